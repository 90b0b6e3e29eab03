//! Groups and orders papers for the index pages.

use crate::data::{Paper, Programme, Programmes};
use std::collections::HashMap;

/// The papers filed under one programme key.
pub struct Group<'a> {
    pub key: &'a str,

    /// `None` for keys that match no configured programme.
    pub programme: Option<&'a Programme>,

    /// Most recent first.
    pub papers: Vec<&'a Paper>,
}

/// Groups `papers` by programme. Every configured programme gets a group, in
/// configured order, even when it has no papers. Papers with an unknown
/// programme key go into extra groups appended after the configured ones, in
/// the order their keys are first seen.
pub fn by_programme<'a>(papers: &'a [Paper], programmes: &'a Programmes) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = programmes
        .iter()
        .map(|programme| Group {
            key: &programme.key,
            programme: Some(programme),
            papers: Vec::new(),
        })
        .collect();
    let mut positions: HashMap<&str, usize> = groups
        .iter()
        .enumerate()
        .map(|(i, group)| (group.key, i))
        .collect();

    for paper in papers {
        match positions.get(paper.program.as_str()) {
            Some(&i) => groups[i].papers.push(paper),
            None => {
                positions.insert(&paper.program, groups.len());
                groups.push(Group {
                    key: &paper.program,
                    programme: None,
                    papers: vec![paper],
                });
            }
        }
    }

    for group in groups.iter_mut() {
        sort_by_date_desc(&mut group.papers);
    }
    groups
}

/// Sorts most recent first. The sort is stable, so papers sharing a date
/// keep their relative order.
pub fn sort_by_date_desc(papers: &mut [&Paper]) {
    papers.sort_by(|a, b| b.date.cmp(&a.date));
}

/// All of `papers`, most recent first.
pub fn by_date_desc(papers: &[Paper]) -> Vec<&Paper> {
    let mut sorted: Vec<&Paper> = papers.iter().collect();
    sort_by_date_desc(&mut sorted);
    sorted
}

/// The papers of one programme, most recent first.
pub fn programme_papers<'a>(papers: &'a [Paper], key: &str) -> Vec<&'a Paper> {
    let mut matched: Vec<&Paper> = papers.iter().filter(|p| p.program == key).collect();
    sort_by_date_desc(&mut matched);
    matched
}

/// Counts papers per configured programme, in configured order. Papers with an
/// unknown programme key aren't counted anywhere.
pub fn counts<'a>(papers: &[Paper], programmes: &'a Programmes) -> Vec<(&'a Programme, usize)> {
    programmes
        .iter()
        .map(|programme| {
            let count = papers.iter().filter(|p| p.program == programme.key).count();
            (programme, count)
        })
        .collect()
}
