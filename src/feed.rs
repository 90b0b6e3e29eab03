//! Support for creating the RSS 2.0 feed from the list of papers.

use crate::data::Paper;
use crate::format::{rfc822_date, rfc822_datetime};
use crate::group;
use crate::pages::Context;
use rss::extension::atom::{AtomExtensionBuilder, Link};
use rss::extension::dublincore::DublinCoreExtensionBuilder;
use rss::{Category, CategoryBuilder, Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::fmt;
use std::io::Write;

/// The feed's path relative to the site root.
pub const FEED_PATH: &str = "/feed.xml";

/// Creates the feed and writes it to a [`std::io::Write`].
pub fn write_feed<W: Write>(ctx: &Context, w: W) -> Result<()> {
    channel(ctx).write_to(w)?.flush()?;
    Ok(())
}

/// Builds the feed channel: one item per paper, most recent first. The `atom`
/// and `dc` namespaces are declared by the serializer for the extensions in
/// use.
pub fn channel(ctx: &Context) -> Channel {
    let site = ctx.site;
    let self_link = Link {
        href: site.absolute(FEED_PATH),
        rel: "self".to_owned(),
        mime_type: Some("application/rss+xml".to_owned()),
        ..Default::default()
    };

    ChannelBuilder::default()
        .title(site.title.clone())
        .link(site.absolute("/"))
        .description(site.description.clone())
        .language(Some(site.language.clone()))
        .managing_editor(Some(site.editor.clone()))
        .last_build_date(Some(rfc822_datetime(ctx.built_at)))
        .atom_ext(Some(AtomExtensionBuilder::default().links(vec![self_link]).build()))
        .items(
            group::by_date_desc(&ctx.data.papers)
                .into_iter()
                .map(|paper| item(ctx, paper))
                .collect::<Vec<Item>>(),
        )
        .build()
}

fn item(ctx: &Context, paper: &Paper) -> Item {
    let url = ctx.site.absolute(&paper.path());
    let categories: Vec<Category> = paper
        .tags
        .iter()
        .map(|tag| CategoryBuilder::default().name(ctx.data.tags.get(tag).to_owned()).build())
        .collect();

    ItemBuilder::default()
        .title(Some(paper.title.clone()))
        .link(Some(url.clone()))
        .guid(Some(GuidBuilder::default().value(url).permalink(true).build()))
        .pub_date(Some(rfc822_date(paper.date)))
        .description(Some(description(paper)))
        .categories(categories)
        .dublin_core_ext(paper.doi.as_ref().map(|doi| {
            DublinCoreExtensionBuilder::default()
                .identifiers(vec![format!("doi:{}", doi)])
                .build()
        }))
        .build()
}

/// Subtitle, byline, and abstract, whichever are present, joined by em-dashes.
fn description(paper: &Paper) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(3);
    if let Some(subtitle) = &paper.subtitle {
        parts.push(subtitle.clone());
    }
    if !paper.authors.is_empty() {
        parts.push(format!("By {}", paper.authors.join(", ")));
    }
    if let Some(text) = &paper.abstract_text {
        parts.push(text.clone());
    }
    parts.join(" — ")
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing the feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when the channel can't be serialized.
    Rss(rss::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Rss(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Rss(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<rss::Error> for Error {
    /// Converts [`rss::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: rss::Error) -> Error {
        Error::Rss(err)
    }
}
