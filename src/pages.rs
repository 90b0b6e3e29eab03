//! Composes the HTML pages of the site and writes them to disk. There are four
//! kinds of page:
//!
//! * a detail page per paper, at `papers/{id}.html`
//! * the papers index, at `papers/index.html`
//! * a page per configured programme, at `programmes/{key}.html`
//! * the programmes index, at `programmes/index.html`
//!
//! [`pages`] builds all of them in memory as [`Page`]s; [`Writer`] puts them
//! on disk.

use crate::config::Site;
use crate::data::{or_key, Dataset, Paper, Programme};
use crate::format::{bibtex, citation, count_label, human_date, iso_date, truncate};
use crate::group;
use crate::markup::{layout, Head, Section, Text};
use chrono::{DateTime, Utc};
use log::debug;
use maud::{html, Markup, PreEscaped};
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The output subdirectory for paper pages.
pub const PAPERS_DIRECTORY: &str = "papers";

/// The output subdirectory for programme pages.
pub const PROGRAMMES_DIRECTORY: &str = "programmes";

const INDEX_FILE: &str = "index.html";

/// Meta descriptions are cut to this many characters.
const DESCRIPTION_LENGTH: usize = 160;

const COPY_SCRIPT: &str = r#"
document.querySelectorAll('[data-copy-target]').forEach(function (button) {
  button.addEventListener('click', function () {
    var target = document.getElementById(button.dataset.copyTarget);
    if (!target || !navigator.clipboard) { return; }
    navigator.clipboard.writeText(target.textContent).then(function () {
      button.textContent = 'Copied';
      setTimeout(function () { button.textContent = 'Copy BibTeX'; }, 2000);
    });
  });
});
"#;

/// Everything a composer reads: the site settings, the data, and the time
/// the build started. All of it is immutable for the duration of a build.
pub struct Context<'a> {
    pub site: &'a Site,
    pub data: &'a Dataset,
    pub built_at: DateTime<Utc>,
}

/// An output HTML file.
pub struct Page {
    /// The target location, relative to the output directory.
    pub file_path: PathBuf,

    pub contents: String,
}

/// Builds every HTML page of the site.
pub fn pages(ctx: &Context) -> Vec<Page> {
    let papers = Path::new(PAPERS_DIRECTORY);
    let programmes = Path::new(PROGRAMMES_DIRECTORY);

    let mut pages = Vec::with_capacity(ctx.data.papers.len() + ctx.data.programs.len() + 2);
    pages.push(Page {
        file_path: papers.join(INDEX_FILE),
        contents: papers_index(ctx).into_string(),
    });
    for paper in &ctx.data.papers {
        pages.push(Page {
            file_path: papers.join(paper.file_name()),
            contents: paper_page(ctx, paper).into_string(),
        });
    }
    pages.push(Page {
        file_path: programmes.join(INDEX_FILE),
        contents: programmes_index(ctx).into_string(),
    });
    for programme in &ctx.data.programs {
        pages.push(Page {
            file_path: programmes.join(programme.file_name()),
            contents: programme_page(ctx, programme).into_string(),
        });
    }
    pages
}

/// A call to action on a paper page.
struct Action {
    label: &'static str,
    class: &'static str,
    href: String,
}

/// The buttons for whichever of PDF, DOI, code, and dashboard the paper has,
/// in that order.
fn actions(site: &Site, paper: &Paper) -> Vec<Action> {
    let mut actions = Vec::new();
    if let Some(pdf) = &paper.pdf {
        actions.push(Action { label: "PDF", class: "button button-primary", href: site.pdf_url(pdf) });
    }
    if let Some(doi) = &paper.doi {
        actions.push(Action { label: "DOI", class: "button", href: site.doi_url(doi) });
    }
    if let Some(github) = &paper.github {
        actions.push(Action { label: "Code", class: "button", href: github.clone() });
    }
    if let Some(dashboard) = &paper.dashboard {
        actions.push(Action { label: "Dashboard", class: "button", href: dashboard.clone() });
    }
    actions
}

/// The detail page of a single paper.
pub fn paper_page(ctx: &Context, paper: &Paper) -> Markup {
    let data = ctx.data;
    let status = data.statuses.get(&paper.status);
    // An unknown programme still gets a link, labelled with its raw key.
    let known = data
        .programs
        .get(&paper.program)
        .map(|programme| format!("{}: {}", programme.label(), programme.title));
    let programme_label = or_key(known.as_deref(), &paper.program);
    let bibtex_id = format!("bibtex-{}", paper.id);

    let content = html! {
        article.paper {
            a.back-link href="/papers" { "← All papers" }

            div.paper-meta {
                time datetime=(iso_date(paper.date)) { (human_date(paper.date)) }
                span class=(Text(&format!("status status-{}", paper.status))) { (Text(status)) }
                a.programme-link href=(Text(&format!("/programmes/{}", paper.program))) {
                    (Text(programme_label))
                }
            }

            header.paper-header {
                h1.paper-title { (Text(&paper.title)) }
                @if let Some(subtitle) = &paper.subtitle {
                    p.paper-subtitle { (Text(subtitle)) }
                }
                p.paper-authors { (Text(&paper.authors.join(", "))) }
                @if let Some(journal) = &paper.journal {
                    p.paper-journal { "Submitted to " em { (Text(journal)) } }
                }
            }

            @let buttons = actions(ctx.site, paper);
            @if !buttons.is_empty() {
                div.paper-actions {
                    @for action in &buttons {
                        a class=(action.class) href=(Text(&action.href)) target="_blank" rel="noopener" {
                            (action.label)
                        }
                    }
                }
            }

            @if let Some(text) = &paper.abstract_text {
                section.paper-abstract {
                    h2 { "Abstract" }
                    p { (Text(text)) }
                }
            }

            section.paper-citation {
                h2 { "Suggested citation" }
                p.citation { (Text(&citation(paper, ctx.site))) }
            }

            section.paper-bibtex {
                h2 { "BibTeX" }
                pre id=(Text(&bibtex_id)) { code { (Text(&bibtex(paper, ctx.site, status))) } }
                button.copy-button type="button" data-copy-target=(Text(&bibtex_id)) { "Copy BibTeX" }
            }

            @if !paper.tags.is_empty() {
                section.paper-tags {
                    h2 { "Tags" }
                    ul.tag-list {
                        @for tag in &paper.tags {
                            li.tag { (Text(data.tags.get(tag))) }
                        }
                    }
                }
            }
        }
        script { (PreEscaped(COPY_SCRIPT)) }
    };

    layout(
        ctx,
        &Head {
            title: Some(paper.title.as_str()),
            description: paper
                .abstract_text
                .as_deref()
                .map(|text| truncate(text, DESCRIPTION_LENGTH)),
            path: paper.path(),
            paper: Some(paper),
        },
        Some(Section::Papers),
        content,
    )
}

/// A linked summary of a paper for the index and programme pages.
fn paper_card(ctx: &Context, paper: &Paper) -> Markup {
    html! {
        a.paper-card href=(Text(&paper.path())) {
            div.card-meta {
                time datetime=(iso_date(paper.date)) { (human_date(paper.date)) }
                span class=(Text(&format!("status status-{}", paper.status))) {
                    (Text(ctx.data.statuses.get(&paper.status)))
                }
            }
            h3.card-title { (Text(&paper.title)) }
            @if let Some(subtitle) = &paper.subtitle {
                p.card-subtitle { (Text(subtitle)) }
            }
            p.card-authors { (Text(&paper.authors.join(", "))) }
        }
    }
}

/// Every paper, grouped under its programme. Papers whose programme isn't
/// configured have no section to appear in.
pub fn papers_index(ctx: &Context) -> Markup {
    let groups = group::by_programme(&ctx.data.papers, &ctx.data.programs);
    let content = html! {
        header.page-header {
            h1 { "Papers" }
            p.page-lede { "Working papers, grouped by research programme." }
        }
        @for group in &groups {
            @if let Some(programme) = group.programme {
                @if !group.papers.is_empty() {
                    section.programme-group id=(Text(&programme.key)) {
                        h2 {
                            a href=(Text(&programme.path())) {
                                span.programme-index { (Text(&programme.label())) }
                                " "
                                span.programme-title { (Text(&programme.title)) }
                            }
                        }
                        div.paper-list {
                            @for paper in &group.papers {
                                (paper_card(ctx, paper))
                            }
                        }
                    }
                }
            }
        }
    };

    layout(
        ctx,
        &Head { title: Some("Papers"), description: None, path: "/papers".to_owned(), paper: None },
        Some(Section::Papers),
        content,
    )
}

/// A single programme and its papers, most recent first.
pub fn programme_page(ctx: &Context, programme: &Programme) -> Markup {
    let papers = group::programme_papers(&ctx.data.papers, &programme.key);
    let title = format!("{}: {}", programme.label(), programme.title);
    let content = html! {
        a.back-link href="/programmes" { "← All programmes" }
        header.programme-header {
            p.programme-index { (Text(&programme.label())) }
            h1 { (Text(&programme.title)) }
            p.programme-description { (Text(&programme.description)) }
        }
        p.paper-count { (count_label(papers.len())) }
        div.paper-list {
            @for paper in &papers {
                (paper_card(ctx, paper))
            }
        }
    };

    layout(
        ctx,
        &Head {
            title: Some(title.as_str()),
            description: Some(truncate(&programme.description, DESCRIPTION_LENGTH)),
            path: programme.path(),
            paper: None,
        },
        Some(Section::Programmes),
        content,
    )
}

/// A card for each configured programme with its paper count.
pub fn programmes_index(ctx: &Context) -> Markup {
    let counts = group::counts(&ctx.data.papers, &ctx.data.programs);
    let content = html! {
        header.page-header {
            h1 { "Research Programmes" }
        }
        div.programme-list {
            @for (programme, count) in &counts {
                a.programme-card href=(Text(&programme.path())) {
                    span.programme-index { (Text(&programme.label())) }
                    h2 { (Text(&programme.title)) }
                    p { (Text(&programme.description)) }
                    span.paper-count { (count_label(*count)) }
                }
            }
        }
    };

    layout(
        ctx,
        &Head {
            title: Some("Programmes"),
            description: None,
            path: "/programmes".to_owned(),
            paper: None,
        },
        Some(Section::Programmes),
        content,
    )
}

/// Responsible for writing [`Page`]s to disk.
pub struct Writer<'a> {
    /// The root of the output tree; page paths are relative to it.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Writes every page, creating directories as they're first needed.
    pub fn write_pages(&self, pages: &[Page]) -> Result<()> {
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for page in pages {
            let path = self.output_directory.join(&page.file_path);
            if let Some(dir) = path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir).map_err(|err| Error::Write {
                        path: dir.to_owned(),
                        err,
                    })?;
                }
            }
            self.write_file(&page.file_path, &page.contents)?;
        }
        Ok(())
    }

    /// Writes `contents` to `path`, relative paths being resolved against the
    /// output directory.
    pub fn write_file<C: AsRef<[u8]>>(&self, path: &Path, contents: C) -> Result<()> {
        let path = self.output_directory.join(path);
        std::fs::write(&path, contents).map_err(|err| Error::Write {
            path: path.clone(),
            err,
        })?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error writing an output file or creating its directory.
    Write { path: PathBuf, err: io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::data::fixture;
    use chrono::TimeZone;

    fn with_context<T>(data: &Dataset, f: impl FnOnce(&Context) -> T) -> T {
        let config = Config::defaults(Path::new(".")).unwrap();
        let ctx = Context {
            site: &config.site,
            data,
            built_at: Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
        };
        f(&ctx)
    }

    #[test]
    fn test_page_paths() {
        let data = fixture::dataset();
        let paths: Vec<PathBuf> = with_context(&data, |ctx| {
            pages(ctx).into_iter().map(|page| page.file_path).collect()
        });
        assert!(paths.contains(&PathBuf::from("papers/index.html")));
        assert!(paths.contains(&PathBuf::from("programmes/index.html")));
        for paper in &data.papers {
            assert!(paths.contains(&Path::new("papers").join(format!("{}.html", paper.id))));
        }
        for programme in &data.programs {
            assert!(paths.contains(&Path::new("programmes").join(format!("{}.html", programme.key))));
        }
        assert_eq!(data.papers.len() + data.programs.len() + 2, paths.len());
    }

    #[test]
    fn test_paper_page() {
        let data = fixture::dataset();
        let html = with_context(&data, |ctx| paper_page(ctx, &data.papers[1]).into_string());
        assert!(html.contains(r#"<link rel="canonical" href="https://example.org/papers/dp-001">"#));
        assert!(html.contains("<h1 class=\"paper-title\">On Friction</h1>"));
        assert!(html.contains("Evidence &amp; Theory"));
        assert!(html.contains(r#"<a class="programme-link" href="/programmes/p1">Programme I: Markets</a>"#));
        assert!(html.contains("14 March 2025"));
        assert!(html.contains("Working Draft"));
        assert!(html.contains("Submitted to <em>Journal of Frictions</em>"));
        assert!(html.contains(r#"<section class="paper-abstract">"#));
        assert!(html.contains("smith2025_dp_001"));
        assert!(html.contains(r#"data-copy-target="bibtex-dp-001""#));
        assert!(html.contains(r#"<li class="tag">Markets</li>"#));
        assert!(html.contains(r#"<li class="tag">mystery</li>"#));
    }

    #[test]
    fn test_paper_page_actions_in_order() {
        let data = fixture::dataset();
        let html = with_context(&data, |ctx| paper_page(ctx, &data.papers[1]).into_string());
        let pdf = html.find(r#"href="/pdfs/dp-001.pdf""#).unwrap();
        let doi = html.find(r#"href="https://doi.org/10.1234/friction""#).unwrap();
        let code = html.find(r#"href="https://github.com/example/friction""#).unwrap();
        assert!(pdf < doi && doi < code);
        assert!(!html.contains(">Dashboard<"));
    }

    #[test]
    fn test_paper_page_omits_missing_sections() {
        let data = fixture::dataset();
        let html = with_context(&data, |ctx| paper_page(ctx, &data.papers[0]).into_string());
        assert!(!html.contains("paper-abstract"));
        assert!(!html.contains("paper-tags"));
        assert!(!html.contains("paper-actions"));
        assert!(!html.contains("paper-subtitle"));
        assert!(!html.contains("Submitted to"));
        assert!(html.contains("paper-citation"));
        assert!(html.contains("paper-bibtex"));
    }

    #[test]
    fn test_paper_page_with_null_tags() {
        let data = fixture::dataset();
        let html = with_context(&data, |ctx| paper_page(ctx, &data.papers[2]).into_string());
        assert!(!html.contains("paper-tags"));
        assert!(!html.contains("paper-subtitle"));
    }

    #[test]
    fn test_paper_meta_description() -> std::result::Result<(), serde_json::Error> {
        let long = vec!["friction"; 30].join(" ");
        let json = serde_json::json!({
            "papers": [{
                "id": "dp-010",
                "title": "Long Abstract",
                "authors": ["A. Smith"],
                "date": "2025-01-01",
                "status": "draft",
                "program": "p1",
                "abstract": long,
            }],
        });
        let data: Dataset = serde_json::from_value(json)?;
        let html = with_context(&data, |ctx| paper_page(ctx, &data.papers[0]).into_string());
        let expected = format!("{}…", vec!["friction"; 17].join(" "));
        assert!(html.contains(&format!(r#"<meta name="description" content="{}">"#, expected)));
        assert!(html.contains(&format!(r#"<section class="paper-abstract"><h2>Abstract</h2><p>{}</p>"#, long)));

        let data = fixture::dataset();
        let html = with_context(&data, |ctx| paper_page(ctx, &data.papers[0]).into_string());
        assert_eq!("dp-002", data.papers[0].id);
        assert!(html.contains(
            r#"<meta name="description" content="Working papers and research programmes.">"#
        ));
        Ok(())
    }

    #[test]
    fn test_paper_page_escapes_text() {
        let data = fixture::dataset();
        let html = with_context(&data, |ctx| paper_page(ctx, &data.papers[2]).into_string());
        assert!(html.contains("Institutions &lt;Revisited&gt;"));
        assert!(!html.contains("<Revisited>"));
        assert!(html.contains("C. O&#039;Neil"));
        assert!(html.contains(">Dashboard<"));
        // unknown status falls back to its key
        assert!(html.contains(r#"<span class="status status-review">review</span>"#));
    }

    #[test]
    fn test_paper_page_with_unknown_programme() {
        let data = fixture::dataset();
        let html = with_context(&data, |ctx| paper_page(ctx, &data.papers[3]).into_string());
        assert!(html.contains(r#"<a class="programme-link" href="/programmes/p9">p9</a>"#));
    }

    #[test]
    fn test_papers_index() {
        let data = fixture::dataset();
        let html = with_context(&data, |ctx| papers_index(ctx).into_string());
        let p2 = html.find(r#"<section class="programme-group" id="p2">"#).unwrap();
        let p1 = html.find(r#"<section class="programme-group" id="p1">"#).unwrap();
        assert!(p2 < p1);
        let newer = html.find(r#"href="/papers/dp-001""#).unwrap();
        let older = html.find(r#"href="/papers/dp-002""#).unwrap();
        assert!(p1 < newer && newer < older);
        // neither the empty programme nor the unknown one get a section
        assert!(!html.contains(r#"id="p3""#));
        assert!(!html.contains("dp-004"));
    }

    #[test]
    fn test_programme_page() {
        let data = fixture::dataset();
        let html = with_context(&data, |ctx| {
            programme_page(ctx, data.programs.get("p1").unwrap()).into_string()
        });
        assert!(html.contains(r#"<a class="back-link" href="/programmes">"#));
        assert!(html.contains("How prices form."));
        assert!(html.contains("2 papers"));
        assert!(html.find("/papers/dp-001").unwrap() < html.find("/papers/dp-002").unwrap());

        let html = with_context(&data, |ctx| {
            programme_page(ctx, data.programs.get("p2").unwrap()).into_string()
        });
        assert!(html.contains("1 paper<"));
    }

    #[test]
    fn test_programmes_index() {
        let data = fixture::dataset();
        let html = with_context(&data, |ctx| programmes_index(ctx).into_string());
        assert!(html.find("Institutions").unwrap() < html.find("Markets").unwrap());
        assert!(html.contains(r#"<span class="paper-count">2 papers</span>"#));
        assert!(html.contains(r#"<span class="paper-count">1 paper</span>"#));
        assert!(html.contains(r#"<span class="paper-count">0 papers</span>"#));
        assert!(html.contains(r#"<span class="programme-index">Programme 3</span>"#));
    }

    #[test]
    fn test_writer() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let writer = Writer { output_directory: dir.path() };
        writer.write_pages(&[
            Page { file_path: PathBuf::from("papers/a.html"), contents: "a".to_owned() },
            Page { file_path: PathBuf::from("papers/b.html"), contents: "b".to_owned() },
        ])?;
        assert_eq!("b", std::fs::read_to_string(dir.path().join("papers/b.html"))?);
        Ok(())
    }
}
