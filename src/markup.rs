//! Reusable HTML fragments: the document head (with SEO and citation
//! metadata), the navigation bar, the footer, and the [`layout`] shell that
//! every page is wrapped in.
//!
//! Markup is built with [`maud`], which escapes spliced values by default.
//! Data from the data file is spliced through [`Text`], which applies
//! [`escape_html`]; raw markup only enters through an explicit
//! [`PreEscaped`].

use crate::data::Paper;
use crate::format::{escape_html, escape_xml, iso_date, slash_date};
use crate::pages::Context;
use chrono::Datelike;
use maud::{html, Markup, PreEscaped, Render, DOCTYPE};
use serde_json::{json, Value};

/// HTML-escaped text.
pub struct Text<'a>(pub &'a str);

impl Render for Text<'_> {
    fn render_to(&self, buffer: &mut String) {
        buffer.push_str(&escape_html(self.0));
    }
}

/// XML-escaped text.
pub struct Xml<'a>(pub &'a str);

impl Render for Xml<'_> {
    fn render_to(&self, buffer: &mut String) {
        buffer.push_str(&escape_xml(self.0));
    }
}

/// The site sections reachable from the navigation bar. A page marks the
/// section it belongs to as active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Framework,
    Programmes,
    Papers,
    People,
    About,
}

const NAVIGATION: [(Section, &str, &str); 5] = [
    (Section::Framework, "/framework", "Framework"),
    (Section::Programmes, "/programmes", "Programmes"),
    (Section::Papers, "/papers", "Papers"),
    (Section::People, "/people", "People"),
    (Section::About, "/about", "About"),
];

/// What the `<head>` of a page describes.
pub struct Head<'a> {
    /// The page title; `None` for a page titled with the bare site name.
    pub title: Option<&'a str>,

    /// Falls back to the site description.
    pub description: Option<String>,

    /// Site path of the page, for the canonical URL.
    pub path: String,

    /// Set on paper detail pages to emit citation metadata.
    pub paper: Option<&'a Paper>,
}

/// Wraps `content` in a complete HTML document.
pub fn layout(ctx: &Context, head: &Head, section: Option<Section>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(Text(&ctx.site.language)) {
            (document_head(ctx, head))
            body {
                (navigation(ctx, section))
                main.site-main {
                    (content)
                }
                (footer(ctx))
            }
        }
    }
}

fn document_head(ctx: &Context, head: &Head) -> Markup {
    let site = ctx.site;
    let title = match head.title {
        Some(title) => format!("{} | {}", title, site.title),
        None => site.title.clone(),
    };
    let description = head.description.as_deref().unwrap_or(&site.description);
    let canonical = site.absolute(&head.path);
    let image = site.absolute(&site.image);
    let og_type = match head.paper {
        Some(_) => "article",
        None => "website",
    };

    html! {
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            title { (Text(&title)) }
            meta name="description" content=(Text(description));
            link rel="canonical" href=(Text(&canonical));

            meta property="og:type" content=(og_type);
            meta property="og:site_name" content=(Text(&site.title));
            meta property="og:title" content=(Text(&title));
            meta property="og:description" content=(Text(description));
            meta property="og:url" content=(Text(&canonical));
            meta property="og:image" content=(Text(&image));

            meta name="twitter:card" content="summary_large_image";
            @if let Some(handle) = &site.twitter {
                meta name="twitter:site" content=(Text(handle));
            }
            meta name="twitter:title" content=(Text(&title));
            meta name="twitter:description" content=(Text(description));
            meta name="twitter:image" content=(Text(&image));

            link rel="alternate" type="application/rss+xml" title=(Text(&site.title))
                href=(Text(&site.absolute("/feed.xml")));
            link rel="stylesheet" href="/styles.css";

            @if let Some(paper) = head.paper {
                (citation_meta(ctx, paper, &canonical))
            }
        }
    }
}

/// Highwire Press (Google Scholar), Dublin Core, and schema.org metadata for
/// a paper.
fn citation_meta(ctx: &Context, paper: &Paper, canonical: &str) -> Markup {
    let site = ctx.site;
    let pdf = paper.pdf.as_ref().map(|pdf| site.absolute(&site.pdf_url(pdf)));

    html! {
        meta name="citation_title" content=(Text(&paper.title));
        @for author in &paper.authors {
            meta name="citation_author" content=(Text(author));
        }
        meta name="citation_publication_date" content=(slash_date(paper.date));
        meta name="citation_online_date" content=(slash_date(paper.date));
        meta name="citation_publisher" content=(Text(&site.publisher));
        meta name="citation_technical_report_institution" content=(Text(&site.publisher));
        meta name="citation_language" content=(Text(&site.language));
        meta name="citation_abstract_html_url" content=(Text(canonical));
        @if let Some(doi) = &paper.doi {
            meta name="citation_doi" content=(Text(doi));
        }
        @if let Some(pdf) = &pdf {
            meta name="citation_pdf_url" content=(Text(pdf));
        }

        meta name="DC.title" content=(Text(&paper.title));
        @for author in &paper.authors {
            meta name="DC.creator" content=(Text(author));
        }
        meta name="DC.date" content=(iso_date(paper.date));
        meta name="DC.publisher" content=(Text(&site.publisher));
        meta name="DC.type" content="Text";
        meta name="DC.format" content="text/html";
        meta name="DC.language" content=(Text(&site.language));
        @if let Some(doi) = &paper.doi {
            meta name="DC.identifier" content=(Text(&format!("doi:{}", doi)));
        }
        @if let Some(text) = &paper.abstract_text {
            meta name="DC.description" content=(Text(text));
        }

        script type="application/ld+json" {
            (PreEscaped(json_script(&scholarly_article(ctx, paper, canonical, pdf.as_deref()))))
        }
    }
}

/// A schema.org `ScholarlyArticle` describing `paper`.
pub fn scholarly_article(ctx: &Context, paper: &Paper, canonical: &str, pdf: Option<&str>) -> Value {
    let site = ctx.site;
    let authors: Vec<Value> = paper
        .authors
        .iter()
        .map(|name| json!({ "@type": "Person", "name": name }))
        .collect();
    let keywords: Vec<&str> = paper.tags.iter().map(|tag| ctx.data.tags.get(tag)).collect();

    let mut article = json!({
        "@context": "https://schema.org",
        "@type": "ScholarlyArticle",
        "headline": paper.title,
        "name": paper.title,
        "author": authors,
        "datePublished": iso_date(paper.date),
        "inLanguage": site.language,
        "url": canonical,
        "publisher": {
            "@type": "Organization",
            "name": site.publisher,
            "url": site.absolute("/"),
        },
    });

    if let Value::Object(fields) = &mut article {
        if let Some(subtitle) = &paper.subtitle {
            fields.insert("alternativeHeadline".to_owned(), json!(subtitle));
        }
        if let Some(text) = &paper.abstract_text {
            fields.insert("abstract".to_owned(), json!(text));
        }
        if !keywords.is_empty() {
            fields.insert("keywords".to_owned(), json!(keywords));
        }
        if let Some(doi) = &paper.doi {
            fields.insert(
                "identifier".to_owned(),
                json!({
                    "@type": "PropertyValue",
                    "propertyID": "DOI",
                    "value": doi,
                    "url": site.doi_url(doi),
                }),
            );
        }
        if let Some(pdf) = pdf {
            fields.insert(
                "encoding".to_owned(),
                json!({
                    "@type": "MediaObject",
                    "encodingFormat": "application/pdf",
                    "contentUrl": pdf,
                }),
            );
        }
    }
    article
}

/// Serializes `value` for an inline `<script>`. Markup-significant characters
/// only ever occur inside JSON strings, where they're written as unicode
/// escapes so the data can't close the element.
fn json_script(value: &Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn navigation(ctx: &Context, current: Option<Section>) -> Markup {
    html! {
        header.site-header {
            nav.site-nav aria-label="Main" {
                a.brand href="/" { (Text(&ctx.site.title)) }
                ul.nav-links {
                    @for (section, href, label) in NAVIGATION {
                        @let active = current == Some(section);
                        li {
                            a href=(href)
                                class=[active.then_some("active")]
                                aria-current=[active.then_some("page")] { (label) }
                        }
                    }
                }
            }
        }
    }
}

fn footer(ctx: &Context) -> Markup {
    html! {
        footer.site-footer {
            p { "© " (ctx.built_at.year()) " " (Text(&ctx.site.publisher)) }
            ul.footer-links {
                li { a href="/contact" { "Contact" } }
                li { a href="/feed.xml" { "RSS" } }
            }
        }
    }
}
