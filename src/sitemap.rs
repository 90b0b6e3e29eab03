//! Builds `sitemap.xml`.

use crate::format::iso_date;
use crate::markup::Xml;
use crate::pages::Context;
use chrono::NaiveDate;
use maud::{html, PreEscaped};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Site paths that aren't generated from data, with their change frequency
/// and priority.
const STATIC_ROUTES: [(&str, &str, &str); 7] = [
    ("/", "weekly", "1.0"),
    ("/framework", "monthly", "0.8"),
    ("/papers", "weekly", "0.9"),
    ("/programmes", "monthly", "0.8"),
    ("/people", "monthly", "0.6"),
    ("/about", "monthly", "0.7"),
    ("/contact", "yearly", "0.5"),
];

/// A `<url>` element of the sitemap.
#[derive(Debug, PartialEq)]
pub struct Entry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: &'static str,
    pub priority: &'static str,
}

/// Static routes and programmes are stamped with the build date; papers with
/// their own date.
pub fn entries(ctx: &Context) -> Vec<Entry> {
    let site = ctx.site;
    let today = ctx.built_at.date_naive();

    let statics = STATIC_ROUTES.iter().map(|&(path, changefreq, priority)| Entry {
        loc: site.absolute(path),
        lastmod: today,
        changefreq,
        priority,
    });
    let papers = ctx.data.papers.iter().map(|paper| Entry {
        loc: site.absolute(&paper.path()),
        lastmod: paper.date,
        changefreq: "monthly",
        priority: "0.7",
    });
    let programmes = ctx.data.programs.iter().map(|programme| Entry {
        loc: site.absolute(&programme.path()),
        lastmod: today,
        changefreq: "monthly",
        priority: "0.6",
    });

    statics.chain(papers).chain(programmes).collect()
}

/// Renders the sitemap document.
pub fn sitemap(ctx: &Context) -> String {
    let urlset = html! {
        urlset xmlns=(SITEMAP_NAMESPACE) {
            @for entry in entries(ctx) {
                url {
                    loc { (Xml(&entry.loc)) }
                    lastmod { (iso_date(entry.lastmod)) }
                    changefreq { (entry.changefreq) }
                    priority { (entry.priority) }
                }
            }
        }
    };
    html! { (PreEscaped(XML_DECLARATION)) (urlset) }.into_string()
}
