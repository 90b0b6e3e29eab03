//! Pure functions that turn raw field values into display or machine-readable
//! strings: dates, escaped text, truncated abstracts, citations, and BibTeX.

use crate::config::Site;
use crate::data::Paper;
use chrono::{DateTime, NaiveDate, Utc};

/// `14 March 2025`. Dates carry no time or zone, so there is no day-shift.
pub fn human_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// `2025-03-14`
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The date at noon UTC in RFC-822 form, as RSS wants:
/// `Fri, 14 Mar 2025 12:00:00 GMT`.
pub fn rfc822_date(date: NaiveDate) -> String {
    date.format("%a, %d %b %Y 12:00:00 GMT").to_string()
}

pub fn rfc822_datetime(datetime: DateTime<Utc>) -> String {
    datetime.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// `2025/03/14`, the Highwire Press date format.
pub fn slash_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// Escapes `& < > " '` for HTML text and attribute values.
pub fn escape_html(s: &str) -> String {
    escape(s, "&#039;")
}

/// Escapes `& < > " '` for XML, using `&apos;` for the apostrophe.
pub fn escape_xml(s: &str) -> String {
    escape(s, "&apos;")
}

fn escape(s: &str, apostrophe: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str(apostrophe),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Shortens `text` to at most `max` characters (plus an ellipsis), cutting
/// back to a word boundary. Text of `max` characters or fewer is returned
/// as is.
pub fn truncate(text: &str, max: usize) -> String {
    let (cut, next) = match text.char_indices().nth(max) {
        None => return text.to_owned(),
        Some(found) => found,
    };
    let head = &text[..cut];
    let head = match next.is_whitespace() {
        // the cut landed on a word boundary
        true => head,
        false => match head.rfind(char::is_whitespace) {
            Some(i) => &head[..i],
            None => head,
        },
    };
    format!("{}…", head.trim_end())
}

/// `smith2025_dp_001`: the first author's lowercased surname, the year, and
/// the paper id with hyphens turned into underscores.
pub fn bibtex_key(paper: &Paper) -> String {
    let surname: String = paper
        .authors
        .first()
        .and_then(|author| author.split_whitespace().last())
        .unwrap_or("anonymous")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    format!("{}{:04}_{}", surname, paper.year(), paper.id.replace('-', "_"))
}

/// A BibTeX `@article` entry. `status` is the paper's status label.
pub fn bibtex(paper: &Paper, site: &Site, status: &str) -> String {
    let mut fields: Vec<(&str, String)> = vec![
        ("title", paper.title.clone()),
        ("author", paper.authors.join(" and ")),
        ("year", paper.year().to_string()),
        ("publisher", site.publisher.clone()),
    ];
    if let Some(doi) = &paper.doi {
        fields.push(("doi", doi.clone()));
    }
    if let Some(pdf) = &paper.pdf {
        fields.push(("url", site.absolute(&site.pdf_url(pdf))));
    }
    fields.push(("note", status.to_owned()));

    let body: Vec<String> = fields
        .iter()
        .map(|(name, value)| format!("  {} = {{{}}}", name, value))
        .collect();
    format!("@article{{{},\n{}\n}}", bibtex_key(paper), body.join(",\n"))
}

/// `A. Smith, B. Jones (2025). "On Friction." Evidence. Publisher. doi:10.1/x`
pub fn citation(paper: &Paper, site: &Site) -> String {
    let mut citation = format!(
        "{} ({}). \"{}.\"",
        paper.authors.join(", "),
        paper.year(),
        paper.title
    );
    if let Some(subtitle) = &paper.subtitle {
        citation.push_str(&format!(" {}.", subtitle));
    }
    citation.push_str(&format!(" {}.", site.publisher));
    if let Some(doi) = &paper.doi {
        citation.push_str(&format!(" doi:{}", doi));
    }
    citation
}

/// `1 paper`, `3 papers`
pub fn count_label(count: usize) -> String {
    match count {
        1 => "1 paper".to_owned(),
        n => format!("{} papers", n),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::data::fixture;
    use chrono::TimeZone;
    use std::path::Path;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_dates() {
        let d = date("2025-03-04");
        assert_eq!("4 March 2025", human_date(d));
        assert_eq!("2025-03-04", iso_date(d));
        assert_eq!("2025/03/04", slash_date(d));
        assert_eq!("Tue, 04 Mar 2025 12:00:00 GMT", rfc822_date(d));
    }

    #[test]
    fn test_rfc822_datetime() {
        let built = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 5).unwrap();
        assert_eq!("Sun, 18 Oct 2026 09:30:05 GMT", rfc822_datetime(built));
    }

    #[test]
    fn test_escape_html() {
        let escaped = escape_html(r#"Tom & "Jerry's" <cat>"#);
        assert_eq!("Tom &amp; &quot;Jerry&#039;s&quot; &lt;cat&gt;", escaped);
        for c in ['<', '>', '"', '\''] {
            assert!(!escaped.contains(c));
        }
    }

    #[test]
    fn test_escape_xml_differs_only_in_apostrophe() {
        let input = r#"a & b < c > d " e ' f"#;
        assert_eq!(
            escape_html(input).replace("&#039;", "&apos;"),
            escape_xml(input)
        );
        assert_eq!("&apos;", escape_xml("'"));
    }

    #[test]
    fn test_truncate() {
        let text = "The quick brown fox jumps";
        assert_eq!("The quick…", truncate(text, 12));
        assert_eq!("The quick brown…", truncate(text, 15));
        assert_eq!(text, truncate(text, text.chars().count()));
        assert_eq!(text, truncate(text, 100));
    }

    #[test]
    fn test_truncate_is_stable_on_truncated_text() {
        let once = truncate("The quick brown fox jumps over the lazy dog", 20);
        assert_eq!("The quick brown fox…", once);
        assert_eq!(once, truncate(&once, 20));
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!("über straße…", truncate("über straße überall", 14));
    }

    #[test]
    fn test_bibtex_key() {
        let data = fixture::dataset();
        assert_eq!("smith2025_dp_001", bibtex_key(&data.papers[1]));
        assert_eq!("oneil2024_dp_003", bibtex_key(&data.papers[2]));
    }

    #[test]
    fn test_bibtex_keys_are_distinct_for_same_author_and_year() {
        let data = fixture::dataset();
        let mut other = data.papers[1].clone();
        other.id = "dp-009".to_owned();
        assert_eq!(bibtex_key(&data.papers[1]), bibtex_key(&data.papers[1]));
        assert_ne!(bibtex_key(&data.papers[1]), bibtex_key(&other));
    }

    #[test]
    fn test_bibtex() -> anyhow::Result<()> {
        let site = Config::defaults(Path::new("."))?.site;
        let data = fixture::dataset();
        assert_eq!(
            "@article{smith2025_dp_001,\n  title = {On Friction},\n  author = {A. Smith and B. Jones},\n  year = {2025},\n  publisher = {Scholia},\n  doi = {10.1234/friction},\n  url = {https://example.org/pdfs/dp-001.pdf},\n  note = {Working Draft}\n}",
            bibtex(&data.papers[1], &site, "Working Draft")
        );
        assert_eq!(
            "@article{smith2024_dp_002,\n  title = {Sticky Prices},\n  author = {A. Smith},\n  year = {2024},\n  publisher = {Scholia},\n  note = {Published}\n}",
            bibtex(&data.papers[0], &site, "Published")
        );
        Ok(())
    }

    #[test]
    fn test_citation() -> anyhow::Result<()> {
        let site = Config::defaults(Path::new("."))?.site;
        let data = fixture::dataset();
        assert_eq!(
            "A. Smith, B. Jones (2025). \"On Friction.\" Evidence & Theory. Scholia. doi:10.1234/friction",
            citation(&data.papers[1], &site)
        );
        assert_eq!(
            "A. Smith (2024). \"Sticky Prices.\" Scholia.",
            citation(&data.papers[0], &site)
        );
        Ok(())
    }

    #[test]
    fn test_count_label() {
        assert_eq!("0 papers", count_label(0));
        assert_eq!("1 paper", count_label(1));
        assert_eq!("2 papers", count_label(2));
    }
}
