//! Defines the [`Dataset`], [`Paper`], [`Programme`], and [`Labels`] types and
//! the logic for loading them from the JSON data file. Loading performs no
//! transformation beyond dropping empty optional strings; grouping and sorting
//! live in [`crate::group`].

use chrono::{Datelike, NaiveDate};
use log::warn;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Everything read from the data file.
#[derive(Debug, Deserialize)]
pub struct Dataset {
    pub papers: Vec<Paper>,

    #[serde(default)]
    pub tags: Labels,

    #[serde(default)]
    pub statuses: Labels,

    /// The configured programmes, in the order they appear in the file.
    #[serde(default)]
    pub programs: Programmes,

    /// Loaded for completeness; no page consumes it.
    #[serde(default)]
    pub categories: serde_json::Value,
}

impl Dataset {
    /// Loads a [`Dataset`] from a JSON file. Papers referencing a programme
    /// key that isn't configured are kept, but logged.
    pub fn load(path: &Path) -> Result<Dataset> {
        match Dataset::_load(path) {
            Ok(data) => {
                for paper in data.orphans() {
                    warn!(
                        "paper `{}` references unknown programme `{}`",
                        paper.id, paper.program
                    );
                }
                Ok(data)
            }
            Err(e) => Err(Error::Annotated(
                format!("loading data file `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn _load(path: &Path) -> Result<Dataset> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parses a [`Dataset`] from a JSON string.
    pub fn from_json(input: &str) -> Result<Dataset> {
        Ok(serde_json::from_str(input)?)
    }

    /// Papers whose programme key matches no configured programme.
    pub fn orphans(&self) -> impl Iterator<Item = &Paper> {
        self.papers
            .iter()
            .filter(move |paper| self.programs.get(&paper.program).is_none())
    }
}

/// A single paper record.
#[derive(Clone, Debug, Deserialize)]
pub struct Paper {
    /// Unique slug; used verbatim as file stem and URL segment.
    pub id: String,

    pub title: String,

    #[serde(default, deserialize_with = "non_empty")]
    pub subtitle: Option<String>,

    pub authors: Vec<String>,

    pub date: NaiveDate,

    /// Status key, resolved through [`Dataset::statuses`].
    pub status: String,

    /// Programme key, resolved through [`Dataset::programs`].
    pub program: String,

    #[serde(default, deserialize_with = "non_empty")]
    pub doi: Option<String>,

    /// PDF file name, relative to the site's PDF base path.
    #[serde(default, deserialize_with = "non_empty")]
    pub pdf: Option<String>,

    /// Code repository URL.
    #[serde(default, deserialize_with = "non_empty")]
    pub github: Option<String>,

    #[serde(default, deserialize_with = "non_empty")]
    pub dashboard: Option<String>,

    #[serde(default, rename = "abstract", deserialize_with = "non_empty")]
    pub abstract_text: Option<String>,

    /// The journal the paper has been submitted to.
    #[serde(default, deserialize_with = "non_empty")]
    pub journal: Option<String>,

    #[serde(default, deserialize_with = "list")]
    pub tags: Vec<String>,
}

impl Paper {
    /// The site path of the paper's detail page, `/papers/{id}`.
    pub fn path(&self) -> String {
        format!("/papers/{}", self.id)
    }

    pub fn file_name(&self) -> String {
        format!("{}.html", self.id)
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// A research programme. Papers refer to it by `key`.
#[derive(Clone, Debug, PartialEq)]
pub struct Programme {
    pub key: String,

    /// Display ordinal, e.g. `I`.
    pub index: String,

    pub title: String,
    pub description: String,
}

impl Programme {
    /// The site path of the programme page, `/programmes/{key}`.
    pub fn path(&self) -> String {
        format!("/programmes/{}", self.key)
    }

    pub fn file_name(&self) -> String {
        format!("{}.html", self.key)
    }

    /// `Programme I`
    pub fn label(&self) -> String {
        format!("Programme {}", self.index)
    }
}

/// The configured programmes in file order. The JSON object is read entry by
/// entry so the order survives deserialization.
#[derive(Clone, Debug, Default)]
pub struct Programmes(Vec<Programme>);

impl Programmes {
    pub fn iter(&self) -> std::slice::Iter<'_, Programme> {
        self.0.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Programme> {
        self.0.iter().find(|p| p.key == key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<'a> IntoIterator for &'a Programmes {
    type Item = &'a Programme;
    type IntoIter = std::slice::Iter<'a, Programme>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Deserialize)]
struct ProgrammeFields {
    #[serde(deserialize_with = "ordinal")]
    index: String,
    title: String,
    #[serde(default)]
    description: String,
}

impl<'de> Deserialize<'de> for Programmes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Programmes, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ProgrammesVisitor;

        impl<'de> Visitor<'de> for ProgrammesVisitor {
            type Value = Programmes;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from programme keys to programmes")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Programmes, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut programmes: Vec<Programme> =
                    Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, fields)) = map.next_entry::<String, ProgrammeFields>()? {
                    let programme = Programme {
                        key,
                        index: fields.index,
                        title: fields.title,
                        description: fields.description,
                    };
                    // A repeated key keeps its first position but takes the
                    // later value.
                    match programmes.iter_mut().find(|p| p.key == programme.key) {
                        Some(existing) => *existing = programme,
                        None => programmes.push(programme),
                    }
                }
                Ok(Programmes(programmes))
            }
        }

        deserializer.deserialize_map(ProgrammesVisitor)
    }
}

/// A key → label mapping (tags, statuses).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Labels(HashMap<String, String>);

impl Labels {
    /// Returns the label for `key`, or `key` itself when there is none.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        or_key(self.0.get(key).map(String::as_str), key)
    }
}

/// The raw-key fallback shared by every label lookup.
pub fn or_key<'a>(label: Option<&'a str>, key: &'a str) -> &'a str {
    label.unwrap_or(key)
}

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

fn list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn ordinal<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Ordinal {
        Text(String),
        Number(u64),
    }

    Ok(match Ordinal::deserialize(deserializer)? {
        Ordinal::Text(text) => text,
        Ordinal::Number(n) => n.to_string(),
    })
}

/// Represents the result of loading a [`Dataset`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Dataset`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the data file can't be read.
    Io(std::io::Error),

    /// Returned when the data file isn't valid JSON or doesn't match the
    /// expected shape.
    Json(serde_json::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Json(err) => err.fmt(f),
            Error::Annotated(annotation, err) => write!(f, "{}: {}", annotation, err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_json`] deserialization functions.
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}
