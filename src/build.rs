//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output site: loading the data file
//! ([`crate::data`]), composing and writing the HTML pages
//! ([`crate::pages`]), and writing the sitemap ([`crate::sitemap`]) and the
//! RSS feed ([`crate::feed`]).

use crate::config::Config;
use crate::data::{Dataset, Error as LoadError};
use crate::feed::{write_feed, Error as FeedError};
use crate::pages::{pages, Context, Error as WriteError, Writer, PAPERS_DIRECTORY, PROGRAMMES_DIRECTORY};
use crate::sitemap::sitemap;
use chrono::{DateTime, Utc};
use log::info;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Builds the site from a [`Config`], stamping it with the current time.
pub fn build_site(config: &Config) -> Result<()> {
    build_site_at(config, Utc::now())
}

/// Builds the site as if at `built_at`. Output depends only on the data file,
/// the configuration, and `built_at`.
pub fn build_site_at(config: &Config, built_at: DateTime<Utc>) -> Result<()> {
    let started = Instant::now();

    info!("Loading {}", config.data_file.display());
    let data = Dataset::load(&config.data_file)?;
    info!(
        "Loaded {} papers in {} programmes",
        data.papers.len(),
        data.programs.len()
    );

    let ctx = Context {
        site: &config.site,
        data: &data,
        built_at,
    };

    // Only the generated directories are removed; the output root may hold
    // static pages and assets that aren't ours.
    rmdir(&config.output_directory.join(PAPERS_DIRECTORY))?;
    rmdir(&config.output_directory.join(PROGRAMMES_DIRECTORY))?;
    std::fs::create_dir_all(&config.output_directory)?;

    let writer = Writer {
        output_directory: &config.output_directory,
    };
    let pages = pages(&ctx);
    writer.write_pages(&pages)?;
    info!("Wrote {} pages", pages.len());

    writer.write_file(Path::new("sitemap.xml"), &sitemap(&ctx))?;
    info!("Wrote sitemap.xml");

    let mut feed = Vec::new();
    write_feed(&ctx, &mut feed)?;
    writer.write_file(Path::new("feed.xml"), &feed)?;
    info!("Wrote feed.xml");

    info!(
        "Built site in {:.2?} ({})",
        started.elapsed(),
        config.output_directory.display()
    );
    Ok(())
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can occur while loading the
/// data file, cleaning output directories, writing pages or the feed, and
/// during other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned when the data file can't be loaded.
    Load(LoadError),

    /// Returned for errors writing pages to disk.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Load(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Feed(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Load(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<LoadError> for Error {
    /// Converts [`LoadError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: LoadError) -> Error {
        Error::Load(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}
