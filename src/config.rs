//! Loads the project configuration. A project is rooted at the directory
//! containing a [`PROJECT_FILE`]; when no such file exists in the working
//! directory or any of its ancestors, built-in defaults are used so that a
//! bare `scholia` invocation still builds a site.

use anyhow::{anyhow, Result};
use log::info;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "scholia.yaml";

const DEFAULT_DATA_FILE: &str = "data/papers.json";
const DEFAULT_OUTPUT_DIRECTORY: &str = "public";
const DEFAULT_BASE_URL: &str = "https://example.org/";

#[derive(Deserialize, Default)]
#[serde(default)]
struct Project {
    data_file: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    site: SiteFile,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SiteFile {
    title: Option<String>,
    description: Option<String>,
    base_url: Option<Url>,
    publisher: Option<String>,
    editor: Option<String>,
    language: Option<String>,
    pdf_base: Option<String>,
    doi_resolver: Option<String>,
    image: Option<String>,
    twitter: Option<String>,
}

/// Site-wide settings shared by every page, feed, and sitemap composer.
#[derive(Clone, Debug)]
pub struct Site {
    /// The site name, appended to page titles.
    pub title: String,

    /// Fallback meta description for pages without their own.
    pub description: String,

    /// The public root of the site. Absolute URLs (canonical links, sitemap
    /// locations, feed links) are built by prefixing site paths with it.
    pub base_url: Url,

    /// Named as publisher in citations, BibTeX entries, and metadata.
    pub publisher: String,

    /// The feed's managing editor, e.g. `editor@example.org (Jane Doe)`.
    pub editor: String,

    pub language: String,

    /// Path (or URL) under which paper PDFs are served.
    pub pdf_base: String,

    pub doi_resolver: String,

    /// Social card image.
    pub image: String,

    /// Twitter handle for `twitter:site`, if any.
    pub twitter: Option<String>,
}

impl Site {
    fn from_file(file: SiteFile) -> Result<Site> {
        Ok(Site {
            title: file.title.unwrap_or_else(|| "Scholia".to_owned()),
            description: file.description.unwrap_or_else(|| {
                "Working papers and research programmes.".to_owned()
            }),
            base_url: match file.base_url {
                Some(url) => url,
                None => Url::parse(DEFAULT_BASE_URL)?,
            },
            publisher: file.publisher.unwrap_or_else(|| "Scholia".to_owned()),
            editor: file
                .editor
                .unwrap_or_else(|| "editor@example.org (Editor)".to_owned()),
            language: file.language.unwrap_or_else(|| "en".to_owned()),
            pdf_base: file.pdf_base.unwrap_or_else(|| "/pdfs".to_owned()),
            doi_resolver: file
                .doi_resolver
                .unwrap_or_else(|| "https://doi.org/".to_owned()),
            image: file.image.unwrap_or_else(|| "/og-image.png".to_owned()),
            twitter: file.twitter,
        })
    }

    /// Turns a site path (`/papers/dp-001`) into an absolute URL. Values
    /// that are already absolute URLs are returned unchanged.
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// The site path of a paper's PDF.
    pub fn pdf_url(&self, pdf: &str) -> String {
        format!("{}/{}", self.pdf_base.trim_end_matches('/'), pdf)
    }

    pub fn doi_url(&self, doi: &str) -> String {
        format!("{}{}", self.doi_resolver, doi)
    }
}

/// Everything a build needs: where the data lives, where output goes, and the
/// [`Site`] settings.
#[derive(Clone, Debug)]
pub struct Config {
    pub data_file: PathBuf,
    pub output_directory: PathBuf,
    pub site: Site,
}

impl Config {
    /// Searches `dir` and its ancestors for a [`PROJECT_FILE`] and loads the
    /// first one found. Falls back to [`Config::defaults`] rooted at `dir`.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path)
                    .map_err(|e| anyhow!("Loading configuration: {:?}", e));
            }
        }
        info!("No `{}` found; using default configuration", PROJECT_FILE);
        Config::defaults(dir)
    }

    /// Loads a project file. Relative paths inside it are resolved against
    /// the directory that contains it.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|e| {
            anyhow!("Opening project file `{}`: {}", path.display(), e)
        })?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Config::from_project(project, project_root),
        }
    }

    /// The configuration used when no project file exists.
    pub fn defaults(root: &Path) -> Result<Config> {
        Config::from_project(Project::default(), root)
    }

    fn from_project(project: Project, root: &Path) -> Result<Config> {
        Ok(Config {
            data_file: root.join(
                project
                    .data_file
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            ),
            output_directory: root.join(
                project
                    .output_directory
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIRECTORY)),
            ),
            site: Site::from_file(project.site)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() -> Result<()> {
        let config = Config::defaults(Path::new("/srv/site"))?;
        assert_eq!(PathBuf::from("/srv/site/data/papers.json"), config.data_file);
        assert_eq!(PathBuf::from("/srv/site/public"), config.output_directory);
        assert_eq!("https://example.org/", config.site.base_url.as_str());
        Ok(())
    }

    #[test]
    fn test_project_file_overrides_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "output_directory: dist\nsite:\n  title: Lab Papers\n  base_url: https://lab.example.com/\n",
        )?;
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(dir.path().join("dist"), config.output_directory);
        assert_eq!(dir.path().join("data/papers.json"), config.data_file);
        assert_eq!("Lab Papers", config.site.title);
        assert_eq!("Scholia", config.site.publisher);
        Ok(())
    }

    #[test]
    fn test_invalid_base_url_is_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        std::fs::write(&path, "site:\n  base_url: not a url\n")?;
        assert!(Config::from_project_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_site_urls() -> Result<()> {
        let site = Config::defaults(Path::new("."))?.site;
        assert_eq!("https://example.org/papers/dp-001", site.absolute("/papers/dp-001"));
        assert_eq!("https://cdn.example.net/x.pdf", site.absolute("https://cdn.example.net/x.pdf"));
        assert_eq!("/pdfs/dp-001.pdf", site.pdf_url("dp-001.pdf"));
        assert_eq!("https://doi.org/10.1234/abc", site.doi_url("10.1234/abc"));
        Ok(())
    }
}
