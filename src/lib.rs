//! The library code for the `scholia` static site generator, which turns a
//! JSON file describing research papers and programmes into HTML pages, a
//! sitemap, and an RSS feed. A build happens in three steps:
//!
//! 1. Loading the data file into memory ([`crate::data`])
//! 2. Composing pages and documents from it ([`crate::pages`],
//!    [`crate::sitemap`], [`crate::feed`])
//! 3. Writing everything under the output directory ([`crate::build`])
//!
//! The second step does the real work. Papers are grouped by programme and
//! ordered by date ([`crate::group`]), field values are formatted for display
//! or for machines ([`crate::format`]), and every HTML page is wrapped in a
//! shared layout carrying search-engine and citation metadata
//! ([`crate::markup`]). Composers are pure functions of a
//! [`crate::pages::Context`], so a build is reproducible given the same data,
//! configuration, and build time.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod data;
pub mod feed;
pub mod format;
pub mod group;
pub mod markup;
pub mod pages;
pub mod sitemap;
