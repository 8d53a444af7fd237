//! Output generation for crawl results.
//!
//! - [`json`]: writes the scraped batch to a JSON file for downstream import

pub mod json;
