#![doc = "theme-chunks-core: core logic library for theme-chunks."]

//! Splits a stream of CSS files into one chunk per theme plus a common chunk.
//!
//! Files are classified by glob (see [`theme`]), buffered per bucket, and merged
//! at the end of input (see [`extract`]). Theme chunks can have their selectors
//! scoped with a prefix ([`selector`]), and source maps are composed through the
//! merge when any input carries one ([`concat`]).
//!
//! # Usage
//! ```no_run
//! use theme_chunks_core::config::ExtractConfig;
//! use theme_chunks_core::contract::SourceFile;
//! use theme_chunks_core::extract::ThemeExtractor;
//!
//! let config = ExtractConfig::from_value(&serde_json::json!({
//!     "themes": ["dark"],
//!     "themeSource": "**/*.[theme].css",
//!     "themeChunk": "[theme].css",
//!     "commonChunk": "common.css",
//! }))?;
//! let mut extractor = ThemeExtractor::new(config)?;
//! extractor.push(SourceFile::new("button.dark.css", ".btn { color: #fff }"))?;
//! let chunks = extractor.finish()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod concat;
pub mod config;
pub mod contract;
pub mod extract;
pub mod matcher;
pub mod merge;
pub mod selector;
pub mod theme;
