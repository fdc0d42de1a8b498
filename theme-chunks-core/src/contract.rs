//! # contract: shared data model and seams of the theme splitter
//!
//! This module defines the plain data types flowing through the pipeline
//! ([`SourceFile`] in, [`OutputFile`] out, [`BucketKey`] in between) and the two
//! traits at its edges:
//!
//! - [`PathMatcher`]: the glob black box used to classify a file path.
//! - [`ChunkWriter`]: the sink that receives each finished chunk at flush time.
//!
//! Both traits are annotated for `mockall` so tests can assert on
//! classification and emission without touching a filesystem.

use encoding_rs::Encoding;
use sourcemap::SourceMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// An input unit handed to the extractor by the host pipeline.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute (or cwd-relative) path of the file.
    pub path: PathBuf,
    /// Base directory used to compute the file's relative name.
    pub base: PathBuf,
    /// Working directory. Theme globs are matched against the path relative to it.
    pub cwd: PathBuf,
    /// Raw bytes, already read by the host.
    pub contents: Vec<u8>,
    /// Map attached by an upstream transform, if any.
    pub source_map: Option<SourceMap>,
    /// Text encoding reported by the host for this file.
    pub encoding: Option<&'static Encoding>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            base: PathBuf::new(),
            cwd: PathBuf::new(),
            contents: contents.into(),
            source_map: None,
            encoding: None,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    pub fn with_source_map(mut self, map: SourceMap) -> Self {
        self.source_map = Some(map);
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Path used for theme matching: relative to `cwd` when one is set, else the full path.
    /// Separators are normalised to `/`.
    pub fn match_path(&self) -> String {
        let path = if self.cwd.as_os_str().is_empty() {
            self.path.as_path()
        } else {
            self.path.strip_prefix(&self.cwd).unwrap_or(&self.path)
        };
        normalise_separators(path)
    }

    /// Name recorded in composed source maps: relative to `base`, falling back to the full path.
    pub fn relative(&self) -> String {
        let path = if self.base.as_os_str().is_empty() {
            self.path.as_path()
        } else {
            self.path.strip_prefix(&self.base).unwrap_or(&self.path)
        };
        normalise_separators(path)
    }
}

fn normalise_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// The bucket a file was routed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BucketKey {
    Theme(String),
    Common,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Theme(name) => f.write_str(name),
            BucketKey::Common => f.write_str("common"),
        }
    }
}

/// A finished chunk: one per non-empty bucket.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
    pub source_map: Option<SourceMap>,
}

impl OutputFile {
    /// Serialise the attached map, if any, as JSON bytes.
    pub fn source_map_bytes(&self) -> Result<Option<Vec<u8>>, sourcemap::Error> {
        match &self.source_map {
            Some(map) => {
                let mut bytes = Vec::new();
                map.to_writer(&mut bytes)?;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }
}

/// Answers "does this path match the pattern" for one compiled theme glob.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
pub trait PathMatcher: Send + Sync {
    fn is_match(&self, path: &str) -> bool;
}

/// Receives chunks when the extractor flushes.
///
/// Implemented by the CLI's filesystem writer and by mocks in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
pub trait ChunkWriter {
    fn write_chunk(
        &mut self,
        chunk: OutputFile,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
