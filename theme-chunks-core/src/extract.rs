//! The extractor: collects files into theme buckets, then flushes them as chunks.
//!
//! # Lifecycle
//! - **Collecting**: [`ThemeExtractor::push`] classifies and buffers each file. Nothing is emitted.
//! - **Flushing**: [`ThemeExtractor::finish`] (or [`ThemeExtractor::finish_into`]) merges every
//!   non-empty bucket, in the order buckets were first seen.
//! - **Done**: any later call fails with [`ExtractError::AlreadyFinished`].
//!
//! If any pushed file carried a source map, every bucket is merged with
//! source-map tracking, including buckets whose own files had none.

use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{ConfigError, ExtractConfig};
use crate::contract::{BucketKey, ChunkWriter, OutputFile, SourceFile};
use crate::merge::Merger;
use crate::theme::{Classification, ThemeSpec};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("extractor has already been flushed")]
    AlreadyFinished,
    #[error("failed to write chunk {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractState {
    Collecting,
    Done,
}

struct ThemeBucket {
    key: BucketKey,
    files: Vec<SourceFile>,
}

pub struct ThemeExtractor {
    config: ExtractConfig,
    spec: ThemeSpec,
    buckets: Vec<ThemeBucket>,
    found_source_map: bool,
    encoding: &'static Encoding,
    state: ExtractState,
}

impl ThemeExtractor {
    pub fn new(config: ExtractConfig) -> Result<Self, ConfigError> {
        let spec = ThemeSpec::from_config(&config)?;
        Ok(Self::with_spec(config, spec))
    }

    /// Use a pre-built theme table, e.g. one backed by custom matchers.
    pub fn with_spec(config: ExtractConfig, spec: ThemeSpec) -> Self {
        config.trace_loaded();
        Self {
            config,
            spec,
            buckets: Vec::new(),
            found_source_map: false,
            encoding: UTF_8,
            state: ExtractState::Collecting,
        }
    }

    pub fn state(&self) -> ExtractState {
        self.state
    }

    pub fn found_source_map(&self) -> bool {
        self.found_source_map
    }

    /// Classify and buffer one file. Returns where it went.
    pub fn push(&mut self, file: SourceFile) -> Result<Classification, ExtractError> {
        if self.state == ExtractState::Done {
            error!(path = %file.path.display(), "File pushed after flush");
            return Err(ExtractError::AlreadyFinished);
        }
        if let Some(encoding) = file.encoding {
            self.encoding = encoding;
        }

        let classification = self.spec.classify(&file);
        match classification.bucket() {
            Some(key) => {
                debug!(path = %file.path.display(), bucket = %key, "Buffered file");
                self.add_content(key, file);
            }
            None => {
                debug!(path = %file.path.display(), "File matches no theme and no common chunk is set, dropping");
            }
        }
        Ok(classification)
    }

    fn add_content(&mut self, key: BucketKey, file: SourceFile) {
        if file.source_map.is_some() {
            self.found_source_map = true;
        }
        match self.buckets.iter_mut().find(|bucket| bucket.key == key) {
            Some(bucket) => bucket.files.push(file),
            None => self.buckets.push(ThemeBucket {
                key,
                files: vec![file],
            }),
        }
    }

    /// Merge every bucket into a chunk. Can only be called once.
    pub fn finish(&mut self) -> Result<Vec<OutputFile>, ExtractError> {
        if self.state == ExtractState::Done {
            error!("Extractor flushed twice");
            return Err(ExtractError::AlreadyFinished);
        }
        self.state = ExtractState::Done;

        let buckets = std::mem::take(&mut self.buckets);
        let merger = Merger::new(&self.config, self.encoding);
        info!(
            buckets = buckets.len(),
            source_maps = self.found_source_map,
            "Flushing theme buckets"
        );

        let chunks = buckets
            .into_iter()
            .map(|bucket| {
                if self.found_source_map {
                    merger.merge_with_map(&bucket.key, bucket.files)
                } else {
                    merger.merge_plain(&bucket.key, bucket.files)
                }
            })
            .collect();
        Ok(chunks)
    }

    /// Flush and hand every chunk to `writer`, stopping at the first write error.
    pub fn finish_into<W>(&mut self, writer: &mut W) -> Result<usize, ExtractError>
    where
        W: ChunkWriter + ?Sized,
    {
        let chunks = self.finish()?;
        let count = chunks.len();
        for chunk in chunks {
            let path = chunk.path.display().to_string();
            writer.write_chunk(chunk).map_err(|source| {
                error!(path = %path, error = %source, "Failed to write chunk");
                ExtractError::Write { path, source }
            })?;
        }
        Ok(count)
    }
}
