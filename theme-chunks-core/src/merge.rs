//! Turns one bucket of files into one output chunk.

use encoding_rs::Encoding;
use tracing::{debug, info};

use crate::concat::SourceMapConcat;
use crate::config::ExtractConfig;
use crate::contract::{BucketKey, OutputFile, SourceFile};
use crate::selector::inject_selector_prefix;

/// Merges buckets according to an [`ExtractConfig`].
pub struct Merger<'a> {
    config: &'a ExtractConfig,
    encoding: &'static Encoding,
}

impl<'a> Merger<'a> {
    pub fn new(config: &'a ExtractConfig, encoding: &'static Encoding) -> Self {
        Self { config, encoding }
    }

    /// Plain byte concatenation, in bucket order.
    pub fn merge_plain(&self, key: &BucketKey, files: Vec<SourceFile>) -> OutputFile {
        let path = self.config.chunk_path(key);
        let prefix = self.config.selector_prefix_for(key);
        let file_count = files.len();

        let mut contents = Vec::with_capacity(files.iter().map(|f| f.contents.len()).sum());
        for mut file in files {
            self.inject(&mut file, prefix.as_deref());
            contents.extend_from_slice(&file.contents);
        }

        info!(
            bucket = %key,
            path = %path.display(),
            files = file_count,
            bytes = contents.len(),
            "Merged chunk"
        );
        OutputFile {
            path,
            contents,
            source_map: None,
        }
    }

    /// Concatenation that composes the inputs' source maps into one map for the chunk.
    pub fn merge_with_map(&self, key: &BucketKey, files: Vec<SourceFile>) -> OutputFile {
        let path = self.config.chunk_path(key);
        let prefix = self.config.selector_prefix_for(key);
        let file_count = files.len();

        let mut concat = SourceMapConcat::new(&path.to_string_lossy(), &self.config.new_line);
        for mut file in files {
            self.inject(&mut file, prefix.as_deref());
            concat.add(&file.relative(), &file.contents, file.source_map.as_ref());
        }
        let (contents, source_map) = concat.into_parts();

        info!(
            bucket = %key,
            path = %path.display(),
            files = file_count,
            bytes = contents.len(),
            sources = source_map.get_source_count(),
            "Merged chunk with source map"
        );
        OutputFile {
            path,
            contents,
            source_map: Some(source_map),
        }
    }

    fn inject(&self, file: &mut SourceFile, prefix: Option<&str>) {
        if let Some(prefix) = prefix {
            debug!(path = %file.path.display(), prefix = %prefix, "Injecting selector prefix");
            file.contents = inject_selector_prefix(&file.contents, prefix, self.encoding);
        }
    }
}
