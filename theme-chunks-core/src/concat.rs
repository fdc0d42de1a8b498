//! Concatenation that keeps track of where each fragment came from.
//!
//! Each fragment is appended to a growing buffer while its mappings are shifted
//! by the current line/column offset and recorded in one composed source map.

use sourcemap::{SourceMap, SourceMapBuilder};
use tracing::trace;

pub struct SourceMapConcat {
    separator: String,
    content: Vec<u8>,
    builder: SourceMapBuilder,
    line_offset: u32,
    column_offset: u32,
    fragments: usize,
}

impl SourceMapConcat {
    pub fn new(file_name: &str, separator: &str) -> Self {
        Self {
            separator: separator.to_string(),
            content: Vec::new(),
            builder: SourceMapBuilder::new(Some(file_name)),
            line_offset: 0,
            column_offset: 0,
            fragments: 0,
        }
    }

    /// Append one fragment. `source_map` is the map already attached to the fragment, if any.
    pub fn add(&mut self, file_path: &str, content: &[u8], source_map: Option<&SourceMap>) {
        if self.fragments > 0 {
            let separator = std::mem::take(&mut self.separator);
            self.content.extend_from_slice(separator.as_bytes());
            self.advance(&separator);
            self.separator = separator;
        }
        self.fragments += 1;
        self.content.extend_from_slice(content);

        let text = String::from_utf8_lossy(content);
        match source_map {
            Some(map) if map.get_token_count() > 0 => self.add_remapped(map),
            upstream => {
                // A map without mappings still names the original file.
                let name = upstream
                    .and_then(|map| map.get_source(0))
                    .unwrap_or(file_path);
                let source_id = self.builder.add_source(name);
                if let Some(contents) = upstream.and_then(|map| map.get_source_contents(0)) {
                    self.builder.set_source_contents(source_id, Some(contents));
                }
                let lines = text.split('\n').count() as u32;
                for line in 0..lines {
                    let dst_col = if line == 0 { self.column_offset } else { 0 };
                    self.builder.add_raw(
                        self.line_offset + line,
                        dst_col,
                        line,
                        0,
                        Some(source_id),
                        None,
                        false,
                    );
                }
            }
        }

        trace!(
            file = %file_path,
            line_offset = self.line_offset,
            column_offset = self.column_offset,
            "Added fragment"
        );
        self.advance(&text);
    }

    fn add_remapped(&mut self, map: &SourceMap) {
        for token in map.tokens() {
            let Some(source) = token.get_source() else {
                continue;
            };
            let source_id = self.builder.add_source(source);
            let name_id = token.get_name().map(|name| self.builder.add_name(name));
            let dst_col = if token.get_dst_line() == 0 {
                self.column_offset + token.get_dst_col()
            } else {
                token.get_dst_col()
            };
            self.builder.add_raw(
                self.line_offset + token.get_dst_line(),
                dst_col,
                token.get_src_line(),
                token.get_src_col(),
                Some(source_id),
                name_id,
                false,
            );
        }

        for (idx, source) in map.sources().enumerate() {
            if let Some(contents) = map.get_source_contents(idx as u32) {
                let source_id = self.builder.add_source(source);
                self.builder.set_source_contents(source_id, Some(contents));
            }
        }
    }

    fn advance(&mut self, text: &str) {
        match text.rfind('\n') {
            Some(last_newline) => {
                self.line_offset += text.matches('\n').count() as u32;
                self.column_offset = utf16_len(&text[last_newline + 1..]);
            }
            None => self.column_offset += utf16_len(text),
        }
    }

    pub fn into_parts(self) -> (Vec<u8>, SourceMap) {
        (self.content, self.builder.into_sourcemap())
    }
}

/// Source map columns count UTF-16 code units.
fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}
