//! Filesystem sink for finished chunks.

use std::fs;
use std::path::{Path, PathBuf};
use theme_chunks_core::contract::{ChunkWriter, OutputFile};
use tracing::{debug, info};

/// Writes each chunk under `out_dir`. Chunks with a source map get a sibling
/// `<chunk>.map` and a trailing `sourceMappingURL` comment.
pub struct FsChunkWriter {
    out_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FsChunkWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            written: Vec::new(),
        }
    }

    /// Every file written so far, maps included, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_file(&mut self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote file");
        self.written.push(path.to_path_buf());
        Ok(())
    }
}

impl ChunkWriter for FsChunkWriter {
    fn write_chunk(
        &mut self,
        chunk: OutputFile,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let target = self.out_dir.join(&chunk.path);
        let map_bytes = chunk.source_map_bytes()?;
        let mut contents = chunk.contents;

        if let Some(map) = map_bytes {
            let mut map_target = target.clone().into_os_string();
            map_target.push(".map");
            let map_target = PathBuf::from(map_target);
            let map_name = map_target
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            contents.extend_from_slice(format!("\n/*# sourceMappingURL={map_name} */\n").as_bytes());
            self.write_file(&map_target, &map)?;
        }

        self.write_file(&target, &contents)?;
        info!(chunk = %target.display(), "Chunk written");
        Ok(())
    }
}
