//! Reading CSS inputs from disk into [`SourceFile`]s.
//!
//! Directories are walked recursively for `.css` files (hidden directories are
//! skipped); explicitly named files are always taken. The resulting list is
//! sorted so the extractor sees files in a stable order.

use anyhow::{Context, Result};
use futures::future::try_join_all;
use sourcemap::{SourceMap, SourceMapBuilder};
use std::path::{Path, PathBuf};
use theme_chunks_core::contract::SourceFile;
use tracing::{debug, info, warn};

/// Expand `inputs` (files or directories, relative to `cwd`) into a sorted list of CSS files.
pub fn collect_css_paths(inputs: &[PathBuf], cwd: &Path) -> Result<Vec<PathBuf>> {
    fn visit_dir(dir: &Path, results: &mut Vec<PathBuf>) -> Result<()> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read input directory {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with('.'));
                if hidden {
                    debug!(path = %path.display(), "Skipping hidden directory");
                    continue;
                }
                visit_dir(&path, results)?;
            } else if path.extension().is_some_and(|ext| ext == "css") {
                results.push(path);
            }
        }
        Ok(())
    }

    let mut paths = Vec::new();
    for input in inputs {
        let input = cwd.join(input);
        if input.is_dir() {
            visit_dir(&input, &mut paths)?;
        } else if input.is_file() {
            paths.push(input);
        } else {
            anyhow::bail!("Input {} does not exist", input.display());
        }
    }
    paths.sort();
    paths.dedup();

    info!(count = paths.len(), "Collected CSS inputs");
    Ok(paths)
}

/// Read every path concurrently. The returned files keep the order of `paths`.
///
/// With `source_maps`, each file carries either its sibling `<file>.map` or an
/// initial map naming the file and holding its content.
pub async fn read_sources(paths: Vec<PathBuf>, cwd: &Path, source_maps: bool) -> Result<Vec<SourceFile>> {
    let reads = paths.into_iter().map(|path| async move {
        let contents = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut file = SourceFile::new(path, contents).with_cwd(cwd).with_base(cwd);
        if source_maps {
            let map = load_source_map(&file).await?;
            file = file.with_source_map(map);
        }
        debug!(path = %file.path.display(), bytes = file.contents.len(), "Read input file");
        anyhow::Ok(file)
    });
    try_join_all(reads).await
}

async fn load_source_map(file: &SourceFile) -> Result<SourceMap> {
    let mut map_path = file.path.clone().into_os_string();
    map_path.push(".map");
    let map_path = PathBuf::from(map_path);

    if tokio::fs::try_exists(&map_path).await.unwrap_or(false) {
        let bytes = tokio::fs::read(&map_path)
            .await
            .with_context(|| format!("Failed to read {}", map_path.display()))?;
        match SourceMap::from_slice(&bytes) {
            Ok(map) => {
                debug!(path = %map_path.display(), "Loaded existing source map");
                return Ok(map);
            }
            Err(e) => {
                warn!(path = %map_path.display(), error = %e, "Ignoring unreadable source map");
            }
        }
    }
    Ok(initial_source_map(file))
}

/// A map with no mappings that names the file and embeds its content.
pub fn initial_source_map(file: &SourceFile) -> SourceMap {
    let relative = file.relative();
    let mut builder = SourceMapBuilder::new(Some(&relative));
    let source_id = builder.add_source(&relative);
    let contents = String::from_utf8_lossy(&file.contents);
    builder.set_source_contents(source_id, Some(contents.as_ref()));
    builder.into_sourcemap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn collects_css_recursively_sorted_and_skips_hidden_dirs() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("styles/themes")).unwrap();
        fs::create_dir_all(root.join("styles/.cache")).unwrap();
        fs::write(root.join("styles/b.css"), "").unwrap();
        fs::write(root.join("styles/themes/a.dark.css"), "").unwrap();
        fs::write(root.join("styles/readme.md"), "").unwrap();
        fs::write(root.join("styles/.cache/x.css"), "").unwrap();

        let paths = collect_css_paths(&[PathBuf::from("styles")], root).unwrap();
        assert_eq!(
            paths,
            vec![root.join("styles/b.css"), root.join("styles/themes/a.dark.css")]
        );
    }

    #[test]
    fn missing_input_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = collect_css_paths(&[PathBuf::from("nope.css")], tmp.path()).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn reads_files_with_initial_maps() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("a.css");
        fs::write(&path, ".a {}").unwrap();

        let files = read_sources(vec![path], tmp.path(), true).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].contents, b".a {}");
        assert_eq!(files[0].match_path(), "a.css");
        let map = files[0].source_map.as_ref().expect("initial map");
        assert_eq!(map.get_source(0), Some("a.css"));
        assert_eq!(map.get_source_contents(0), Some(".a {}"));
    }
}
