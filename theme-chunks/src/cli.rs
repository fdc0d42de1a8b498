///
/// This module implements the CLI interface for theme-chunks: command parsing,
/// argument validation, and the async entrypoint used by `main` and by tests.
///
/// All splitting and merging logic lives in the [`theme-chunks-core`] crate.
/// This module only reads inputs, drives the extractor, and writes its chunks.
///
/// [`theme-chunks-core`]: ../../theme-chunks-core/
use crate::input::{collect_css_paths, read_sources};
use crate::load_config::load_config;
use crate::output::FsChunkWriter;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use theme_chunks_core::extract::ThemeExtractor;

/// CLI for theme-chunks: split CSS sources into per-theme and common chunks.
#[derive(Parser)]
#[clap(
    name = "theme-chunks",
    version,
    about = "Split CSS sources into per-theme and common bundles, optionally scoping theme selectors"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Group the input CSS files by theme and write one chunk per theme
    Extract {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Directory the chunks are written to
        #[clap(long)]
        out: PathBuf,
        /// Directory theme globs are matched relative to (defaults to the current directory)
        #[clap(long)]
        cwd: Option<PathBuf>,
        /// Compose source maps and write a `.map` next to each chunk
        #[clap(long)]
        source_maps: bool,
        /// CSS files or directories to read
        #[clap(required = true)]
        inputs: Vec<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Extract {
            config,
            out,
            cwd,
            source_maps,
            inputs,
        } => {
            let config = load_config(config)?;
            let cwd = match cwd {
                Some(cwd) => cwd,
                None => std::env::current_dir().context("Failed to resolve current directory")?,
            };
            tracing::info!(command = "extract", cwd = %cwd.display(), source_maps, "Starting extraction");

            let paths = collect_css_paths(&inputs, &cwd)?;
            let files = read_sources(paths, &cwd, source_maps).await?;

            let mut extractor = ThemeExtractor::new(config)?;
            for file in files {
                extractor.push(file)?;
            }

            let mut writer = FsChunkWriter::new(&out);
            let chunks = extractor.finish_into(&mut writer)?;
            for path in writer.written() {
                println!("Wrote {}", path.display());
            }
            println!("Extracted {chunks} chunk(s) into {}", out.display());
            tracing::info!(command = "extract", chunks, "Extraction complete");
            Ok(())
        }
    }
}
