/// `load_config` module: Loads a YAML options file and validates it into an [`ExtractConfig`].
///
/// This module is the only place where user-supplied YAML is parsed. Validation
/// itself lives in the core crate, so the CLI and library callers reject the
/// same configurations with the same field-specific errors.
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics, and are surfaced at the CLI boundary.
///
/// Accepted keys: `themes`, `themeSource`, `themeChunk`, `commonChunk`,
/// `selectorPrefix`, `newLine`.
use anyhow::Result;
use std::fs;
use std::path::Path;
use theme_chunks_core::config::ExtractConfig;
use tracing::{error, info};

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ExtractConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: serde_json::Value = match serde_yaml::from_str(&config_content) {
        Ok(value) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            value
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    match ExtractConfig::from_value(&raw) {
        Ok(config) => {
            info!(themes = config.themes.len(), "Config validated");
            Ok(config)
        }
        Err(e) => {
            error!(error = %e, field = e.field().unwrap_or("<root>"), "Invalid configuration");
            Err(anyhow::Error::new(e).context(format!("Invalid configuration in {}", path_ref.display())))
        }
    }
}
