//! Extraction options and their validation.
//!
//! Configuration arrives either untyped (a `serde_json::Value`, which is what the
//! CLI produces from YAML) or as a typed [`ThemeOptions`]. Both routes end in
//! [`ExtractConfig`], and every failure names the field that caused it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::contract::BucketKey;

/// Token replaced by the theme name in `themeSource`, `themeChunk` and `selectorPrefix`.
pub const THEME_PLACEHOLDER: &str = "[theme]";

/// Separator placed between fragments in source-map mode unless `newLine` says otherwise.
pub const DEFAULT_NEW_LINE: &str = "\n";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("configuration must be a key/value object")]
    NotAnObject,
    #[error("invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("theme `{theme}` produced an invalid glob pattern `{pattern}`: {reason}")]
    InvalidPattern {
        theme: String,
        pattern: String,
        reason: String,
    },
}

impl ConfigError {
    /// The configuration key this error refers to, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigError::NotAnObject => None,
            ConfigError::InvalidField { field, .. } => Some(*field),
            ConfigError::InvalidPattern { .. } => Some("themeSource"),
        }
    }

    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Raw, unvalidated options as a user writes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeOptions {
    pub themes: Option<Vec<String>>,
    pub theme_source: Option<String>,
    pub theme_chunk: Option<String>,
    #[serde(default)]
    pub common_chunk: Option<String>,
    #[serde(default)]
    pub selector_prefix: Option<String>,
    #[serde(default)]
    pub new_line: Option<String>,
}

/// Validated extraction configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    pub themes: Vec<String>,
    pub theme_source: String,
    pub theme_chunk: String,
    pub common_chunk: Option<String>,
    /// Already trimmed; `None` when absent or blank.
    pub selector_prefix: Option<String>,
    pub new_line: String,
}

impl ExtractConfig {
    /// Validate an untyped configuration object.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let map = value.as_object().ok_or(ConfigError::NotAnObject)?;

        let themes = match map.get("themes") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ConfigError::invalid("themes", "must be an array of theme names")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => {
                return Err(ConfigError::invalid(
                    "themes",
                    "must be an array of theme names",
                ))
            }
        };

        Self::try_from(ThemeOptions {
            themes: Some(themes),
            theme_source: optional_string(map, "themeSource")?,
            theme_chunk: optional_string(map, "themeChunk")?,
            common_chunk: optional_string(map, "commonChunk")?,
            selector_prefix: optional_string(map, "selectorPrefix")?,
            new_line: optional_string(map, "newLine")?,
        })
    }

    pub fn trace_loaded(&self) {
        info!(
            themes = ?self.themes,
            theme_source = %self.theme_source,
            theme_chunk = %self.theme_chunk,
            common_chunk = self.common_chunk.as_deref().unwrap_or("<none>"),
            selector_prefix = self.selector_prefix.is_some(),
            "Loaded extract config"
        );
        debug!(?self, "Extract config loaded (full debug)");
    }

    /// Glob pattern for one theme.
    pub fn theme_pattern(&self, theme: &str) -> String {
        substitute_theme(&self.theme_source, theme)
    }

    /// Output path for a bucket.
    pub fn chunk_path(&self, key: &BucketKey) -> PathBuf {
        match key {
            BucketKey::Theme(theme) => PathBuf::from(substitute_theme(&self.theme_chunk, theme)),
            BucketKey::Common => PathBuf::from(self.common_chunk.as_deref().unwrap_or_default()),
        }
    }

    /// Selector prefix to inject into a bucket's files, if injection applies to it.
    pub fn selector_prefix_for(&self, key: &BucketKey) -> Option<String> {
        match (key, &self.selector_prefix) {
            (BucketKey::Theme(theme), Some(template)) => {
                Some(substitute_theme(template, theme).trim().to_string())
            }
            _ => None,
        }
    }
}

impl TryFrom<ThemeOptions> for ExtractConfig {
    type Error = ConfigError;

    fn try_from(options: ThemeOptions) -> Result<Self, Self::Error> {
        let themes = options
            .themes
            .ok_or_else(|| ConfigError::invalid("themes", "must be an array of theme names"))?;

        let theme_source = match options.theme_source {
            Some(source) if source.contains(THEME_PLACEHOLDER) => source,
            Some(_) => {
                return Err(ConfigError::invalid(
                    "themeSource",
                    format!("must contain the {THEME_PLACEHOLDER} placeholder"),
                ))
            }
            None => {
                return Err(ConfigError::invalid(
                    "themeSource",
                    "must be a string of theme file name pattern",
                ))
            }
        };

        let theme_chunk = options
            .theme_chunk
            .filter(|chunk| !chunk.is_empty())
            .ok_or_else(|| {
                ConfigError::invalid("themeChunk", "must be a string of theme file name pattern")
            })?;

        let common_chunk = options.common_chunk.filter(|chunk| !chunk.is_empty());

        let selector_prefix = options
            .selector_prefix
            .map(|prefix| prefix.trim().to_string())
            .filter(|prefix| !prefix.is_empty());

        let new_line = options
            .new_line
            .filter(|sep| !sep.is_empty())
            .unwrap_or_else(|| DEFAULT_NEW_LINE.to_string());

        Ok(ExtractConfig {
            themes,
            theme_source,
            theme_chunk,
            common_chunk,
            selector_prefix,
            new_line,
        })
    }
}

/// Replace the first `[theme]` token in `template` with `theme`.
pub fn substitute_theme(template: &str, theme: &str) -> String {
    template.replacen(THEME_PLACEHOLDER, theme, 1)
}

fn optional_string(map: &Map<String, Value>, field: &'static str) -> Result<Option<String>, ConfigError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ConfigError::invalid(field, "must be a string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "themes": ["Css1"],
            "themeSource": "**/*[theme].css",
            "themeChunk": "[theme].css",
            "commonChunk": "common.css"
        })
    }

    #[test]
    fn accepts_minimal_valid_config() {
        let config = ExtractConfig::from_value(&base()).expect("valid config");
        assert_eq!(config.themes, vec!["Css1".to_string()]);
        assert_eq!(config.common_chunk.as_deref(), Some("common.css"));
        assert_eq!(config.selector_prefix, None);
        assert_eq!(config.new_line, "\n");
    }

    #[test]
    fn rejects_array_config() {
        let err = ExtractConfig::from_value(&json!(["**/*"])).unwrap_err();
        assert_eq!(err, ConfigError::NotAnObject);
    }

    #[test]
    fn rejects_primitive_config() {
        assert_eq!(
            ExtractConfig::from_value(&json!("themes")).unwrap_err(),
            ConfigError::NotAnObject
        );
    }

    #[test]
    fn each_missing_required_field_is_named() {
        let cases = [
            (json!({}), "themes"),
            (json!({ "themes": [] }), "themeSource"),
            (json!({ "themes": [], "themeSource": "*[theme]" }), "themeChunk"),
            (json!({ "themes": "Css1", "themeSource": "*[theme]", "themeChunk": "x" }), "themes"),
            (json!({ "themes": [1], "themeSource": "*[theme]", "themeChunk": "x" }), "themes"),
            (json!({ "themes": [], "themeSource": "*", "themeChunk": "x" }), "themeSource"),
            (json!({ "themes": [], "themeSource": "*[theme]", "themeChunk": "" }), "themeChunk"),
        ];
        for (value, field) in cases {
            let err = ExtractConfig::from_value(&value).unwrap_err();
            assert_eq!(err.field(), Some(field), "config {value} should fail on {field}");
        }
    }

    #[test]
    fn optional_fields_must_be_strings() {
        let mut value = base();
        value["selectorPrefix"] = json!(42);
        let err = ExtractConfig::from_value(&value).unwrap_err();
        assert_eq!(err.field(), Some("selectorPrefix"));
    }

    #[test]
    fn empty_themes_are_valid() {
        let mut value = base();
        value["themes"] = json!([]);
        let config = ExtractConfig::from_value(&value).expect("empty themes are allowed");
        assert!(config.themes.is_empty());
    }

    #[test]
    fn selector_prefix_is_trimmed_and_blank_is_absent() {
        let mut value = base();
        value["selectorPrefix"] = json!("  #pfx_[theme]  ");
        let config = ExtractConfig::from_value(&value).unwrap();
        assert_eq!(config.selector_prefix.as_deref(), Some("#pfx_[theme]"));

        value["selectorPrefix"] = json!("   ");
        let config = ExtractConfig::from_value(&value).unwrap();
        assert_eq!(config.selector_prefix, None);
    }

    #[test]
    fn chunk_paths_and_prefixes_per_bucket() {
        let mut value = base();
        value["selectorPrefix"] = json!(".theme-[theme]");
        let config = ExtractConfig::from_value(&value).unwrap();
        let theme = BucketKey::Theme("dark".into());

        assert_eq!(config.chunk_path(&theme), PathBuf::from("dark.css"));
        assert_eq!(config.chunk_path(&BucketKey::Common), PathBuf::from("common.css"));
        assert_eq!(config.selector_prefix_for(&theme).as_deref(), Some(".theme-dark"));
        assert_eq!(config.selector_prefix_for(&BucketKey::Common), None);
    }

    #[test]
    fn typed_options_deserialize_from_camel_case() {
        let options: ThemeOptions = serde_json::from_value(base()).unwrap();
        assert_eq!(options.theme_chunk.as_deref(), Some("[theme].css"));
        let config = ExtractConfig::try_from(options).unwrap();
        assert_eq!(config.theme_pattern("Css1"), "**/*Css1.css");
    }
}
