//! Theme classification: which bucket does a file belong to?

use tracing::{debug, trace};

use crate::config::{ConfigError, ExtractConfig};
use crate::contract::{BucketKey, PathMatcher, SourceFile};
use crate::matcher::GlobPathMatcher;

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Theme(String),
    Common,
    Dropped,
}

impl Classification {
    pub fn bucket(&self) -> Option<BucketKey> {
        match self {
            Classification::Theme(name) => Some(BucketKey::Theme(name.clone())),
            Classification::Common => Some(BucketKey::Common),
            Classification::Dropped => None,
        }
    }
}

/// Ordered theme name to matcher table. Order is declaration order.
pub struct ThemeSpec {
    themes: Vec<(String, Box<dyn PathMatcher>)>,
    has_common: bool,
}

impl ThemeSpec {
    /// Compile one glob per declared theme.
    pub fn from_config(config: &ExtractConfig) -> Result<Self, ConfigError> {
        let mut themes: Vec<(String, Box<dyn PathMatcher>)> = Vec::with_capacity(config.themes.len());
        for theme in &config.themes {
            let pattern = config.theme_pattern(theme);
            let matcher = GlobPathMatcher::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
                theme: theme.clone(),
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            debug!(theme = %theme, pattern = %pattern, "Compiled theme glob");
            themes.push((theme.clone(), Box::new(matcher)));
        }
        Ok(Self {
            themes,
            has_common: config.common_chunk.is_some(),
        })
    }

    /// Build a spec from already-constructed matchers.
    pub fn with_matchers(themes: Vec<(String, Box<dyn PathMatcher>)>, has_common: bool) -> Self {
        Self { themes, has_common }
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|(name, _)| name.as_str())
    }

    /// First declared theme whose pattern matches wins; otherwise common, if configured.
    pub fn classify(&self, file: &SourceFile) -> Classification {
        let path = file.match_path();
        for (theme, matcher) in &self.themes {
            if matcher.is_match(&path) {
                trace!(path = %path, theme = %theme, "Matched theme");
                return Classification::Theme(theme.clone());
            }
        }
        if self.has_common {
            Classification::Common
        } else {
            Classification::Dropped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeOptions;
    use crate::contract::MockPathMatcher;

    fn config(themes: &[&str], common: Option<&str>) -> ExtractConfig {
        ExtractConfig::try_from(ThemeOptions {
            themes: Some(themes.iter().map(|t| t.to_string()).collect()),
            theme_source: Some("**/*[theme].css".into()),
            theme_chunk: Some("[theme].css".into()),
            common_chunk: common.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn routes_by_theme_then_common() {
        let spec = ThemeSpec::from_config(&config(&["Css1"], Some("common.css"))).unwrap();
        assert_eq!(spec.theme_names().collect::<Vec<_>>(), vec!["Css1"]);
        assert_eq!(
            spec.classify(&SourceFile::new("fixtures/a.Css1.css", "")),
            Classification::Theme("Css1".into())
        );
        assert_eq!(spec.classify(&SourceFile::new("fixtures/c.css", "")), Classification::Common);
    }

    #[test]
    fn unmatched_file_is_dropped_without_common_chunk() {
        let spec = ThemeSpec::from_config(&config(&["Css1"], None)).unwrap();
        assert_eq!(spec.classify(&SourceFile::new("c.css", "")), Classification::Dropped);
        assert_eq!(Classification::Dropped.bucket(), None);
    }

    #[test]
    fn path_is_matched_relative_to_cwd() {
        let spec = ThemeSpec::from_config(&ExtractConfig::try_from(ThemeOptions {
            themes: Some(vec!["dark".into()]),
            theme_source: Some("styles/*.[theme].css".into()),
            theme_chunk: Some("[theme].css".into()),
            ..Default::default()
        })
        .unwrap())
        .unwrap();

        let file = SourceFile::new("/work/project/styles/button.dark.css", "").with_cwd("/work/project");
        assert_eq!(spec.classify(&file), Classification::Theme("dark".into()));

        let no_cwd = SourceFile::new("/work/project/styles/button.dark.css", "");
        assert_eq!(spec.classify(&no_cwd), Classification::Dropped);
    }

    #[test]
    fn first_declared_theme_wins() {
        let mut first = MockPathMatcher::new();
        first.expect_is_match().times(1).return_const(true);
        let mut second = MockPathMatcher::new();
        second.expect_is_match().never();

        let spec = ThemeSpec::with_matchers(
            vec![
                ("first".to_string(), Box::new(first) as Box<dyn PathMatcher>),
                ("second".to_string(), Box::new(second) as Box<dyn PathMatcher>),
            ],
            true,
        );
        assert_eq!(
            spec.classify(&SourceFile::new("x.css", "")),
            Classification::Theme("first".into())
        );
    }

    #[test]
    fn invalid_theme_glob_names_the_theme() {
        let cfg = ExtractConfig::try_from(ThemeOptions {
            themes: Some(vec!["[bad".into()]),
            theme_source: Some("**/*[theme].css".into()),
            theme_chunk: Some("[theme].css".into()),
            ..Default::default()
        })
        .unwrap();
        match ThemeSpec::from_config(&cfg) {
            Err(ConfigError::InvalidPattern { theme, .. }) => assert_eq!(theme, "[bad"),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("pattern should not compile"),
        }
    }
}
