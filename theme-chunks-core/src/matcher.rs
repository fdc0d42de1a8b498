//! Default [`PathMatcher`] backed by `globset`.

use globset::{GlobBuilder, GlobMatcher};

use crate::contract::PathMatcher;

/// A single compiled theme glob.
///
/// `*` never crosses a `/`, while `**/` spans zero or more directories.
#[derive(Debug, Clone)]
pub struct GlobPathMatcher {
    matcher: GlobMatcher,
}

impl GlobPathMatcher {
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build()?;
        Ok(Self {
            matcher: glob.compile_matcher(),
        })
    }
}

impl PathMatcher for GlobPathMatcher {
    fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }
}
