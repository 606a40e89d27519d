//! Request path filtering.
//!
//! Decides, from the request path alone, whether a response may be rewritten.
//! Suffix checks only; no regex.

use serde::{Deserialize, Serialize};

/// Asset suffixes skipped by [`PathPolicy::ExcludeAssets`].
pub const ASSET_SUFFIXES: &[&str] = &[".js", ".css", ".json"];

/// Which request paths count as pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathPolicy {
    /// Only directory-like paths (`/`) and `.html` files.
    #[default]
    Pages,
    /// Everything except script, stylesheet and JSON assets.
    ExcludeAssets,
}

impl PathPolicy {
    /// Returns true if a response to `path` should go through the rewriter.
    pub fn should_rewrite(&self, path: &str) -> bool {
        match self {
            PathPolicy::Pages => path.ends_with('/') || path.ends_with(".html"),
            PathPolicy::ExcludeAssets => !ASSET_SUFFIXES.iter().any(|s| path.ends_with(s)),
        }
    }
}
