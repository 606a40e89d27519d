//! Resolution of the injected site values from the environment.
//!
//! Lookups go through a caller-supplied closure so resolution stays a pure
//! function; `SiteEnv::from_process_env` is the only place that touches the
//! real process environment.

use std::fmt;

use crate::config::schema::EnvSources;

/// Values injected into pages, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct SiteEnv {
    pub owner: String,
    pub repo: String,
    /// Absent token is the only condition that triggers the error page.
    pub token: Option<String>,
}

// The token must never end up in logs.
impl fmt::Debug for SiteEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteEnv")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("has_token", &self.has_token())
            .finish()
    }
}

impl SiteEnv {
    /// Resolve all three values through `lookup`.
    pub fn from_sources<F>(sources: &EnvSources, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            owner: resolve_or(&sources.owner_vars, &sources.default_owner, &lookup),
            repo: resolve_or(&sources.repo_vars, &sources.default_repo, &lookup),
            token: resolve(&sources.token_vars, &lookup),
        }
    }

    /// Resolve against the process environment.
    pub fn from_process_env(sources: &EnvSources) -> Self {
        Self::from_sources(sources, |name| std::env::var(name).ok())
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

/// Return the value of the first name that is set to a non-empty string.
pub fn resolve<S, F>(names: &[S], lookup: F) -> Option<String>
where
    S: AsRef<str>,
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name.as_ref()))
        .find(|value| !value.is_empty())
}

/// Like [`resolve`], falling back to a literal default.
pub fn resolve_or<S, F>(names: &[S], default: &str, lookup: F) -> String
where
    S: AsRef<str>,
    F: Fn(&str) -> Option<String>,
{
    resolve(names, lookup).unwrap_or_else(|| default.to_string())
}
