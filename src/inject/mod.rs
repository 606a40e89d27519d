//! HTML response rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! request
//!     → path.rs (page path? otherwise pass through)
//!     → next (origin response)
//!     → content-type check (text/html? otherwise pass through)
//!     → token present?
//!         no  → error_page.rs (fixed diagnostic document, 200)
//!         yes → html.rs (script spliced after <head>) + no-cache headers
//! ```
//!
//! # Design Decisions
//! - Site values are resolved once at startup, never per request
//! - Non-HTML bodies are never read
//! - The token value is never logged

pub mod error_page;
pub mod html;
pub mod middleware;
pub mod path;

pub use middleware::{rewrite, RewriteState};
pub use path::PathPolicy;

/// What the rewriter did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Request path is not a page.
    SkippedPath,
    /// Origin response is not HTML.
    SkippedContentType,
    /// Script injected after the head tag.
    Injected,
    /// HTML without a head tag; body left as is, cache headers applied.
    HeadTagMissing,
    /// No token configured; error page served.
    MissingToken,
}

impl RewriteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewriteOutcome::SkippedPath => "skipped_path",
            RewriteOutcome::SkippedContentType => "skipped_content_type",
            RewriteOutcome::Injected => "injected",
            RewriteOutcome::HeadTagMissing => "head_tag_missing",
            RewriteOutcome::MissingToken => "missing_token",
        }
    }
}
