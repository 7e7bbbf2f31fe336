//! Turning a failed request path into a redirect target.
//!
//! This is the boundary a web framework's not-found hook calls: it pulls
//! the slug out of the path, runs the resolver chain, and formats the
//! location. Status codes and response building stay with the caller.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::Resolution;
use crate::error::Result;
use crate::resolver::ResolverChain;

/// Placeholder replaced by the winning key in redirect patterns.
pub const SLUG_PLACEHOLDER: &str = "{slug}";
pub const DEFAULT_REDIRECT_PATTERN: &str = "/{slug}";

type Extractor = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Where a failed path should be sent instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redirect {
    /// The slug extracted from the failed path.
    pub slug: String,
    pub location: String,
    pub resolution: Resolution,
}

/// Resolver chain plus the path-to-slug and key-to-location glue.
pub struct PathHealer {
    chain: ResolverChain,
    extractor: Extractor,
    redirect_pattern: String,
}

impl std::fmt::Debug for PathHealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathHealer")
            .field("chain", &self.chain)
            .field("redirect_pattern", &self.redirect_pattern)
            .finish_non_exhaustive()
    }
}

impl PathHealer {
    /// Uses the whole path, minus surrounding slashes, as the slug.
    pub fn new(chain: ResolverChain) -> Self {
        Self {
            chain,
            extractor: Box::new(|path| Some(path.to_string())),
            redirect_pattern: DEFAULT_REDIRECT_PATTERN.to_string(),
        }
    }

    /// Replace the slug extraction. The extractor receives the path with
    /// surrounding slashes removed; `None` means "not ours, leave the 404".
    #[must_use]
    pub fn with_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.extractor = Box::new(extractor);
        self
    }

    /// Use the part after `prefix` as the slug, or the whole path when it
    /// does not start with `prefix`.
    #[must_use]
    pub fn with_prefix(self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_matches('/').to_string();
        self.with_extractor(move |path| Some(strip_segment_prefix(path, &prefix).to_string()))
    }

    /// Pattern for the location, with `{slug}` standing for the key.
    #[must_use]
    pub fn with_redirect_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.redirect_pattern = pattern.into();
        self
    }

    pub fn chain(&self) -> &ResolverChain {
        &self.chain
    }

    pub fn redirect_pattern(&self) -> &str {
        &self.redirect_pattern
    }

    /// Redirect for `path`, or `None` when nothing better than the
    /// requested slug exists.
    pub fn heal(&self, path: &str) -> Result<Option<Redirect>> {
        let trimmed = path.trim().trim_matches('/');
        let Some(slug) = (self.extractor)(trimmed) else {
            debug!(path = %path, "path not handled by extractor");
            return Ok(None);
        };
        if slug.is_empty() {
            return Ok(None);
        }
        let Some(resolution) = self.chain.resolve(&slug)? else {
            return Ok(None);
        };
        if resolution.key == slug {
            // The requested slug is canonical; redirecting would loop.
            return Ok(None);
        }
        let location = self.location(&resolution.key);
        debug!(path = %path, location = %location, "healed path");
        Ok(Some(Redirect {
            slug,
            location,
            resolution,
        }))
    }

    pub fn location(&self, key: &str) -> String {
        self.redirect_pattern.replace(SLUG_PLACEHOLDER, key)
    }
}

fn strip_segment_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return path;
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => path,
    }
}
