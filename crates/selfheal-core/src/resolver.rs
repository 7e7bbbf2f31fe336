//! Resolvers and resolver chains.

use tracing::{debug, debug_span};

use crate::config::EngineConfig;
use crate::engine::{Engine, Explanation, Resolution};
use crate::error::{ConfigError, Result};
use crate::source::CandidateSource;

/// Anything that maps a raw key to at most one canonical key.
pub trait Resolver: Send + Sync {
    fn name(&self) -> &str;

    fn resolve(&self, raw: &str) -> Result<Option<Resolution>>;

    fn explain(&self, raw: &str) -> Result<Explanation>;
}

impl Resolver for Engine {
    fn name(&self) -> &str {
        Engine::name(self)
    }

    fn resolve(&self, raw: &str) -> Result<Option<Resolution>> {
        Engine::resolve(self, raw)
    }

    fn explain(&self, raw: &str) -> Result<Explanation> {
        Engine::explain(self, raw)
    }
}

/// Resolves against an application's registered route paths.
///
/// Routes with parameters (`<slug>`, `{id}`) cannot be redirect targets
/// and are skipped. By default only exact and fuzzy matching run.
#[derive(Debug)]
pub struct RouteResolver {
    engine: Engine,
}

impl RouteResolver {
    pub fn new<I, S>(routes: I) -> std::result::Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_config("routes", routes, Self::default_config())
    }

    pub fn with_config<I, S>(
        name: impl Into<String>,
        routes: I,
        config: EngineConfig,
    ) -> std::result::Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let slugs: Vec<String> = routes
            .into_iter()
            .filter_map(|route| route_slug(route.as_ref()))
            .collect();
        let engine = Engine::builder(CandidateSource::static_corpus(slugs))
            .name(name)
            .config(config)
            .build()?;
        Ok(Self { engine })
    }

    pub fn default_config() -> EngineConfig {
        EngineConfig::default()
            .with_word_matching(false)
            .with_partial_matching(false)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl Resolver for RouteResolver {
    fn name(&self) -> &str {
        self.engine.name()
    }

    fn resolve(&self, raw: &str) -> Result<Option<Resolution>> {
        self.engine.resolve(raw)
    }

    fn explain(&self, raw: &str) -> Result<Explanation> {
        self.engine.explain(raw)
    }
}

/// `/hello-world/` becomes `hello-world`; parameterised and root routes
/// yield nothing.
pub fn route_slug(route: &str) -> Option<String> {
    let trimmed = route.trim().trim_matches('/');
    if trimmed.is_empty() || trimmed.contains(['<', '{']) {
        return None;
    }
    Some(trimmed.to_string())
}

/// Ordered resolvers; the first non-empty answer wins.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl std::fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.names())
            .finish()
    }
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn push(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Tries each resolver in order. A resolver error stops the chain.
    pub fn resolve(&self, raw: &str) -> Result<Option<Resolution>> {
        let span = debug_span!("chain", input = %raw);
        let _guard = span.enter();
        for resolver in &self.resolvers {
            if let Some(resolution) = resolver.resolve(raw)? {
                return Ok(Some(resolution));
            }
        }
        debug!("chain exhausted without a match");
        Ok(None)
    }

    /// Explanations from each resolver tried, ending with the one that
    /// matched (or covering every resolver if none did).
    pub fn explain(&self, raw: &str) -> Result<Vec<Explanation>> {
        let mut explanations = Vec::new();
        for resolver in &self.resolvers {
            let explanation = resolver.explain(raw)?;
            let matched = explanation.resolution.is_some();
            explanations.push(explanation);
            if matched {
                break;
            }
        }
        Ok(explanations)
    }
}
