//! Resolution engine: one candidate source, an ordered strategy pipeline.

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, trace, warn};

use crate::config::EngineConfig;
use crate::error::{ConfigError, ResolveError, Result};
use crate::normalize::Normalizer;
use crate::source::{CandidateSet, CandidateSource};
use crate::strategy::{
    AliasMatch, ExactMatch, FuzzyMatch, PartialSubstring, Strategy, StrategyKind, WordOverlap,
};
use crate::tokenize::Tokenizer;

/// The winning canonical key of a resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub key: String,
    pub strategy: StrategyKind,
    /// 0.0 to 1.0; 1.0 for exact and alias hits.
    pub confidence: f64,
    /// Name of the resolver that produced the key.
    pub resolver: String,
}

/// What one strategy did during an explained resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Disabled,
    Missed,
    Matched { key: String, confidence: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub strategy: StrategyKind,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Step-by-step account of a resolution, stopping at the first hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub resolver: String,
    pub input: String,
    pub normalized: String,
    pub steps: Vec<Step>,
    pub resolution: Option<Resolution>,
}

/// Builder for [`Engine`].
#[derive(Debug)]
pub struct EngineBuilder {
    name: String,
    source: CandidateSource,
    config: EngineConfig,
    aliases: Vec<(String, String)>,
}

impl EngineBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Stale-to-canonical pairs for the alias strategy, in addition to
    /// any carried by an alias-mapping source.
    #[must_use]
    pub fn aliases<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.aliases
            .extend(pairs.into_iter().map(|(from, to)| (from.into(), to.into())));
        self
    }

    pub fn build(self) -> std::result::Result<Engine, ConfigError> {
        let Self {
            name,
            source,
            config,
            aliases,
        } = self;
        let normalizer = Normalizer::new(&config.normalization)?;

        let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();
        for kind in config.enabled_strategies() {
            let strategy: Box<dyn Strategy> = match kind {
                StrategyKind::Exact => Box::new(ExactMatch),
                StrategyKind::Alias => {
                    let pairs = source
                        .alias_pairs()
                        .iter()
                        .chain(aliases.iter())
                        .map(|(from, to)| (normalizer.normalize(from), to.clone()))
                        .filter(|(from, _)| !from.is_empty());
                    Box::new(AliasMatch::new(pairs))
                }
                StrategyKind::WordOverlap => Box::new(WordOverlap::new(
                    Tokenizer::new(&config.separators, config.min_word_length),
                    config.word_match,
                )),
                StrategyKind::PartialSubstring => Box::new(PartialSubstring),
                StrategyKind::Fuzzy => Box::new(FuzzyMatch::new(config.fuzzy_cutoff)),
            };
            strategies.push(strategy);
        }

        // Static sources never fail and never change; index them once.
        let fixed = if source.is_static() {
            let keys = source.keys().unwrap_or_default();
            Some(CandidateSet::build(keys, &normalizer))
        } else {
            None
        };

        debug!(
            engine = %name,
            source = source.kind(),
            candidates = ?fixed.as_ref().map(CandidateSet::len),
            "built resolution engine"
        );

        Ok(Engine {
            name,
            config,
            normalizer,
            source,
            strategies,
            fixed,
        })
    }
}

/// Resolves a raw key against one candidate source.
///
/// Immutable once built; `resolve` keeps no state between calls and is
/// safe to call from many threads at once.
pub struct Engine {
    name: String,
    config: EngineConfig,
    normalizer: Normalizer,
    source: CandidateSource,
    strategies: Vec<Box<dyn Strategy>>,
    fixed: Option<CandidateSet>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn builder(source: CandidateSource) -> EngineBuilder {
        EngineBuilder {
            name: source.kind().to_string(),
            source,
            config: EngineConfig::default(),
            aliases: Vec::new(),
        }
    }

    /// Engine with the default configuration.
    pub fn new(source: CandidateSource) -> std::result::Result<Self, ConfigError> {
        Self::builder(source).build()
    }

    /// Alias dictionary lookups only.
    pub fn alias_mapping<I, K, V>(pairs: I) -> std::result::Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::builder(CandidateSource::alias_mapping(pairs))
            .config(EngineConfig::lookup_only())
            .build()
    }

    /// Every strategy over a fixed list of canonical keys.
    pub fn corpus<I, S>(keys: I) -> std::result::Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CandidateSource::static_corpus(keys))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &CandidateSource {
        &self.source
    }

    /// The normalized form strategies see for `raw`.
    pub fn normalize(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }

    /// Best canonical key for `raw`, or `None` if every strategy misses.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Store`] if a dynamic source's store fails.
    pub fn resolve(&self, raw: &str) -> Result<Option<Resolution>> {
        let span = debug_span!("resolve", engine = %self.name);
        let _guard = span.enter();
        self.run(raw, None)
    }

    /// Like [`Engine::resolve`], recording every strategy's outcome.
    pub fn explain(&self, raw: &str) -> Result<Explanation> {
        let span = debug_span!("explain", engine = %self.name);
        let _guard = span.enter();
        let mut steps = Vec::new();
        let resolution = self.run(raw, Some(&mut steps))?;
        Ok(Explanation {
            resolver: self.name.clone(),
            input: raw.to_string(),
            normalized: self.normalizer.normalize(raw),
            steps,
            resolution,
        })
    }

    fn run(&self, raw: &str, mut steps: Option<&mut Vec<Step>>) -> Result<Option<Resolution>> {
        let normalized = self.normalizer.normalize(raw);
        if normalized.is_empty() {
            trace!("empty input never resolves");
            return Ok(None);
        }

        let mut candidates = Candidates {
            engine: self,
            fragment: raw.trim(),
            loaded: None,
        };
        let mut enabled = self.strategies.iter();
        let mut next = enabled.next();

        for kind in StrategyKind::ORDER {
            let strategy = match next {
                Some(strategy) if strategy.kind() == kind => {
                    next = enabled.next();
                    strategy
                }
                _ => {
                    record(&mut steps, kind, StepOutcome::Disabled);
                    continue;
                }
            };

            trace!(strategy = %kind, input = %normalized, "trying strategy");
            let found = if kind == StrategyKind::Exact
                && let Some(key) = self.find_raw(raw)?
            {
                Some(crate::strategy::Match {
                    key,
                    confidence: 1.0,
                })
            } else if strategy.needs_candidates() {
                strategy.try_match(&normalized, candidates.get()?)
            } else {
                strategy.try_match(&normalized, &CandidateSet::default())
            };

            match found {
                Some(hit) => {
                    debug!(
                        strategy = %kind,
                        key = %hit.key,
                        confidence = hit.confidence,
                        "resolved"
                    );
                    record(
                        &mut steps,
                        kind,
                        StepOutcome::Matched {
                            key: hit.key.clone(),
                            confidence: hit.confidence,
                        },
                    );
                    return Ok(Some(Resolution {
                        key: hit.key,
                        strategy: kind,
                        confidence: hit.confidence,
                        resolver: self.name.clone(),
                    }));
                }
                None => record(&mut steps, kind, StepOutcome::Missed),
            }
        }

        trace!(input = %normalized, "no strategy matched");
        Ok(None)
    }

    fn find_raw(&self, raw: &str) -> Result<Option<String>> {
        self.source.find_raw(raw.trim()).map_err(|source| {
            warn!(engine = %self.name, error = %source, "slug store lookup failed");
            ResolveError::store(&self.name, source)
        })
    }

    fn load(&self, fragment: &str) -> Result<CandidateSet> {
        let keys = self.source.snapshot(fragment).map_err(|source| {
            warn!(engine = %self.name, error = %source, "slug store query failed");
            ResolveError::store(&self.name, source)
        })?;
        trace!(candidates = keys.len(), "loaded candidate snapshot");
        Ok(CandidateSet::build(keys, &self.normalizer))
    }
}

/// Per-call access to the candidate set: the prebuilt index for static
/// sources, or one snapshot fetched on first use for dynamic ones.
struct Candidates<'a> {
    engine: &'a Engine,
    fragment: &'a str,
    loaded: Option<CandidateSet>,
}

impl Candidates<'_> {
    fn get(&mut self) -> Result<&CandidateSet> {
        if let Some(fixed) = &self.engine.fixed {
            return Ok(fixed);
        }
        if self.loaded.is_none() {
            self.loaded = Some(self.engine.load(self.fragment)?);
        }
        Ok(self.loaded.get_or_insert_with(CandidateSet::default))
    }
}

fn record(steps: &mut Option<&mut Vec<Step>>, strategy: StrategyKind, outcome: StepOutcome) {
    if let Some(steps) = steps {
        steps.push(Step { strategy, outcome });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::StoreError;
    use crate::source::{MemoryStore, SlugStore};

    struct FailingStore;

    impl SlugStore for FailingStore {
        fn slugs(&self) -> std::result::Result<Vec<String>, StoreError> {
            Err(StoreError::new("connection refused"))
        }
    }

    #[test]
    fn explain_records_disabled_and_missed_steps() {
        let engine = Engine::builder(CandidateSource::static_corpus(["hello-world"]))
            .name("docs")
            .config(EngineConfig::default().with_word_matching(false))
            .build()
            .unwrap();
        let explanation = engine.explain("Hello-Worl").unwrap();
        assert_eq!(explanation.normalized, "hello-worl");
        let outcomes: Vec<_> = explanation
            .steps
            .iter()
            .map(|s| (s.strategy, s.outcome.clone()))
            .collect();
        assert_eq!(
            outcomes,
            vec![
                (StrategyKind::Exact, StepOutcome::Missed),
                (StrategyKind::Alias, StepOutcome::Missed),
                (StrategyKind::WordOverlap, StepOutcome::Disabled),
                (
                    StrategyKind::PartialSubstring,
                    StepOutcome::Matched {
                        key: "hello-world".to_string(),
                        confidence: 10.0 / 11.0,
                    }
                ),
            ]
        );
        let resolution = explanation.resolution.unwrap();
        assert_eq!(resolution.resolver, "docs");
        assert_eq!(resolution.strategy, StrategyKind::PartialSubstring);
    }

    #[test]
    fn explain_of_empty_input_has_no_steps() {
        let engine = Engine::corpus(["a-b"]).unwrap();
        let explanation = engine.explain("   ").unwrap();
        assert!(explanation.steps.is_empty());
        assert!(explanation.resolution.is_none());
    }

    #[test]
    fn alias_only_engine_never_touches_a_failing_store() {
        let engine = Engine::builder(CandidateSource::dynamic(Arc::new(FailingStore)))
            .config(EngineConfig::lookup_only().with_exact(false))
            .aliases([("old", "new")])
            .build()
            .unwrap();
        let resolution = engine.resolve("old").unwrap().unwrap();
        assert_eq!(resolution.key, "new");
        assert!(engine.resolve("other").unwrap().is_none());
    }

    #[test]
    fn store_failures_surface_as_errors() {
        let engine = Engine::builder(CandidateSource::dynamic(Arc::new(FailingStore)))
            .name("articles")
            .build()
            .unwrap();
        let error = engine.resolve("anything").unwrap_err();
        let ResolveError::Store { resolver, source } = error;
        assert_eq!(resolver, "articles");
        assert_eq!(source.message(), "connection refused");
    }

    #[test]
    fn dynamic_raw_hit_short_circuits() {
        let store = Arc::new(MemoryStore::new(["Mixed-Case-Slug"]));
        let engine = Engine::new(CandidateSource::dynamic(store)).unwrap();
        let resolution = engine.resolve("Mixed-Case-Slug").unwrap().unwrap();
        assert_eq!(resolution.strategy, StrategyKind::Exact);
        assert_eq!(resolution.key, "Mixed-Case-Slug");
        assert_eq!(resolution.resolver, "dynamic");
    }

    #[test]
    fn alias_keys_are_normalized() {
        let engine = Engine::alias_mapping([("Flask_Basic", "flask-basics")]).unwrap();
        let resolution = engine.resolve("flask-basic").unwrap().unwrap();
        assert_eq!(resolution.key, "flask-basics");
        assert_eq!(resolution.strategy, StrategyKind::Alias);
    }
}
