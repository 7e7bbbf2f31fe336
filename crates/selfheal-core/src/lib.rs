//! Slug resolution engine.
//!
//! Given a key that no longer exists (a typo, a renamed slug, a stale
//! link), find the canonical key a caller should redirect to. An
//! [`Engine`] runs one [`CandidateSource`] through the strategies in
//! [`StrategyKind::ORDER`] and stops at the first hit; a
//! [`ResolverChain`] tries several resolvers in turn.
//!
//! ```
//! use selfheal_core::{Engine, ResolverChain, StrategyKind};
//!
//! let chain = ResolverChain::new()
//!     .with(Engine::alias_mapping([("flask-basic", "flask-basics")]).unwrap())
//!     .with(Engine::corpus(["hello-world", "flask-basics"]).unwrap());
//!
//! let hit = chain.resolve("hello-wrold").unwrap().unwrap();
//! assert_eq!(hit.key, "hello-world");
//! assert_eq!(hit.strategy, StrategyKind::Fuzzy);
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod heal;
pub mod normalize;
pub mod resolver;
pub mod source;
pub mod strategy;
pub mod tokenize;

pub use config::{
    EngineConfig, NormalizationConfig, NormalizationRule, RuleKind, WordMatchMode,
};
pub use engine::{Engine, EngineBuilder, Explanation, Resolution, Step, StepOutcome};
pub use error::{ConfigError, ResolveError, Result, StoreError};
pub use heal::{PathHealer, Redirect};
pub use normalize::Normalizer;
pub use resolver::{Resolver, ResolverChain, RouteResolver};
pub use source::{CandidateSource, MemoryStore, SlugStore};
pub use strategy::StrategyKind;
pub use tokenize::Tokenizer;
