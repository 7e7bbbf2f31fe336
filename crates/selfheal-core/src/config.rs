//! Engine configuration.
//!
//! All types here are plain data: they are resolved once when an
//! [`crate::Engine`] is built and never mutated afterwards. They derive
//! `serde` so integrating applications can load them from their own
//! configuration files; this crate parses nothing itself.

use serde::{Deserialize, Serialize};

use crate::strategy::StrategyKind;

/// Default minimum similarity ratio for the fuzzy strategy.
pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.6;
/// Default minimum token length for word matching.
pub const DEFAULT_MIN_WORD_LENGTH: usize = 4;
/// Default token separators (whitespace always separates).
pub const DEFAULT_SEPARATORS: &str = "-/";

/// Where a significant input token must appear for a word-overlap match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordMatchMode {
    /// Inside one of the candidate's tokens (mid-word matches allowed).
    #[default]
    Token,
    /// Anywhere in the candidate's normalized text.
    Text,
}

/// How a rule's pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    #[default]
    Literal,
    /// A `regex` pattern; the replacement may use `$1`-style group references.
    Regex,
}

/// A substitution applied to every occurrence in the working text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationRule {
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub kind: RuleKind,
}

impl NormalizationRule {
    pub fn literal(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            kind: RuleKind::Literal,
        }
    }

    pub fn regex(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            kind: RuleKind::Regex,
        }
    }
}

/// Rule set used by the [`crate::Normalizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Apply the built-in digit/letter typo rules before `rules`.
    pub typo_rules: bool,
    /// Caller rules, applied in order after the built-ins.
    pub rules: Vec<NormalizationRule>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            typo_rules: true,
            rules: Vec::new(),
        }
    }
}

/// Immutable configuration for one [`crate::Engine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub exact: bool,
    pub alias: bool,
    pub word_matching: bool,
    pub partial_matching: bool,
    pub fuzzy: bool,
    /// Minimum similarity ratio (nominally 0.0 to 1.0) for a fuzzy match.
    pub fuzzy_cutoff: f64,
    /// Tokens shorter than this (in chars) are ignored by word matching.
    pub min_word_length: usize,
    pub word_match: WordMatchMode,
    /// Characters that split tokens, in addition to whitespace.
    pub separators: String,
    pub normalization: NormalizationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exact: true,
            alias: true,
            word_matching: true,
            partial_matching: true,
            fuzzy: true,
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
            min_word_length: DEFAULT_MIN_WORD_LENGTH,
            word_match: WordMatchMode::default(),
            separators: DEFAULT_SEPARATORS.to_string(),
            normalization: NormalizationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Exact and alias lookups only.
    #[must_use]
    pub fn lookup_only() -> Self {
        Self {
            word_matching: false,
            partial_matching: false,
            fuzzy: false,
            ..Self::default()
        }
    }

    /// Returns true if the given strategy runs under this configuration.
    #[must_use]
    pub fn is_enabled(&self, kind: StrategyKind) -> bool {
        match kind {
            StrategyKind::Exact => self.exact,
            StrategyKind::Alias => self.alias,
            StrategyKind::WordOverlap => self.word_matching,
            StrategyKind::PartialSubstring => self.partial_matching,
            StrategyKind::Fuzzy => self.fuzzy,
        }
    }

    /// Strategies that run under this configuration, in resolution order.
    #[must_use]
    pub fn enabled_strategies(&self) -> Vec<StrategyKind> {
        StrategyKind::ORDER
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .collect()
    }

    #[must_use]
    pub fn with_exact(mut self, enable: bool) -> Self {
        self.exact = enable;
        self
    }

    #[must_use]
    pub fn with_alias(mut self, enable: bool) -> Self {
        self.alias = enable;
        self
    }

    #[must_use]
    pub fn with_word_matching(mut self, enable: bool) -> Self {
        self.word_matching = enable;
        self
    }

    #[must_use]
    pub fn with_partial_matching(mut self, enable: bool) -> Self {
        self.partial_matching = enable;
        self
    }

    #[must_use]
    pub fn with_fuzzy(mut self, enable: bool) -> Self {
        self.fuzzy = enable;
        self
    }

    #[must_use]
    pub fn with_fuzzy_cutoff(mut self, cutoff: f64) -> Self {
        self.fuzzy_cutoff = cutoff;
        self
    }

    #[must_use]
    pub fn with_min_word_length(mut self, length: usize) -> Self {
        self.min_word_length = length;
        self
    }

    #[must_use]
    pub fn with_word_match(mut self, mode: WordMatchMode) -> Self {
        self.word_match = mode;
        self
    }

    #[must_use]
    pub fn with_separators(mut self, separators: impl Into<String>) -> Self {
        self.separators = separators.into();
        self
    }

    #[must_use]
    pub fn with_typo_rules(mut self, enable: bool) -> Self {
        self.normalization.typo_rules = enable;
        self
    }

    /// Append a caller rule after any already configured.
    #[must_use]
    pub fn with_rule(mut self, rule: NormalizationRule) -> Self {
        self.normalization.rules.push(rule);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_every_strategy() {
        let config = EngineConfig::default();
        assert_eq!(config.enabled_strategies(), StrategyKind::ORDER.to_vec());
        assert!((config.fuzzy_cutoff - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.min_word_length, 4);
    }

    #[test]
    fn lookup_only_keeps_exact_and_alias() {
        let config = EngineConfig::lookup_only();
        assert_eq!(
            config.enabled_strategies(),
            vec![StrategyKind::Exact, StrategyKind::Alias]
        );
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"fuzzy_cutoff": 0.7, "normalization": {"rules": [{"pattern": "ph", "replacement": "f"}]}}"#)
                .unwrap();
        assert!((config.fuzzy_cutoff - 0.7).abs() < f64::EPSILON);
        assert!(config.word_matching);
        assert!(config.normalization.typo_rules);
        assert_eq!(
            config.normalization.rules,
            vec![NormalizationRule::literal("ph", "f")]
        );
    }
}
