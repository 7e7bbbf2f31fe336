//! Text normalization applied to inputs and candidates before matching.

use regex::Regex;

use crate::config::{NormalizationConfig, NormalizationRule, RuleKind};
use crate::error::ConfigError;

/// Digit-for-letter typos folded by default.
pub const TYPO_RULES: [(&str, &str); 2] = [("0", "o"), ("1", "l")];

#[derive(Debug, Clone)]
enum CompiledRule {
    Literal { pattern: String, replacement: String },
    Regex { pattern: Regex, replacement: String },
}

impl CompiledRule {
    fn compile(index: usize, rule: &NormalizationRule) -> Result<Self, ConfigError> {
        if rule.pattern.is_empty() {
            return Err(ConfigError::EmptyPattern { index });
        }
        match rule.kind {
            RuleKind::Literal => Ok(Self::Literal {
                pattern: rule.pattern.clone(),
                replacement: rule.replacement.clone(),
            }),
            RuleKind::Regex => {
                let pattern =
                    Regex::new(&rule.pattern).map_err(|source| ConfigError::InvalidPattern {
                        index,
                        pattern: rule.pattern.clone(),
                        source,
                    })?;
                Ok(Self::Regex {
                    pattern,
                    replacement: rule.replacement.clone(),
                })
            }
        }
    }

    fn apply(&self, text: &str) -> String {
        match self {
            Self::Literal {
                pattern,
                replacement,
            } => text.replace(pattern.as_str(), replacement),
            Self::Regex {
                pattern,
                replacement,
            } => pattern.replace_all(text, replacement.as_str()).into_owned(),
        }
    }
}

/// Deterministic text transform shared by every strategy.
///
/// Steps, in order: lowercase, separator canonicalization, then each rule
/// over the whole string. Rules run once each; a later rule may produce
/// text an earlier rule would have rewritten, and that text is kept as is.
/// Normalizing twice is therefore not guaranteed to be a no-op.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Vec<CompiledRule>,
}

impl Normalizer {
    pub fn new(config: &NormalizationConfig) -> Result<Self, ConfigError> {
        let mut rules = Vec::new();
        if config.typo_rules {
            for (pattern, replacement) in TYPO_RULES {
                rules.push(CompiledRule::Literal {
                    pattern: pattern.to_string(),
                    replacement: replacement.to_string(),
                });
            }
        }
        for (index, rule) in config.rules.iter().enumerate() {
            rules.push(CompiledRule::compile(index, rule)?);
        }
        Ok(Self { rules })
    }

    pub fn normalize(&self, text: &str) -> String {
        let folded = text.to_lowercase();
        let mut working = canonicalize_separators(&folded);
        for rule in &self.rules {
            working = rule.apply(&working);
        }
        working
    }
}

/// Whitespace and underscores become `-`; runs of `-` collapse; no
/// leading or trailing `-` survives.
fn canonicalize_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let ch = if ch.is_whitespace() || ch == '_' {
            '-'
        } else {
            ch
        };
        if ch == '-' && (out.is_empty() || out.ends_with('-')) {
            continue;
        }
        out.push(ch);
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
