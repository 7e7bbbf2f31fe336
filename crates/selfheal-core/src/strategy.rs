//! Matching strategies.
//!
//! Each strategy looks at a normalized input and a candidate set and
//! commits to at most one answer. The engine runs them in
//! [`StrategyKind::ORDER`], cheapest and most certain first.

use std::collections::HashMap;
use std::fmt;

use rapidfuzz::distance::levenshtein;
use serde::{Deserialize, Serialize};

use crate::config::WordMatchMode;
use crate::source::{Candidate, CandidateSet};
use crate::tokenize::Tokenizer;

/// Identifies a matching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Exact,
    Alias,
    WordOverlap,
    PartialSubstring,
    Fuzzy,
}

impl StrategyKind {
    /// Resolution order.
    pub const ORDER: [StrategyKind; 5] = [
        Self::Exact,
        Self::Alias,
        Self::WordOverlap,
        Self::PartialSubstring,
        Self::Fuzzy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Alias => "alias",
            Self::WordOverlap => "word_overlap",
            Self::PartialSubstring => "partial_substring",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single strategy's answer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Match {
    pub(crate) key: String,
    /// 0.0 to 1.0.
    pub(crate) confidence: f64,
}

impl Match {
    fn of(candidate: &Candidate, confidence: f64) -> Self {
        Self {
            key: candidate.key.clone(),
            confidence,
        }
    }
}

pub(crate) trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Whether `try_match` reads the candidate set at all.
    fn needs_candidates(&self) -> bool {
        true
    }

    fn try_match(&self, input: &str, candidates: &CandidateSet) -> Option<Match>;
}

/// Input equals a candidate's normalized form.
pub(crate) struct ExactMatch;

impl Strategy for ExactMatch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Exact
    }

    fn try_match(&self, input: &str, candidates: &CandidateSet) -> Option<Match> {
        candidates
            .exact(input)
            .map(|candidate| Match::of(candidate, 1.0))
    }
}

/// Input is a known stale key. The target is trusted as is.
pub(crate) struct AliasMatch {
    aliases: HashMap<String, String>,
}

impl AliasMatch {
    /// `pairs` must already carry normalized alias keys; the first pair
    /// for a key wins.
    pub(crate) fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut aliases = HashMap::new();
        for (from, to) in pairs {
            aliases.entry(from).or_insert(to);
        }
        Self { aliases }
    }
}

impl Strategy for AliasMatch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Alias
    }

    fn needs_candidates(&self) -> bool {
        false
    }

    fn try_match(&self, input: &str, _candidates: &CandidateSet) -> Option<Match> {
        self.aliases.get(input).map(|target| Match {
            key: target.clone(),
            confidence: 1.0,
        })
    }
}

/// Every significant input token appears inside the candidate.
///
/// Among qualifying candidates the fewest extra tokens wins, then the
/// shortest text, then the first seen.
pub(crate) struct WordOverlap {
    tokenizer: Tokenizer,
    mode: WordMatchMode,
}

impl WordOverlap {
    pub(crate) fn new(tokenizer: Tokenizer, mode: WordMatchMode) -> Self {
        Self { tokenizer, mode }
    }
}

impl Strategy for WordOverlap {
    fn kind(&self) -> StrategyKind {
        StrategyKind::WordOverlap
    }

    fn try_match(&self, input: &str, candidates: &CandidateSet) -> Option<Match> {
        let input_tokens = self.tokenizer.tokenize(input);
        if input_tokens.is_empty() {
            return None;
        }

        // (extra tokens, text length, candidate, candidate token count)
        let mut best: Option<(usize, usize, &Candidate, usize)> = None;
        for candidate in candidates.iter() {
            let candidate_tokens = self.tokenizer.tokenize(&candidate.normalized);
            let qualifies = match self.mode {
                WordMatchMode::Token => input_tokens
                    .iter()
                    .all(|token| candidate_tokens.iter().any(|ct| ct.contains(token))),
                WordMatchMode::Text => input_tokens
                    .iter()
                    .all(|token| candidate.normalized.contains(token)),
            };
            if !qualifies {
                continue;
            }
            let extra = candidate_tokens
                .iter()
                .filter(|ct| !input_tokens.iter().any(|token| ct.contains(token)))
                .count();
            let length = candidate.normalized.chars().count();
            let better = match best {
                None => true,
                Some((best_extra, best_length, _, _)) => (extra, length) < (best_extra, best_length),
            };
            if better {
                best = Some((extra, length, candidate, candidate_tokens.len()));
            }
        }

        best.map(|(extra, _, candidate, total)| {
            let confidence = if total == 0 {
                1.0
            } else {
                (total - extra) as f64 / total as f64
            };
            Match::of(candidate, confidence)
        })
    }
}

/// Input is a substring of the candidate, or the candidate of the input.
///
/// The smallest length difference wins, then the first seen.
pub(crate) struct PartialSubstring;

impl Strategy for PartialSubstring {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PartialSubstring
    }

    fn try_match(&self, input: &str, candidates: &CandidateSet) -> Option<Match> {
        let input_length = input.chars().count();
        let mut best: Option<(usize, &Candidate, usize)> = None;
        for candidate in candidates.iter() {
            let text = candidate.normalized.as_str();
            if text.is_empty() || !(text.contains(input) || input.contains(text)) {
                continue;
            }
            let length = text.chars().count();
            let difference = length.abs_diff(input_length);
            if best.is_none_or(|(best_difference, _, _)| difference < best_difference) {
                best = Some((difference, candidate, length));
            }
        }

        best.map(|(_, candidate, length)| {
            let confidence = length.min(input_length) as f64 / length.max(input_length) as f64;
            Match::of(candidate, confidence)
        })
    }
}

/// Highest normalized Levenshtein similarity, if at least `cutoff`.
///
/// Ties keep the first seen. A cutoff above 1.0 never matches; one below
/// 0.0 accepts the best candidate whatever its score.
pub(crate) struct FuzzyMatch {
    cutoff: f64,
}

impl FuzzyMatch {
    pub(crate) fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }
}

impl Strategy for FuzzyMatch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fuzzy
    }

    fn try_match(&self, input: &str, candidates: &CandidateSet) -> Option<Match> {
        let mut best: Option<(f64, &Candidate)> = None;
        for candidate in candidates.iter() {
            let score = similarity(input, &candidate.normalized);
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, candidate));
            }
        }
        match best {
            Some((score, candidate)) if score >= self.cutoff => Some(Match::of(candidate, score)),
            _ => None,
        }
    }
}

/// `1 - distance / max(len)` over chars.
pub fn similarity(a: &str, b: &str) -> f64 {
    levenshtein::normalized_similarity(a.chars(), b.chars())
}
