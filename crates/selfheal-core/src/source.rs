//! Candidate sources: where the canonical keys come from.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::StoreError;
use crate::normalize::Normalizer;

/// Read-only access to a backing store of canonical slugs.
///
/// A resolution issues at most one [`SlugStore::matching`] query, so the
/// candidate set always reflects current data. Implementations must not
/// mutate the store.
pub trait SlugStore: Send + Sync {
    /// Label used in logs and errors.
    fn name(&self) -> &str {
        "store"
    }

    /// Every canonical slug currently in the store.
    fn slugs(&self) -> Result<Vec<String>, StoreError>;

    /// Candidate rows for one resolution of `fragment` (the trimmed raw
    /// input, typos and all).
    ///
    /// Stores with a pattern query (`LIKE '%...%'`, a trigram index) may
    /// narrow by it, but must still return every row a strategy could
    /// accept; scoring happens in the engine. Defaults to [`SlugStore::slugs`].
    fn matching(&self, _fragment: &str) -> Result<Vec<String>, StoreError> {
        self.slugs()
    }

    /// Indexed lookup of one slug by its exact raw value, tried before the
    /// candidate query. Stores without such an index answer `None`.
    fn find(&self, _slug: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }
}

/// In-memory [`SlugStore`]; contents may change between resolutions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slugs: RwLock<Vec<String>>,
}

impl MemoryStore {
    pub fn new<I, S>(slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slugs: RwLock::new(slugs.into_iter().map(Into::into).collect()),
        }
    }

    pub fn insert(&self, slug: impl Into<String>) -> Result<(), StoreError> {
        let mut guard = self
            .slugs
            .write()
            .map_err(|_| StoreError::new("memory store lock poisoned"))?;
        guard.push(slug.into());
        Ok(())
    }

    pub fn remove(&self, slug: &str) -> Result<bool, StoreError> {
        let mut guard = self
            .slugs
            .write()
            .map_err(|_| StoreError::new("memory store lock poisoned"))?;
        let before = guard.len();
        guard.retain(|existing| existing != slug);
        Ok(guard.len() != before)
    }
}

impl SlugStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn slugs(&self) -> Result<Vec<String>, StoreError> {
        let guard = self
            .slugs
            .read()
            .map_err(|_| StoreError::new("memory store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn find(&self, slug: &str) -> Result<Option<String>, StoreError> {
        let guard = self
            .slugs
            .read()
            .map_err(|_| StoreError::new("memory store lock poisoned"))?;
        Ok(guard.iter().find(|candidate| *candidate == slug).cloned())
    }
}

/// The provider of candidate keys for one engine.
#[derive(Clone)]
pub enum CandidateSource {
    /// Static alias dictionary; candidates are its values.
    AliasMapping(Vec<(String, String)>),
    /// Fixed in-memory list of canonical keys.
    StaticCorpus(Vec<String>),
    /// Keys fetched from an external store on every resolution.
    DynamicCorpus(Arc<dyn SlugStore>),
}

impl fmt::Debug for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AliasMapping(pairs) => f.debug_tuple("AliasMapping").field(pairs).finish(),
            Self::StaticCorpus(keys) => f.debug_tuple("StaticCorpus").field(keys).finish(),
            Self::DynamicCorpus(store) => f.debug_tuple("DynamicCorpus").field(&store.name()).finish(),
        }
    }
}

impl CandidateSource {
    pub fn alias_mapping<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::AliasMapping(
            pairs
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        )
    }

    pub fn static_corpus<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::StaticCorpus(keys.into_iter().map(Into::into).collect())
    }

    pub fn dynamic(store: Arc<dyn SlugStore>) -> Self {
        Self::DynamicCorpus(store)
    }

    /// Short label for summaries: `alias`, `corpus` or `dynamic`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AliasMapping(_) => "alias",
            Self::StaticCorpus(_) => "corpus",
            Self::DynamicCorpus(_) => "dynamic",
        }
    }

    pub fn is_static(&self) -> bool {
        !matches!(self, Self::DynamicCorpus(_))
    }

    /// Alias pairs carried by the source itself.
    pub fn alias_pairs(&self) -> &[(String, String)] {
        match self {
            Self::AliasMapping(pairs) => pairs,
            _ => &[],
        }
    }

    /// Current candidate keys. Alias targets shared by several aliases
    /// are listed once.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        match self {
            Self::AliasMapping(pairs) => {
                let mut keys: Vec<String> = Vec::new();
                for (_, target) in pairs {
                    if !keys.contains(target) {
                        keys.push(target.clone());
                    }
                }
                Ok(keys)
            }
            Self::StaticCorpus(keys) => Ok(keys.clone()),
            Self::DynamicCorpus(store) => store.slugs(),
        }
    }

    /// Keys for one resolution of `fragment`. Only a dynamic store sees
    /// the fragment; the other sources return all their keys.
    pub(crate) fn snapshot(&self, fragment: &str) -> Result<Vec<String>, StoreError> {
        match self {
            Self::DynamicCorpus(store) => store.matching(fragment),
            _ => self.keys(),
        }
    }

    /// Raw-value lookup against a dynamic store's index. Static sources
    /// answer `None`; their normalized index covers this case.
    pub(crate) fn find_raw(&self, raw: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::DynamicCorpus(store) => store.find(raw),
            _ => Ok(None),
        }
    }
}

/// A key paired with its normalized form.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) key: String,
    pub(crate) normalized: String,
}

/// Normalized snapshot of a source's keys, with an exact-match index.
#[derive(Debug, Clone, Default)]
pub(crate) struct CandidateSet {
    candidates: Vec<Candidate>,
    exact: HashMap<String, usize>,
}

impl CandidateSet {
    pub(crate) fn build(keys: Vec<String>, normalizer: &Normalizer) -> Self {
        let mut candidates = Vec::with_capacity(keys.len());
        let mut exact = HashMap::with_capacity(keys.len());
        for key in keys {
            let normalized = normalizer.normalize(&key);
            exact.entry(normalized.clone()).or_insert(candidates.len());
            candidates.push(Candidate { key, normalized });
        }
        Self { candidates, exact }
    }

    /// First candidate whose normalized form equals `normalized`.
    pub(crate) fn exact(&self, normalized: &str) -> Option<&Candidate> {
        self.exact
            .get(normalized)
            .and_then(|index| self.candidates.get(*index))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.candidates.len()
    }
}
