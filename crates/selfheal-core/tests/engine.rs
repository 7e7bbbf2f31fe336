use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use selfheal_core::{
    CandidateSource, Engine, EngineConfig, MemoryStore, NormalizationRule, SlugStore,
    StoreError, StrategyKind,
};

const PRODUCTS: [&str; 5] = [
    "cool-product-SKU1234567",
    "awesome-gadget-ABC987654",
    "super-phone-XYZ123",
    "laptop-model-DEF456789",
    "gaming-mouse-GHI321654",
];

fn product_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new(PRODUCTS))
}

fn product_engine(config: EngineConfig) -> Engine {
    Engine::builder(CandidateSource::dynamic(product_store()))
        .name("products")
        .config(config)
        .build()
        .expect("build engine")
}

fn resolve(engine: &Engine, input: &str) -> Option<(String, StrategyKind)> {
    engine
        .resolve(input)
        .expect("resolve")
        .map(|r| (r.key, r.strategy))
}

fn key(engine: &Engine, input: &str) -> Option<String> {
    resolve(engine, input).map(|(key, _)| key)
}

#[test]
fn exact_match() {
    let engine = product_engine(EngineConfig::default());
    assert_eq!(
        resolve(&engine, "cool-product-SKU1234567"),
        Some(("cool-product-SKU1234567".to_string(), StrategyKind::Exact))
    );
    assert_eq!(
        key(&engine, "gaming-mouse-GHI321654").as_deref(),
        Some("gaming-mouse-GHI321654")
    );
}

#[test]
fn typo_normalization() {
    let engine = product_engine(EngineConfig::default());
    for input in ["c00l-product-SKU1234567", "cool-pr0duct-SKU1234567", "COOL PRODUCT sku1234567"] {
        assert_eq!(
            resolve(&engine, input),
            Some(("cool-product-SKU1234567".to_string(), StrategyKind::Exact)),
            "input {input}"
        );
    }
}

#[test]
fn explicit_digit_rule_resolves_via_exact() {
    let config = EngineConfig::default()
        .with_typo_rules(false)
        .with_rule(NormalizationRule::literal("0", "o"));
    let engine = Engine::builder(CandidateSource::static_corpus([
        "cool-product-SKU1234567",
        "awesome-gadget-ABC987654",
    ]))
    .config(config)
    .build()
    .unwrap();
    assert_eq!(
        resolve(&engine, "c00l-product-SKU1234567"),
        Some(("cool-product-SKU1234567".to_string(), StrategyKind::Exact))
    );
}

#[test]
fn word_matching() {
    let engine = product_engine(EngineConfig::default());
    for (input, expected) in [
        ("SKU1234567", "cool-product-SKU1234567"),
        ("ABC987654", "awesome-gadget-ABC987654"),
        ("product-SKU1234567", "cool-product-SKU1234567"),
        ("phone-xyz123", "super-phone-XYZ123"),
    ] {
        assert_eq!(
            resolve(&engine, input),
            Some((expected.to_string(), StrategyKind::WordOverlap)),
            "input {input}"
        );
    }
}

#[test]
fn partial_matching() {
    let engine = product_engine(EngineConfig::default());
    assert_eq!(
        key(&engine, "cool-SKU1234567").as_deref(),
        Some("cool-product-SKU1234567")
    );
    assert_eq!(
        key(&engine, "awesome-ABC987654").as_deref(),
        Some("awesome-gadget-ABC987654")
    );

    let substring_only = product_engine(EngineConfig::default().with_word_matching(false));
    assert_eq!(
        resolve(&substring_only, "product-SKU"),
        Some((
            "cool-product-SKU1234567".to_string(),
            StrategyKind::PartialSubstring
        ))
    );
}

#[test]
fn fuzzy_matching() {
    let engine = product_engine(EngineConfig::default().with_fuzzy_cutoff(0.7));
    let transposed = engine.resolve("cool-prodcut-SKU1234567").unwrap().unwrap();
    assert_eq!(transposed.key, "cool-product-SKU1234567");
    assert_eq!(transposed.strategy, StrategyKind::Fuzzy);
    assert!(transposed.confidence > 0.9);

    assert_eq!(
        resolve(&engine, "awsome-gadget-ABC987654"),
        Some(("awesome-gadget-ABC987654".to_string(), StrategyKind::Fuzzy))
    );

    let strict = product_engine(EngineConfig::default().with_fuzzy_cutoff(0.95));
    assert_eq!(resolve(&strict, "cool-prodcut-SKU1234567"), None);
}

#[test]
fn custom_normalizers() {
    let config = EngineConfig::default()
        .with_rule(NormalizationRule::literal("ph", "f"))
        .with_rule(NormalizationRule::literal("sku", "SKU"));
    let engine = product_engine(config);
    assert_eq!(
        resolve(&engine, "super-fone-XYZ123"),
        Some(("super-phone-XYZ123".to_string(), StrategyKind::Exact))
    );
}

#[test]
fn configurable_matching() {
    let no_words = product_engine(EngineConfig::default().with_word_matching(false));
    assert_eq!(
        resolve(&no_words, "SKU1234567"),
        Some((
            "cool-product-SKU1234567".to_string(),
            StrategyKind::PartialSubstring
        ))
    );

    let no_partial = product_engine(EngineConfig::default().with_partial_matching(false));
    assert_eq!(
        key(&no_partial, "cool-product-SKU1234567").as_deref(),
        Some("cool-product-SKU1234567")
    );

    let long_words = product_engine(EngineConfig::default().with_min_word_length(6));
    assert_eq!(
        resolve(&long_words, "SKU1234567"),
        Some((
            "cool-product-SKU1234567".to_string(),
            StrategyKind::WordOverlap
        ))
    );
}

#[test]
fn no_match_cases() {
    let engine = product_engine(EngineConfig::default());
    for input in ["totally-different-thing", "unrelated", "", "   ", "--"] {
        assert_eq!(resolve(&engine, input), None, "input {input:?}");
    }
}

#[test]
fn strategies_run_cheapest_first() {
    let engine = product_engine(EngineConfig::default());
    let exact = engine.resolve("cool-product-SKU1234567").unwrap().unwrap();
    assert_eq!(exact.strategy, StrategyKind::Exact);
    assert!((exact.confidence - 1.0).abs() < f64::EPSILON);

    let words = engine.resolve("product-SKU").unwrap().unwrap();
    assert_eq!(words.key, "cool-product-SKU1234567");
    assert_eq!(words.strategy, StrategyKind::WordOverlap);
}

#[test]
fn single_entry_store() {
    let store = Arc::new(MemoryStore::new(["flask-basics"]));
    let engine = Engine::new(CandidateSource::dynamic(store)).unwrap();
    assert_eq!(key(&engine, "flask-basic").as_deref(), Some("flask-basics"));
    assert_eq!(key(&engine, "not-found"), None);
}

#[test]
fn dynamic_corpus_reflects_current_data() {
    let store = product_store();
    let engine = Engine::new(CandidateSource::dynamic(store.clone())).unwrap();
    assert_eq!(key(&engine, "wireless-keyboard-KEY555"), None);

    store.insert("wireless-keyboard-KEY555").unwrap();
    assert_eq!(
        key(&engine, "wireles-keyboard-KEY555").as_deref(),
        Some("wireless-keyboard-KEY555")
    );

    store.remove("wireless-keyboard-KEY555").unwrap();
    assert_eq!(key(&engine, "wireles-keyboard-KEY555"), None);
}

#[test]
fn alias_does_not_require_target_in_candidates() {
    let engine = Engine::builder(CandidateSource::static_corpus(PRODUCTS))
        .aliases([("retired-gadget", "gadget-landing-page")])
        .build()
        .unwrap();
    let resolution = engine.resolve("Retired_Gadget").unwrap().unwrap();
    assert_eq!(resolution.key, "gadget-landing-page");
    assert_eq!(resolution.strategy, StrategyKind::Alias);
}

#[test]
fn exact_wins_whatever_else_is_enabled() {
    let configs = [
        EngineConfig::default(),
        EngineConfig::lookup_only(),
        EngineConfig::default().with_alias(false).with_fuzzy_cutoff(0.0),
    ];
    for config in configs {
        let engine = Engine::builder(CandidateSource::static_corpus(PRODUCTS))
            .aliases([("super-phone-XYZ123", "somewhere-else")])
            .config(config)
            .build()
            .unwrap();
        for candidate in PRODUCTS {
            assert_eq!(
                resolve(&engine, candidate),
                Some((candidate.to_string(), StrategyKind::Exact))
            );
        }
    }
}

#[test]
fn empty_candidate_set_never_matches() {
    let engine = Engine::corpus(Vec::<String>::new()).unwrap();
    assert_eq!(resolve(&engine, "anything"), None);
}

#[test]
fn concurrent_resolutions_are_independent() {
    let engine = product_engine(EngineConfig::default().with_fuzzy_cutoff(0.7));
    let inputs = [
        ("SKU1234567", Some("cool-product-SKU1234567")),
        ("awsome-gadget-ABC987654", Some("awesome-gadget-ABC987654")),
        ("totally-different-thing", None),
        ("gaming-mouse-GHI321654", Some("gaming-mouse-GHI321654")),
    ];
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..25 {
                    for (input, expected) in inputs {
                        assert_eq!(key(&engine, input).as_deref(), expected);
                    }
                }
            });
        }
    });
}

/// Store without an index that counts full-table queries.
#[derive(Default)]
struct CountingStore {
    queries: AtomicUsize,
}

impl CountingStore {
    fn take(&self) -> usize {
        self.queries.swap(0, Ordering::SeqCst)
    }
}

impl SlugStore for CountingStore {
    fn slugs(&self) -> Result<Vec<String>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(PRODUCTS.iter().map(|s| (*s).to_string()).collect())
    }
}

#[test]
fn dynamic_store_is_queried_once_per_resolve() {
    let store = Arc::new(CountingStore::default());
    let engine = Engine::new(CandidateSource::dynamic(store.clone())).unwrap();

    let cases = [
        ("c00l-product-SKU1234567", Some(StrategyKind::Exact)),
        ("SKU1234567", Some(StrategyKind::WordOverlap)),
        ("totally-different-thing", None),
    ];
    for (input, strategy) in cases {
        assert_eq!(resolve(&engine, input).map(|(_, s)| s), strategy, "{input}");
        assert_eq!(store.take(), 1, "{input}");
    }

    engine.explain("SKU1234567").unwrap();
    assert_eq!(store.take(), 1);
}

/// Store with a pattern query: returns only rows sharing a token with the
/// fragment and records every fragment it was asked about.
#[derive(Default)]
struct PatternStore {
    fragments: Mutex<Vec<String>>,
    full_scans: AtomicUsize,
}

impl SlugStore for PatternStore {
    fn slugs(&self) -> Result<Vec<String>, StoreError> {
        self.full_scans.fetch_add(1, Ordering::SeqCst);
        Ok(PRODUCTS.iter().map(|s| (*s).to_string()).collect())
    }

    fn matching(&self, fragment: &str) -> Result<Vec<String>, StoreError> {
        self.fragments
            .lock()
            .map_err(|_| StoreError::new("poisoned"))?
            .push(fragment.to_string());
        let fragment = fragment.to_lowercase();
        let tokens: Vec<&str> = fragment.split('-').filter(|t| t.len() >= 3).collect();
        Ok(PRODUCTS
            .iter()
            .filter(|slug| {
                let slug = slug.to_lowercase();
                tokens.iter().any(|token| slug.contains(token))
            })
            .map(|s| (*s).to_string())
            .collect())
    }
}

#[test]
fn dynamic_store_can_narrow_by_the_raw_input() {
    let store = Arc::new(PatternStore::default());
    let engine = Engine::new(CandidateSource::dynamic(store.clone())).unwrap();

    assert_eq!(
        resolve(&engine, "  phone-xyz123 "),
        Some(("super-phone-XYZ123".to_string(), StrategyKind::WordOverlap))
    );
    assert_eq!(key(&engine, "unrelated"), None);

    assert_eq!(
        *store.fragments.lock().unwrap(),
        vec!["phone-xyz123".to_string(), "unrelated".to_string()]
    );
    assert_eq!(store.full_scans.load(Ordering::SeqCst), 0);
}
