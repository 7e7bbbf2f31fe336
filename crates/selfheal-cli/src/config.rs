//! TOML configuration for the `selfheal` command.
//!
//! ```toml
//! [heal]
//! strip_prefix = "/product"
//! redirect_pattern = "/product/{slug}"
//!
//! [[resolvers]]
//! kind = "alias"
//! aliases = { "old-hello" = "hello-world" }
//!
//! [[resolvers]]
//! name = "products"
//! kind = "file"
//! path = "products.txt"
//! engine = { fuzzy_cutoff = 0.7 }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use selfheal_core::{
    CandidateSource, ConfigError, Engine, EngineConfig, PathHealer, Resolver, ResolverChain,
    RouteResolver, StrategyKind,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::store::FileStore;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config {path} defines no resolvers")]
    NoResolvers { path: PathBuf },

    #[error("resolver '{name}' in {path} is invalid: {source}")]
    Resolver {
        path: PathBuf,
        name: String,
        #[source]
        source: ConfigError,
    },
}

/// Contents of a `selfheal.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HealFile {
    pub heal: HealSection,
    pub resolvers: Vec<ResolverSpec>,
    /// Where the file was loaded from; relative slug file paths resolve
    /// against its directory.
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealSection {
    /// Location pattern with `{slug}` standing for the resolved key.
    pub redirect_pattern: Option<String>,
    /// Leading path segment(s) to drop before resolving.
    pub strip_prefix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverSpec {
    pub name: Option<String>,
    #[serde(flatten)]
    pub source: SourceSpec,
    /// Extra stale-to-canonical pairs. Ignored by `routes` resolvers.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Overrides the per-kind default configuration.
    #[serde(default)]
    pub engine: Option<EngineConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    Alias,
    Corpus { candidates: Vec<String> },
    File { path: PathBuf },
    Routes { routes: Vec<String> },
}

impl SourceSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceSpec::Alias => "alias",
            SourceSpec::Corpus { .. } => "corpus",
            SourceSpec::File { .. } => "file",
            SourceSpec::Routes { .. } => "routes",
        }
    }
}

/// One row of `selfheal check` output.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSummary {
    pub name: String,
    pub kind: &'static str,
    pub source: String,
    pub strategies: Vec<StrategyKind>,
}

impl HealFile {
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&contents, path)
    }

    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigFileError> {
        let mut file: HealFile = toml::from_str(contents).map_err(|e| ConfigFileError::Toml {
            path: path.to_path_buf(),
            source: e,
        })?;
        if file.resolvers.is_empty() {
            return Err(ConfigFileError::NoResolvers {
                path: path.to_path_buf(),
            });
        }
        file.path = path.to_path_buf();
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        for spec in &mut file.resolvers {
            if let SourceSpec::File { path } = &mut spec.source
                && path.is_relative()
            {
                *path = base_dir.join(&*path);
            }
        }
        debug!(path = %path.display(), resolvers = file.resolvers.len(), "loaded config");
        Ok(file)
    }

    /// Resolvers in file order.
    pub fn build_chain(&self) -> Result<ResolverChain, ConfigFileError> {
        let mut chain = ResolverChain::new();
        for (index, spec) in self.resolvers.iter().enumerate() {
            let name = spec.display_name(index);
            let resolver = spec
                .build(&name)
                .map_err(|source| ConfigFileError::Resolver {
                    path: self.path.clone(),
                    name: name.clone(),
                    source,
                })?;
            chain.push(resolver);
        }
        Ok(chain)
    }

    pub fn build_healer(&self) -> Result<PathHealer, ConfigFileError> {
        let mut healer = PathHealer::new(self.build_chain()?);
        if let Some(prefix) = &self.heal.strip_prefix {
            healer = healer.with_prefix(prefix.as_str());
        }
        if let Some(pattern) = &self.heal.redirect_pattern {
            healer = healer.with_redirect_pattern(pattern.as_str());
        }
        Ok(healer)
    }

    pub fn summaries(&self) -> Vec<ResolverSummary> {
        self.resolvers
            .iter()
            .enumerate()
            .map(|(index, spec)| ResolverSummary {
                name: spec.display_name(index),
                kind: spec.source.kind(),
                source: spec.describe_source(),
                strategies: spec.effective_config().enabled_strategies(),
            })
            .collect()
    }
}

impl ResolverSpec {
    /// The configured name, else the kind (`kind-N` after the first slot).
    pub fn display_name(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None if index == 0 => self.source.kind().to_string(),
            None => format!("{}-{}", self.source.kind(), index + 1),
        }
    }

    pub fn effective_config(&self) -> EngineConfig {
        if let Some(config) = &self.engine {
            return config.clone();
        }
        match self.source {
            SourceSpec::Alias => EngineConfig::lookup_only(),
            SourceSpec::Routes { .. } => RouteResolver::default_config(),
            SourceSpec::Corpus { .. } | SourceSpec::File { .. } => EngineConfig::default(),
        }
    }

    pub fn build(&self, name: &str) -> Result<Box<dyn Resolver>, ConfigError> {
        let config = self.effective_config();
        let source = match &self.source {
            SourceSpec::Routes { routes } => {
                let resolver = RouteResolver::with_config(name, routes, config)?;
                return Ok(Box::new(resolver));
            }
            SourceSpec::Alias => CandidateSource::alias_mapping(self.aliases.clone()),
            SourceSpec::Corpus { candidates } => CandidateSource::static_corpus(candidates),
            SourceSpec::File { path } => CandidateSource::dynamic(Arc::new(FileStore::new(path))),
        };
        let mut builder = Engine::builder(source).name(name).config(config);
        if !matches!(self.source, SourceSpec::Alias) {
            builder = builder.aliases(self.aliases.clone());
        }
        Ok(Box::new(builder.build()?))
    }

    fn describe_source(&self) -> String {
        match &self.source {
            SourceSpec::Alias => count(self.aliases.len(), "alias", "aliases"),
            SourceSpec::Corpus { candidates } => count(candidates.len(), "candidate", "candidates"),
            SourceSpec::File { path } => path.display().to_string(),
            SourceSpec::Routes { routes } => count(routes.len(), "route", "routes"),
        }
    }
}

fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("1 {singular}")
    } else {
        format!("{n} {plural}")
    }
}
