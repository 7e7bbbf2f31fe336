use std::path::Path;

use anyhow::{Context, Result, bail};
use selfheal_cli::config::{HealFile, SourceSpec};
use selfheal_cli::render::{
    explanation_text, format_confidence, redirect_table, resolution_table, resolver_table,
};
use selfheal_cli::store::FileStore;
use selfheal_core::{Redirect, Resolution, SlugStore};
use tracing::{info, info_span, warn};

use crate::cli::{ExplainArgs, HealArgs, OutputArg, ResolveArgs};

/// Whether every input produced an answer.
pub type AllMatched = bool;

fn load(config: &Path) -> Result<HealFile> {
    let file = HealFile::load(config)?;
    info!(
        path = %config.display(),
        resolvers = file.resolvers.len(),
        "loaded resolver config"
    );
    Ok(file)
}

pub fn run_resolve(config: &Path, args: &ResolveArgs) -> Result<AllMatched> {
    let chain = load(config)?.build_chain()?;
    let mut rows: Vec<(String, Option<Resolution>)> = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let span = info_span!("resolve", input = %input);
        let _guard = span.enter();
        let resolution = chain
            .resolve(input)
            .with_context(|| format!("resolve '{input}'"))?;
        rows.push((input.clone(), resolution));
    }

    match args.output {
        OutputArg::Table => println!("{}", resolution_table(&rows)),
        OutputArg::Plain => {
            for (input, resolution) in &rows {
                match resolution {
                    Some(r) => println!(
                        "{input}\t{}\t{}\t{}\t{}",
                        r.key,
                        r.strategy,
                        format_confidence(r.confidence),
                        r.resolver
                    ),
                    None => println!("{input}\t-"),
                }
            }
        }
        OutputArg::Json => {
            let json: Vec<_> = rows
                .iter()
                .map(|(input, resolution)| {
                    serde_json::json!({ "input": input, "resolution": resolution })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(rows.iter().all(|(_, resolution)| resolution.is_some()))
}

pub fn run_explain(config: &Path, args: &ExplainArgs) -> Result<AllMatched> {
    let chain = load(config)?.build_chain()?;
    let explanations = chain
        .explain(&args.input)
        .with_context(|| format!("explain '{}'", args.input))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&explanations)?);
    } else {
        println!("{}", explanation_text(&args.input, &explanations));
    }
    Ok(explanations.iter().any(|e| e.resolution.is_some()))
}

pub fn run_heal(config: &Path, args: &HealArgs) -> Result<AllMatched> {
    let healer = load(config)?.build_healer()?;
    let mut rows: Vec<(String, Option<Redirect>)> = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        let redirect = healer
            .heal(path)
            .with_context(|| format!("heal '{path}'"))?;
        rows.push((path.clone(), redirect));
    }

    match args.output {
        OutputArg::Table => println!("{}", redirect_table(&rows)),
        OutputArg::Plain => {
            for (path, redirect) in &rows {
                match redirect {
                    Some(redirect) => println!("{path}\t{}", redirect.location),
                    None => println!("{path}\t-"),
                }
            }
        }
        OutputArg::Json => {
            let json: Vec<_> = rows
                .iter()
                .map(|(path, redirect)| serde_json::json!({ "path": path, "redirect": redirect }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(rows.iter().all(|(_, redirect)| redirect.is_some()))
}

/// Builds every resolver (compiling rules) and reads every slug file once.
pub fn run_check(config: &Path) -> Result<()> {
    let file = load(config)?;
    let chain = file.build_chain()?;
    println!("{}", resolver_table(&file.summaries()));

    let mut unreadable = 0usize;
    for spec in &file.resolvers {
        let SourceSpec::File { path } = &spec.source else {
            continue;
        };
        match FileStore::new(path).slugs() {
            Ok(slugs) => println!("{}: {} slugs", path.display(), slugs.len()),
            Err(error) => {
                warn!(path = %path.display(), error = %error, "slug file unreadable");
                eprintln!("error: {error}");
                unreadable += 1;
            }
        }
    }
    if unreadable > 0 {
        bail!("{unreadable} slug file(s) could not be read");
    }
    info!(resolvers = chain.len(), "config ok");
    Ok(())
}
