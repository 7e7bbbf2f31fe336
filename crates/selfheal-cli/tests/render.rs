use std::path::Path;

use selfheal_cli::config::HealFile;
use selfheal_cli::render::explanation_text;

const SITE: &str = r#"
[[resolvers]]
kind = "alias"
aliases = { "old-hello" = "hello-world" }

[[resolvers]]
name = "routes"
kind = "routes"
routes = ["/hello-world", "/world-hello", "/flask-basics", "/product/<slug>"]
"#;

#[test]
fn explain_trace_for_route_typo() {
    let file = HealFile::parse(SITE, Path::new("selfheal.toml")).unwrap();
    let chain = file.build_chain().unwrap();
    let explanations = chain.explain("hello-worl").unwrap();
    let text = explanation_text("hello-worl", &explanations);
    insta::assert_snapshot!("explain_route_typo", text);
}

#[test]
fn explain_trace_without_match_ends_in_no_match() {
    let file = HealFile::parse(SITE, Path::new("selfheal.toml")).unwrap();
    let chain = file.build_chain().unwrap();
    let explanations = chain.explain("not-found").unwrap();
    assert_eq!(explanations.len(), 2);
    let text = explanation_text("not-found", &explanations);
    assert!(text.ends_with("result: no match"));
}

#[test]
fn explain_trace_for_blank_input() {
    let file = HealFile::parse(SITE, Path::new("selfheal.toml")).unwrap();
    let explanations = file.build_chain().unwrap().explain(" -- ").unwrap();
    let text = explanation_text(" -- ", &explanations);
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines.len(), 6, "{text}");
    assert_eq!(lines[0], r#"input: " -- ""#);
    assert!(lines[1].starts_with("resolver "));
    assert_eq!(lines[2], "  nothing to match after normalization");
    assert_eq!(lines[4], "  nothing to match after normalization");
    assert_eq!(lines[5], "result: no match");
}
