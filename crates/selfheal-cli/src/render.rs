//! Terminal output: comfy tables for humans, plain text for explain.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use selfheal_core::{Explanation, Redirect, Resolution, StepOutcome, StrategyKind};

use crate::config::ResolverSummary;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// One row per input; unresolved inputs show dashes.
pub fn resolution_table(rows: &[(String, Option<Resolution>)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Input"),
        header_cell("Key"),
        header_cell("Strategy"),
        header_cell("Confidence"),
        header_cell("Resolver"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for (input, resolution) in rows {
        match resolution {
            Some(resolution) => table.add_row(vec![
                Cell::new(input),
                Cell::new(&resolution.key)
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
                Cell::new(resolution.strategy),
                Cell::new(format_confidence(resolution.confidence)),
                Cell::new(&resolution.resolver),
            ]),
            None => table.add_row(vec![
                Cell::new(input),
                Cell::new("no match").fg(Color::Red),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
            ]),
        };
    }
    table
}

pub fn redirect_table(rows: &[(String, Option<Redirect>)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Path"),
        header_cell("Location"),
        header_cell("Strategy"),
        header_cell("Resolver"),
    ]);
    apply_table_style(&mut table);
    for (path, redirect) in rows {
        match redirect {
            Some(redirect) => table.add_row(vec![
                Cell::new(path),
                Cell::new(&redirect.location).fg(Color::Green),
                Cell::new(redirect.resolution.strategy),
                Cell::new(&redirect.resolution.resolver),
            ]),
            None => table.add_row(vec![
                Cell::new(path),
                Cell::new("404").fg(Color::Red),
                dim_cell("-"),
                dim_cell("-"),
            ]),
        };
    }
    table
}

pub fn resolver_table(summaries: &[ResolverSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Resolver"),
        header_cell("Kind"),
        header_cell("Source"),
        header_cell("Strategies"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, summary) in summaries.iter().enumerate() {
        let strategies = summary
            .strategies
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(&summary.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(summary.kind),
            Cell::new(&summary.source),
            Cell::new(strategies),
        ]);
    }
    table
}

/// Uncolored trace of each resolver tried, in the order they ran.
pub fn explanation_text(input: &str, explanations: &[Explanation]) -> String {
    let width = StrategyKind::ORDER
        .iter()
        .map(|kind| kind.as_str().len())
        .max()
        .unwrap_or_default();
    let mut lines = vec![format!("input: {input:?}")];
    for explanation in explanations {
        lines.push(format!(
            "resolver {} (normalized {:?})",
            explanation.resolver, explanation.normalized
        ));
        if explanation.steps.is_empty() {
            lines.push("  nothing to match after normalization".to_string());
        }
        for step in &explanation.steps {
            let outcome = match &step.outcome {
                StepOutcome::Disabled => "disabled".to_string(),
                StepOutcome::Missed => "missed".to_string(),
                StepOutcome::Matched { key, confidence } => {
                    format!("matched {key} ({})", format_confidence(*confidence))
                }
            };
            lines.push(format!("  {:<width$}  {outcome}", step.strategy.as_str()));
        }
    }
    lines.push(
        match explanations.iter().find_map(|e| e.resolution.as_ref()) {
            Some(resolution) => format!(
                "result: {} via {} from {}",
                resolution.key, resolution.strategy, resolution.resolver
            ),
            None => "result: no match".to_string(),
        },
    );
    lines.join("\n")
}

pub fn format_confidence(confidence: f64) -> String {
    format!("{confidence:.3}")
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
