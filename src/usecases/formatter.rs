//! Table Formatter - Markdown Rendering of Aggregated Results
//!
//! Pure function of its input. Renders a column-aligned markdown table
//! (platform, question, odds, volume), then a warnings section and a
//! one-line source summary.

use std::fmt::Write as _;

use crate::domain::display::{format_odds, format_volume, truncate_text};
use crate::domain::{AggregatedResult, UnifiedMarket};

/// Longest question shown in a table cell.
pub const QUESTION_WIDTH: usize = 60;

const HEADERS: [&str; 4] = ["Platform", "Question", "Odds", "Volume"];

/// Render a full aggregated result: table, warnings and source summary.
pub fn render_result(result: &AggregatedResult) -> String {
  let mut out = if result.markets.is_empty() {
    format!("No markets found for \"{}\".\n", result.meta.query)
  } else {
    format_table(&result.markets)
  };

  if !result.meta.warnings.is_empty() {
    out.push_str("\n**Warnings:**\n");
    for warning in &result.meta.warnings {
      let _ = writeln!(out, "- {warning}");
    }
  }

  let sources = result.successful_platforms();
  let summary = if sources.is_empty() {
    "none".to_string()
  } else {
    sources
      .iter()
      .map(|(platform, count)| format!("{platform} ({count})"))
      .collect::<Vec<_>>()
      .join(", ")
  };
  let _ = writeln!(out, "\nSources: {summary}");

  out
}

/// Render markets as a column-aligned markdown table.
pub fn format_table(markets: &[UnifiedMarket]) -> String {
  let rows: Vec<[String; 4]> = markets
    .iter()
    .map(|m| {
      [
        m.platform.to_string(),
        truncate_text(&m.question, QUESTION_WIDTH).replace('|', "\\|"),
        format_odds(m.odds),
        format_volume(m.volume),
      ]
    })
    .collect();

  let mut widths = HEADERS.map(|h| h.chars().count());
  for row in &rows {
    for (width, cell) in widths.iter_mut().zip(row) {
      *width = (*width).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  push_row(&mut out, &HEADERS.map(str::to_string), &widths);
  let rule = widths.map(|w| "-".repeat(w));
  push_row(&mut out, &rule, &widths);
  for row in &rows {
    push_row(&mut out, row, &widths);
  }
  out
}

fn push_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
  out.push('|');
  for (cell, width) in cells.iter().zip(widths) {
    let pad = width.saturating_sub(cell.chars().count());
    let _ = write!(out, " {cell}{} |", " ".repeat(pad));
  }
  out.push('\n');
}
