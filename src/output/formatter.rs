use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::prices::PricedEntrantRow;
use crate::summary::EventSummaryRow;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit a column, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Circuit column width: full names on wide terminals, truncated on narrow
fn circuit_column_width() -> usize {
    match get_terminal_width() {
        Some(w) if w < 100 => 12,
        _ => 20,
    }
}

/// Format a fantasy-point total with one decimal
pub fn format_fp(fp: f64) -> String {
    format!("{:.1}", fp)
}

/// Format an optional cost; missing prices render as "-"
pub fn format_cost(cost: Option<f64>) -> String {
    match cost {
        Some(c) => format!("{:.1}", c),
        None => "-".to_string(),
    }
}

fn format_finish(finishing_pos: Option<u32>) -> String {
    match finishing_pos {
        Some(p) => p.to_string(),
        None => "-".to_string(),
    }
}

fn podium_slot(slot: &Option<String>) -> &str {
    slot.as_deref().unwrap_or("-")
}

/// Format the per-entrant scored/priced table, one row per driver per event.
/// Raw grid position is shown unchanged (0 stays 0 for pit-lane starts).
pub fn format_scored_table(rows: &[PricedEntrantRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No scored entrants.".to_string();
    }

    let circuit_width = circuit_column_width();
    let header = format!(
        "{:<6}  {:>2}  {:<cw$}  {:<4}  {:<10}  {:>4}  {:>3}  {:>5}  {:>4}  {:>6}  {:>6}  {:>5}  {:>5}",
        "SEASON", "RD", "CIRCUIT", "DRV", "TEAM", "GRID", "FIN", "PTS", "GAIN", "FP", "CFP",
        "$DRV", "$CON",
        cw = circuit_width
    );

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(if use_colors {
        header.dimmed().to_string()
    } else {
        header
    });

    for row in rows {
        let r = &row.scored.result;
        // Pad cells before colorizing: ANSI escapes would otherwise count
        // toward the format width
        let driver_cell = format!("{:<4}", r.driver);
        let fp_cell = format!("{:>6}", format_fp(row.scored.driver_fp));
        let line = format!(
            "{:<6}  {:>2}  {:<cw$}  {}  {:<10}  {:>4}  {:>3}  {:>5.1}  {:>4}  {}  {:>6}  {:>5}  {:>5}",
            r.season,
            r.round,
            truncate_name(&r.circuit, circuit_width),
            if use_colors {
                driver_cell.cyan().to_string()
            } else {
                driver_cell
            },
            truncate_name(&r.constructor, 10),
            r.grid_pos,
            format_finish(r.finishing_pos),
            r.points,
            row.scored.positions_gained,
            if use_colors {
                fp_cell.bold().to_string()
            } else {
                fp_cell
            },
            format_fp(row.scored.constructor_fp),
            format_cost(row.driver_cost),
            format_cost(row.constructor_cost),
            cw = circuit_width
        );
        lines.push(line);
    }

    lines.join("\n")
}

/// Format the per-event prediction summary table
pub fn format_summary_table(rows: &[EventSummaryRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No event summaries.".to_string();
    }

    let circuit_width = circuit_column_width();
    let header = format!(
        "{:<6}  {:>2}  {:<cw$}  {:<4}  {:<4}  {:<4}  {:<4}  {:<4}  {:>2}",
        "SEASON", "RD", "CIRCUIT", "POLE", "P1", "P2", "P3", "FL", "SC",
        cw = circuit_width
    );

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(if use_colors {
        header.dimmed().to_string()
    } else {
        header
    });

    for row in rows {
        lines.push(format!(
            "{:<6}  {:>2}  {:<cw$}  {:<4}  {:<4}  {:<4}  {:<4}  {:<4}  {:>2}",
            row.season,
            row.round,
            truncate_name(&row.circuit, circuit_width),
            row.pole,
            podium_slot(&row.p1),
            podium_slot(&row.p2),
            podium_slot(&row.p3),
            row.fastest_lap,
            row.safety_cars,
            cw = circuit_width
        ));
    }

    lines.join("\n")
}

/// Tab-separated scored table for scripting (no headers, no colors)
pub fn format_scored_tsv(rows: &[PricedEntrantRow]) -> String {
    rows.iter()
        .map(|row| {
            let r = &row.scored.result;
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                r.season,
                r.round,
                r.circuit,
                r.driver,
                r.constructor,
                r.grid_pos,
                format_finish(r.finishing_pos),
                r.points,
                row.scored.positions_gained,
                format_fp(row.scored.driver_fp),
                format_fp(row.scored.constructor_fp),
                format_cost(row.driver_cost),
                format_cost(row.constructor_cost),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tab-separated summary table for scripting (no headers, no colors)
pub fn format_summary_tsv(rows: &[EventSummaryRow]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                row.season,
                row.round,
                row.circuit,
                row.pole,
                podium_slot(&row.p1),
                podium_slot(&row.p2),
                podium_slot(&row.p3),
                row.fastest_lap,
                row.safety_cars,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
