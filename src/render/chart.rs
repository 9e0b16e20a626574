//! Text area chart of performance ratio over time.
//!
//! DESIGN
//! ======
//! The Y axis is fixed to the 0-100 percent domain and every value is clamped
//! into it. Each reading is one column filled with `#` from the baseline up
//! to its level. The threshold row is drawn as a dashed reference line in
//! the cells the area does not cover.

#[cfg(test)]
#[path = "chart_test.rs"]
mod chart_test;

use std::fmt::Write;

use crate::net::types::AuditEntry;

pub const CHART_HEIGHT: usize = 10;
/// Only the most recent readings are drawn.
pub const CHART_MAX_POINTS: usize = 60;

const FILL: char = '#';
const REFERENCE: char = '-';
const LABEL_WIDTH: usize = 3;

/// Chart the `performance_ratio` of `entries` in order, with dates under the
/// first and last columns.
#[must_use]
pub fn pr_chart(entries: &[AuditEntry], threshold: f64) -> String {
    let start = entries.len().saturating_sub(CHART_MAX_POINTS);
    let shown = &entries[start..];
    let values: Vec<f64> = shown.iter().map(|entry| entry.performance_ratio).collect();
    let mut out = area_chart(&values, threshold, CHART_HEIGHT);

    if let (Some(first), Some(last)) = (shown.first(), shown.last()) {
        let indent = " ".repeat(LABEL_WIDTH + 2);
        if shown.len() == 1 {
            let _ = writeln!(out, "{indent}{}", first.date);
        } else {
            let gap = shown.len().saturating_sub(first.date.len() + last.date.len()).max(1);
            let _ = writeln!(out, "{indent}{}{}{}", first.date, " ".repeat(gap), last.date);
        }
    }
    out
}

/// Draw `values` as a filled area `height` rows tall.
#[must_use]
pub fn area_chart(values: &[f64], threshold: f64, height: usize) -> String {
    if values.is_empty() {
        return "  (no readings)\n".to_owned();
    }
    let height = height.max(1);
    let levels: Vec<usize> = values.iter().map(|value| level(*value, height)).collect();
    let reference_row = threshold_row(threshold, height);

    let mut out = String::new();
    for row in (0..height).rev() {
        out.push_str(&row_label(row, height, reference_row, threshold));
        out.push_str(" |");
        for filled in &levels {
            let cell = if *filled > row {
                FILL
            } else if row == reference_row {
                REFERENCE
            } else {
                ' '
            };
            out.push(cell);
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{:>LABEL_WIDTH$} +{}", 0, "-".repeat(levels.len()));
    out
}

/// Number of filled rows for a percent value.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn level(value: f64, height: usize) -> usize {
    let clamped = if value.is_finite() { value.clamp(0.0, 100.0) } else { 0.0 };
    (clamped / 100.0 * height as f64).round() as usize
}

/// Row the threshold line sits on, counted from the baseline.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub(crate) fn threshold_row(threshold: f64, height: usize) -> usize {
    let clamped = if threshold.is_finite() { threshold.clamp(0.0, 100.0) } else { 0.0 };
    let row = (clamped / 100.0 * height as f64).floor() as usize;
    row.min(height.saturating_sub(1))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn row_label(row: usize, height: usize, reference_row: usize, threshold: f64) -> String {
    if row == height - 1 {
        format!("{:>LABEL_WIDTH$}", 100)
    } else if row == reference_row {
        format!("{:>LABEL_WIDTH$}", threshold.clamp(0.0, 100.0).round() as u32)
    } else {
        " ".repeat(LABEL_WIDTH)
    }
}
