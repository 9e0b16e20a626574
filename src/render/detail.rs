//! Detail view for the selected bond.
//!
//! DESIGN
//! ======
//! The polling variant reads its headline numbers from today's computed
//! result; the push variant reads them from the newest reading it has, live
//! feed first. Missing numbers render as placeholders instead of failing.

#[cfg(test)]
#[path = "detail_test.rs"]
mod detail_test;

use std::fmt::Write;

use super::chart;
use crate::config::Variant;
use crate::net::types::{AuditEntry, AuditSummary, Bond, PenaltySummary, Verdict};
use crate::state::detail::{DetailState, FeedStatus, Selection};

const PENDING: &str = "PENDING";

/// Inputs the detail view needs beyond the detail state itself.
#[derive(Clone, Copy, Debug)]
pub struct DetailContext {
    pub variant: Variant,
    pub logged_today: bool,
}

#[must_use]
pub fn detail_view(detail: &DetailState, ctx: DetailContext) -> String {
    let Some(selection) = detail.selection.as_ref() else {
        return "  No asset selected\n".to_owned();
    };
    let bond = &selection.bond;

    let (pr, verdict, theoretical_max) = match ctx.variant {
        Variant::Polling => {
            let today = detail.today.as_ref();
            (
                today.and_then(|t| t.performance_ratio),
                today.and_then(|t| t.verdict.as_ref()),
                today.and_then(|t| t.theoretical_max_kwh),
            )
        }
        Variant::Push => {
            let latest = detail.latest_entry();
            (
                latest.map(|e| e.performance_ratio),
                latest.map(|e| &e.verdict),
                latest.and_then(|e| e.theoretical_max_kwh),
            )
        }
    };

    let series: Vec<AuditEntry> = detail
        .history
        .iter()
        .chain(selection.live_feed.iter())
        .cloned()
        .collect();

    let mut out = String::new();
    out.push_str(&node_panel(bond));
    out.push_str(&performance_panel(pr, verdict));
    out.push_str(&theoretical_panel(theoretical_max, bond));
    out.push('\n');

    out.push_str("Performance_Archive\n");
    out.push_str(&chart::pr_chart(&series, bond.threshold));
    out.push('\n');

    out.push_str("Audit_Ledger\n");
    out.push_str(&ledger(&series));
    if !detail.summary.is_empty() {
        out.push_str(&summary_line(&detail.summary));
    }
    if let Some(penalties) = &detail.penalties {
        out.push('\n');
        out.push_str(&penalty_section(penalties));
    }
    if ctx.variant == Variant::Push {
        out.push('\n');
        out.push_str(&live_section(selection, detail.feed_status, ctx.logged_today));
    }
    out
}

// =============================================================================
// PANELS
// =============================================================================

fn node_panel(bond: &Bond) -> String {
    let mut out = String::new();
    out.push_str("Verified Node\n");
    let _ = writeln!(out, "  {}", bond.name);
    if let Some(address) = &bond.contract_address {
        let _ = writeln!(out, "  Contract {address}");
    }
    out
}

fn performance_panel(pr: Option<f64>, verdict: Option<&Verdict>) -> String {
    let verdict = verdict.map_or(PENDING, Verdict::label);
    format!("Daily Performance    {}  [{verdict}]\n", format_pr(pr))
}

fn theoretical_panel(theoretical_max: Option<f64>, bond: &Bond) -> String {
    format!(
        "GHI Theoretical Max  {}  LOC: {}, {}\n",
        format_kwh(theoretical_max),
        bond.lat,
        bond.lon
    )
}

pub(crate) fn format_pr(pr: Option<f64>) -> String {
    match pr {
        Some(value) if value.is_finite() => format!("{value:.1}%"),
        _ => "--%".to_owned(),
    }
}

pub(crate) fn format_kwh(kwh: Option<f64>) -> String {
    match kwh {
        Some(value) if value.is_finite() => format!("{value:.2} kWh"),
        _ => "0.00 kWh".to_owned(),
    }
}

// =============================================================================
// LEDGER
// =============================================================================

/// Audit rows, newest first.
#[must_use]
pub fn ledger(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "  (empty)\n".to_owned();
    }
    let mut out = String::new();
    let _ = writeln!(out, "  {:<12}{:>8}  {:<14}{}", "Time", "PR", "Verdict", "Tx");
    for entry in entries.iter().rev() {
        let mut verdict = entry.verdict.label().to_owned();
        if let Some(flag) = &entry.flag {
            let _ = write!(verdict, " ({flag})");
        }
        let _ = writeln!(
            out,
            "  {:<12}{:>8}  {:<14}{}",
            entry.date,
            format_pr(Some(entry.performance_ratio)),
            verdict,
            entry.tx_link.as_deref().unwrap_or("-"),
        );
    }
    out
}

fn summary_line(summary: &AuditSummary) -> String {
    let mut parts = Vec::new();
    if let Some(period) = &summary.period {
        parts.push(period.clone());
    } else if let (Some(start), Some(end)) = (&summary.start_date, &summary.end_date) {
        parts.push(format!("{start} .. {end}"));
    }
    match (summary.compliant_days, summary.total_days) {
        (Some(compliant), Some(total)) => parts.push(format!("{compliant}/{total} days compliant")),
        (None, Some(total)) => parts.push(format!("{total} days")),
        _ => {}
    }
    if let Some(penalty_days) = summary.penalty_days {
        parts.push(format!("{penalty_days} penalty days"));
    }
    if let Some(threshold) = summary.threshold {
        parts.push(format!("floor {threshold}%"));
    }
    format!("  Summary: {}\n", parts.join(" | "))
}

fn penalty_section(penalties: &PenaltySummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Penalty_Summary  {}/{} days ({:.1}%)",
        penalties.penalty_days, penalties.total_days, penalties.penalty_rate
    );
    for event in &penalties.events {
        let _ = writeln!(
            out,
            "  {:<12}{:>8}  shortfall {:.2} kWh of {:.2} kWh",
            event.date,
            format_pr(Some(event.pr)),
            event.shortfall,
            event.theoretical_max
        );
    }
    out
}

// =============================================================================
// LIVE FEED
// =============================================================================

fn live_section(selection: &Selection, status: FeedStatus, logged_today: bool) -> String {
    let status = match status {
        FeedStatus::Idle => "IDLE",
        FeedStatus::Live => "LIVE",
        FeedStatus::Offline => "OFFLINE",
    };
    let mut out = String::new();
    let _ = writeln!(out, "Live_Feed  [{status}]  {} readings", selection.live_feed.len());
    for entry in selection.live_feed.iter().rev().take(5) {
        let _ = writeln!(out, "  {:<12}{:>8}  {}", entry.date, format_pr(Some(entry.performance_ratio)), entry.verdict.label());
    }
    if logged_today {
        out.push_str("  Proof submitted for today\n");
    } else {
        out.push_str("  Manual log open: `log <kWh>`\n");
    }
    out
}
