//! Normalization adapter from backend JSON to canonical types.
//!
//! DESIGN
//! ======
//! Every response passes through exactly one function here before it reaches
//! state. The functions are lenient on field presence and numeric encoding
//! (numbers and numeric strings are both accepted) and strict only where a
//! value cannot be recovered, such as a bond row without an id.

#[cfg(test)]
#[path = "normalize_test.rs"]
mod normalize_test;

use serde_json::Value;

use super::types::{
    ApiError, AuditEntry, AuditLog, AuditSummary, Bond, ORACLE_UPDATE, PenaltyEvent, PenaltySummary, PushMessage,
    TodayResult, Verdict,
};

// =============================================================================
// FIELD HELPERS
// =============================================================================

/// Coerce a JSON number or numeric string into a finite `f64`.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn pick_number(row: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| row.get(*key).and_then(number))
}

fn pick_str<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| row.get(*key).and_then(Value::as_str))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pick_count(row: &Value, key: &str) -> Option<u64> {
    let value = row.get(key)?;
    value.as_u64().or_else(|| {
        number(value)
            .filter(|n| *n >= 0.0 && n.fract() == 0.0)
            .map(|n| n as u64)
    })
}

fn pick_string(row: &Value, key: &str) -> Option<String> {
    pick_str(row, &[key]).map(str::to_owned)
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn verdict(row: &Value) -> Option<Verdict> {
    pick_str(row, &["verdict", "status"]).map(Verdict::from_label)
}

// =============================================================================
// BONDS
// =============================================================================

/// Normalize the asset listing.
///
/// Accepts a bare array or an object carrying a `bonds` array; an object
/// without one yields an empty list. Rows without an id are dropped.
///
/// # Errors
///
/// Returns [`ApiError::Shape`] when the body is neither an array nor an object.
pub fn bond_list(value: &Value) -> Result<Vec<Bond>, ApiError> {
    let rows = match value {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(map) => match map.get("bonds") {
            Some(Value::Array(rows)) => rows.as_slice(),
            _ => &[][..],
        },
        other => return Err(ApiError::Shape(format!("expected bond list, got {}", kind_name(other)))),
    };

    Ok(rows
        .iter()
        .filter_map(|row| {
            let parsed = bond(row);
            if parsed.is_none() {
                tracing::debug!(%row, "dropping bond row without id");
            }
            parsed
        })
        .collect())
}

/// Normalize a single bond row.
#[must_use]
pub fn bond(row: &Value) -> Option<Bond> {
    if !row.is_object() {
        return None;
    }
    let id = row.get("id").and_then(id_string)?;
    Some(Bond {
        id,
        name: pick_string(row, "name").unwrap_or_default(),
        lat: pick_number(row, &["lat", "latitude"]).unwrap_or(0.0),
        lon: pick_number(row, &["lon", "lng", "longitude"]).unwrap_or(0.0),
        capacity_kw: pick_number(row, &["capacity_kw"]).unwrap_or(0.0),
        threshold: pick_number(row, &["threshold"]).unwrap_or(0.0),
        interest_rate: pick_number(row, &["interest_rate"]),
        contract_address: pick_string(row, "contract_address"),
    })
}

// =============================================================================
// AUDIT LOG
// =============================================================================

/// Normalize an audit response (`{audit_log: [...], ...}` or a bare array).
///
/// Ratios are coerced to numbers; a ratio that cannot be read becomes `0.0`.
#[must_use]
pub fn audit_log(value: &Value) -> AuditLog {
    let rows = match value {
        Value::Array(rows) => rows.as_slice(),
        _ => value
            .get("audit_log")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
    };

    let entries = rows.iter().filter_map(audit_entry).collect();
    let summary = AuditSummary {
        period: pick_string(value, "period"),
        start_date: pick_string(value, "start_date"),
        end_date: pick_string(value, "end_date"),
        total_days: pick_count(value, "total_days"),
        compliant_days: pick_count(value, "compliant_days"),
        penalty_days: pick_count(value, "penalty_days"),
        threshold: pick_number(value, &["threshold"]),
    };
    AuditLog { entries, summary }
}

/// Normalize one audit row. Non-object rows are dropped.
#[must_use]
pub fn audit_entry(row: &Value) -> Option<AuditEntry> {
    if !row.is_object() {
        return None;
    }
    Some(AuditEntry {
        date: pick_string(row, "date").unwrap_or_default(),
        performance_ratio: pick_number(row, &["performance_ratio", "pr"]).unwrap_or(0.0),
        verdict: verdict(row).unwrap_or_default(),
        tx_link: pick_string(row, "tx_link"),
        actual_energy_kwh: pick_number(row, &["actual_energy_kwh"]),
        theoretical_max_kwh: pick_number(row, &["theoretical_max_kwh"]),
        ghi: pick_number(row, &["ghi"]),
        flag: pick_string(row, "flag"),
    })
}

/// Stable ascending sort by calendar date.
///
/// ISO `YYYY-MM-DD` strings order correctly as text.
pub fn sort_by_date(entries: &mut [AuditEntry]) {
    entries.sort_by(|a, b| a.date.cmp(&b.date));
}

// =============================================================================
// TODAY + PENALTIES
// =============================================================================

/// Normalize today's computed result. Missing fields stay `None`.
#[must_use]
pub fn today_result(value: &Value) -> TodayResult {
    TodayResult {
        date: pick_string(value, "date"),
        performance_ratio: pick_number(value, &["performance_ratio"]),
        theoretical_max_kwh: pick_number(value, &["theoretical_max_kwh"]),
        verdict: verdict(value),
        actual_energy_kwh: pick_number(value, &["actual_energy_kwh"]),
        ghi: pick_number(value, &["ghi"]),
        flag: pick_string(value, "flag"),
    }
}

/// Normalize the penalty-summary report.
#[must_use]
pub fn penalty_summary(value: &Value) -> PenaltySummary {
    let events = value
        .get("penalty_events")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter(|row| row.is_object())
                .map(|row| {
                    let actual_energy = pick_number(row, &["actual_energy"]).unwrap_or(0.0);
                    let theoretical_max = pick_number(row, &["theoretical_max"]).unwrap_or(0.0);
                    PenaltyEvent {
                        date: pick_string(row, "date").unwrap_or_default(),
                        pr: pick_number(row, &["pr", "performance_ratio"]).unwrap_or(0.0),
                        actual_energy,
                        theoretical_max,
                        shortfall: pick_number(row, &["shortfall"]).unwrap_or(theoretical_max - actual_energy),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    PenaltySummary {
        total_days: pick_count(value, "total_days").unwrap_or(0),
        penalty_days: pick_count(value, "penalty_days").unwrap_or(0),
        penalty_rate: pick_number(value, &["penalty_rate"]).unwrap_or(0.0),
        events,
    }
}

// =============================================================================
// PUSH FEED
// =============================================================================

/// Decode one websocket text frame.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] for non-JSON text and [`ApiError::Shape`] when
/// an `ORACLE_UPDATE` frame carries no usable `data` object.
pub fn push_message(text: &str) -> Result<PushMessage, ApiError> {
    let value: Value = serde_json::from_str(text)?;
    let kind = value.get("type").and_then(Value::as_str).unwrap_or_default();
    if kind != ORACLE_UPDATE {
        return Ok(PushMessage::Unrecognized(kind.to_owned()));
    }
    value
        .get("data")
        .and_then(audit_entry)
        .map(PushMessage::OracleUpdate)
        .ok_or_else(|| ApiError::Shape("ORACLE_UPDATE without data object".to_owned()))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
