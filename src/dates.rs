use chrono::{DateTime, Days, Local, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a stored date. Accepts `YYYY-MM-DD` and RFC 3339 date-times
/// (truncated to their date). Anything else is treated as absent.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(dt) => Some(dt.date_naive()),
        Err(_) => {
            log::debug!("ignoring invalid date '{trimmed}'");
            None
        }
    }
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Move a date by whole calendar days (negative goes back). Shifts past the
/// representable range stop at `NaiveDate::MIN` / `NaiveDate::MAX`.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let step = Days::new(days.unsigned_abs());
    if days < 0 {
        date.checked_sub_days(step).unwrap_or(NaiveDate::MIN)
    } else {
        date.checked_add_days(step).unwrap_or(NaiveDate::MAX)
    }
}

/// Inclusive day count between two dates: the same day counts as 1.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Whole calendar days a task occupies for a given effort.
/// Absent or non-positive effort counts as one day; fractions round up.
/// Spans longer than the whole calendar are capped to it.
pub fn span_days(effort: Option<f64>) -> i64 {
    let widest = inclusive_day_count(NaiveDate::MIN, NaiveDate::MAX);
    match effort {
        Some(value) if value.is_finite() && value > 0.0 => {
            (value.ceil() as i64).clamp(1, widest)
        }
        _ => 1,
    }
}

/// Serde helper: an optional date where malformed values become `None`.
pub(crate) fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

/// Serde helper: an optional effort where negative, non-finite or
/// non-numeric values become `None`.
pub(crate) fn deserialize_lenient_effort<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    let value = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.filter(|v| v.is_finite() && *v >= 0.0))
}
