//! Display formatting shared by the chart transformer and the presentation layer

use crate::types::CurrencyCode;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Direction of a 24h price move, used to pick the row color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    Up,
    Down,
}

/// Uppercases the first character of an asset id ("bitcoin" -> "Bitcoin")
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// True if `format` is a chrono strftime string without unknown specifiers
pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Formats a millisecond timestamp as a UTC calendar date
///
/// Timestamps chrono cannot represent, or a format chrono rejects, fall back
/// to the raw millisecond value.
pub fn date_label(timestamp_millis: i64, format: &str) -> String {
    let Some(dt) = DateTime::<Utc>::from_timestamp_millis(timestamp_millis) else {
        return timestamp_millis.to_string();
    };

    let mut label = String::new();
    match write!(label, "{}", dt.format(format)) {
        Ok(()) => label,
        Err(_) => timestamp_millis.to_string(),
    }
}

/// Chart title for an asset quoted in a currency, e.g. "Bitcoin (USD)"
pub fn series_title(display_name: &str, currency: CurrencyCode) -> String {
    format!("{} ({})", display_name, currency.code())
}

/// Price with two decimals, e.g. "64250.10"
pub fn price(value: f64) -> String {
    format!("{:.2}", value)
}

/// 24h change with two decimals and a percent sign, e.g. "-1.25%"
pub fn change_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Only strictly positive changes count as up
pub fn change_direction(value: f64) -> ChangeDirection {
    if value > 0.0 {
        ChangeDirection::Up
    } else {
        ChangeDirection::Down
    }
}
