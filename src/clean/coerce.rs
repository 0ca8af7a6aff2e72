//! Cell-level coercions. None of these fail: bad input maps to a state.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// A numeric cell before the invalid-value policy is applied.
///
/// Zero is a `Value`; only empty and unparseable cells are set apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric<T> {
    Value(T),
    Missing,
    Invalid,
}

/// Largest accepted unit count (2^53 - 1), exact in f64 and in the page's JS.
pub const MAX_QUANTITY: u64 = (1 << 53) - 1;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a unit count. Accepts integers and integral decimals ("5.0") up to
/// `MAX_QUANTITY`.
pub fn parse_quantity(raw: &str) -> Numeric<u64> {
    let s = raw.trim();
    if s.is_empty() {
        return Numeric::Missing;
    }
    if let Ok(v) = s.parse::<u64>() {
        return if v <= MAX_QUANTITY {
            Numeric::Value(v)
        } else {
            Numeric::Invalid
        };
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= MAX_QUANTITY as f64 => {
            Numeric::Value(v as u64)
        }
        _ => Numeric::Invalid,
    }
}

/// Parse a non-negative monetary amount.
pub fn parse_price(raw: &str) -> Numeric<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Numeric::Missing;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Numeric::Value(v),
        _ => Numeric::Invalid,
    }
}

/// Parse a sale date; a time-of-day component is discarded.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
///
/// "phone x" -> "Phone X", "IPHONE 14pro" -> "Iphone 14Pro".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
