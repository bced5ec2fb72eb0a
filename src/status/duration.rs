//! Status duration parsing.
//!
//! Accepts Go-style spans such as `90m`, `1h30m`, `1.5h` or `45m30s`. Units are
//! `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. The result is truncated to whole minutes
//! and must be at least one minute.

use crate::error::ApiError;

const UNITS: &[(&str, f64)] = &[
    ("ns", 1e-9),
    ("us", 1e-6),
    ("µs", 1e-6),
    ("μs", 1e-6),
    ("ms", 1e-3),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
];

/// Parse a span into seconds.
pub fn parse_span_seconds(input: &str) -> Result<f64, ApiError> {
    let invalid = || ApiError::InvalidInput(format!("failed to parse duration string: {}", input));

    let mut rest = input.trim();
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(0.0);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total = 0.0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        if number.is_empty() || number == "." {
            return Err(invalid());
        }
        let value: f64 = number.parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| {
                if unit.is_empty() {
                    ApiError::InvalidInput(format!("missing unit in duration: {}", input))
                } else {
                    ApiError::InvalidInput(format!("unknown unit '{}' in duration: {}", unit, input))
                }
            })?;
        total += value * scale;
        rest = &rest[unit_len..];
    }

    Ok(if negative { -total } else { total })
}

/// Parse an optional duration flag into whole minutes. Absent or empty means 0 (no expiry).
pub fn parse_duration_minutes(input: Option<&str>) -> Result<u32, ApiError> {
    let Some(raw) = input.filter(|s| !s.trim().is_empty()) else {
        return Ok(0);
    };

    let seconds = parse_span_seconds(raw)?;
    let minutes = seconds / 60.0;
    if minutes < 1.0 {
        return Err(ApiError::InvalidInput(format!(
            "duration needs to be at least 1 minute not: {:.6} minute(s)",
            minutes
        )));
    }
    if minutes > f64::from(u32::MAX) {
        return Err(ApiError::InvalidInput(format!("duration is too long: {}", raw)));
    }
    Ok(minutes.floor() as u32)
}
