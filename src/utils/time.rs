//! Time parsing and formatting utilities

use crate::domain::errors::DomainError;

/// Parse `SS(.mmm)`, `MM:SS(.mmm)` or `HH:MM:SS(.mmm)` into seconds.
///
/// An empty string parses to `0.0`; callers treat that as "unset".
pub fn parse_time(text: &str) -> Result<f64, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0.0);
    }

    let invalid = || DomainError::InvalidTimeFormat(text.to_string());
    let parts = text
        .split(':')
        .map(|part| {
            let part = part.trim();
            match part.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(invalid()),
            }
        })
        .collect::<Result<Vec<f64>, DomainError>>()?;

    match parts.as_slice() {
        [seconds] => Ok(*seconds),
        [minutes, seconds] => Ok(minutes * 60.0 + seconds),
        [hours, minutes, seconds] => Ok(hours * 3600.0 + minutes * 60.0 + seconds),
        _ => Err(invalid()),
    }
}

/// Format seconds as `MM:SS.mmm`, or `HH:MM:SS.mmm` from one hour up.
///
/// Negative input is clamped to zero. The value is rounded to whole milliseconds
/// before splitting so fields never show `60.000`.
pub fn format_seconds(value: f64) -> String {
    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    let total_ms = (value * 1000.0).round() as u64;

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let milliseconds = total_ms % 1000;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
    } else {
        format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
    }
}
