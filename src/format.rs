//! Console formatting helpers for wei amounts and fiat values.

use crate::error::DeployError;
use ethers::{
    types::U256,
    utils::{format_units, ConversionError},
};

/// Formats `amount` in `units` (`"ether"`, `"gwei"`, ...), trimming trailing
/// zeros but keeping at least one fractional digit (`1.0`, `0.015`).
pub fn format_units_trimmed(amount: U256, units: &str) -> Result<String, DeployError> {
    let mut formatted = format_units(amount, units)?;
    if formatted.contains('.') {
        let len = formatted.trim_end_matches('0').len();
        formatted.truncate(len);
        if formatted.ends_with('.') {
            formatted.push('0');
        }
    }
    Ok(formatted)
}

pub fn format_native(wei: U256) -> Result<String, DeployError> {
    format_units_trimmed(wei, "ether")
}

pub fn format_gwei(wei: U256) -> Result<String, DeployError> {
    format_units_trimmed(wei, "gwei")
}

/// Native display units as a float, only for fiat conversion.
pub fn native_display_units(wei: U256) -> Result<f64, DeployError> {
    Ok(format_units(wei, "ether")?
        .parse::<f64>()
        .map_err(ConversionError::from)?)
}

/// Groups digits with `.` the way id-ID locales print rupiah (`1.234.567`).
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}
