//! Parsing utilities for CLI arguments.

use crate::error::{CasperError, Result};
use crate::protocol::{PowerProfile, Zone};

/// Parse a hex color string into RGB components.
///
/// Accepts formats: `#RRGGBB` or `RRGGBB`.
pub fn parse_hex_color(hex: &str) -> Result<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Err(CasperError::InvalidInput(format!(
            "invalid color '{hex}', expected RRGGBB"
        )));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| CasperError::InvalidInput(format!("invalid color '{hex}'")))
    };

    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Parse a zone name or logical index into a [`Zone`].
///
/// Accepts `right`, `middle`, `left`, `corner`, or `0`-`3`.
pub fn parse_zone(name: &str) -> Result<Zone> {
    match name.to_lowercase().as_str() {
        "right" | "0" => Ok(Zone::Right),
        "middle" | "1" => Ok(Zone::Middle),
        "left" | "2" => Ok(Zone::Left),
        "corner" | "bias" | "3" => Ok(Zone::Corner),
        _ => Err(CasperError::InvalidInput(format!(
            "unknown zone '{name}'. Use: right, middle, left, or corner"
        ))),
    }
}

/// Parse a power profile name.
pub fn parse_power_profile(name: &str) -> Result<PowerProfile> {
    match name.to_lowercase().as_str() {
        "low-power" | "low" => Ok(PowerProfile::LowPower),
        "balanced" => Ok(PowerProfile::Balanced),
        "balanced-performance" => Ok(PowerProfile::BalancedPerformance),
        "performance" => Ok(PowerProfile::Performance),
        _ => Err(CasperError::InvalidInput(format!(
            "unknown profile '{name}'. Use: low-power, balanced, balanced-performance, or performance"
        ))),
    }
}
