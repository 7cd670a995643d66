//! LED preset configuration and persistence.
//!
//! A preset is a full per-zone color/brightness set. A few built-ins are
//! compiled in; user presets are stored as JSON under the platform config
//! directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CasperError, Result};
use crate::protocol::Zone;

// =============================================================================
// Preset Types
// =============================================================================

/// Color and brightness for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub brightness: u8,
}

impl ZoneColor {
    pub const fn new(red: u8, green: u8, blue: u8, brightness: u8) -> Self {
        Self {
            red,
            green,
            blue,
            brightness,
        }
    }
}

/// A named lighting configuration covering all four zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedPreset {
    pub right: ZoneColor,
    pub middle: ZoneColor,
    pub left: ZoneColor,
    pub corner: ZoneColor,
}

impl LedPreset {
    /// All zones dark (white color, zero brightness).
    pub const OFF: Self = Self::uniform(ZoneColor::new(0xff, 0xff, 0xff, 0));

    /// Full white at maximum brightness.
    pub const WHITE: Self = Self::uniform(ZoneColor::new(0xff, 0xff, 0xff, 2));

    /// Red keyboard with a dimmer red corner light.
    pub const CRIMSON: Self = Self {
        right: ZoneColor::new(0xff, 0x00, 0x00, 2),
        middle: ZoneColor::new(0xff, 0x00, 0x00, 2),
        left: ZoneColor::new(0xff, 0x00, 0x00, 2),
        corner: ZoneColor::new(0xff, 0x00, 0x00, 1),
    };

    /// Same color on every zone.
    pub const fn uniform(color: ZoneColor) -> Self {
        Self {
            right: color,
            middle: color,
            left: color,
            corner: color,
        }
    }

    /// Entry for a zone.
    pub fn zone(&self, zone: Zone) -> ZoneColor {
        match zone {
            Zone::Right => self.right,
            Zone::Middle => self.middle,
            Zone::Left => self.left,
            Zone::Corner => self.corner,
        }
    }

    /// Look up a built-in preset by name.
    pub fn builtin(name: &str) -> Option<LedPreset> {
        match name.to_lowercase().as_str() {
            "off" => Some(Self::OFF),
            "white" => Some(Self::WHITE),
            "crimson" => Some(Self::CRIMSON),
            _ => None,
        }
    }

    /// Names of the built-in presets.
    pub const BUILTIN_NAMES: [&'static str; 3] = ["off", "white", "crimson"];
}

// =============================================================================
// Persistence
// =============================================================================

/// Path of the user preset store (`<config>/casper-wmi/presets.json`).
pub fn presets_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("casper-wmi").join("presets.json"))
}

/// Load user presets from a JSON file. A missing file is an empty store.
pub fn load_presets_from(path: &Path) -> Result<BTreeMap<String, LedPreset>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| CasperError::InvalidInput(format!("corrupt preset store: {e}")))
}

/// Add or replace one user preset in a JSON file.
pub fn save_preset_to(path: &Path, name: &str, preset: LedPreset) -> Result<()> {
    let mut presets = load_presets_from(path)?;
    presets.insert(name.to_string(), preset);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(&presets)
        .map_err(|e| CasperError::InvalidInput(format!("cannot serialize presets: {e}")))?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load user presets from the default store.
pub fn load_presets() -> Result<BTreeMap<String, LedPreset>> {
    match presets_path() {
        Some(path) => load_presets_from(&path),
        None => Ok(BTreeMap::new()),
    }
}

/// Save one user preset to the default store.
pub fn save_preset(name: &str, preset: LedPreset) -> Result<()> {
    let path = presets_path().ok_or_else(|| {
        CasperError::InvalidInput("no config directory available on this system".into())
    })?;
    save_preset_to(&path, name, preset)
}

/// Find a preset by name: built-ins first, then the user store.
pub fn find_preset(name: &str) -> Result<LedPreset> {
    if let Some(preset) = LedPreset::builtin(name) {
        return Ok(preset);
    }
    load_presets()?
        .get(name)
        .copied()
        .ok_or_else(|| CasperError::UnknownPreset(name.to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(LedPreset::builtin("off"), Some(LedPreset::OFF));
        assert_eq!(LedPreset::builtin("WHITE"), Some(LedPreset::WHITE));
        assert_eq!(LedPreset::builtin("nope"), None);
    }

    #[test]
    fn test_zone_accessor() {
        let preset = LedPreset::CRIMSON;
        assert_eq!(preset.zone(Zone::Middle).brightness, 2);
        assert_eq!(preset.zone(Zone::Corner).brightness, 1);
    }

    #[test]
    fn test_preset_json_round_trip() {
        let json = serde_json::to_string(&LedPreset::CRIMSON).unwrap();
        let parsed: LedPreset = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, LedPreset::CRIMSON);
    }

    #[test]
    fn test_save_and_load_store() {
        let path = std::env::temp_dir().join(format!(
            "casper-wmi-test-presets-{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        assert!(load_presets_from(&path).unwrap().is_empty());

        save_preset_to(&path, "desk", LedPreset::WHITE).unwrap();
        save_preset_to(&path, "night", LedPreset::OFF).unwrap();

        let presets = load_presets_from(&path).unwrap();
        assert_eq!(presets.len(), 2);
        assert_eq!(presets["desk"], LedPreset::WHITE);
        assert_eq!(presets["night"], LedPreset::OFF);

        let _ = fs::remove_file(&path);
    }
}
