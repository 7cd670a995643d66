//! Power plan mapping between the generic profile enumeration and the
//! two hardware schemes.
//!
//! Older firmwares enumerate plans 1-4, newer ones 0-2. The newer scheme
//! has no code for `BalancedPerformance`, so that profile must neither be
//! advertised nor sent when the new scheme is active.

use crate::error::{CasperError, Result};
use crate::quirks::QuirkProfile;

// Legacy scheme (pre-11th-gen firmware).
const OLD_HIGH_PERFORMANCE: u32 = 1;
const OLD_GAMING: u32 = 2;
const OLD_TEXT_MODE: u32 = 3;
const OLD_POWERSAVE: u32 = 4;

// New scheme (11th-gen and later firmware).
const NEW_HIGH_PERFORMANCE: u32 = 0;
const NEW_GAMING: u32 = 1;
const NEW_AUDIO: u32 = 2;

/// Generic, hardware-independent power/performance profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerProfile {
    LowPower,
    Balanced,
    BalancedPerformance,
    Performance,
}

impl PowerProfile {
    /// Profiles selectable under the given quirk profile.
    ///
    /// `BalancedPerformance` is excluded when the new power scheme is
    /// active; the list is empty when the product has no power plan
    /// control at all.
    pub fn choices(quirk: &QuirkProfile) -> Vec<PowerProfile> {
        if quirk.no_power_profiles {
            return Vec::new();
        }

        let mut choices = vec![PowerProfile::LowPower, PowerProfile::Balanced];
        if !quirk.new_power_scheme {
            choices.push(PowerProfile::BalancedPerformance);
        }
        choices.push(PowerProfile::Performance);
        choices
    }

    /// Hardware plan code for this profile under the active scheme.
    ///
    /// # Errors
    /// Returns `UnsupportedProfile` for `BalancedPerformance` under the
    /// new scheme; callers must not touch the channel in that case.
    pub fn hardware_code(&self, quirk: &QuirkProfile) -> Result<u32> {
        if quirk.new_power_scheme {
            return match self {
                PowerProfile::Performance => Ok(NEW_HIGH_PERFORMANCE),
                PowerProfile::Balanced => Ok(NEW_GAMING),
                PowerProfile::LowPower => Ok(NEW_AUDIO),
                PowerProfile::BalancedPerformance => {
                    Err(CasperError::UnsupportedProfile(self.to_string()))
                }
            };
        }

        match self {
            PowerProfile::Performance => Ok(OLD_HIGH_PERFORMANCE),
            PowerProfile::BalancedPerformance => Ok(OLD_GAMING),
            PowerProfile::Balanced => Ok(OLD_TEXT_MODE),
            PowerProfile::LowPower => Ok(OLD_POWERSAVE),
        }
    }

    /// Map a hardware plan code back to the generic profile.
    ///
    /// # Errors
    /// Returns `InvalidHardwareState` for codes outside the active
    /// scheme's enumeration.
    pub fn from_hardware_code(code: u32, quirk: &QuirkProfile) -> Result<PowerProfile> {
        if quirk.new_power_scheme {
            return match code {
                NEW_HIGH_PERFORMANCE => Ok(PowerProfile::Performance),
                NEW_GAMING => Ok(PowerProfile::Balanced),
                NEW_AUDIO => Ok(PowerProfile::LowPower),
                _ => Err(CasperError::InvalidHardwareState(code)),
            };
        }

        match code {
            OLD_HIGH_PERFORMANCE => Ok(PowerProfile::Performance),
            OLD_GAMING => Ok(PowerProfile::BalancedPerformance),
            OLD_TEXT_MODE => Ok(PowerProfile::Balanced),
            OLD_POWERSAVE => Ok(PowerProfile::LowPower),
            _ => Err(CasperError::InvalidHardwareState(code)),
        }
    }
}

impl std::fmt::Display for PowerProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerProfile::LowPower => write!(f, "low-power"),
            PowerProfile::Balanced => write!(f, "balanced"),
            PowerProfile::BalancedPerformance => write!(f, "balanced-performance"),
            PowerProfile::Performance => write!(f, "performance"),
        }
    }
}
