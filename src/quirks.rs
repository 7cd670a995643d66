//! Hardware-variant resolution.
//!
//! Casper shipped the same WMI interface across several Intel generations
//! with different field encodings, and not every product exposes power
//! plans. Resolution is table-driven and fails closed: an unknown CPU or
//! product identity refuses to bind instead of guessing a default.

use crate::error::{CasperError, Result};

// =============================================================================
// Quirk Profile
// =============================================================================

/// Resolved hardware-variant configuration.
///
/// Produced once at bind time by [`resolve`] and treated as immutable
/// configuration by every other component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuirkProfile {
    /// Fan speed fields are big-endian and need a byte swap.
    pub big_endian_fans: bool,
    /// Product does not expose power plan control.
    pub no_power_profiles: bool,
    /// Firmware uses the 0-2 power plan enumeration instead of 1-4.
    pub new_power_scheme: bool,
}

/// CPU identity as reported by cpuid: vendor family and model.
///
/// All supported machines are Intel family 6; the model number selects
/// the generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuId {
    pub family: u16,
    pub model: u16,
}

impl CpuId {
    pub const fn new(family: u16, model: u16) -> Self {
        Self { family, model }
    }
}

// =============================================================================
// Known CPU Generations
// =============================================================================

pub const INTEL_KABYLAKE: CpuId = CpuId::new(6, 0x9e);
pub const INTEL_COMETLAKE: CpuId = CpuId::new(6, 0xa5);
pub const INTEL_TIGERLAKE: CpuId = CpuId::new(6, 0x8d);
pub const INTEL_ALDERLAKE: CpuId = CpuId::new(6, 0x97);
pub const INTEL_RAPTORLAKE: CpuId = CpuId::new(6, 0xb7);
pub const INTEL_METEORLAKE: CpuId = CpuId::new(6, 0xac);
pub const INTEL_RAPTORLAKE_S: CpuId = CpuId::new(6, 0xbf);

/// Pre-11th-gen machines: big-endian fan fields, legacy power scheme.
const GEN_OLDER_THAN_11: QuirkProfile = QuirkProfile {
    big_endian_fans: true,
    no_power_profiles: false,
    new_power_scheme: false,
};

/// 11th-gen and newer machines: little-endian fans, new power scheme.
const GEN_NEWER_THAN_11: QuirkProfile = QuirkProfile {
    big_endian_fans: false,
    no_power_profiles: false,
    new_power_scheme: true,
};

/// CPU generation table. The encoding flags come from here; the
/// `no_power_profiles` default is always overwritten by the product
/// table below.
const CPU_GENERATIONS: &[(CpuId, QuirkProfile)] = &[
    (INTEL_KABYLAKE, GEN_OLDER_THAN_11),
    (INTEL_COMETLAKE, GEN_OLDER_THAN_11),
    (INTEL_TIGERLAKE, GEN_NEWER_THAN_11),
    (INTEL_ALDERLAKE, GEN_NEWER_THAN_11),
    (INTEL_RAPTORLAKE, GEN_NEWER_THAN_11),
    (INTEL_METEORLAKE, GEN_NEWER_THAN_11),
    (INTEL_RAPTORLAKE_S, GEN_NEWER_THAN_11),
];

// =============================================================================
// Known Product Identities
// =============================================================================

/// DMI system vendor string shared by all supported products.
pub const CASPER_DMI_VENDOR: &str = "CASPER BILGISAYAR SISTEMLERI";

/// Product table: `(product name, no_power_profiles)`.
///
/// Product identity is authoritative for power plan availability.
const CASPER_PRODUCTS: &[(&str, bool)] = &[
    ("EXCALIBUR G650", true),
    ("EXCALIBUR G670", true),
    ("EXCALIBUR G750", true),
    ("EXCALIBUR G770", false),
    ("EXCALIBUR G780", false),
    ("EXCALIBUR G870", false),
    ("EXCALIBUR G900", false),
    ("EXCALIBUR G911", false),
];

// =============================================================================
// Resolution
// =============================================================================

/// Resolve the quirk profile for a machine.
///
/// Two lookups: the CPU identity selects the encoding flags
/// (`big_endian_fans`, `new_power_scheme`), and the DMI identity pair
/// selects `no_power_profiles`. Either lookup missing is fatal.
///
/// # Errors
/// Returns `UnsupportedPlatform` when the CPU model or the
/// vendor/product pair is not in the tables.
pub fn resolve(cpu: CpuId, vendor: &str, product: &str) -> Result<QuirkProfile> {
    let mut profile = CPU_GENERATIONS
        .iter()
        .find(|(id, _)| *id == cpu)
        .map(|(_, quirk)| *quirk)
        .ok_or_else(|| {
            CasperError::UnsupportedPlatform(format!(
                "unknown CPU family {} model {:#x}",
                cpu.family, cpu.model
            ))
        })?;

    if vendor != CASPER_DMI_VENDOR {
        return Err(CasperError::UnsupportedPlatform(format!(
            "unknown system vendor '{vendor}'"
        )));
    }

    let no_power_profiles = CASPER_PRODUCTS
        .iter()
        .find(|(name, _)| *name == product)
        .map(|(_, flag)| *flag)
        .ok_or_else(|| {
            CasperError::UnsupportedPlatform(format!("unknown product '{product}'"))
        })?;

    profile.no_power_profiles = no_power_profiles;
    Ok(profile)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_old_generation() {
        let quirk = resolve(INTEL_COMETLAKE, CASPER_DMI_VENDOR, "EXCALIBUR G650").unwrap();
        assert!(quirk.big_endian_fans);
        assert!(!quirk.new_power_scheme);
        assert!(quirk.no_power_profiles);
    }

    #[test]
    fn test_resolve_new_generation() {
        let quirk = resolve(INTEL_RAPTORLAKE, CASPER_DMI_VENDOR, "EXCALIBUR G911").unwrap();
        assert!(!quirk.big_endian_fans);
        assert!(quirk.new_power_scheme);
        assert!(!quirk.no_power_profiles);
    }

    #[test]
    fn test_product_overrides_power_profile_flag() {
        // Same CPU generation, different products.
        let without = resolve(INTEL_TIGERLAKE, CASPER_DMI_VENDOR, "EXCALIBUR G750").unwrap();
        let with = resolve(INTEL_TIGERLAKE, CASPER_DMI_VENDOR, "EXCALIBUR G770").unwrap();
        assert!(without.no_power_profiles);
        assert!(!with.no_power_profiles);
    }

    #[test]
    fn test_unknown_cpu_fails_closed() {
        let cpu = CpuId::new(6, 0x55); // Skylake-X, never shipped in these laptops
        assert!(matches!(
            resolve(cpu, CASPER_DMI_VENDOR, "EXCALIBUR G770"),
            Err(CasperError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn test_unknown_vendor_fails_closed() {
        assert!(matches!(
            resolve(INTEL_ALDERLAKE, "OTHER VENDOR", "EXCALIBUR G770"),
            Err(CasperError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn test_unknown_product_fails_closed() {
        assert!(matches!(
            resolve(INTEL_ALDERLAKE, CASPER_DMI_VENDOR, "EXCALIBUR G999"),
            Err(CasperError::UnsupportedPlatform(_))
        ));
    }
}
