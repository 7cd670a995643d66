//! Platform identity readout.
//!
//! Collects the inputs of the variant resolver from the running system:
//! CPU family/model from `/proc/cpuinfo` and the DMI identity strings
//! from sysfs.

use std::fs;

use crate::error::{CasperError, Result};
use crate::quirks::CpuId;

const CPUINFO_PATH: &str = "/proc/cpuinfo";
const DMI_SYS_VENDOR_PATH: &str = "/sys/class/dmi/id/sys_vendor";
const DMI_PRODUCT_NAME_PATH: &str = "/sys/class/dmi/id/product_name";

/// Identity of the running machine, ready to feed [`crate::quirks::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemIdentity {
    pub cpu: CpuId,
    pub sys_vendor: String,
    pub product_name: String,
}

/// Read CPU and DMI identity from the running system.
pub fn detect() -> Result<SystemIdentity> {
    let cpuinfo = fs::read_to_string(CPUINFO_PATH)?;
    let cpu = parse_cpuinfo(&cpuinfo).ok_or_else(|| {
        CasperError::UnsupportedPlatform("cannot parse CPU identity from /proc/cpuinfo".into())
    })?;

    Ok(SystemIdentity {
        cpu,
        sys_vendor: read_dmi_field(DMI_SYS_VENDOR_PATH)?,
        product_name: read_dmi_field(DMI_PRODUCT_NAME_PATH)?,
    })
}

/// Extract family and model of the first processor entry.
fn parse_cpuinfo(contents: &str) -> Option<CpuId> {
    let mut family = None;
    let mut model = None;

    for line in contents.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "cpu family" if family.is_none() => family = value.trim().parse::<u16>().ok(),
            "model" if model.is_none() => model = value.trim().parse::<u16>().ok(),
            _ => {}
        }
        if family.is_some() && model.is_some() {
            break;
        }
    }

    Some(CpuId::new(family?, model?))
}

fn read_dmi_field(path: &str) -> Result<String> {
    Ok(fs::read_to_string(path)?.trim().to_string())
}
