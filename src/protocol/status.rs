//! Fan speed decoding from the hardware info record.
//!
//! Pure transforms over an already-fetched [`CommandRecord`]; all I/O
//! happens in the command channel.

use byteorder::{BigEndian, ByteOrder};

use crate::protocol::commands::CommandRecord;
use crate::quirks::QuirkProfile;

/// hwmon label for the CPU fan channel.
pub const CPU_FAN_LABEL: &str = "cpu_fan_speed";

/// hwmon label for the GPU fan channel.
pub const GPU_FAN_LABEL: &str = "gpu_fan_speed";

/// Fan speed pair extracted from a `GET_HARDWAREINFO` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanReading {
    /// CPU fan speed in RPM.
    pub cpu_fan: u32,
    /// GPU fan speed in RPM.
    pub gpu_fan: u32,
}

impl FanReading {
    /// Decode fan speeds from a hardware info record.
    ///
    /// Big-endian firmwares pack each speed in the low 16 bits of its
    /// field and need a byte swap. Little-endian firmwares report both
    /// channels through `a5`; this asymmetry matches observed hardware
    /// and must not be "corrected" without verification on a real
    /// machine.
    pub fn decode(record: &CommandRecord, quirk: &QuirkProfile) -> FanReading {
        if quirk.big_endian_fans {
            FanReading {
                cpu_fan: swap_low_word(record.a4),
                gpu_fan: swap_low_word(record.a5),
            }
        } else {
            FanReading {
                cpu_fan: record.a5,
                gpu_fan: record.a5,
            }
        }
    }
}

/// Interpret the low 16 bits of a field as a big-endian integer.
fn swap_low_word(field: u32) -> u32 {
    BigEndian::read_u16(&field.to_le_bytes()[0..2]) as u32
}

impl std::fmt::Display for FanReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "+-----------------------------------+")?;
        writeln!(f, "|   Casper Excalibur Fan Status     |")?;
        writeln!(f, "+-----------------------------------+")?;
        writeln!(f, "|  CPU Fan:       {:>5} RPM         |", self.cpu_fan)?;
        writeln!(f, "|  GPU Fan:       {:>5} RPM         |", self.gpu_fan)?;
        writeln!(f, "+-----------------------------------+")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(a4: u32, a5: u32) -> CommandRecord {
        CommandRecord {
            a4,
            a5,
            ..CommandRecord::default()
        }
    }

    fn quirk(big_endian_fans: bool) -> QuirkProfile {
        QuirkProfile {
            big_endian_fans,
            no_power_profiles: false,
            new_power_scheme: !big_endian_fans,
        }
    }

    #[test]
    fn test_decode_big_endian() {
        let reading = FanReading::decode(&record(0x1234, 0x5678), &quirk(true));
        assert_eq!(reading.cpu_fan, 0x3412);
        assert_eq!(reading.gpu_fan, 0x7856);
    }

    #[test]
    fn test_decode_little_endian_reads_both_from_a5() {
        let reading = FanReading::decode(&record(0x1234, 0x5678), &quirk(false));
        assert_eq!(reading.cpu_fan, 0x5678);
        assert_eq!(reading.gpu_fan, 0x5678);
    }

    #[test]
    fn test_big_endian_swap_ignores_high_word() {
        // Only the low 16 bits of each field carry the speed.
        let reading = FanReading::decode(&record(0xdead_0a0b, 0xbeef_0c0d), &quirk(true));
        assert_eq!(reading.cpu_fan, 0x0b0a);
        assert_eq!(reading.gpu_fan, 0x0d0c);
    }
}
