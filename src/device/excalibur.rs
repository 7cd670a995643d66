//! Bound Casper Excalibur device.
//!
//! High-level interface over the command channel: per-zone LED control,
//! power plan get/set, and fan speed readings. One instance corresponds
//! to one binding of the WMI channel; the quirk profile resolved at bind
//! time is immutable for its lifetime.

use std::sync::Mutex;

use crate::config::LedPreset;
use crate::device::channel::CommandChannel;
use crate::device::transport::WmiTransport;
use crate::error::{CasperError, Result};
use crate::protocol::commands::{
    CASPER_ALL_KEYBOARD_LEDS, CASPER_CORNER_LEDS, CASPER_GET_HARDWAREINFO, CASPER_POWERPLAN,
    CASPER_SET_LED, DEFAULT_COLOR, LedMode, Zone, ZONE_COUNT, pack_led_data,
};
use crate::protocol::power::PowerProfile;
use crate::protocol::status::FanReading;
use crate::quirks::QuirkProfile;

// =============================================================================
// LED Zone State
// =============================================================================

/// Cached state of one LED zone.
///
/// Mirrors what was last written to (or read back from) the hardware.
/// Brightness lives apart from the color channels because the device
/// packs it into the alpha byte together with the mode nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedZoneState {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub brightness: u8,
    pub mode: LedMode,
}

impl LedZoneState {
    /// Bind-time default: full white, zero brightness.
    const fn initial() -> Self {
        Self {
            red: 0xff,
            green: 0xff,
            blue: 0xff,
            brightness: 0,
            mode: LedMode::Normal,
        }
    }

    /// Packed 32-bit LED data word for this state.
    fn packed(&self) -> u32 {
        pack_led_data(self.red, self.green, self.blue, self.brightness, self.mode)
    }
}

// =============================================================================
// Excalibur
// =============================================================================

/// A bound Casper Excalibur laptop.
///
/// # Example
///
/// ```no_run
/// use casper_rust_wmi::device::{DevNodeTransport, Excalibur};
/// use casper_rust_wmi::protocol::Zone;
/// use casper_rust_wmi::quirks::{self, INTEL_RAPTORLAKE, CASPER_DMI_VENDOR};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let quirk = quirks::resolve(INTEL_RAPTORLAKE, CASPER_DMI_VENDOR, "EXCALIBUR G911")?;
///     let transport = DevNodeTransport::open("/dev/casper-wmi")?;
///     let laptop = Excalibur::bind(transport, quirk)?;
///
///     laptop.set_color(Zone::Middle, 255, 0, 0)?;
///     laptop.set_brightness(Zone::Middle, 1)?;
///     println!("{}", laptop.fan_reading()?);
///     Ok(())
/// }
/// ```
pub struct Excalibur<T: WmiTransport> {
    channel: CommandChannel<T>,
    quirk: QuirkProfile,
    zones: Mutex<[LedZoneState; ZONE_COUNT]>,
}

impl<T: WmiTransport> Excalibur<T> {
    /// Bind the device: take ownership of the transport and establish
    /// the deterministic default visual state (all zones full white at
    /// zero brightness) with two bulk LED writes.
    pub fn bind(transport: T, quirk: QuirkProfile) -> Result<Self> {
        let laptop = Self {
            channel: CommandChannel::new(transport),
            quirk,
            zones: Mutex::new([LedZoneState::initial(); ZONE_COUNT]),
        };

        laptop
            .channel
            .send(CASPER_SET_LED, CASPER_ALL_KEYBOARD_LEDS, DEFAULT_COLOR)?;
        laptop
            .channel
            .send(CASPER_SET_LED, CASPER_CORNER_LEDS, DEFAULT_COLOR)?;

        Ok(laptop)
    }

    /// Quirk profile this binding was resolved with.
    pub fn quirk(&self) -> &QuirkProfile {
        &self.quirk
    }

    /// Cached state of a zone.
    pub fn zone_state(&self, zone: Zone) -> LedZoneState {
        self.zones.lock().unwrap()[zone.index()]
    }

    // -------------------------------------------------------------------------
    // LED Zone Controller
    // -------------------------------------------------------------------------

    /// Set a zone's color, keeping its current brightness and mode.
    pub fn set_color(&self, zone: Zone, red: u8, green: u8, blue: u8) -> Result<()> {
        let mut zones = self.zones.lock().unwrap();
        let state = &mut zones[zone.index()];
        state.red = red;
        state.green = green;
        state.blue = blue;

        self.channel
            .send(CASPER_SET_LED, zone.hardware_code(), state.packed())
    }

    /// Set a zone's brightness, forcing the mode back to `Normal`.
    ///
    /// Setting the level the cache already holds re-reads the live
    /// hardware brightness and reasserts that instead; "set to current"
    /// means "refresh from hardware", not a no-op. Levels are not
    /// range-checked here (see `MAX_BRIGHTNESS`).
    pub fn set_brightness(&self, zone: Zone, level: u8) -> Result<()> {
        let mut zones = self.zones.lock().unwrap();
        let state = &mut zones[zone.index()];

        let level = if level == state.brightness {
            if zone.is_corner() {
                state.brightness
            } else {
                self.query_hardware_brightness()
            }
        } else {
            level
        };

        state.brightness = level;
        state.mode = LedMode::Normal;

        self.channel
            .send(CASPER_SET_LED, zone.hardware_code(), state.packed())
    }

    /// Current brightness of a zone.
    ///
    /// The corner light has no hardware status readback, so its cached
    /// value is returned; keyboard zones are read live. This call is
    /// infallible by contract: LED front-ends expect a best-effort
    /// integer, so any query failure reads as brightness 0.
    pub fn brightness(&self, zone: Zone) -> u8 {
        if zone.is_corner() {
            return self.zones.lock().unwrap()[zone.index()].brightness;
        }
        self.query_hardware_brightness()
    }

    /// Write a whole preset: color and brightness for every zone, mode
    /// forced to `Normal`. One LED write per zone.
    pub fn apply_preset(&self, preset: &LedPreset) -> Result<()> {
        let mut zones = self.zones.lock().unwrap();
        for zone in Zone::ALL {
            let entry = preset.zone(zone);
            let state = &mut zones[zone.index()];
            *state = LedZoneState {
                red: entry.red,
                green: entry.green,
                blue: entry.blue,
                brightness: entry.brightness,
                mode: LedMode::Normal,
            };
            self.channel
                .send(CASPER_SET_LED, zone.hardware_code(), state.packed())?;
        }
        Ok(())
    }

    /// Live keyboard brightness from the hardware info block, with
    /// failures swallowed to 0. This is the only place in the driver
    /// that downgrades an error.
    fn query_hardware_brightness(&self) -> u8 {
        self.channel
            .query(CASPER_GET_HARDWAREINFO)
            .map(|record| record.a6 as u8)
            .unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Fan Sensors
    // -------------------------------------------------------------------------

    /// Read both fan speeds.
    pub fn fan_reading(&self) -> Result<FanReading> {
        let record = self.channel.query(CASPER_GET_HARDWAREINFO)?;
        Ok(FanReading::decode(&record, &self.quirk))
    }

    // -------------------------------------------------------------------------
    // Power Profiles
    // -------------------------------------------------------------------------

    /// Profiles selectable on this machine.
    pub fn power_profile_choices(&self) -> Vec<PowerProfile> {
        PowerProfile::choices(&self.quirk)
    }

    /// Read the active power profile.
    pub fn power_profile(&self) -> Result<PowerProfile> {
        if self.quirk.no_power_profiles {
            return Err(CasperError::PowerProfilesUnavailable);
        }

        let record = self.channel.query(CASPER_POWERPLAN)?;
        PowerProfile::from_hardware_code(record.a2, &self.quirk)
    }

    /// Switch the active power profile.
    ///
    /// A profile with no hardware code under the active scheme fails
    /// before anything reaches the channel.
    pub fn set_power_profile(&self, profile: PowerProfile) -> Result<()> {
        if self.quirk.no_power_profiles {
            return Err(CasperError::PowerProfilesUnavailable);
        }

        let code = profile.hardware_code(&self.quirk)?;
        self.channel.send(CASPER_POWERPLAN, code, 0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::transport::mock::{MockEvent, MockTransport};
    use crate::device::transport::WmiObject;
    use crate::protocol::commands::CommandRecord;
    use std::sync::{Arc, Mutex as StdMutex};

    fn new_scheme_quirk() -> QuirkProfile {
        QuirkProfile {
            big_endian_fans: false,
            no_power_profiles: false,
            new_power_scheme: true,
        }
    }

    fn old_scheme_quirk() -> QuirkProfile {
        QuirkProfile {
            big_endian_fans: true,
            no_power_profiles: false,
            new_power_scheme: false,
        }
    }

    /// Decode the write-class sets out of a mock log.
    fn sent_records(log: &Arc<StdMutex<Vec<MockEvent>>>) -> Vec<CommandRecord> {
        log.lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                MockEvent::Set(bytes) => Some(CommandRecord::parse(bytes).unwrap()),
                MockEvent::Query => None,
            })
            .collect()
    }

    #[test]
    fn test_bind_initializes_all_zones() {
        let transport = MockTransport::new();
        let log = transport.log();
        let laptop = Excalibur::bind(transport, new_scheme_quirk()).unwrap();

        let records = sent_records(&log);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].a1, CASPER_SET_LED);
        assert_eq!(records[0].a2, CASPER_ALL_KEYBOARD_LEDS);
        assert_eq!(records[0].a3, DEFAULT_COLOR);
        assert_eq!(records[1].a2, CASPER_CORNER_LEDS);
        assert_eq!(records[1].a3, DEFAULT_COLOR);

        for zone in Zone::ALL {
            assert_eq!(laptop.zone_state(zone), LedZoneState::initial());
        }
    }

    #[test]
    fn test_set_color_then_brightness_scenario() {
        // End-to-end: red on the middle zone, then brightness 1.
        let transport = MockTransport::new();
        let log = transport.log();
        let laptop = Excalibur::bind(transport, new_scheme_quirk()).unwrap();
        log.lock().unwrap().clear();

        laptop.set_color(Zone::Middle, 255, 0, 0).unwrap();
        laptop.set_brightness(Zone::Middle, 1).unwrap();

        let records = sent_records(&log);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].a2, Zone::Middle.hardware_code());
        assert_eq!(records[0].a3, 0x10ff0000); // brightness 0, NORMAL, red
        assert_eq!(records[1].a3, 0x11ff0000); // brightness 1, NORMAL, red
    }

    #[test]
    fn test_set_brightness_to_cached_level_requeries_hardware() {
        let mut transport = MockTransport::new();
        let hardware = CommandRecord {
            a6: 2,
            ..CommandRecord::default()
        };
        transport.push_reply(Ok(WmiObject::Buffer(hardware.encode().to_vec())));
        let log = transport.log();
        let laptop = Excalibur::bind(transport, new_scheme_quirk()).unwrap();
        log.lock().unwrap().clear();

        // Cache holds 0; asking for 0 must reassert the live value (2).
        laptop.set_brightness(Zone::Left, 0).unwrap();

        assert_eq!(laptop.zone_state(Zone::Left).brightness, 2);
        let records = sent_records(&log);
        assert_eq!(records.len(), 2); // the hardware-info read + the LED write
        let led_write = records.last().unwrap();
        assert_eq!(led_write.a3 >> 24, 0x12);
    }

    #[test]
    fn test_corner_brightness_never_queries_hardware() {
        let transport = MockTransport::new();
        let log = transport.log();
        let laptop = Excalibur::bind(transport, new_scheme_quirk()).unwrap();

        laptop.set_brightness(Zone::Corner, 2).unwrap();
        log.lock().unwrap().clear();

        assert_eq!(laptop.brightness(Zone::Corner), 2);
        assert!(log.lock().unwrap().is_empty());

        // Toggling to the cached value stays on the cache too.
        laptop.set_brightness(Zone::Corner, 2).unwrap();
        let records = sent_records(&log);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].a3 >> 24, 0x12);
    }

    #[test]
    fn test_keyboard_brightness_swallows_query_failure() {
        let mut transport = MockTransport::new();
        // bind issues no queries, so the first failure hits the read.
        transport.push_reply(Ok(WmiObject::Integer(0x10)));
        let laptop = Excalibur::bind(transport, new_scheme_quirk()).unwrap();

        assert_eq!(laptop.brightness(Zone::Right), 0);
    }

    #[test]
    fn test_fan_reading_uses_quirk() {
        let mut transport = MockTransport::new();
        let hardware = CommandRecord {
            a4: 0x1234,
            a5: 0x5678,
            ..CommandRecord::default()
        };
        transport.push_reply(Ok(WmiObject::Buffer(hardware.encode().to_vec())));
        let laptop = Excalibur::bind(transport, old_scheme_quirk()).unwrap();

        let reading = laptop.fan_reading().unwrap();
        assert_eq!(reading.cpu_fan, 0x3412);
        assert_eq!(reading.gpu_fan, 0x7856);
    }

    #[test]
    fn test_power_profile_round_trip() {
        let mut transport = MockTransport::new();
        let plan = CommandRecord {
            a2: 1, // NEW_GAMING
            ..CommandRecord::default()
        };
        transport.push_reply(Ok(WmiObject::Buffer(plan.encode().to_vec())));
        let log = transport.log();
        let laptop = Excalibur::bind(transport, new_scheme_quirk()).unwrap();
        log.lock().unwrap().clear();

        assert_eq!(laptop.power_profile().unwrap(), PowerProfile::Balanced);

        laptop.set_power_profile(PowerProfile::Performance).unwrap();
        let records = sent_records(&log);
        let set = records.last().unwrap();
        assert_eq!(set.a1, CASPER_POWERPLAN);
        assert_eq!(set.a2, 0);
        assert_eq!(set.a3, 0);
    }

    #[test]
    fn test_unsupported_profile_never_touches_channel() {
        let transport = MockTransport::new();
        let log = transport.log();
        let laptop = Excalibur::bind(transport, new_scheme_quirk()).unwrap();
        log.lock().unwrap().clear();

        assert!(matches!(
            laptop.set_power_profile(PowerProfile::BalancedPerformance),
            Err(CasperError::UnsupportedProfile(_))
        ));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_power_profiles_unavailable_on_quirked_products() {
        let quirk = QuirkProfile {
            no_power_profiles: true,
            ..new_scheme_quirk()
        };
        let transport = MockTransport::new();
        let log = transport.log();
        let laptop = Excalibur::bind(transport, quirk).unwrap();
        log.lock().unwrap().clear();

        assert!(laptop.power_profile_choices().is_empty());
        assert!(matches!(
            laptop.power_profile(),
            Err(CasperError::PowerProfilesUnavailable)
        ));
        assert!(matches!(
            laptop.set_power_profile(PowerProfile::Balanced),
            Err(CasperError::PowerProfilesUnavailable)
        ));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_apply_preset_writes_every_zone() {
        let transport = MockTransport::new();
        let log = transport.log();
        let laptop = Excalibur::bind(transport, new_scheme_quirk()).unwrap();
        log.lock().unwrap().clear();

        laptop.apply_preset(&LedPreset::OFF).unwrap();

        let records = sent_records(&log);
        assert_eq!(records.len(), ZONE_COUNT);
        for (record, zone) in records.iter().zip(Zone::ALL) {
            assert_eq!(record.a2, zone.hardware_code());
            assert_eq!(record.a3 >> 24, 0x10); // brightness 0, NORMAL
        }
    }
}
