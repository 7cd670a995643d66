//! WMI command definitions and the fixed-layout command record.
//!
//! Protocol based on the Casper Excalibur ACPI-WMI interface: every
//! transaction exchanges one 32-byte record through a single block
//! set/query channel.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CasperError, Result};

// =============================================================================
// Constants
// =============================================================================

/// WMI method GUID of the Casper command channel.
pub const CASPER_WMI_GUID: &str = "644C5791-B7B0-4123-A90B-E93876E0DAAD";

/// Serialized length of a [`CommandRecord`] in bytes.
pub const RECORD_LENGTH: usize = 32;

/// Operation class: read request.
pub const CASPER_READ: u16 = 0xfa00;

/// Operation class: write request.
pub const CASPER_WRITE: u16 = 0xfb00;

/// Sub-command: set an LED zone color word.
pub const CASPER_SET_LED: u16 = 0x0100;

/// Sub-command: query the hardware info block (fan speeds, LED brightness).
pub const CASPER_GET_HARDWAREINFO: u16 = 0x0200;

/// Sub-command: get or set the active power plan.
pub const CASPER_POWERPLAN: u16 = 0x0300;

/// Bulk LED target covering all three keyboard zones, used only for
/// bind-time initialization.
pub const CASPER_ALL_KEYBOARD_LEDS: u32 = 0x06;

/// LED target for the corner/bias light strip.
pub const CASPER_CORNER_LEDS: u32 = 0x07;

/// Number of independently addressable LED zones.
pub const ZONE_COUNT: usize = 4;

/// Full-intensity white with zero alpha, written to every zone at bind time.
pub const DEFAULT_COLOR: u32 = 0x00ff_ffff;

/// Advertised maximum brightness level (hardware has a 2-step range).
///
/// The core does not range-check levels itself; front-ends are expected
/// to enforce this maximum.
pub const MAX_BRIGHTNESS: u8 = 2;

// =============================================================================
// Command Record
// =============================================================================

/// Fixed-layout argument record exchanged with the firmware.
///
/// `a0` carries the operation class ([`CASPER_READ`] / [`CASPER_WRITE`]),
/// `a1` the sub-command, and the remaining fields the target id and
/// payload. The wire format is little-endian and exactly
/// [`RECORD_LENGTH`] bytes; any other response length is a protocol
/// error, not a retryable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandRecord {
    pub a0: u16,
    pub a1: u16,
    pub a2: u32,
    pub a3: u32,
    pub a4: u32,
    pub a5: u32,
    pub a6: u32,
    pub a7: u32,
    pub a8: u32,
}

impl CommandRecord {
    /// Build a write-class record carrying a target id and payload.
    pub fn write(sub_command: u16, target_id: u32, payload: u32) -> Self {
        Self {
            a0: CASPER_WRITE,
            a1: sub_command,
            a2: target_id,
            a3: payload,
            ..Self::default()
        }
    }

    /// Build a read-class record with all payload fields zeroed.
    pub fn read(sub_command: u16) -> Self {
        Self {
            a0: CASPER_READ,
            a1: sub_command,
            ..Self::default()
        }
    }

    /// Serialize into the 32-byte little-endian wire layout.
    pub fn encode(&self) -> [u8; RECORD_LENGTH] {
        let mut buf = [0u8; RECORD_LENGTH];
        LittleEndian::write_u16(&mut buf[0..2], self.a0);
        LittleEndian::write_u16(&mut buf[2..4], self.a1);
        LittleEndian::write_u32(&mut buf[4..8], self.a2);
        LittleEndian::write_u32(&mut buf[8..12], self.a3);
        LittleEndian::write_u32(&mut buf[12..16], self.a4);
        LittleEndian::write_u32(&mut buf[16..20], self.a5);
        LittleEndian::write_u32(&mut buf[20..24], self.a6);
        LittleEndian::write_u32(&mut buf[24..28], self.a7);
        LittleEndian::write_u32(&mut buf[28..32], self.a8);
        buf
    }

    /// Parse a response buffer.
    ///
    /// # Errors
    /// Returns `WrongSize` if `buf` is not exactly [`RECORD_LENGTH`]
    /// bytes. Truncating or zero-padding would silently corrupt field
    /// values, so the length check is strict.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() != RECORD_LENGTH {
            return Err(CasperError::WrongSize {
                expected: RECORD_LENGTH,
                actual: buf.len(),
            });
        }

        Ok(Self {
            a0: LittleEndian::read_u16(&buf[0..2]),
            a1: LittleEndian::read_u16(&buf[2..4]),
            a2: LittleEndian::read_u32(&buf[4..8]),
            a3: LittleEndian::read_u32(&buf[8..12]),
            a4: LittleEndian::read_u32(&buf[12..16]),
            a5: LittleEndian::read_u32(&buf[16..20]),
            a6: LittleEndian::read_u32(&buf[20..24]),
            a7: LittleEndian::read_u32(&buf[24..28]),
            a8: LittleEndian::read_u32(&buf[28..32]),
        })
    }
}

// =============================================================================
// LED Zones
// =============================================================================

/// One of the four independently controllable light zones.
///
/// The three keyboard thirds map to device sub-ids 0x03-0x05; the
/// corner/bias light maps to 0x07. The bulk id 0x06 addresses all
/// keyboard zones at once and is only used for initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Right keyboard third.
    Right,
    /// Middle keyboard third.
    Middle,
    /// Left keyboard third.
    Left,
    /// Corner/bias light strip.
    Corner,
}

impl Zone {
    /// All zones in state-array order.
    pub const ALL: [Zone; ZONE_COUNT] = [Zone::Right, Zone::Middle, Zone::Left, Zone::Corner];

    /// Device sub-id used as the target of an LED set command.
    pub const fn hardware_code(&self) -> u32 {
        match self {
            Zone::Right => 0x03,
            Zone::Middle => 0x04,
            Zone::Left => 0x05,
            Zone::Corner => CASPER_CORNER_LEDS,
        }
    }

    /// Index into the per-zone state array.
    pub const fn index(&self) -> usize {
        match self {
            Zone::Right => 0,
            Zone::Middle => 1,
            Zone::Left => 2,
            Zone::Corner => 3,
        }
    }

    /// Zone from a logical index (0-3).
    pub fn from_index(index: usize) -> Option<Zone> {
        Zone::ALL.get(index).copied()
    }

    /// LED class device name for this zone.
    pub const fn name(&self) -> &'static str {
        match self {
            Zone::Right => "casper:rgb:kbd_zoned_backlight-right",
            Zone::Middle => "casper:rgb:kbd_zoned_backlight-middle",
            Zone::Left => "casper:rgb:kbd_zoned_backlight-left",
            Zone::Corner => "casper:rgb:biaslight",
        }
    }

    /// True for the corner/bias light, which has no hardware status
    /// readback.
    pub const fn is_corner(&self) -> bool {
        matches!(self, Zone::Corner)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Right => write!(f, "right"),
            Zone::Middle => write!(f, "middle"),
            Zone::Left => write!(f, "left"),
            Zone::Corner => write!(f, "corner"),
        }
    }
}

// =============================================================================
// LED Modes and Color Packing
// =============================================================================

/// LED animation mode, encoded in the high nibble of the alpha byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedMode {
    Normal = 0x10,
    Blink = 0x20,
    Fade = 0x30,
    Heartbeat = 0x40,
    Repeat = 0x50,
    Random = 0x60,
}

impl LedMode {
    /// Decode a mode nibble from an alpha byte.
    pub fn from_alpha(alpha: u8) -> Option<LedMode> {
        match alpha & 0xf0 {
            0x10 => Some(LedMode::Normal),
            0x20 => Some(LedMode::Blink),
            0x30 => Some(LedMode::Fade),
            0x40 => Some(LedMode::Heartbeat),
            0x50 => Some(LedMode::Repeat),
            0x60 => Some(LedMode::Random),
            _ => None,
        }
    }
}

/// Pack color channels and an alpha byte into the 32-bit LED data word.
///
/// Layout: `alpha << 24 | red << 16 | green << 8 | blue`. The alpha byte
/// itself carries `brightness | mode`.
pub const fn pack_led_data(red: u8, green: u8, blue: u8, brightness: u8, mode: LedMode) -> u32 {
    let alpha = brightness | mode as u8;
    (alpha as u32) << 24 | (red as u32) << 16 | (green as u32) << 8 | blue as u32
}

/// Unpack an LED data word into `(red, green, blue, brightness, mode)`.
///
/// Returns `None` if the mode nibble is not a known animation mode.
pub fn unpack_led_data(word: u32) -> Option<(u8, u8, u8, u8, LedMode)> {
    let alpha = (word >> 24) as u8;
    let mode = LedMode::from_alpha(alpha)?;
    Some((
        (word >> 16) as u8,
        (word >> 8) as u8,
        word as u8,
        alpha & 0x0f,
        mode,
    ))
}

// =============================================================================
// Tests
// =============================================================================
