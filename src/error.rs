//! Custom error types for Casper Excalibur WMI operations.
//!
//! This module provides fine-grained error handling for transport failures,
//! protocol violations, and hardware-variant resolution.

use thiserror::Error;

/// Main error type for Casper WMI operations.
#[derive(Error, Debug)]
pub enum CasperError {
    /// WMI transport call failed.
    #[error("WMI transport error: {0}")]
    Io(#[from] std::io::Error),

    /// Response buffer had an unexpected length.
    ///
    /// The command record is fixed-size; any other length means the
    /// firmware and this driver disagree about the protocol.
    #[error("WMI response was {actual} bytes, expected {expected}")]
    WrongSize { expected: usize, actual: usize },

    /// Response was a scalar instead of a buffer.
    ///
    /// The firmware returns an integer sentinel when the read address
    /// was invalid.
    #[error("WMI response was not a buffer (firmware rejected the read)")]
    WrongType,

    /// No quirk table entry matched this machine.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Generic profile has no hardware code under the active power scheme.
    #[error("Power profile '{0}' is not supported by this hardware")]
    UnsupportedProfile(String),

    /// Hardware reported a power plan code outside the known mapping.
    #[error("Hardware reported unknown power plan code {0:#04x}")]
    InvalidHardwareState(u32),

    /// Power profile control is disabled for this product.
    #[error("Power profiles are not available on this model")]
    PowerProfilesUnavailable,

    /// Named LED preset does not exist.
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Casper WMI operations.
pub type Result<T> = std::result::Result<T, CasperError>;
