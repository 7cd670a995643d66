//! WMI protocol implementation for Casper Excalibur laptops.
//!
//! This module contains the fixed-layout command record codec, LED zone
//! and color packing definitions, power plan mapping, and fan speed
//! decoding.

pub mod commands;
pub mod power;
pub mod status;

pub use commands::*;
pub use power::*;
pub use status::*;
