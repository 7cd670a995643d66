//! Casper Rust WMI Library
//!
//! A Rust driver for the WMI hardware control channel of Casper Excalibur
//! laptops.
//!
//! # Features
//!
//! - RGB keyboard-zone and corner-light control (4 zones)
//! - CPU/GPU fan speed readings
//! - Power plan get/set across both firmware enumeration schemes
//! - Table-driven hardware-variant resolution (refuses unknown machines)
//!
//! # Example
//!
//! ```no_run
//! use casper_rust_wmi::device::{DevNodeTransport, Excalibur};
//! use casper_rust_wmi::protocol::Zone;
//! use casper_rust_wmi::quirks;
//! use casper_rust_wmi::utils::detect;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Resolve the hardware variant once, then bind the channel
//!     let id = detect::detect()?;
//!     let quirk = quirks::resolve(id.cpu, &id.sys_vendor, &id.product_name)?;
//!     let transport = DevNodeTransport::open("/dev/casper-wmi")?;
//!     let laptop = Excalibur::bind(transport, quirk)?;
//!
//!     // Red middle keyboard zone at brightness 1
//!     laptop.set_color(Zone::Middle, 255, 0, 0)?;
//!     laptop.set_brightness(Zone::Middle, 1)?;
//!
//!     // Fan speeds
//!     let fans = laptop.fan_reading()?;
//!     println!("cpu {} rpm, gpu {} rpm", fans.cpu_fan, fans.gpu_fan);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod protocol;
pub mod quirks;
pub mod utils;

// Re-exports for convenience
pub use device::{DevNodeTransport, Excalibur, WmiObject, WmiTransport};
pub use error::{CasperError, Result};
pub use protocol::{CommandRecord, FanReading, LedMode, PowerProfile, Zone};
pub use quirks::{QuirkProfile, resolve};
