//! Device abstraction layer for Casper Excalibur laptops.
//!
//! Contains the WMI transport boundary, the transactional command
//! channel, and the high-level bound device.

pub mod channel;
pub mod excalibur;
pub mod transport;

pub use channel::CommandChannel;
pub use excalibur::{Excalibur, LedZoneState};
pub use transport::{DEFAULT_DEVICE_NODE, DevNodeTransport, WmiObject, WmiTransport};
