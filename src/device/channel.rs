//! Transactional command channel.
//!
//! All hardware access funnels through this layer. The WMI block has no
//! per-transaction identifier, so a write slipped between the set and
//! query phases of a read would silently corrupt it; a single mutex
//! therefore spans every whole transaction.

use std::sync::Mutex;

use crate::error::{CasperError, Result};
use crate::protocol::commands::CommandRecord;
use crate::device::transport::{WmiObject, WmiTransport};

/// Exclusive owner of the WMI transport.
///
/// Exposes only whole transactions ([`send`](CommandChannel::send) and
/// [`query`](CommandChannel::query)); callers cannot reach the raw
/// transport and therefore cannot break the two-phase invariant. The
/// channel never retries and enforces no timeout - both belong to the
/// caller and the platform respectively.
pub struct CommandChannel<T: WmiTransport> {
    transport: Mutex<T>,
}

impl<T: WmiTransport> CommandChannel<T> {
    /// Wrap a transport handle, taking exclusive ownership of it.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Mutex::new(transport),
        }
    }

    /// Submit a write-class command as one atomic set operation.
    pub fn send(&self, sub_command: u16, target_id: u32, payload: u32) -> Result<()> {
        let record = CommandRecord::write(sub_command, target_id, payload);
        let mut transport = self.transport.lock().unwrap();
        transport.block_set(&record.encode())?;
        Ok(())
    }

    /// Run a read-class command: submit the request, then fetch and
    /// parse the response record. The lock is held across both phases.
    ///
    /// # Errors
    /// `Io` if either phase's transport call fails (phase 2 is never
    /// attempted after a phase 1 failure), `WrongType` if the firmware
    /// answered with a scalar sentinel, `WrongSize` if the buffer is not
    /// exactly one record.
    pub fn query(&self, sub_command: u16) -> Result<CommandRecord> {
        let record = CommandRecord::read(sub_command);
        let mut transport = self.transport.lock().unwrap();

        transport.block_set(&record.encode())?;

        match transport.block_query()? {
            WmiObject::Integer(_) => Err(CasperError::WrongType),
            WmiObject::Buffer(bytes) => CommandRecord::parse(&bytes),
        }
    }
}
