//! WMI transport boundary.
//!
//! The firmware is reached through a single block set/query channel; this
//! module defines the trait the command channel drives and a dev-node
//! implementation for kernels that expose the Casper WMI block as a
//! character device.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

/// Typed result of a block query.
///
/// ACPI hands back either a raw buffer or a scalar; the firmware uses a
/// scalar to signal that the read address was invalid, so the type tag
/// must survive up to the channel layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WmiObject {
    /// Raw response buffer.
    Buffer(Vec<u8>),
    /// Scalar sentinel (invalid read address).
    Integer(u64),
}

/// Block set/query primitives of the Casper WMI channel.
///
/// The command channel owns the transport exclusively; nothing else may
/// touch these primitives directly.
pub trait WmiTransport: Send {
    /// Submit a request block to the firmware.
    fn block_set(&mut self, data: &[u8]) -> io::Result<()>;

    /// Fetch the response block for the previously submitted request.
    fn block_query(&mut self) -> io::Result<WmiObject>;
}

// =============================================================================
// Dev-node Transport
// =============================================================================

/// Default character device node for the Casper WMI block.
pub const DEFAULT_DEVICE_NODE: &str = "/dev/casper-wmi";

/// Largest response the dev node is expected to produce. The protocol
/// record is 32 bytes; anything longer is passed up for the channel to
/// reject.
const READ_BUFFER_LENGTH: usize = 64;

/// Transport over a character device exposing the WMI block.
///
/// Writes and reads always address offset 0; the node represents a
/// single register block, not a stream. The node only ever yields raw
/// bytes, so queries are always buffer-typed here; scalar sentinels
/// occur on transports that preserve ACPI object types.
pub struct DevNodeTransport {
    file: File,
    path: PathBuf,
}

impl DevNodeTransport {
    /// Open the WMI device node read-write.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Ok(Self { file, path })
    }

    /// Path this transport was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WmiTransport for DevNodeTransport {
    fn block_set(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all_at(data, 0)
    }

    fn block_query(&mut self) -> io::Result<WmiObject> {
        let mut buf = [0u8; READ_BUFFER_LENGTH];
        let n = self.file.read_at(&mut buf, 0)?;
        Ok(WmiObject::Buffer(buf[..n].to_vec()))
    }
}

// =============================================================================
// Mock Transport (tests)
// =============================================================================

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// One transport call, as observed by the mock.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MockEvent {
        Set(Vec<u8>),
        Query,
    }

    /// Scripted transport that records call ordering and injects faults.
    pub struct MockTransport {
        log: Arc<Mutex<Vec<MockEvent>>>,
        replies: VecDeque<io::Result<WmiObject>>,
        fail_sets: u32,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                log: Arc::new(Mutex::new(Vec::new())),
                replies: VecDeque::new(),
                fail_sets: 0,
            }
        }

        /// Handle to the call log, usable after the transport is moved
        /// into a channel.
        pub fn log(&self) -> Arc<Mutex<Vec<MockEvent>>> {
            Arc::clone(&self.log)
        }

        /// Script the next query reply. Unscripted queries yield an
        /// all-zero record-sized buffer.
        pub fn push_reply(&mut self, reply: io::Result<WmiObject>) {
            self.replies.push_back(reply);
        }

        /// Make the next `count` set calls fail with an I/O error.
        pub fn fail_next_sets(&mut self, count: u32) {
            self.fail_sets = count;
        }
    }

    impl WmiTransport for MockTransport {
        fn block_set(&mut self, data: &[u8]) -> io::Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(MockEvent::Set(data.to_vec()));
            if self.fail_sets > 0 {
                self.fail_sets -= 1;
                return Err(io::Error::other("injected set failure"));
            }
            Ok(())
        }

        fn block_query(&mut self) -> io::Result<WmiObject> {
            self.log.lock().unwrap().push(MockEvent::Query);
            self.replies
                .pop_front()
                .unwrap_or_else(|| Ok(WmiObject::Buffer(vec![0u8; crate::protocol::RECORD_LENGTH])))
        }
    }
}
