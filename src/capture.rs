//! Single packet capture slot between the decoder and the host.
//!
//! The slot holds at most one unread packet. A new packet overwrites an unread
//! one; this is fine for DCC, where command stations repeat every packet
//! continuously. The ready flag is set exactly when the slot holds bytes the
//! host has not read yet.
//!
//! The slot itself does no locking. When the decoder runs in an interrupt,
//! keep the owning [`DccDevice`](crate::device::DccDevice) behind a
//! `critical_section::Mutex` (see [`crate::timer`]) so the host never sees the
//! ready flag before the bytes behind it.

use crate::consts::CAPTURE_CAPACITY;

use heapless::Vec;

/// Fixed capacity buffer, captured length and one-shot ready flag.
#[derive(Debug, Default, Clone)]
pub struct CaptureSlot {
    bytes: Vec<u8, CAPTURE_CAPACITY>,
    ready: bool,
}

impl CaptureSlot {
    /// Creates an empty, not ready slot.
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            ready: false,
        }
    }

    /// Replaces the slot contents and raises the ready flag.
    ///
    /// Input longer than [`CAPTURE_CAPACITY`] is cut to fit. Returns `true` if
    /// an unread packet was overwritten.
    pub fn store(&mut self, bytes: &[u8]) -> bool {
        let overwritten = self.ready;
        let len = bytes.len().min(CAPTURE_CAPACITY);
        self.bytes.clear();
        let _ = self.bytes.extend_from_slice(&bytes[..len]);
        self.ready = true;
        overwritten
    }

    /// Whether an unread packet is waiting.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Length of the captured packet, read or not.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copies the unread packet into `buf` and clears the ready flag.
    ///
    /// Returns `0` if nothing was ready (and `buf` is left untouched),
    /// otherwise the captured length. Only `buf.len()` bytes are copied when
    /// the packet does not fit.
    pub fn drain(&mut self, buf: &mut [u8]) -> usize {
        if !self.ready {
            return 0;
        }
        let len = self.bytes.len().min(buf.len());
        buf[..len].copy_from_slice(&self.bytes[..len]);
        self.ready = false;
        self.bytes.len()
    }
}
