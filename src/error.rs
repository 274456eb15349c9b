//! Error types.
//!
//! [`DccError`] is returned to callers that misconfigure a device.
//! [`DecodeError`] never leaves the decoder; it names the reason a frame was
//! dropped so it can be counted and logged.

use thiserror::Error;

/// Configuration errors reported by [`DccDevice`](crate::device::DccDevice).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DccError {
    /// The lane index is not below the number of lanes on the device.
    #[error("lane {lane} is out of range for a device with {lanes} lanes")]
    LaneOutOfRange {
        /// Requested lane.
        lane: usize,
        /// Lanes the device has.
        lanes: usize,
    },
    /// `begin` was called before the decoding program was installed.
    #[error("decoder program is not installed on this device")]
    ProgramNotInstalled,
    /// The program offset was issued by a different device.
    #[error("program offset does not belong to this device")]
    OffsetMismatch,
    /// The lane is already decoding; call `end` first.
    #[error("lane {0} is already running")]
    LaneBusy(usize),
}

/// Reasons the framer discards an in-progress frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DecodeError {
    /// A pulse fell outside both timing windows, or the two halves of a bit
    /// disagreed.
    #[error("invalid bit timing")]
    Timing,
    /// The packet was too short or too long.
    #[error("malformed frame")]
    Framing,
    /// The error detection byte did not match.
    #[error("checksum mismatch")]
    Checksum,
}
