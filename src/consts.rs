//! Constants used across the DCC receiver.
//!
//! This module defines the NMRA S-9.1 timing windows, preamble and packet
//! length bounds, and the capacity of the host capture slot.
//!
//! ## Key Concepts
//!
//! - **Half-bit windows**: every DCC bit is two level segments of equal length.
//!   A short segment (~58 µs) belongs to a `1`, a long one (~100 µs) to a `0`.
//! - **Preamble**: at least [`PREAMBLE_MIN_ONES`] consecutive `1` bits must be
//!   seen before a packet start bit is accepted.
//! - **Packet length**: a packet carries [`MIN_PACKET_LEN`] to
//!   [`MAX_PACKET_LEN`] bytes including the trailing XOR error detection byte.
//! - **Capture capacity**: the host always reads into a buffer of
//!   [`CAPTURE_CAPACITY`] bytes.
//!
//! All durations are in microseconds.

/// Shortest half-period accepted as half of a `1` bit.
pub const ONE_HALF_MIN_US: u32 = 52;

/// Nominal half-period of a `1` bit as sent by a command station.
pub const ONE_HALF_NOMINAL_US: u32 = 58;

/// Longest half-period accepted as half of a `1` bit.
pub const ONE_HALF_MAX_US: u32 = 64;

/// Shortest half-period accepted as half of a `0` bit.
pub const ZERO_HALF_MIN_US: u32 = 90;

/// Nominal half-period of a `0` bit as sent by a command station.
pub const ZERO_HALF_NOMINAL_US: u32 = 100;

/// Longest half-period accepted as half of a `0` bit.
///
/// Zero stretching makes long halves legal, but anything above this is a
/// stuck or disconnected line.
pub const ZERO_HALF_MAX_US: u32 = 10_000;

/// Number of consecutive `1` bits that qualify as a preamble.
pub const PREAMBLE_MIN_ONES: u8 = 10;

/// Smallest packet, in bytes, including the error detection byte.
pub const MIN_PACKET_LEN: usize = 3;

/// Largest packet, in bytes, including the error detection byte.
pub const MAX_PACKET_LEN: usize = 6;

/// Size of the host-facing capture buffer.
pub const CAPTURE_CAPACITY: usize = 8;

/// Default sample period for polled reception.
///
/// Fine enough to keep a 58 µs half-period inside the 52..=64 µs window.
pub const DEFAULT_TICK_US: u32 = 4;

/// Offset the decoding program occupies on a device once installed.
pub const DECODER_PROGRAM_OFFSET: u8 = 0;
