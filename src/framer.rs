//! Bit synchronizer and packet framer.
//!
//! Consumes [`BitSymbol`]s and reassembles DCC packets:
//!
//! ```text
//! 1111111111...1 0 AAAAAAAA 0 DDDDDDDD 0 ... 0 EEEEEEEE 1
//! |  preamble  | |  byte   | |  byte   |     | check  | end
//!              start       marker
//! ```
//!
//! The framer hunts for at least [`PREAMBLE_MIN_ONES`] consecutive `1` bits,
//! waits for the `0` start bit, then reads bytes most significant bit first,
//! each followed by a marker bit (`0` = another byte, `1` = end of packet).
//! A finished packet is only returned if its length is within
//! [`MIN_PACKET_LEN`]..=[`MAX_PACKET_LEN`] and its last byte is the XOR of the
//! others.
//!
//! Any [`BitSymbol::Invalid`] throws away the frame in progress and restarts
//! the preamble search. No error ever escapes; drops are counted in
//! [`DecoderStats`].

use crate::checksum::verify_checksum;
use crate::consts::{MAX_PACKET_LEN, MIN_PACKET_LEN, PREAMBLE_MIN_ONES};
use crate::error::DecodeError;
use crate::timing::BitSymbol;

use core::mem;
use heapless::Vec;

/// Where the framer is within a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FramerState {
    /// Counting consecutive `1` bits.
    #[default]
    SeekPreamble,
    /// Preamble complete, waiting for the `0` start bit.
    SeekPacketStart,
    /// Shifting in the eight bits of a byte.
    ReadByte,
    /// Reading the bit that follows each byte.
    ReadBitMarker,
}

/// A framed DCC packet, error detection byte included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Packet {
    bytes: Vec<u8, MAX_PACKET_LEN>,
}

impl Packet {
    /// Builds a packet from raw bytes, or `None` if there are more than
    /// [`MAX_PACKET_LEN`] of them.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        Vec::from_slice(bytes).ok().map(|bytes| Self { bytes })
    }

    /// All bytes as received, error detection byte last.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes before the error detection byte.
    pub fn payload(&self) -> &[u8] {
        match self.bytes.split_last() {
            Some((_, body)) => body,
            None => &[],
        }
    }

    /// The error detection byte.
    pub fn checksum(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    /// Number of bytes, error detection byte included.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes have been collected.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the length is legal and the error detection byte matches.
    pub fn is_valid(&self) -> bool {
        (MIN_PACKET_LEN..=MAX_PACKET_LEN).contains(&self.len()) && verify_checksum(&self.bytes)
    }
}

/// Running counters kept by the decoder.
///
/// Counters saturate instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct DecoderStats {
    /// Packets that passed validation.
    pub packets_ok: u16,
    /// Packets dropped because the error detection byte did not match.
    pub checksum_errors: u16,
    /// Invalid bit symbols seen.
    pub timing_errors: u16,
    /// Frames dropped for being too short or too long.
    pub framing_errors: u16,
    /// Captured packets replaced before the host read them.
    pub overwritten: u16,
}

impl DecoderStats {
    /// All counters at zero.
    pub const fn new() -> Self {
        Self {
            packets_ok: 0,
            checksum_errors: 0,
            timing_errors: 0,
            framing_errors: 0,
            overwritten: 0,
        }
    }

    pub(crate) fn record(&mut self, err: DecodeError) {
        let counter = match err {
            DecodeError::Timing => &mut self.timing_errors,
            DecodeError::Framing => &mut self.framing_errors,
            DecodeError::Checksum => &mut self.checksum_errors,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Packet framing state machine.
#[derive(Debug, Clone)]
pub struct PacketFramer {
    state: FramerState,
    preamble_ones: u8,
    bit_count: u8,
    byte: u8,
    packet: Packet,
    pub(crate) stats: DecoderStats,
}

impl Default for PacketFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketFramer {
    /// Creates a framer searching for a preamble.
    pub const fn new() -> Self {
        Self {
            state: FramerState::SeekPreamble,
            preamble_ones: 0,
            bit_count: 0,
            byte: 0,
            packet: Packet { bytes: Vec::new() },
            stats: DecoderStats::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Consecutive `1` bits seen in the current preamble. Saturates at 255.
    pub fn preamble_ones(&self) -> u8 {
        self.preamble_ones
    }

    /// Whether the framer is still looking for a preamble or the start bit
    /// after it, i.e. no frame is in progress.
    pub fn in_preamble(&self) -> bool {
        matches!(
            self.state,
            FramerState::SeekPreamble | FramerState::SeekPacketStart
        )
    }

    /// Counters since construction.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Drops any frame in progress and goes back to preamble search.
    ///
    /// Counters are kept.
    pub fn reset(&mut self) {
        self.state = FramerState::SeekPreamble;
        self.preamble_ones = 0;
        self.bit_count = 0;
        self.byte = 0;
        self.packet.bytes.clear();
    }

    /// Advances the state machine by one bit.
    ///
    /// Returns the packet when this bit completed a valid one.
    pub fn push(&mut self, symbol: BitSymbol) -> Option<Packet> {
        let bit = match symbol {
            BitSymbol::One => true,
            BitSymbol::Zero => false,
            BitSymbol::Invalid => {
                self.discard(DecodeError::Timing);
                return None;
            }
        };

        match self.state {
            FramerState::SeekPreamble => {
                if bit {
                    self.preamble_ones = self.preamble_ones.saturating_add(1);
                    if self.preamble_ones >= PREAMBLE_MIN_ONES {
                        self.state = FramerState::SeekPacketStart;
                    }
                } else {
                    self.preamble_ones = 0;
                }
            }
            FramerState::SeekPacketStart => {
                if bit {
                    self.preamble_ones = self.preamble_ones.saturating_add(1);
                } else {
                    self.packet.bytes.clear();
                    self.start_byte();
                }
            }
            FramerState::ReadByte => {
                self.byte = (self.byte << 1) | u8::from(bit);
                self.bit_count += 1;
                if self.bit_count == 8 {
                    if self.packet.bytes.push(self.byte).is_err() {
                        self.discard(DecodeError::Framing);
                        return None;
                    }
                    self.state = FramerState::ReadBitMarker;
                }
            }
            FramerState::ReadBitMarker => {
                if bit {
                    return self.complete();
                }
                if self.packet.len() >= MAX_PACKET_LEN {
                    // More bytes announced than a packet may carry
                    self.discard(DecodeError::Framing);
                } else {
                    self.start_byte();
                }
            }
        }
        None
    }

    fn start_byte(&mut self) {
        self.byte = 0;
        self.bit_count = 0;
        self.state = FramerState::ReadByte;
    }

    fn complete(&mut self) -> Option<Packet> {
        let packet = mem::take(&mut self.packet);
        self.reset();

        if !(MIN_PACKET_LEN..=MAX_PACKET_LEN).contains(&packet.len()) {
            self.stats.record(DecodeError::Framing);
            debug!("dropped {} byte frame: {}", packet.len(), DecodeError::Framing);
            return None;
        }
        if !verify_checksum(packet.as_bytes()) {
            self.stats.record(DecodeError::Checksum);
            debug!("dropped {} byte frame: {}", packet.len(), DecodeError::Checksum);
            return None;
        }

        self.stats.packets_ok = self.stats.packets_ok.saturating_add(1);
        trace!("framed {} byte packet", packet.len());
        Some(packet)
    }

    fn discard(&mut self, err: DecodeError) {
        self.stats.record(err);
        if matches!(
            self.state,
            FramerState::ReadByte | FramerState::ReadBitMarker
        ) {
            debug!("dropped frame after {} bytes: {}", self.packet.len(), err);
        }
        self.reset();
    }
}
