//! Half-bit pulse timing classifier.
//!
//! DCC is self clocking: the track voltage flips polarity in the middle and at
//! the end of every bit, and the bit value is encoded in how long each level
//! lasts. This module measures the time between line transitions, sorts each
//! measurement into a short (`1`) or long (`0`) half-bit, and pairs matching
//! halves into [`BitSymbol`]s.
//!
//! A pair whose halves disagree, or a half outside both windows, produces
//! [`BitSymbol::Invalid`]. The one exception is the preamble: a run of `1`s
//! looks the same whether pairing is aligned to bit boundaries or one half
//! off, so the misalignment only shows when the long start bit arrives. While
//! the [`PacketFramer`](crate::framer::PacketFramer) is hunting for a
//! preamble, a long half after an unpaired short one is taken as a half-bit
//! slip: the stale short half is dropped and pairing restarts on the long one.

use crate::consts::{ONE_HALF_MAX_US, ONE_HALF_MIN_US, ZERO_HALF_MAX_US, ZERO_HALF_MIN_US};

/// Classification of a single level segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum HalfBit {
    /// Inside the `1` window (52..=64 µs).
    Short,
    /// Inside the `0` window (90..=10000 µs).
    Long,
    /// Outside both windows.
    Invalid,
}

impl HalfBit {
    /// Sorts a measured half-period into a window.
    pub const fn classify(duration_us: u32) -> Self {
        if duration_us >= ONE_HALF_MIN_US && duration_us <= ONE_HALF_MAX_US {
            HalfBit::Short
        } else if duration_us >= ZERO_HALF_MIN_US && duration_us <= ZERO_HALF_MAX_US {
            HalfBit::Long
        } else {
            HalfBit::Invalid
        }
    }
}

/// One decoded DCC bit, or the marker for a timing violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum BitSymbol {
    /// Two long halves.
    Zero,
    /// Two short halves.
    One,
    /// A half outside both windows, or a short/long mismatch.
    Invalid,
}

/// Turns line transitions into [`BitSymbol`]s.
///
/// Holds the timestamp of the previous transition and at most one unpaired
/// half-bit. Timestamps come from a free running microsecond counter; the
/// difference is taken with wrapping arithmetic so counter roll-over is
/// harmless.
#[derive(Debug, Default, Clone)]
pub struct PulseClassifier {
    last_edge_us: Option<u32>,
    pending: Option<HalfBit>,
}

impl PulseClassifier {
    /// Creates a classifier that has not yet seen any transition.
    pub const fn new() -> Self {
        Self {
            last_edge_us: None,
            pending: None,
        }
    }

    /// Forgets the last transition and any unpaired half.
    pub fn reset(&mut self) {
        self.last_edge_us = None;
        self.pending = None;
    }

    /// Feeds the timestamp of a line transition.
    ///
    /// The first transition after construction or [`reset`](Self::reset) only
    /// starts the clock. See [`on_pulse`](Self::on_pulse) for `in_preamble`.
    pub fn on_edge(&mut self, now_us: u32, in_preamble: bool) -> Option<BitSymbol> {
        let last = self.last_edge_us.replace(now_us)?;
        self.on_pulse(now_us.wrapping_sub(last), in_preamble)
    }

    /// Feeds an already measured half-period.
    ///
    /// Returns a symbol every second matching half. On a mismatch the newer
    /// half is kept as the first half of the next bit, which realigns the
    /// pairing to the true bit boundaries at the next change of bit value.
    ///
    /// With `in_preamble` set, a long half following an unpaired short half is
    /// a slip rather than an error: nothing is emitted and the long half
    /// becomes the first half of the next bit.
    pub fn on_pulse(&mut self, duration_us: u32, in_preamble: bool) -> Option<BitSymbol> {
        let half = HalfBit::classify(duration_us);
        if half == HalfBit::Invalid {
            self.pending = None;
            return Some(BitSymbol::Invalid);
        }
        match self.pending.take() {
            None => {
                self.pending = Some(half);
                None
            }
            Some(first) if first == half => Some(match half {
                HalfBit::Short => BitSymbol::One,
                _ => BitSymbol::Zero,
            }),
            Some(HalfBit::Short) if in_preamble => {
                self.pending = Some(half);
                None
            }
            Some(_) => {
                self.pending = Some(half);
                Some(BitSymbol::Invalid)
            }
        }
    }
}
