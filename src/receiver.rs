//! DCC packet receiver for a single input line.
//!
//! This module provides the [`DccReceiver`] struct, which chains the
//! [`PulseClassifier`], the [`PacketFramer`] and a [`CaptureSlot`] into one
//! decoder that turns a DCC track signal into validated packets.
//!
//! The receiver can be driven two ways:
//!
//! - **Edge driven**: call [`on_edge()`](DccReceiver::on_edge) from a pin
//!   change or input capture interrupt with a microsecond timestamp (or
//!   [`on_pulse()`](DccReceiver::on_pulse) with an already measured duration).
//! - **Polled**: call [`sample()`](DccReceiver::sample) every `tick_us`
//!   microseconds from a timer interrupt or a delay loop. The receiver reads
//!   the pin and keeps its own clock.
//!
//! The host side is [`available()`](DccReceiver::available) and
//! [`read()`](DccReceiver::read). Neither blocks.
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! use dccrx::receiver::DccReceiver;
//!
//! fn main() {
//!     # let rx_pin = Pin::new(&[PinTransaction::get(PinState::High)]);
//!     let mut receiver: DccReceiver<Pin> = DccReceiver::new(rx_pin, None, None);
//!     let mut packet = [0u8; 8];
//!
//!     loop {
//!         receiver.sample(); // Called every 4 µs by a delay or timer interrupt
//!         if receiver.available() {
//!             let len = receiver.read(&mut packet);
//!             # let _ = len;
//!         }
//!         # break; // For testing purposes
//!     }
//!     # receiver.rx.done();
//! }
//! ```

use crate::capture::CaptureSlot;
use crate::consts::DEFAULT_TICK_US;
use crate::framer::{DecoderStats, FramerState, PacketFramer};
use crate::timing::{BitSymbol, PulseClassifier};
use embedded_hal::digital::InputPin;

use core::convert::Infallible;

/// A software DCC decoder bound to one input pin.
///
/// The pin must already be configured as an input; DCC idles high, so use a
/// pull-up when the line is driven by an open collector optocoupler.
///
/// ## Type Parameters
///
/// - `RX`: A type implementing [`embedded_hal::digital::InputPin`], sampled in
///   polled mode
///
/// ## Notes
///
/// - Only the newest packet is kept. A host that reads less often than packets
///   arrive loses the ones in between; [`DecoderStats::overwritten`] counts
///   them.
/// - Frames with bad timing, bad length or a bad checksum are dropped without
///   any host visible signal; see [`stats()`](Self::stats).
#[derive(Debug)]
pub struct DccReceiver<RX>
where
    RX: InputPin,
{
    /// RX pin
    pub rx: RX,
    classifier: PulseClassifier,
    framer: PacketFramer,
    slot: CaptureSlot,
    tick_us: u32,
    clock_us: u32,
    last_level: Option<bool>,
    keep_checksum: bool,
}

impl<RX> DccReceiver<RX>
where
    RX: InputPin,
{
    /// Creates a new `DccReceiver` reading from `rx`.
    ///
    /// # Arguments
    /// - `rx`: The input pin carrying the rectified DCC signal.
    /// - `tick_us`: Period between [`sample()`](Self::sample) calls in
    ///   microseconds. Defaults to [`DEFAULT_TICK_US`]. Unused in edge driven
    ///   mode.
    /// - `keep_checksum`: Whether captured packets keep their trailing error
    ///   detection byte. Defaults to `false`, so the host only sees the
    ///   payload.
    ///
    /// # Notes
    /// The pin is not touched until the first `sample()`.
    pub fn new(rx: RX, tick_us: Option<u32>, keep_checksum: Option<bool>) -> Self {
        Self {
            rx,
            classifier: PulseClassifier::new(),
            framer: PacketFramer::new(),
            slot: CaptureSlot::new(),
            tick_us: tick_us.unwrap_or(DEFAULT_TICK_US),
            clock_us: 0,
            last_level: None,
            keep_checksum: keep_checksum.unwrap_or(false),
        }
    }

    /// Sample period used by [`sample()`](Self::sample).
    pub fn tick_us(&self) -> u32 {
        self.tick_us
    }

    /// Handles a transition on the input line at `now_us`.
    ///
    /// Returns `true` when this edge completed a valid packet.
    pub fn on_edge(&mut self, now_us: u32) -> bool {
        match self.classifier.on_edge(now_us, self.framer.in_preamble()) {
            Some(symbol) => self.on_symbol(symbol),
            None => false,
        }
    }

    /// Handles a half-bit measured elsewhere, e.g. by a capture timer.
    ///
    /// Returns `true` when this half completed a valid packet.
    pub fn on_pulse(&mut self, duration_us: u32) -> bool {
        match self.classifier.on_pulse(duration_us, self.framer.in_preamble()) {
            Some(symbol) => self.on_symbol(symbol),
            None => false,
        }
    }

    /// Reads the input pin once and advances the internal clock by `tick_us`.
    ///
    /// Must be called at a steady rate. A read error counts as a low level.
    /// Returns `true` when this sample completed a valid packet.
    pub fn sample(&mut self) -> bool {
        self.clock_us = self.clock_us.wrapping_add(self.tick_us);
        let level = self.rx.is_high().unwrap_or(false);
        match self.last_level.replace(level) {
            Some(previous) if previous != level => self.on_edge(self.clock_us),
            _ => false,
        }
    }

    fn on_symbol(&mut self, symbol: BitSymbol) -> bool {
        let Some(packet) = self.framer.push(symbol) else {
            return false;
        };
        let bytes = if self.keep_checksum {
            packet.as_bytes()
        } else {
            packet.payload()
        };
        if self.slot.store(bytes) {
            let overwritten = &mut self.framer.stats.overwritten;
            *overwritten = overwritten.saturating_add(1);
            trace!("unread packet overwritten");
        }
        true
    }

    /// Checks whether a packet is waiting to be read.
    ///
    /// Does not consume the packet; use [`read()`](Self::read).
    pub fn available(&self) -> bool {
        self.slot.is_ready()
    }

    /// Copies the waiting packet into `buf` and marks it read.
    ///
    /// # Returns
    /// - `0` if no packet is waiting; `buf` is untouched
    /// - otherwise the captured length of the packet. A packet longer than
    ///   `buf` is truncated to `buf.len()` bytes and still marked read, so a
    ///   return value above `buf.len()` means bytes were lost.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        self.slot.drain(buf)
    }

    /// Like [`read()`](Self::read), but reports an empty slot as
    /// [`nb::Error::WouldBlock`] so it composes with [`nb::block!`].
    pub fn read_nb(&mut self, buf: &mut [u8]) -> nb::Result<usize, Infallible> {
        if self.available() {
            Ok(self.read(buf))
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Decoder counters.
    pub fn stats(&self) -> DecoderStats {
        self.framer.stats()
    }

    /// Framer state, mostly useful for diagnostics.
    pub fn state(&self) -> FramerState {
        self.framer.state()
    }

    /// Drops any partial bit or frame and waits for a fresh preamble.
    ///
    /// An unread captured packet stays available.
    pub fn resync(&mut self) {
        self.classifier.reset();
        self.framer.reset();
        self.last_level = None;
    }

    /// Stops decoding and hands back the pin.
    pub fn release(self) -> RX {
        self.rx
    }
}
