//! Turns DCC packets into the line transitions a command station would
//! produce, so tests can drive the receiver end to end.
#![allow(dead_code)]

use dccrx::checksum::xor_checksum;
use dccrx::consts::{ONE_HALF_NOMINAL_US, ZERO_HALF_NOMINAL_US};
use dccrx::receiver::DccReceiver;
use embedded_hal::digital::InputPin;

/// Appends the error detection byte to `payload`.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = payload.to_vec();
    bytes.push(xor_checksum(payload));
    bytes
}

/// Bits of a packet: preamble, start bit, bytes with marker bits, end bit.
pub fn packet_bits(preamble: usize, bytes: &[u8]) -> Vec<bool> {
    let mut bits = vec![true; preamble];
    bits.push(false);
    for (i, byte) in bytes.iter().enumerate() {
        bits.extend((0..8).rev().map(|b| byte & (1 << b) != 0));
        bits.push(i + 1 == bytes.len());
    }
    bits
}

/// Half-periods for a run of bits at nominal timing.
pub fn halves(bits: &[bool]) -> Vec<u32> {
    bits.iter()
        .flat_map(|&bit| {
            let half = if bit {
                ONE_HALF_NOMINAL_US
            } else {
                ZERO_HALF_NOMINAL_US
            };
            [half, half]
        })
        .collect()
}

/// A track signal being fed into a receiver edge by edge.
///
/// Keeps the clock running across packets, so consecutive packets look like
/// one continuous signal.
pub struct Track<'a, RX: InputPin> {
    pub receiver: &'a mut DccReceiver<RX>,
    now_us: u32,
    pub completed: usize,
}

impl<'a, RX: InputPin> Track<'a, RX> {
    /// Starts the signal with an initial edge at `start_us`.
    pub fn new(receiver: &'a mut DccReceiver<RX>, start_us: u32) -> Self {
        let _ = receiver.on_edge(start_us);
        Self {
            receiver,
            now_us: start_us,
            completed: 0,
        }
    }

    /// Emits the edge that ends a half-period of `duration_us`.
    pub fn half(&mut self, duration_us: u32) {
        self.now_us = self.now_us.wrapping_add(duration_us);
        if self.receiver.on_edge(self.now_us) {
            self.completed += 1;
        }
    }

    pub fn halves(&mut self, durations: &[u32]) {
        for &duration in durations {
            self.half(duration);
        }
    }

    pub fn bits(&mut self, bits: &[bool]) {
        self.halves(&halves(bits));
    }

    /// Sends `payload` with its error detection byte after `preamble` ones.
    pub fn packet(&mut self, preamble: usize, payload: &[u8]) {
        self.bits(&packet_bits(preamble, &frame(payload)));
    }

    /// Sends already framed bytes, trailing byte and all.
    pub fn raw_packet(&mut self, preamble: usize, bytes: &[u8]) {
        self.bits(&packet_bits(preamble, bytes));
    }
}
