//! # dccrx
//!
//! A portable, no_std Rust receiver for NMRA Digital Command Control (DCC), the
//! bit-level protocol used to command model-railway locomotives and accessories.
//!
//! This crate decodes the track signal from a single digital input using:
//! - `embedded-hal` traits for digital input and timing
//! - a half-bit pulse classifier for the NMRA timing windows
//! - a preamble/byte/checksum framing state machine
//! - interrupt-safe capture slot access with `critical-section`
//!
//! ## Crate features
//! | Feature               | Description |
//! |-----------------------|-------------|
//! | `std`                 | Disables `#![no_std]` support |
//! | `delay-loop`          | Uses `embedded_hal::delay::DelayNs` to pace polled sampling |
//! | `timer-isr` (default) | Uses `critical_section::with` for interrupt-driven decoding |
//! | `defmt-0-3`           | Uses `defmt` logging |
//! | `log`                 | Uses `log` logging |
//!
//! ## Pipeline
//!
//! ```text
//! line edges -> timing::PulseClassifier -> framer::PacketFramer -> capture::CaptureSlot -> host
//! ```
//!
//! - [`timing`] turns half-bit durations into `1`, `0` or invalid symbols
//! - [`framer`] finds preambles, assembles bytes and checks the XOR byte
//! - [`capture`] keeps the newest packet with a one-shot ready flag
//! - [`receiver`] ties the three together for one input pin
//! - [`device`] groups lanes behind an explicit handle with install/begin
//!
//! Invalid timing, bad framing and bad checksums are never fatal: the decoder
//! drops the frame, counts it, and looks for the next preamble.
//!
//! ## Usage
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::Mock as Pin;
//! use dccrx::device::DccDevice;
//!
//! # let dcc_pin = Pin::new(&[]);
//! let mut device: DccDevice<Pin, 1> = DccDevice::new(0, None, None);
//! let offset = device.add_program();
//! device.begin(0, dcc_pin, offset).unwrap();
//!
//! // In the pin change interrupt:
//! device.on_edge(0, 1_000);
//!
//! // In the main loop:
//! let mut packet = [0u8; 8];
//! if device.available(0) {
//!     let len = device.read(0, &mut packet);
//! #   let _ = len;
//! }
//! # device.end(0).unwrap().done();
//! ```
//!
//! ## Integration Notes
//!
//! - Edge timestamps must be in microseconds; a timer with at least 4 µs
//!   resolution keeps the `1` window (52..=64 µs) reliable
//! - Polled sampling needs a steady period no longer than ~4 µs
//! - Pull-up and optocoupler wiring are up to the board support code
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "timer-isr")]
pub use critical_section;

pub use heapless;

#[macro_use]
mod fmt;

pub mod capture;
pub mod checksum;
pub mod consts;
pub mod device;
pub mod error;
pub mod framer;
pub mod receiver;
pub mod timer;
pub mod timing;
