//! Drive helpers and timer arithmetic for the DCC receiver.
//!
//! The decoder has to be fed from somewhere. This employs two approaches: an
//! interrupt service routine using `critical_section::with` (`timer-isr`
//! feature), or a busy-loop sampler (`delay-loop` feature).
//!
//! Contains helpers for polling- and ISR-based scheduling, including:
//! - `compute_ocr_value`: runtime OCR calculator for a periodic sample timer
//! - `const_ocr_value`: compile-time OCR calculator
//! - `ticks_to_us`: converts an input capture tick delta into microseconds
//! - `run_dcc_sample_loop` / `sample_for`: blocking sampler over `DelayNs`
//!   (feature `delay-loop`)
//! - `global_dcc_edge`, `global_dcc_sample`, `dcc_edge!()` and friends:
//!   interrupt-side wrappers around a shared device (feature `timer-isr`)
//!
//! Sample periods at common AVR settings (16 MHz clock):
//!
//! | PRESCALER | OCR | Sample period |
//! |-----------|-----|---------------|
//! |         1 |  64 |          4 µs |
//! |         8 |   8 |          4 µs |
//! |         8 |  10 |          5 µs |
//! |        64 |   1 |          4 µs |

use libm::round;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;
#[cfg_attr(feature = "timer-isr", allow(unused_imports))]
#[cfg(feature = "timer-isr")]
pub use macros::*;

/// 1,000,000 microseconds = 1 second
pub const MICROSECONDS_PER_SECOND: u32 = 1_000_000;

/// Computes the OCR value for a periodic sample timer (CTC mode).
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `prescaler`: timer prescaler (e.g., 1, 8, 64)
/// - `tick_us`: desired sample interval in microseconds (e.g., 4.0)
///
/// # Returns
/// - OCR value for OCRnA (rounds to nearest integer)
/// - The sample period that OCR value really produces, rounded to whole
///   microseconds (for initializing the `DccReceiver`)
pub fn compute_ocr_value(f_cpu: u32, prescaler: u32, tick_us: f32) -> (u16, u32) {
    let ticks_per_second: f64 = f_cpu as f64 / prescaler as f64;
    let ticks_per_tick: f64 = ticks_per_second * (tick_us as f64 / MICROSECONDS_PER_SECOND as f64);
    let ocr = round(ticks_per_tick) as u16;
    let period_us = round(ocr as f64 * MICROSECONDS_PER_SECOND as f64 / ticks_per_second) as u32;
    (ocr, period_us)
}

/// Compile-time OCR value calculator
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `prescaler`: timer prescaler (e.g., 1, 8, 64)
/// - `tick_us`: desired sample interval in whole microseconds
///
/// # Returns
/// - OCR value for OCRnA (truncated)
/// - `None` for a zero `prescaler`, or when the value does not fit OCRnA
pub const fn const_ocr_value(f_cpu: u32, prescaler: u32, tick_us: u32) -> Option<u16> {
    let Some(ticks_per_second) = f_cpu.checked_div(prescaler) else {
        return None;
    };
    let ocr = ticks_per_second as u64 * tick_us as u64 / MICROSECONDS_PER_SECOND as u64;
    if ocr > u16::MAX as u64 {
        None
    } else {
        Some(ocr as u16)
    }
}

/// Converts a tick count of a `timer_hz` timer into microseconds.
///
/// Meant for the difference between two input captures, which can then be
/// passed to [`DccReceiver::on_pulse`](crate::receiver::DccReceiver::on_pulse).
/// A zero `timer_hz` gives `None`; results beyond `u32::MAX` saturate, which
/// any half-bit classifier treats as out of window.
pub const fn ticks_to_us(ticks: u32, timer_hz: u32) -> Option<u32> {
    let Some(us) = (ticks as u64 * MICROSECONDS_PER_SECOND as u64).checked_div(timer_hz as u64)
    else {
        return None;
    };
    if us > u32::MAX as u64 {
        Some(u32::MAX)
    } else {
        Some(us as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_ocr_value() {
        assert_eq!(compute_ocr_value(16_000_000, 8, 4.0), (8, 4));
        assert_eq!(compute_ocr_value(16_000_000, 64, 5.0), (1, 4));
    }

    #[test]
    fn test_const_ocr_value() {
        const OCR: Option<u16> = const_ocr_value(16_000_000, 8, 4);
        assert_eq!(OCR, Some(8));
        assert_eq!(const_ocr_value(16_000_000, 1, 4), Some(64));
    }

    #[test]
    fn test_const_ocr_value_rejects_bad_input() {
        assert_eq!(const_ocr_value(16_000_000, 0, 4), None);
        // 16 MHz for 10 ms is 160_000 ticks, too many for a 16 bit OCR
        assert_eq!(const_ocr_value(16_000_000, 1, 10_000), None);
    }

    #[test]
    fn test_ticks_to_us() {
        assert_eq!(ticks_to_us(116, 2_000_000), Some(58));
        assert_eq!(ticks_to_us(100, 1_000_000), Some(100));
        assert_eq!(ticks_to_us(1_600, 16_000_000), Some(100));
    }

    #[test]
    fn test_ticks_to_us_zero_rate_and_saturation() {
        assert_eq!(ticks_to_us(100, 0), None);
        assert_eq!(ticks_to_us(u32::MAX, 1), Some(u32::MAX));
    }
}
