use crate::consts::CAPTURE_CAPACITY;
use crate::receiver::DccReceiver;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

/// Samples `receiver` `samples` times, `tick_us` apart, handing every captured
/// packet to `on_packet`.
///
/// Returns the number of packets delivered.
///
/// # Notes
/// - The time spent in `sample()` and `on_packet` adds to each period; keep
///   `on_packet` short or lower `tick_us` to compensate.
pub fn sample_for<D, RX, F>(
    receiver: &mut DccReceiver<RX>,
    delay: &mut D,
    samples: usize,
    mut on_packet: F,
) -> usize
where
    D: DelayNs,
    RX: InputPin,
    F: FnMut(&[u8]),
{
    let mut delivered = 0;
    for _ in 0..samples {
        if poll_once(receiver, delay, &mut on_packet) {
            delivered += 1;
        }
    }
    delivered
}

/// Runs a blocking loop that samples the DCC line forever.
///
/// This is a simple timing loop for use in environments where interrupts are
/// unavailable or undesired. It drives the receiver using a delay provider
/// implementing `embedded_hal::delay::DelayNs`, waiting
/// [`tick_us()`](DccReceiver::tick_us) between samples.
///
/// # Example
/// ```rust,no_run
/// # use embedded_hal_mock::eh1::{delay::NoopDelay, digital::Mock as Pin};
/// use dccrx::receiver::DccReceiver;
/// use dccrx::timer::run_dcc_sample_loop;
///
/// # let rx = Pin::new(&[]);
/// # let mut delay = NoopDelay::new();
/// let mut receiver = DccReceiver::new(rx, Some(4), None);
/// run_dcc_sample_loop(&mut receiver, &mut delay, |packet| {
///     // decode the instruction bytes here
///     let _ = packet;
/// });
/// ```
///
/// # Notes
/// - This loop will never return; it is intended for single-purpose polling firmware.
/// - For more efficient or concurrent applications, prefer interrupt-driven sampling.
pub fn run_dcc_sample_loop<D, RX, F>(receiver: &mut DccReceiver<RX>, delay: &mut D, mut on_packet: F)
where
    D: DelayNs,
    RX: InputPin,
    F: FnMut(&[u8]),
{
    loop {
        let _ = poll_once(receiver, delay, &mut on_packet);
    }
}

fn poll_once<D, RX, F>(receiver: &mut DccReceiver<RX>, delay: &mut D, on_packet: &mut F) -> bool
where
    D: DelayNs,
    RX: InputPin,
    F: FnMut(&[u8]),
{
    let _ = receiver.sample();
    let mut packet = [0u8; CAPTURE_CAPACITY];
    let len = receiver.read(&mut packet);
    if len > 0 {
        on_packet(&packet[..len]);
    }
    delay.delay_us(receiver.tick_us());
    len > 0
}
