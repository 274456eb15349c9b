use crate::device::{DccDevice, ProgramOffset};
use crate::error::DccError;
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::digital::InputPin;

/// A device shared between interrupt handlers and the main loop.
pub type SharedDccDevice<RX, const LANES: usize> = Mutex<RefCell<DccDevice<RX, LANES>>>;

/// Used to initialize a global static `DccDevice` for use with
/// `critical_section`.
///
/// # Returns
/// * A device with no program installed, wrapped for `critical_section`
///
/// # Example
/// ```rust
/// use dccrx::timer::{SharedDccDevice, global_dcc_device_init};
/// # use embedded_hal_mock::eh1::digital::Mock as PA3;
///
/// static DCC_DEVICE: SharedDccDevice<PA3, 2> = global_dcc_device_init(0, None, None);
/// ```
pub const fn global_dcc_device_init<RX: InputPin, const LANES: usize>(
    id: u8,
    tick_us: Option<u32>,
    keep_checksum: Option<bool>,
) -> SharedDccDevice<RX, LANES> {
    Mutex::new(RefCell::new(DccDevice::new(id, tick_us, keep_checksum)))
}

/// Installs the decoding program on the global device.
///
/// Safe to call from several places; all of them get the same offset.
pub fn global_dcc_add_program<RX: InputPin, const LANES: usize>(
    global_device: &'static SharedDccDevice<RX, LANES>,
) -> ProgramOffset {
    critical_section::with(|cs| global_device.borrow(cs).borrow_mut().add_program())
}

/// Starts `lane` of the global device on `pin`.
///
///# Example
/// ```rust,ignore
/// main() {
///     let offset = global_dcc_add_program(&DCC_DEVICE);
///     global_dcc_begin(&DCC_DEVICE, 0, pa3.into_pull_up_input(), offset).unwrap();
/// }
/// ```
pub fn global_dcc_begin<RX: InputPin, const LANES: usize>(
    global_device: &'static SharedDccDevice<RX, LANES>,
    lane: usize,
    pin: RX,
    offset: ProgramOffset,
) -> Result<(), DccError> {
    critical_section::with(|cs| global_device.borrow(cs).borrow_mut().begin(lane, pin, offset))
}

/// Feeds a line transition to `lane` from a pin change or input capture
/// interrupt.
///
///# Example
/// ```rust,ignore
/// #[interrupt]
/// fn EXTI3() {
///     global_dcc_edge(&DCC_DEVICE, 0, micros());
/// }
/// ```
pub fn global_dcc_edge<RX: InputPin, const LANES: usize>(
    global_device: &'static SharedDccDevice<RX, LANES>,
    lane: usize,
    now_us: u32,
) {
    critical_section::with(|cs| {
        let _ = global_device.borrow(cs).borrow_mut().on_edge(lane, now_us);
    });
}

/// Samples every running lane from a periodic timer interrupt.
///
///# Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     global_dcc_sample(&DCC_DEVICE);
/// }
/// ```
pub fn global_dcc_sample<RX: InputPin, const LANES: usize>(
    global_device: &'static SharedDccDevice<RX, LANES>,
) {
    critical_section::with(|cs| global_device.borrow(cs).borrow_mut().sample_all());
}

/// Whether `lane` of the global device holds an unread packet.
pub fn global_dcc_available<RX: InputPin, const LANES: usize>(
    global_device: &'static SharedDccDevice<RX, LANES>,
    lane: usize,
) -> bool {
    critical_section::with(|cs| global_device.borrow(cs).borrow().available(lane))
}

/// Reads the packet waiting on `lane` of the global device.
///
/// The copy and the flag reset happen in one critical section, so an
/// interrupt can never publish a new packet halfway through.
pub fn global_dcc_read<RX: InputPin, const LANES: usize>(
    global_device: &'static SharedDccDevice<RX, LANES>,
    lane: usize,
    buf: &mut [u8],
) -> usize {
    critical_section::with(|cs| global_device.borrow(cs).borrow_mut().read(lane, buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{CAPTURE_CAPACITY, ONE_HALF_NOMINAL_US, ZERO_HALF_NOMINAL_US};
    use embedded_hal_mock::eh1::digital::Mock as PinMock;

    static DEVICE: SharedDccDevice<PinMock, 2> = global_dcc_device_init(3, None, None);

    #[test]
    fn test_global_device_round_trip() {
        // Nothing running yet, so sampling reads no pin
        global_dcc_sample(&DEVICE);

        let offset = global_dcc_add_program(&DEVICE);
        assert_eq!(global_dcc_add_program(&DEVICE), offset);
        let mut pin = PinMock::new(&[]);
        assert_eq!(global_dcc_begin(&DEVICE, 1, pin.clone(), offset), Ok(()));

        // 12 preamble bits, start bit, [0x03, 0x60, 0x63], end bit
        let mut bits = vec![true; 12];
        bits.push(false);
        for (i, byte) in [0x03u8, 0x60, 0x63].iter().enumerate() {
            bits.extend((0..8).rev().map(|b| byte & (1 << b) != 0));
            bits.push(i == 2);
        }
        let mut now = 0u32;
        global_dcc_edge(&DEVICE, 1, now);
        for bit in bits {
            let half = if bit {
                ONE_HALF_NOMINAL_US
            } else {
                ZERO_HALF_NOMINAL_US
            };
            for _ in 0..2 {
                now += half;
                global_dcc_edge(&DEVICE, 1, now);
            }
        }

        assert!(!global_dcc_available(&DEVICE, 0));
        assert!(global_dcc_available(&DEVICE, 1));
        let mut buf = [0; CAPTURE_CAPACITY];
        assert_eq!(global_dcc_read(&DEVICE, 1, &mut buf), 2);
        assert_eq!(&buf[..2], &[0x03, 0x60]);
        assert_eq!(global_dcc_read(&DEVICE, 1, &mut buf), 0);
        pin.done();
    }
}
