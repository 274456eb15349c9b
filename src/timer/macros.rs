/// Declares a static global `DCC_DEVICE` protected by a `critical_section` mutex.
///
/// This macro creates a `static` `DCC_DEVICE` suitable for use in
/// interrupt-based environments, where both the main thread and an ISR need
/// to safely access the decoder and its capture slots.
///
/// # Arguments
/// - `$rx`: The concrete type of the input pins (must implement `InputPin`)
/// - `$lanes`: Number of lanes on the device
/// - optionally `$id`, `$tick_us` and `$keep_checksum`, as for
///   [`DccDevice::new`](crate::device::DccDevice::new)
///
/// # Example
/// ```rust
/// # use embedded_hal_mock::eh1::digital::Mock as MyRxPinType;
/// dccrx::init_dcc_device!(MyRxPinType, 2);
/// ```
#[macro_export]
macro_rules! init_dcc_device {
    ( $rx:ty, $lanes:expr ) => {
        $crate::init_dcc_device!($rx, $lanes, 0, None, None);
    };
    ( $rx:ty, $lanes:expr, $id:expr, $tick_us:expr, $keep_checksum:expr ) => {
        pub static DCC_DEVICE: $crate::critical_section::Mutex<
            core::cell::RefCell<$crate::device::DccDevice<$rx, { $lanes }>>,
        > = $crate::critical_section::Mutex::new(core::cell::RefCell::new(
            $crate::device::DccDevice::new($id, $tick_us, $keep_checksum),
        ));
    };
}

/// Installs the program on `DCC_DEVICE` and starts `$lane` on `$pin`.
///
/// Evaluates to the `Result` of [`DccDevice::begin`](crate::device::DccDevice::begin).
///
/// # Example
/// ```rust,ignore
/// main() {
///     setup_dcc_device!(0, pa3).unwrap();
/// }
/// ```
///
/// # Notes
/// - Must be called inside a critical section-aware context (safe in `main()`).
/// - Requires `init_dcc_device!` to have been used earlier.
#[macro_export]
macro_rules! setup_dcc_device {
    ( $lane:expr, $pin:expr ) => {
        $crate::critical_section::with(|cs| {
            let mut device = DCC_DEVICE.borrow(cs).borrow_mut();
            let offset = device.add_program();
            device.begin($lane, $pin, offset)
        })
    };
}

/// Feeds an edge timestamp to `$lane` of `DCC_DEVICE`.
///
/// Intended to be invoked from a pin change or input capture ISR.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn EXTI3() {
///     dcc_edge!(0, micros());
/// }
/// ```
#[macro_export]
macro_rules! dcc_edge {
    ( $lane:expr, $now_us:expr ) => {
        $crate::critical_section::with(|cs| {
            let _ = DCC_DEVICE.borrow(cs).borrow_mut().on_edge($lane, $now_us);
        })
    };
}

/// Samples every running lane of `DCC_DEVICE`.
///
/// This macro is intended to be invoked from a timer ISR every `tick_us`
/// microseconds.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     dcc_sample!();
/// }
/// ```
///
/// # Notes
/// - Safe to call before any lane has started; it does nothing then.
#[macro_export]
macro_rules! dcc_sample {
    () => {
        $crate::critical_section::with(|cs| {
            DCC_DEVICE.borrow(cs).borrow_mut().sample_all();
        })
    };
}

/// Reads the packet waiting on `$lane` of `DCC_DEVICE` into `$buf`.
///
/// Evaluates to the number of bytes copied.
#[macro_export]
macro_rules! dcc_read {
    ( $lane:expr, $buf:expr ) => {
        $crate::critical_section::with(|cs| DCC_DEVICE.borrow(cs).borrow_mut().read($lane, $buf))
    };
}
