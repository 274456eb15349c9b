//! Multi-lane decoding device.
//!
//! A [`DccDevice`] groups up to `LANES` independent [`DccReceiver`]s, the way a
//! programmable I/O block runs one program on several state machines. The
//! device is an explicit value, so several devices (and their interrupt
//! handlers) can coexist without any hidden global.
//!
//! Setup follows three steps:
//!
//! 1. [`add_program()`](DccDevice::add_program) installs the decoder once per
//!    device and hands out a [`ProgramOffset`]. Calling it again returns the
//!    same offset.
//! 2. [`begin()`](DccDevice::begin) starts a lane on an input pin, proving the
//!    program is installed by passing that offset.
//! 3. The interrupt side feeds lanes with [`on_edge()`](DccDevice::on_edge) or
//!    [`sample_all()`](DccDevice::sample_all); the host polls
//!    [`available()`](DccDevice::available) and [`read()`](DccDevice::read).
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::Mock as Pin;
//! use dccrx::device::DccDevice;
//!
//! # fn main() -> Result<(), dccrx::error::DccError> {
//! # let pin = Pin::new(&[]);
//! let mut device: DccDevice<Pin, 4> = DccDevice::new(0, None, None);
//! let offset = device.add_program();
//! device.begin(0, pin, offset)?;
//!
//! let mut packet = [0u8; 8];
//! let len = device.read(0, &mut packet);
//! assert_eq!(len, 0);
//! # device.end(0).unwrap().done();
//! # Ok(())
//! # }
//! ```

use crate::consts::DECODER_PROGRAM_OFFSET;
use crate::error::DccError;
use crate::receiver::DccReceiver;
use embedded_hal::digital::InputPin;

/// Proof that the decoder is installed on a particular device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct ProgramOffset {
    device: u8,
    offset: u8,
}

impl ProgramOffset {
    /// Identifier of the device that issued this offset.
    pub const fn device(&self) -> u8 {
        self.device
    }

    /// Where the program sits on that device.
    pub const fn offset(&self) -> u8 {
        self.offset
    }
}

/// A set of `LANES` decoder lanes sharing one installed program.
#[derive(Debug)]
pub struct DccDevice<RX, const LANES: usize>
where
    RX: InputPin,
{
    id: u8,
    program: Option<ProgramOffset>,
    tick_us: Option<u32>,
    keep_checksum: Option<bool>,
    lanes: [Option<DccReceiver<RX>>; LANES],
}

impl<RX, const LANES: usize> DccDevice<RX, LANES>
where
    RX: InputPin,
{
    /// Creates a device with no program installed and every lane stopped.
    ///
    /// # Arguments
    /// - `id`: Identifies this device; offsets from another device are refused.
    /// - `tick_us`: Sample period handed to every lane, see
    ///   [`DccReceiver::new`].
    /// - `keep_checksum`: Whether lanes capture the error detection byte, see
    ///   [`DccReceiver::new`].
    ///
    /// `const`, so a device can initialize a `static`.
    pub const fn new(id: u8, tick_us: Option<u32>, keep_checksum: Option<bool>) -> Self {
        Self {
            id,
            program: None,
            tick_us,
            keep_checksum,
            lanes: [const { None }; LANES],
        }
    }

    /// Identifier given at construction.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Number of lanes.
    pub const fn lanes(&self) -> usize {
        LANES
    }

    /// Installs the decoding program and returns its offset.
    ///
    /// Idempotent: every caller on the same device gets the same offset.
    pub fn add_program(&mut self) -> ProgramOffset {
        if let Some(offset) = self.program {
            return offset;
        }
        let offset = ProgramOffset {
            device: self.id,
            offset: DECODER_PROGRAM_OFFSET,
        };
        trace!("decoder installed on device {}", self.id);
        self.program = Some(offset);
        offset
    }

    /// The installed program, if any.
    pub fn program(&self) -> Option<ProgramOffset> {
        self.program
    }

    /// Starts decoding on `lane`, reading `pin`.
    ///
    /// `pin` must already be an input with a pull-up so an idle line reads
    /// high.
    ///
    /// # Errors
    /// - [`DccError::ProgramNotInstalled`] before [`add_program()`](Self::add_program)
    /// - [`DccError::OffsetMismatch`] for an offset issued by another device
    /// - [`DccError::LaneOutOfRange`] if `lane >= LANES`
    /// - [`DccError::LaneBusy`] if the lane is already running
    pub fn begin(&mut self, lane: usize, pin: RX, offset: ProgramOffset) -> Result<(), DccError> {
        self.start_lane(lane, pin, offset)
            .inspect_err(|err| warn!("lane {} not started: {}", lane, err))
    }

    fn start_lane(&mut self, lane: usize, pin: RX, offset: ProgramOffset) -> Result<(), DccError> {
        let installed = self.program.ok_or(DccError::ProgramNotInstalled)?;
        if installed != offset {
            return Err(DccError::OffsetMismatch);
        }
        let slot = self
            .lanes
            .get_mut(lane)
            .ok_or(DccError::LaneOutOfRange { lane, lanes: LANES })?;
        if slot.is_some() {
            return Err(DccError::LaneBusy(lane));
        }
        *slot = Some(DccReceiver::new(pin, self.tick_us, self.keep_checksum));
        trace!("lane {} started on device {}", lane, self.id);
        Ok(())
    }

    /// Stops `lane` and returns its pin, or `None` if it was not running.
    pub fn end(&mut self, lane: usize) -> Option<RX> {
        self.lanes.get_mut(lane)?.take().map(DccReceiver::release)
    }

    /// The receiver running on `lane`.
    pub fn receiver(&self, lane: usize) -> Option<&DccReceiver<RX>> {
        self.lanes.get(lane)?.as_ref()
    }

    /// The receiver running on `lane`, mutably.
    pub fn receiver_mut(&mut self, lane: usize) -> Option<&mut DccReceiver<RX>> {
        self.lanes.get_mut(lane)?.as_mut()
    }

    /// Feeds a line transition to `lane`. Returns `true` if it completed a
    /// packet; stopped lanes ignore it.
    pub fn on_edge(&mut self, lane: usize, now_us: u32) -> bool {
        self.receiver_mut(lane)
            .is_some_and(|receiver| receiver.on_edge(now_us))
    }

    /// Samples the pin of `lane` once. See [`DccReceiver::sample`].
    pub fn sample(&mut self, lane: usize) -> bool {
        self.receiver_mut(lane).is_some_and(DccReceiver::sample)
    }

    /// Samples every running lane once, for a shared periodic timer interrupt.
    pub fn sample_all(&mut self) {
        for receiver in self.lanes.iter_mut().flatten() {
            let _ = receiver.sample();
        }
    }

    /// Whether `lane` holds an unread packet. Stopped lanes never do.
    pub fn available(&self, lane: usize) -> bool {
        self.receiver(lane).is_some_and(DccReceiver::available)
    }

    /// Reads the packet waiting on `lane` into `buf`.
    ///
    /// Returns `0` when nothing is waiting or the lane is stopped.
    /// See [`DccReceiver::read`].
    pub fn read(&mut self, lane: usize, buf: &mut [u8]) -> usize {
        self.receiver_mut(lane)
            .map_or(0, |receiver| receiver.read(buf))
    }
}
