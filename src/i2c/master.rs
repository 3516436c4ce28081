//! Interrupt-side master state machine.
//!
//! [`I2cShared::on_interrupt`] is called once per `SI` event with the port that
//! raised it. It never logs, never allocates and clears `SI` exactly once.

use core::cell::RefCell;
use core::ops::BitOr;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::CriticalSectionMutex;

use super::buffers::TransactionBuffers;
use super::state::TransactionState;
use super::status::BusEvent;

/// Control bits shared by the set (`I2CONSET`) and clear (`I2CONCLR`) registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Control(u8);

impl Control {
    /// Assert acknowledge on the next received byte.
    pub const AA: Control = Control(0x04);
    /// Interrupt pending; the bus is held until it is cleared.
    pub const SI: Control = Control(0x08);
    pub const STO: Control = Control(0x10);
    pub const STA: Control = Control(0x20);
    pub const EN: Control = Control(0x40);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Control) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Control {
    type Output = Control;

    fn bitor(self, rhs: Control) -> Control {
        Control(self.0 | rhs.0)
    }
}

/// Register-level view of one I2C controller in master mode.
pub trait I2cPort {
    /// Current status code (`I2STAT`).
    fn status(&self) -> u8;
    /// Load the data register for the next transmit.
    fn write_data(&mut self, byte: u8);
    /// Last received byte.
    fn read_data(&self) -> u8;
    fn set_control(&mut self, flags: Control);
    fn clear_control(&mut self, flags: Control);
    /// A requested STOP has not gone out on the bus yet.
    fn stop_pending(&self) -> bool;
    /// Called on every iteration of the engine's wait loops.
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}

impl<P: I2cPort + ?Sized> I2cPort for &mut P {
    fn status(&self) -> u8 {
        (**self).status()
    }
    fn write_data(&mut self, byte: u8) {
        (**self).write_data(byte)
    }
    fn read_data(&self) -> u8 {
        (**self).read_data()
    }
    fn set_control(&mut self, flags: Control) {
        (**self).set_control(flags)
    }
    fn clear_control(&mut self, flags: Control) {
        (**self).clear_control(flags)
    }
    fn stop_pending(&self) -> bool {
        (**self).stop_pending()
    }
    fn relax(&mut self) {
        (**self).relax()
    }
}

/// State shared between the interrupt handler and the foreground engine.
///
/// `state` is the only field the foreground reads while a transaction runs.
pub struct I2cShared {
    state: AtomicU32,
    buffers: CriticalSectionMutex<RefCell<TransactionBuffers>>,
}

impl Default for I2cShared {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cShared {
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(TransactionState::Idle as u32),
            buffers: CriticalSectionMutex::new(RefCell::new(TransactionBuffers::new())),
        }
    }

    pub fn state(&self) -> TransactionState {
        TransactionState::from_code(self.state.load(Ordering::Acquire)).unwrap_or(TransactionState::Idle)
    }

    pub(crate) fn set_state(&self, state: TransactionState) {
        self.state.store(state.code(), Ordering::Release);
    }

    /// Run `f` with the buffers. Foreground callers must not hold this across a wait.
    pub fn with_buffers<R>(&self, f: impl FnOnce(&mut TransactionBuffers) -> R) -> R {
        self.buffers.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Interrupt entry. Reads the status once and acts on it.
    #[inline]
    pub fn on_interrupt<P: I2cPort + ?Sized>(&self, port: &mut P) {
        let event = BusEvent::decode(port.status());
        self.buffers.lock(|cell| {
            let mut bufs = cell.borrow_mut();
            self.step(event, &mut bufs, port);
        });
    }

    fn step<P: I2cPort + ?Sized>(&self, event: BusEvent, bufs: &mut TransactionBuffers, port: &mut P) {
        match event {
            BusEvent::StartSent => {
                // always SLA+W (or SLA+R for a read-only request) first
                bufs.reset_write_cursor();
                port.write_data(bufs.next_write_byte());
                port.clear_control(Control::SI | Control::STA);
                self.set_state(TransactionState::Pending);
            }
            BusEvent::RepeatedStartSent => {
                bufs.reset_read_cursor();
                // SLA+R stored right after the write phase
                port.write_data(bufs.next_write_byte());
                port.clear_control(Control::SI | Control::STA);
            }
            BusEvent::AddressWriteAck | BusEvent::DataWriteAck => {
                if bufs.write_pending() {
                    port.write_data(bufs.next_write_byte());
                } else if bufs.read_len() != 0 {
                    // answered with 0x10
                    port.set_control(Control::STA);
                } else {
                    self.set_state(TransactionState::Ack);
                    port.set_control(Control::STO);
                }
                port.clear_control(Control::SI);
            }
            BusEvent::AddressWriteNack | BusEvent::AddressReadNack => {
                port.set_control(Control::STO);
                port.clear_control(Control::SI);
                self.set_state(TransactionState::SlaNack);
            }
            BusEvent::DataWriteNack => {
                port.set_control(Control::STO);
                port.clear_control(Control::SI);
                self.set_state(TransactionState::Nack);
            }
            BusEvent::ArbitrationLost => {
                // the controller has already released the bus
                self.set_state(TransactionState::ArbitrationLoss);
                port.clear_control(Control::SI);
            }
            BusEvent::AddressReadAck => {
                if bufs.read_len() == 1 {
                    port.clear_control(Control::AA);
                } else {
                    port.set_control(Control::AA);
                }
                port.clear_control(Control::SI);
            }
            BusEvent::DataReadAck => {
                bufs.store_read_byte(port.read_data());
                if bufs.ack_next_read() {
                    port.set_control(Control::AA);
                } else {
                    port.clear_control(Control::AA);
                }
                port.clear_control(Control::SI);
            }
            BusEvent::DataReadNack => {
                bufs.store_read_byte(port.read_data());
                self.set_state(TransactionState::Ack);
                port.set_control(Control::STO);
                port.clear_control(Control::SI);
            }
            BusEvent::Other(_) => {
                port.clear_control(Control::SI);
            }
        }
    }
}
