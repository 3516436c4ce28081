//! Interrupt-driven I2C master.
//!
//! ```text
//! foreground                         interrupt (SI)
//! I2cMaster::execute ──load──► I2cShared ◄── on_interrupt(status)
//!        │ STA                        │ state / cursors
//!        └──spin on state◄────────────┘
//! ```

pub mod buffers;
pub mod engine;
mod hal;
pub mod master;
pub mod state;
pub mod status;

#[cfg(target_arch = "arm")]
pub mod i2c1;

pub use buffers::{TransactionBuffers, READ_CAPACITY, WRITE_CAPACITY};
pub use engine::{validate_request, I2cMaster, RD_BIT};
pub use master::{Control, I2cPort, I2cShared};
pub use state::TransactionState;
pub use status::BusEvent;

/// Spins allowed between requesting START and seeing it acknowledged.
pub const MAX_TIMEOUT: u32 = 0x00FF_FFFF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// The controller never acknowledged START. Hardware fault.
    StartTimeout,
    /// Address byte not acknowledged.
    AddressNack,
    /// Data byte not acknowledged.
    DataNack,
    ArbitrationLost,
    /// Nothing to send, or a zero-length read.
    EmptyRequest,
    WriteOverflow,
    ReadOverflow,
    /// A SLA+R byte follows the write phase but no read length was given.
    ReadPhaseWithoutLength,
    /// A read length was given after a write phase but no SLA+R byte.
    MissingReadAddress,
    /// `write_len` and the supplied bytes disagree.
    LengthMismatch,
    /// R/W bit of an address byte does not match its phase.
    AddressDirection,
    InvalidAddress,
    /// Operation sequence that cannot be expressed as one write-then-read.
    UnsupportedOperation,
    /// The device kept rejecting its address for the whole poll budget.
    DeviceNotReady,
    /// A state that is not an outcome yet (Idle or Pending).
    Unfinished,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Peripheral clock feeding the controller.
    pub pclk_hz: u32,
    /// Bus frequency.
    pub freq: u32,
    pub start_timeout: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            pclk_hz: 12_500_000, // cclk / 8
            freq: 100_000,
            start_timeout: MAX_TIMEOUT,
        }
    }
}

impl I2cConfig {
    pub fn new(pclk_hz: u32, freq: u32) -> Self {
        Self {
            pclk_hz,
            freq,
            ..Default::default()
        }
    }

    /// `(SCLH, SCLL)` for a 50% duty cycle at `freq`.
    pub fn duty_cycle(&self) -> (u16, u16) {
        let half = self.pclk_hz / self.freq.max(1) / 2;
        let half = half.clamp(4, u16::MAX as u32) as u16;
        (half, half)
    }
}
