use super::I2cError;

/// Progress of the transaction owned by the interrupt handler.
///
/// The numeric codes keep the terminal band above `0x100` so a single compare
/// separates "still running" from "finished".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum TransactionState {
    Idle = 0x000,
    /// START acknowledged by the controller, byte phase running.
    Pending = 0x001,
    /// Every requested byte was transferred.
    Ack = 0x101,
    /// A data byte was rejected.
    Nack = 0x102,
    /// The address byte was rejected (device absent or busy).
    SlaNack = 0x103,
    ArbitrationLoss = 0x104,
}

const TERMINAL_BAND: u32 = 0x100;

impl TransactionState {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0x000 => Some(TransactionState::Idle),
            0x001 => Some(TransactionState::Pending),
            0x101 => Some(TransactionState::Ack),
            0x102 => Some(TransactionState::Nack),
            0x103 => Some(TransactionState::SlaNack),
            0x104 => Some(TransactionState::ArbitrationLoss),
            _ => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        self.code() >= TERMINAL_BAND
    }

    /// Turn a terminal outcome into `Ok(())` or the matching error.
    ///
    /// `execute` only ever returns terminal states; Idle and Pending map to
    /// [`I2cError::Unfinished`].
    pub fn into_result(self) -> Result<(), I2cError> {
        match self {
            TransactionState::Ack => Ok(()),
            TransactionState::Nack => Err(I2cError::DataNack),
            TransactionState::SlaNack => Err(I2cError::AddressNack),
            TransactionState::ArbitrationLoss => Err(I2cError::ArbitrationLost),
            TransactionState::Idle | TransactionState::Pending => Err(I2cError::Unfinished),
        }
    }
}
