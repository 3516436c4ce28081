//! 24LC512-class serial EEPROM with 16-bit word addresses.

use crate::i2c::{I2cError, I2cMaster, I2cPort, TransactionState, RD_BIT};

/// Bus address with A2..A0 tied low, 8-bit form.
pub const EEPROM_ADDR: u8 = 0xA0;
/// Address polls allowed while an internal write cycle finishes.
pub const WRITE_CYCLE_POLLS: u32 = 1_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromError {
    Bus(I2cError),
    /// The transfer completed with something other than Ack.
    Rejected(TransactionState),
}

impl From<I2cError> for EepromError {
    fn from(err: I2cError) -> Self {
        EepromError::Bus(err)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Eeprom {
    pub addr: u8,
    pub polls: u32,
}

impl Default for Eeprom {
    fn default() -> Self {
        Self {
            addr: EEPROM_ADDR,
            polls: WRITE_CYCLE_POLLS,
        }
    }
}

impl Eeprom {
    pub fn new(addr: u8) -> Self {
        Self {
            addr: addr & !RD_BIT,
            ..Self::default()
        }
    }

    /// Write one byte. The device starts its write cycle after STOP and
    /// ignores its address until the cycle is done.
    pub fn set<P: I2cPort>(&self, i2c: &mut I2cMaster<'_, P>, addr: u16, val: u8) -> Result<(), EepromError> {
        let [hi, lo] = addr.to_be_bytes();
        expect_ack(i2c.send(self.addr, &[hi, lo, val])?)
    }

    /// Random read of one byte, retried while a write cycle is still running.
    pub fn get<P: I2cPort>(&self, i2c: &mut I2cMaster<'_, P>, addr: u16) -> Result<u8, EepromError> {
        let [hi, lo] = addr.to_be_bytes();
        let frame = [self.addr, hi, lo, self.addr | RD_BIT];
        let mut val = [0u8];
        let state = i2c.execute_until_ready(&frame, 3, &mut val, self.polls)?;
        expect_ack(state)?;
        Ok(val[0])
    }
}

fn expect_ack(state: TransactionState) -> Result<(), EepromError> {
    match state {
        TransactionState::Ack => Ok(()),
        other => Err(EepromError::Rejected(other)),
    }
}
