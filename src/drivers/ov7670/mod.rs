//! OV7670 register access over SCCB.

use embedded_hal::delay::DelayNs;

use crate::i2c::{I2cError, I2cMaster, I2cPort, TransactionState, RD_BIT};

pub mod ov7670_reg;
use ov7670_reg::*;

/// Read attempts while the sensor keeps rejecting its address.
pub const READ_POLLS: u32 = 1_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    Bus(I2cError),
    /// The transfer completed with something other than Ack.
    Rejected(TransactionState),
    /// Product ID register did not read 0x76.
    WrongId(u8),
}

impl From<I2cError> for SensorError {
    fn from(err: I2cError) -> Self {
        SensorError::Bus(err)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Ov7670 {
    pub addr: u8,
    pub polls: u32,
}

impl Default for Ov7670 {
    fn default() -> Self {
        Self {
            addr: OV7670_ADDR,
            polls: READ_POLLS,
        }
    }
}

impl Ov7670 {
    pub fn set<P: I2cPort>(&self, i2c: &mut I2cMaster<'_, P>, reg: u8, val: u8) -> Result<(), SensorError> {
        expect_ack(i2c.send(self.addr, &[reg, val])?)
    }

    /// SCCB has no repeated START: select the register, pause, then read.
    pub fn get<P: I2cPort, D: DelayNs>(
        &self,
        i2c: &mut I2cMaster<'_, P>,
        delay: &mut D,
        reg: u8,
    ) -> Result<u8, SensorError> {
        // a rejected select leaves the pointer on some other register
        let frame = [self.addr, reg];
        expect_ack(i2c.execute_until_ready(&frame, frame.len(), &mut [], self.polls)?)?;
        delay.delay_ms(1);

        let mut val = [0u8];
        expect_ack(i2c.execute_until_ready(&[self.addr | RD_BIT], 0, &mut val, self.polls)?)?;
        Ok(val[0])
    }

    pub fn probe<P: I2cPort, D: DelayNs>(&self, i2c: &mut I2cMaster<'_, P>, delay: &mut D) -> Result<(), SensorError> {
        match self.get(i2c, delay, REG_PID)? {
            OV7670_PID => Ok(()),
            other => Err(SensorError::WrongId(other)),
        }
    }

    /// Probe, reset, and load the QQVGA RGB565 table.
    pub fn init<P: I2cPort, D: DelayNs>(&self, i2c: &mut I2cMaster<'_, P>, delay: &mut D) -> Result<(), SensorError> {
        info!("ov7670: probing");
        self.probe(i2c, delay)?;
        self.set(i2c, REG_COM7, COM7_RESET)?;
        delay.delay_ms(1);
        for &(reg, val) in OV7670_QQVGA_RGB565 {
            self.set(i2c, reg, val)?;
        }
        info!("ov7670: {} registers written", OV7670_QQVGA_RGB565.len());
        Ok(())
    }
}

fn expect_ack(state: TransactionState) -> Result<(), SensorError> {
    match state {
        TransactionState::Ack => Ok(()),
        other => Err(SensorError::Rejected(other)),
    }
}
