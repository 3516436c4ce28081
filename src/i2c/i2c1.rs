//! I2C1 on P0.19 (SDA) / P0.20 (SCL).

use cortex_m::peripheral::NVIC;

use super::engine::I2cMaster;
use super::master::{Control, I2cPort, I2cShared};
use super::I2cConfig;
use crate::regs::{pincon, sc, Interrupt, Reg};

const BASE: usize = 0x4005_C000;
const I2CONSET: Reg = Reg::at(BASE);
const I2STAT: Reg = Reg::at(BASE + 0x04);
const I2DAT: Reg = Reg::at(BASE + 0x08);
const I2SCLH: Reg = Reg::at(BASE + 0x10);
const I2SCLL: Reg = Reg::at(BASE + 0x14);
const I2CONCLR: Reg = Reg::at(BASE + 0x18);

/// Transaction state for I2C1, shared with [`on_interrupt`].
pub static I2C1_SHARED: I2cShared = I2cShared::new();

/// Zero-sized handle to the I2C1 register block.
pub struct I2c1;

impl I2cPort for I2c1 {
    #[inline(always)]
    fn status(&self) -> u8 {
        I2STAT.read() as u8
    }

    #[inline(always)]
    fn write_data(&mut self, byte: u8) {
        I2DAT.write(byte as u32);
    }

    #[inline(always)]
    fn read_data(&self) -> u8 {
        I2DAT.read() as u8
    }

    #[inline(always)]
    fn set_control(&mut self, flags: Control) {
        I2CONSET.write(flags.bits() as u32);
    }

    #[inline(always)]
    fn clear_control(&mut self, flags: Control) {
        I2CONCLR.write(flags.bits() as u32);
    }

    #[inline(always)]
    fn stop_pending(&self) -> bool {
        I2CONSET.read() & Control::STO.bits() as u32 != 0
    }
}

/// Body of the I2C1 vector.
#[inline(always)]
pub fn on_interrupt() {
    I2C1_SHARED.on_interrupt(&mut I2c1);
}

/// Route the pins, clock the block, program the bit rate, unmask the interrupt
/// and enable the controller. Call once.
pub fn init(config: I2cConfig) -> I2cMaster<'static, I2c1> {
    sc::PCONP.modify(|v| v | sc::PCONP_I2C1);

    // P0.19 SDA1, P0.20 SCL1: function 3, no pulls, open drain
    pincon::PINSEL1.set_field(6, 2, 0b11);
    pincon::PINSEL1.set_field(8, 2, 0b11);
    pincon::PINMODE1.set_field(6, 2, pincon::MODE_NO_PULL);
    pincon::PINMODE1.set_field(8, 2, pincon::MODE_NO_PULL);
    pincon::PINMODE_OD0.modify(|v| v | (0b11 << 19));

    // PCLK_I2C1 = CCLK / 8
    sc::PCLKSEL1.set_field(6, 2, 0b11);

    let clear = Control::AA | Control::SI | Control::STA | Control::EN;
    I2CONCLR.write(clear.bits() as u32);

    let (high, low) = config.duty_cycle();
    I2SCLH.write(high as u32);
    I2SCLL.write(low as u32);
    info!(
        "i2c1: {} Hz requested, sclh={} scll={}",
        config.freq,
        high,
        low
    );

    unsafe { NVIC::unmask(Interrupt::I2C1) };
    I2CONSET.write(Control::EN.bits() as u32);

    I2cMaster::new(&I2C1_SHARED, I2c1, config)
}
