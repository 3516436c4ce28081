#![no_std]
#![no_main]

use cortex_m_rt::entry;
use lpc17_cam::clock::{self, ClockConfig};
use lpc17_cam::drivers::Eeprom;
use lpc17_cam::i2c::{i2c1, I2cConfig};
use lpc17_cam_firmware::halt;

#[entry]
fn main() -> ! {
    let cclk = clock::init_clock(&ClockConfig::default());
    let mut i2c = i2c1::init(I2cConfig::new(cclk / 8, 100_000));
    let eeprom = Eeprom::default();

    for (addr, val) in [(0x0000u16, 0x7Fu8), (0x0123, 0xA5)] {
        if let Err(e) = eeprom.set(&mut i2c, addr, val) {
            defmt::error!("eeprom write {=u16:#x}: {}", addr, e);
            halt();
        }
        match eeprom.get(&mut i2c, addr) {
            Ok(read) if read == val => defmt::info!("eeprom {=u16:#x} = {=u8:#x}", addr, read),
            Ok(read) => defmt::warn!("eeprom {=u16:#x}: wrote {=u8:#x}, read {=u8:#x}", addr, val, read),
            Err(e) => defmt::error!("eeprom read {=u16:#x}: {}", addr, e),
        }
    }

    loop {
        clock::delay_ms(500);
    }
}
