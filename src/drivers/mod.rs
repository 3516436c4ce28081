//! Device drivers layered on the interrupt-driven I2C engine.

pub mod eeprom;
pub mod ov7670;

pub use eeprom::{Eeprom, EepromError};
pub use ov7670::{Ov7670, SensorError};
