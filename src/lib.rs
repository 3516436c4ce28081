#![cfg_attr(not(test), no_std)]

// Pure modules (available everywhere)
#[macro_use]
mod fmt;
pub mod camera;
pub mod console;
pub mod drivers;
pub mod i2c;

// Hardware modules (available only on ARM)
#[cfg(target_arch = "arm")]
pub mod clock;
#[cfg(target_arch = "arm")]
pub mod gpio;
#[cfg(target_arch = "arm")]
pub mod regs;
#[cfg(target_arch = "arm")]
pub mod usart;
