//! Raw LPC17xx register access. Addresses from UM10360.

use core::ptr::{read_volatile, write_volatile};

#[derive(Copy, Clone)]
pub struct Reg(usize);

impl Reg {
    pub const fn at(addr: usize) -> Self {
        Reg(addr)
    }

    #[inline(always)]
    pub fn read(self) -> u32 {
        unsafe { read_volatile(self.0 as *const u32) }
    }

    #[inline(always)]
    pub fn write(self, val: u32) {
        unsafe { write_volatile(self.0 as *mut u32, val) }
    }

    #[inline(always)]
    pub fn modify(self, f: impl FnOnce(u32) -> u32) {
        self.write(f(self.read()));
    }

    /// Replace the `width`-bit field at `shift`.
    #[inline(always)]
    pub fn set_field(self, shift: u32, width: u32, val: u32) {
        let mask = ((1 << width) - 1) << shift;
        self.modify(|v| (v & !mask) | ((val << shift) & mask));
    }
}

pub mod sc {
    use super::Reg;
    const BASE: usize = 0x400F_C000;
    pub const FLASHCFG: Reg = Reg::at(BASE);
    pub const PLL0CON: Reg = Reg::at(BASE + 0x080);
    pub const PLL0CFG: Reg = Reg::at(BASE + 0x084);
    pub const PLL0STAT: Reg = Reg::at(BASE + 0x088);
    pub const PLL0FEED: Reg = Reg::at(BASE + 0x08C);
    pub const PCONP: Reg = Reg::at(BASE + 0x0C4);
    pub const CCLKCFG: Reg = Reg::at(BASE + 0x104);
    pub const CLKSRCSEL: Reg = Reg::at(BASE + 0x10C);
    pub const SCS: Reg = Reg::at(BASE + 0x1A0);
    pub const PCLKSEL0: Reg = Reg::at(BASE + 0x1A8);
    pub const PCLKSEL1: Reg = Reg::at(BASE + 0x1AC);
    pub const CLKOUTCFG: Reg = Reg::at(BASE + 0x1C8);

    pub const PCONP_UART0: u32 = 1 << 3;
    pub const PCONP_I2C1: u32 = 1 << 19;
}

pub mod pincon {
    use super::Reg;
    const BASE: usize = 0x4002_C000;
    pub const PINSEL0: Reg = Reg::at(BASE);
    pub const PINSEL1: Reg = Reg::at(BASE + 0x04);
    pub const PINSEL3: Reg = Reg::at(BASE + 0x0C);
    pub const PINSEL4: Reg = Reg::at(BASE + 0x10);
    pub const PINMODE1: Reg = Reg::at(BASE + 0x44);
    pub const PINMODE_OD0: Reg = Reg::at(BASE + 0x68);

    /// Pin mode field value: neither pull-up nor pull-down.
    pub const MODE_NO_PULL: u32 = 0b10;
}

/// Fast GPIO port block.
#[derive(Copy, Clone)]
pub struct FioPort {
    base: usize,
}

impl FioPort {
    pub const fn dir(self) -> Reg {
        Reg::at(self.base)
    }
    pub const fn pin(self) -> Reg {
        Reg::at(self.base + 0x14)
    }
    pub const fn set(self) -> Reg {
        Reg::at(self.base + 0x18)
    }
    pub const fn clr(self) -> Reg {
        Reg::at(self.base + 0x1C)
    }
}

pub const GPIO0: FioPort = FioPort { base: 0x2009_C000 };
pub const GPIO2: FioPort = FioPort { base: 0x2009_C040 };

/// Device interrupt lines used by this crate.
#[derive(Copy, Clone, Debug)]
#[repr(u16)]
pub enum Interrupt {
    UART0 = 5,
    I2C1 = 11,
}

unsafe impl cortex_m::interrupt::InterruptNumber for Interrupt {
    fn number(self) -> u16 {
        self as u16
    }
}

/// Number of device vectors on the LPC176x.
pub const INTERRUPT_COUNT: usize = 35;
