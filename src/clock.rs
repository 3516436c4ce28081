//! PLL0, CLKOUT and cycle-counter delays.

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::DWT;
use embedded_hal::delay::DelayNs;

use crate::regs::{pincon, sc};

/// CPU clock in Hz, updated by [`init_clock`].
static SYSTEM_CLOCK: AtomicU32 = AtomicU32::new(4_000_000);

const PLLSTAT_ENABLED: u32 = 1 << 24;
const PLLSTAT_CONNECTED: u32 = 1 << 25;
const PLLSTAT_LOCKED: u32 = 1 << 26;
const SCS_OSCEN: u32 = 1 << 5;
const SCS_OSCSTAT: u32 = 1 << 6;

#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    pub xtal_hz: u32,
    /// PLL0 multiplier, 6..=512.
    pub pll_m: u16,
    /// PLL0 pre-divider, 1..=32.
    pub pll_n: u8,
    /// CPU clock divider applied to the PLL output.
    pub cclk_div: u8,
    /// CLKOUT divider, 1..=16. Drives the sensor's XCLK.
    pub clkout_div: u8,
}

impl Default for ClockConfig {
    /// 12 MHz crystal, 400 MHz PLL, 100 MHz CPU, CLKOUT at cclk / 15.
    fn default() -> Self {
        Self {
            xtal_hz: 12_000_000,
            pll_m: 100,
            pll_n: 6,
            cclk_div: 4,
            clkout_div: 15,
        }
    }
}

impl ClockConfig {
    pub fn pll_hz(&self) -> u32 {
        2 * self.pll_m as u32 * (self.xtal_hz / self.pll_n as u32)
    }

    pub fn cclk_hz(&self) -> u32 {
        self.pll_hz() / self.cclk_div as u32
    }
}

fn pll0_feed() {
    sc::PLL0FEED.write(0xAA);
    sc::PLL0FEED.write(0x55);
}

/// Run the CPU from PLL0 fed by the main oscillator. Returns the CPU clock.
pub fn init_clock(config: &ClockConfig) -> u32 {
    cortex_m::interrupt::free(|_| {
        if sc::PLL0STAT.read() & PLLSTAT_CONNECTED != 0 {
            sc::PLL0CON.write(1);
            pll0_feed();
        }
        sc::PLL0CON.write(0);
        pll0_feed();

        sc::SCS.modify(|v| v | SCS_OSCEN);
        while sc::SCS.read() & SCS_OSCSTAT == 0 {}
        sc::CLKSRCSEL.write(1);

        let m = config.pll_m as u32 - 1;
        let n = config.pll_n as u32 - 1;
        sc::PLL0CFG.write(m | (n << 16));
        pll0_feed();
        sc::PLL0CON.write(1);
        pll0_feed();

        sc::CCLKCFG.write(config.cclk_div as u32 - 1);
        while sc::PLL0STAT.read() & PLLSTAT_LOCKED == 0 {}

        // 5 wait states, safe up to 100 MHz
        sc::FLASHCFG.write((4 << 12) | 0x03A);

        sc::PLL0CON.write(3);
        pll0_feed();
        let up = PLLSTAT_ENABLED | PLLSTAT_CONNECTED;
        while sc::PLL0STAT.read() & up != up {}
    });

    let cclk = config.cclk_hz();
    SYSTEM_CLOCK.store(cclk, Ordering::Relaxed);
    delay_enable();
    info!("clock: cclk {} Hz", cclk);
    cclk
}

/// Put the CPU clock divided by `clkout_div` on P1.27.
pub fn clkout_enable(config: &ClockConfig) {
    pincon::PINSEL3.set_field(22, 2, 0b01);
    let div = (config.clkout_div.clamp(1, 16) - 1) as u32;
    sc::CLKOUTCFG.write((1 << 8) | (div << 4));
}

pub fn system_clock() -> u32 {
    SYSTEM_CLOCK.load(Ordering::Relaxed)
}

pub fn delay_enable() {
    unsafe {
        let mut p = cortex_m::Peripherals::steal();
        p.DCB.enable_trace();
        p.DWT.enable_cycle_counter();
    }
}

pub fn delay_cycles(n: u32) {
    let start = DWT::cycle_count();
    while DWT::cycle_count().wrapping_sub(start) < n {}
}

pub fn delay_ms(n: u32) {
    CycleDelay.delay_ms(n);
}

/// [`DelayNs`] on the DWT cycle counter. Needs [`init_clock`] or [`delay_enable`] first.
#[derive(Copy, Clone, Default)]
pub struct CycleDelay;

impl DelayNs for CycleDelay {
    fn delay_ns(&mut self, ns: u32) {
        let cycles = ns as u64 * system_clock() as u64 / 1_000_000_000;
        delay_cycles(cycles as u32);
    }
}
