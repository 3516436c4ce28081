//! UART0 on P0.2 (TXD0) / P0.3 (RXD0), polled.

use core::fmt;

use crate::regs::{pincon, sc, Reg};

const BASE: usize = 0x4000_C000;
const RBR_THR_DLL: Reg = Reg::at(BASE);
const DLM: Reg = Reg::at(BASE + 0x04);
const FCR: Reg = Reg::at(BASE + 0x08);
const LCR: Reg = Reg::at(BASE + 0x0C);
const LSR: Reg = Reg::at(BASE + 0x14);

const LSR_RDR: u32 = 0x01;
const LSR_THRE: u32 = 0x20;

pub struct Uart0;

impl Uart0 {
    /// 8N1 at `baud`, FIFOs enabled. `pclk_hz` is the UART0 peripheral clock.
    pub fn init(pclk_hz: u32, baud: u32) -> Self {
        sc::PCONP.modify(|v| v | sc::PCONP_UART0);
        // PCLK_UART0 = CCLK / 4
        sc::PCLKSEL0.set_field(6, 2, 0b00);
        pincon::PINSEL0.set_field(4, 2, 0b01);
        pincon::PINSEL0.set_field(6, 2, 0b01);

        let fdiv = pclk_hz / 16 / baud;
        LCR.write(0x83);
        DLM.write(fdiv / 256);
        RBR_THR_DLL.write(fdiv % 256);
        LCR.write(0x03);
        FCR.write(0x07);
        debug!("uart0: {} baud, divisor {}", baud, fdiv);
        Uart0
    }

    pub fn write_byte(&mut self, byte: u8) {
        while LSR.read() & LSR_THRE == 0 {}
        RBR_THR_DLL.write(byte as u32);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }

    /// Next received byte, if any.
    pub fn read_byte(&mut self) -> Option<u8> {
        if LSR.read() & LSR_RDR == 0 {
            return None;
        }
        Some(RBR_THR_DLL.read() as u8)
    }
}

impl fmt::Write for Uart0 {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}
