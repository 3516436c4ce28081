//! Runtime glue shared by the firmware images: vector table, RTT logging
//! and the panic handler.
#![no_std]

use defmt_rtt as _;
use lpc17_cam::regs::INTERRUPT_COUNT;

extern "C" {
    fn WDT();
    fn TIMER0();
    fn TIMER1();
    fn TIMER2();
    fn TIMER3();
    fn UART0();
    fn UART1();
    fn UART2();
    fn UART3();
    fn PWM1();
    fn I2C0();
    fn I2C2();
    fn SPI();
    fn SSP0();
    fn SSP1();
    fn PLL0();
    fn RTC();
    fn EINT0();
    fn EINT1();
    fn EINT2();
    fn EINT3();
    fn ADC();
    fn BOD();
    fn USB();
    fn CAN();
    fn DMA();
    fn I2S();
    fn ENET();
    fn RIT();
    fn MCPWM();
    fn QEI();
    fn PLL1();
    fn USBACT();
    fn CANACT();
}

#[allow(non_snake_case)]
#[no_mangle]
pub extern "C" fn I2C1() {
    lpc17_cam::i2c::i2c1::on_interrupt();
}

#[link_section = ".vector_table.interrupts"]
#[no_mangle]
pub static __INTERRUPTS: [unsafe extern "C" fn(); INTERRUPT_COUNT] = [
    WDT,
    TIMER0,
    TIMER1,
    TIMER2,
    TIMER3,
    UART0,
    UART1,
    UART2,
    UART3,
    PWM1,
    I2C0,
    I2C1,
    I2C2,
    SPI,
    SSP0,
    SSP1,
    PLL0,
    RTC,
    EINT0,
    EINT1,
    EINT2,
    EINT3,
    ADC,
    BOD,
    USB,
    CAN,
    DMA,
    I2S,
    ENET,
    RIT,
    MCPWM,
    QEI,
    PLL1,
    USBACT,
    CANACT,
];

/// Park the core after an unrecoverable bring-up failure.
pub fn halt() -> ! {
    defmt::error!("fatal error, halting");
    loop {
        cortex_m::asm::wfi();
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    defmt::error!("panic: {}", defmt::Display2Format(info));
    loop {}
}
