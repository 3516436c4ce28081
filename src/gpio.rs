//! Fast GPIO: plain output pins and the camera's parallel port.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::camera::ParallelPort;
use crate::regs::{pincon, FioPort, Reg, GPIO0, GPIO2};

const PINCON_BASE: usize = 0x4002_C000;

pub struct GpioPin {
    fio: FioPort,
    port: u8,
    pin: u8,
}

pub const CAM_RESET_P0_22: GpioPin = GpioPin {
    fio: GPIO0,
    port: 0,
    pin: 22,
};

impl GpioPin {
    fn mask(&self) -> u32 {
        1 << self.pin
    }

    fn pinsel(&self) -> Reg {
        Reg::at(PINCON_BASE + (self.port as usize * 2 + self.pin as usize / 16) * 4)
    }

    fn pinmode(&self) -> Reg {
        Reg::at(PINCON_BASE + 0x40 + (self.port as usize * 2 + self.pin as usize / 16) * 4)
    }

    /// GPIO function, no pulls, output.
    pub fn setup_output(&self) {
        let shift = (self.pin as u32 % 16) * 2;
        self.pinsel().set_field(shift, 2, 0);
        self.pinmode().set_field(shift, 2, pincon::MODE_NO_PULL);
        self.fio.dir().modify(|v| v | self.mask());
    }

    pub fn set_high(&self) {
        self.fio.set().write(self.mask());
    }

    pub fn set_low(&self) {
        self.fio.clr().write(self.mask());
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        GpioPin::set_low(self);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        GpioPin::set_high(self);
        Ok(())
    }
}

/// Port 2 as the sensor bus: D0..D7 on P2.0..P2.7, VSYNC P2.8, HREF P2.11, PCLK P2.12.
pub struct CameraPort;

impl CameraPort {
    /// Route the bus pins to GPIO and make them inputs.
    pub fn setup() -> Self {
        // P2.0..P2.8 are PINSEL4 bits 0..17, P2.11/P2.12 bits 22..25
        pincon::PINSEL4.modify(|v| v & !0x0003_FFFF & !(0xF << 22));
        GPIO2.dir().modify(|v| v & !0x19FF);
        CameraPort
    }
}

impl ParallelPort for CameraPort {
    #[inline(always)]
    fn read(&mut self) -> u32 {
        GPIO2.pin().read()
    }
}

/// Pulse the sensor's reset line low for 100 ms and let it settle.
pub fn camera_reset<D: DelayNs>(pin: &GpioPin, delay: &mut D) {
    pin.setup_output();
    pin.set_low();
    delay.delay_ms(100);
    pin.set_high();
    delay.delay_ms(100);
}
