#![no_std]
#![no_main]

use core::fmt::Write;
use core::ptr::addr_of_mut;

use cortex_m_rt::entry;
use lpc17_cam::camera::{qqvga_plane, CapturePins, FramePlanes, QqvgaPlane, QQVGA_WIDTH};
use lpc17_cam::clock::{self, ClockConfig, CycleDelay};
use lpc17_cam::console::{format_register, Command, LineBuffer, REPLY_ERR, REPLY_OK};
use lpc17_cam::drivers::Ov7670;
use lpc17_cam::gpio::{self, CameraPort, CAM_RESET_P0_22};
use lpc17_cam::i2c::{i2c1, I2cConfig};
use lpc17_cam::usart::Uart0;
use lpc17_cam_firmware::halt;

const BAUD: u32 = 921_600;

static mut PLANE_A: QqvgaPlane = qqvga_plane();
#[link_section = ".ahb_sram"]
static mut PLANE_B: QqvgaPlane = qqvga_plane();

#[entry]
fn main() -> ! {
    let clocks = ClockConfig::default();
    let cclk = clock::init_clock(&clocks);
    clock::clkout_enable(&clocks);

    let mut uart = Uart0::init(cclk / 4, BAUD);
    let mut delay = CycleDelay;
    let mut i2c = i2c1::init(I2cConfig::new(cclk / 8, 100_000));

    let mut port = CameraPort::setup();
    gpio::camera_reset(&CAM_RESET_P0_22, &mut delay);
    let sensor = Ov7670::default();
    if let Err(e) = sensor.init(&mut i2c, &mut delay) {
        defmt::error!("ov7670 init failed: {}", e);
        halt();
    }

    // only touched from here on
    let (a, b) = unsafe { (&mut *addr_of_mut!(PLANE_A), &mut *addr_of_mut!(PLANE_B)) };
    let Ok(mut planes) = FramePlanes::new(&mut a[..], &mut b[..], QQVGA_WIDTH) else {
        halt();
    };
    planes.clear();

    defmt::info!("camtest says hi, cclk {} Hz", cclk);
    let _ = uart.write_str("Camtest says hi!\r\n");

    let mut console = LineBuffer::new();
    loop {
        let Some(byte) = uart.read_byte() else {
            continue;
        };
        let Some(line) = console.push(byte) else {
            continue;
        };

        match Command::parse(&line) {
            Command::GetImage => {
                planes.capture(&mut port, CapturePins::DEFAULT);
                let (ma, mb) = planes.missing_pixels();
                defmt::debug!("frame captured, zero samples {} / {}", ma, mb);
                uart.write_bytes(REPLY_OK.as_bytes());
            }
            Command::GetLine(y) => match planes.line(y as usize) {
                Some(pixels) => {
                    for [first, second] in pixels {
                        uart.write_byte(first);
                        uart.write_byte(second);
                    }
                }
                None => uart.write_bytes(REPLY_ERR.as_bytes()),
            },
            Command::RegRead(reg) => match sensor.get(&mut i2c, &mut delay, reg) {
                Ok(val) => uart.write_bytes(format_register(reg, val).as_bytes()),
                Err(e) => {
                    defmt::warn!("regr {=u8:#x}: {}", reg, e);
                    uart.write_bytes(REPLY_ERR.as_bytes());
                }
            },
            Command::RegWrite(reg, val) => match sensor.set(&mut i2c, reg, val) {
                Ok(()) => uart.write_bytes(format_register(reg, val).as_bytes()),
                Err(e) => {
                    defmt::warn!("regw {=u8:#x}: {}", reg, e);
                    uart.write_bytes(REPLY_ERR.as_bytes());
                }
            },
            Command::Unknown => {
                defmt::info!("unknown command: [{}]", line.as_str());
                uart.write_bytes(REPLY_ERR.as_bytes());
            }
        }
    }
}
