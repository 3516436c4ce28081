/// SCCB address, 8-bit form.
pub const OV7670_ADDR: u8 = 0x42;
/// Expected value of [`REG_PID`].
pub const OV7670_PID: u8 = 0x76;

pub const REG_VREF: u8 = 0x03;
pub const REG_PID: u8 = 0x0A;
pub const REG_VER: u8 = 0x0B;
pub const REG_COM3: u8 = 0x0C;
pub const REG_CLKRC: u8 = 0x11;
pub const REG_COM7: u8 = 0x12;
pub const REG_COM10: u8 = 0x15;
pub const REG_HSTART: u8 = 0x17;
pub const REG_HSTOP: u8 = 0x18;
pub const REG_VSTART: u8 = 0x19;
pub const REG_VSTOP: u8 = 0x1A;
pub const REG_MVFP: u8 = 0x1E;
pub const REG_HREF: u8 = 0x32;
pub const REG_TSLB: u8 = 0x3A;
pub const REG_COM11: u8 = 0x3B;
pub const REG_COM14: u8 = 0x3E;
pub const REG_COM15: u8 = 0x40;
pub const REG_SCALING_DCWCTR: u8 = 0x72;
pub const REG_SCALING_PCLK_DIV: u8 = 0x73;
pub const REG_RGB444: u8 = 0x8C;

/// COM7 bit that resets every register to its default.
pub const COM7_RESET: u8 = 0x80;

/// RGB565 output, QQVGA by scaling, colour matrix. Applied after a reset.
pub const OV7670_QQVGA_RGB565: &[(u8, u8)] = &[
    (REG_CLKRC, 0x80),
    (REG_COM11, 0x0A),
    (REG_TSLB, 0x04),
    (REG_TSLB, 0x04),
    (REG_COM7, 0x04), // rgb
    (REG_RGB444, 0x00),
    (REG_COM15, 0xD0), // rgb565, full range
    (REG_HSTART, 0x16),
    (REG_HSTOP, 0x04),
    (REG_HREF, 0x24),
    (REG_VSTART, 0x02),
    (REG_VSTOP, 0x7A),
    (REG_VREF, 0x0A),
    (REG_COM10, 0x02),
    (REG_COM3, 0x04),
    (REG_COM14, 0x1A), // pclk / 4
    (REG_MVFP, 0x27),
    (REG_SCALING_DCWCTR, 0x22), // downsample by 4
    (REG_SCALING_PCLK_DIV, 0xF2),
    // colour matrix
    (0x4F, 0x80),
    (0x50, 0x80),
    (0x51, 0x00),
    (0x52, 0x22),
    (0x53, 0x5E),
    (0x54, 0x80),
    (0x56, 0x40),
    (0x58, 0x9E),
    (0x59, 0x88),
    (0x5A, 0x88),
    (0x5B, 0x44),
    (0x5C, 0x67),
    (0x5D, 0x49),
    (0x5E, 0x0E),
    (0x69, 0x00),
    (0x6A, 0x40),
    (0x6B, 0x0A),
    (0x6C, 0x0A),
    (0x6D, 0x55),
    (0x6E, 0x11),
    (0x6F, 0x9F),
    (0xB0, 0x84),
];
