//! Bit-banged capture of one frame from an 8-bit parallel sensor bus.
//!
//! The sensor drives the pixel clock, so the inner loops only poll the bus:
//! no logging, no allocation and no calls other than [`ParallelPort::read`].
//! Each RGB565 pixel arrives as two samples; the first lands in plane A and
//! the second in plane B at the same index.

use aligned::{Aligned, A4};

pub const QQVGA_WIDTH: usize = 160;
pub const QQVGA_HEIGHT: usize = 120;
pub const QQVGA_PIXELS: usize = QQVGA_WIDTH * QQVGA_HEIGHT;

/// Word-aligned backing store for one QQVGA plane.
pub type QqvgaPlane = Aligned<A4, [u8; QQVGA_PIXELS]>;

pub const fn qqvga_plane() -> QqvgaPlane {
    Aligned([0; QQVGA_PIXELS])
}

/// A parallel bus whose low byte carries the pixel data.
pub trait ParallelPort {
    /// One snapshot of every line on the port.
    fn read(&mut self) -> u32;
}

impl<P: ParallelPort + ?Sized> ParallelPort for &mut P {
    #[inline(always)]
    fn read(&mut self) -> u32 {
        P::read(self)
    }
}

/// Bit masks of the handshake lines within the sampled port word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapturePins {
    /// Frame active, high during a frame.
    pub vsync: u32,
    /// Line active, high while a line is clocked out.
    pub href: u32,
    /// Sample clock, data valid while high.
    pub pclk: u32,
}

impl CapturePins {
    /// P2.8 VSYNC, P2.11 HREF, P2.12 PCLK.
    pub const DEFAULT: Self = Self {
        vsync: 1 << 8,
        href: 1 << 11,
        pclk: 1 << 12,
    };
}

impl Default for CapturePins {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaneError {
    /// The two planes differ in length.
    LengthMismatch,
    /// Zero width, or a plane length that is not a whole number of lines.
    Geometry,
}

/// The two pixel planes a frame is captured into.
pub struct FramePlanes<'a> {
    first: &'a mut [u8],
    second: &'a mut [u8],
    width: usize,
}

impl<'a> FramePlanes<'a> {
    pub fn new(first: &'a mut [u8], second: &'a mut [u8], width: usize) -> Result<Self, PlaneError> {
        if first.len() != second.len() {
            return Err(PlaneError::LengthMismatch);
        }
        if width == 0 || first.len() % width != 0 {
            return Err(PlaneError::Geometry);
        }
        Ok(Self {
            first,
            second,
            width,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.first.len() / self.width
    }

    pub fn pixels(&self) -> usize {
        self.first.len()
    }

    pub fn planes(&self) -> (&[u8], &[u8]) {
        (&*self.first, &*self.second)
    }

    /// Zero both planes. Zero doubles as the "never written" marker for
    /// [`FramePlanes::missing_pixels`].
    pub fn clear(&mut self) {
        self.first.fill(0);
        self.second.fill(0);
    }

    /// Count zero entries per plane.
    ///
    /// This is a heuristic: a dark scene legitimately produces zeros, so a
    /// non-zero count does not prove the frame was cut short.
    pub fn missing_pixels(&self) -> (usize, usize) {
        let count = |plane: &[u8]| plane.iter().filter(|&&b| b == 0).count();
        (count(&*self.first), count(&*self.second))
    }

    /// Line `y` as `[first, second]` byte pairs, in transfer order.
    pub fn line(&self, y: usize) -> Option<impl Iterator<Item = [u8; 2]> + '_> {
        if y >= self.height() {
            return None;
        }
        let span = y * self.width..(y + 1) * self.width;
        let a = &self.first[span.clone()];
        let b = &self.second[span];
        Some(a.iter().zip(b).map(|(&a, &b)| [a, b]))
    }

    /// Wait for the next full frame and sample it into the planes.
    ///
    /// Returns when frame-active drops or the planes are full. Pixels past the
    /// point where the frame ended keep their previous contents; see
    /// [`FramePlanes::missing_pixels`].
    pub fn capture<P: ParallelPort>(&mut self, port: &mut P, pins: CapturePins) -> (&[u8], &[u8]) {
        let CapturePins { vsync, href, pclk } = pins;
        let len = self.first.len();
        let first = &mut *self.first;
        let second = &mut *self.second;

        // let any frame in progress finish, then wait for a fresh one
        let mut w = port.read();
        while w & vsync != 0 {
            w = port.read();
        }
        while w & vsync == 0 {
            w = port.read();
        }

        let mut i = 0;
        'frame: while w & vsync != 0 {
            while w & vsync != 0 && w & href == 0 {
                w = port.read();
            }
            if w & vsync == 0 {
                break;
            }

            while w & href != 0 {
                while w & pclk == 0 {
                    w = port.read();
                    if w & href == 0 {
                        continue 'frame;
                    }
                }
                if i >= len {
                    break 'frame;
                }
                first[i] = w as u8;
                while w & pclk != 0 {
                    w = port.read();
                }

                while w & pclk == 0 {
                    w = port.read();
                    if w & href == 0 {
                        continue 'frame;
                    }
                }
                second[i] = w as u8;
                while w & pclk != 0 {
                    w = port.read();
                }
                i += 1;
            }
        }

        (&*self.first, &*self.second)
    }
}
