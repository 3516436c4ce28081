//! Line-oriented command console spoken over the serial port.
//!
//! ```text
//! getimage          capture a frame, reply "OK\r\n"
//! getline <y>       reply with line y as raw byte pairs
//! regr 0xRR         reply "0xRR 0xVV\r\n"
//! regw 0xRR 0xVV    write, reply "0xRR 0xVV\r\n"
//! ```
//! Anything else gets `ERR\r\n`.

use core::fmt::Write;

use heapless::String;

pub const LINE_CAPACITY: usize = 32;

pub const REPLY_OK: &str = "OK\r\n";
pub const REPLY_ERR: &str = "ERR\r\n";

/// Accumulates printable bytes until CR.
#[derive(Default)]
pub struct LineBuffer {
    line: String<LINE_CAPACITY>,
    overflowed: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            line: String::new(),
            overflowed: false,
        }
    }

    /// Feed one received byte. Returns the completed line on CR.
    ///
    /// Other control bytes are dropped. A line longer than the buffer is
    /// discarded whole and comes back empty, which parses as unknown.
    pub fn push(&mut self, byte: u8) -> Option<String<LINE_CAPACITY>> {
        match byte {
            32..=126 => {
                if self.overflowed || self.line.push(byte as char).is_err() {
                    self.overflowed = true;
                }
                None
            }
            b'\r' => {
                let line = core::mem::take(&mut self.line);
                let overflowed = core::mem::replace(&mut self.overflowed, false);
                Some(if overflowed { String::new() } else { line })
            }
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    GetImage,
    GetLine(u16),
    RegRead(u8),
    RegWrite(u8, u8),
    Unknown,
}

impl Command {
    pub fn parse(line: &str) -> Command {
        if line == "getimage" {
            return Command::GetImage;
        }
        if let Some(arg) = line.strip_prefix("getline ") {
            return match leading_decimal(arg) {
                Some(y) => Command::GetLine(y),
                None => Command::Unknown,
            };
        }
        if line.len() == 9 {
            if let Some(reg) = line.strip_prefix("regr 0x").and_then(hex_byte) {
                return Command::RegRead(reg);
            }
        }
        if line.len() == 14 {
            if let Some(rest) = line.strip_prefix("regw 0x") {
                let reg = rest.get(..2).and_then(hex_byte);
                let val = rest.get(2..).and_then(|r| r.strip_prefix(" 0x")).and_then(hex_byte);
                if let (Some(reg), Some(val)) = (reg, val) {
                    return Command::RegWrite(reg, val);
                }
            }
        }
        Command::Unknown
    }
}

/// Leading decimal digits, like `atoi`. Empty or oversized input is `None`.
fn leading_decimal(s: &str) -> Option<u16> {
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    s[..end].parse().ok()
}

fn hex_byte(s: &str) -> Option<u8> {
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(s, 16).ok()
}

/// `0xRR 0xVV\r\n`
pub fn format_register(reg: u8, val: u8) -> String<16> {
    let mut out = String::new();
    // 11 bytes always fit
    let _ = write!(out, "0x{:02x} 0x{:02x}\r\n", reg, val);
    out
}
