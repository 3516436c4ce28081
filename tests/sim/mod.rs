//! Host-side stand-ins for the hardware: an LPC17xx-style I2C master with
//! devices on the bus, and a parallel image sensor driven by a waveform.
#![allow(dead_code)]

use std::any::Any;
use std::collections::VecDeque;

use lpc17_cam::camera::ParallelPort;
use lpc17_cam::i2c::{Control, I2cPort, I2cShared};

/// Something that happened on the wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wire {
    Start,
    RepeatedStart,
    Addr { byte: u8, ack: bool },
    Write { byte: u8, ack: bool },
    /// `master_ack` is what the master answered after the byte.
    Read { byte: u8, master_ack: bool },
    ArbitrationLost,
    Stop,
}

/// A control register write, tagged with the status it was made under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOp {
    Set(u8, u8),
    Clear(u8, u8),
}

pub trait SimDevice: Any {
    /// 8-bit bus form, R/W bit clear.
    fn address(&self) -> u8;
    /// Addressed after a (repeated) START. Returns the ACK bit.
    fn select(&mut self, read: bool) -> bool;
    fn write(&mut self, byte: u8) -> bool;
    fn read(&mut self) -> u8;
    fn stop(&mut self);
    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// START or repeated START sent, address byte next.
    Started,
    Writing,
    Reading,
    /// Address or data rejected, waiting for STOP.
    Rejected,
    /// Lost the bus; the controller is back in slave mode.
    Lost,
    /// Controller does not react to anything.
    Dead,
}

pub struct SimBus<'a> {
    shared: &'a I2cShared,
    devices: Vec<Box<dyn SimDevice>>,
    phase: Phase,
    selected: Option<usize>,
    status: u8,
    si: bool,
    sta: bool,
    sto: bool,
    aa: bool,
    dat: u8,
    /// Status codes raised ahead of the next real one.
    injected: VecDeque<u8>,
    deferred: Option<u8>,
    lose_arbitration_at: Option<usize>,
    bytes_sent: usize,
    pub wire: Vec<Wire>,
    pub controls: Vec<ControlOp>,
    pub interrupts: usize,
    pub relaxes: usize,
}

impl<'a> SimBus<'a> {
    pub fn new(shared: &'a I2cShared) -> Self {
        Self {
            shared,
            devices: Vec::new(),
            phase: Phase::Idle,
            selected: None,
            status: 0xF8,
            si: false,
            sta: false,
            sto: false,
            aa: false,
            dat: 0,
            injected: VecDeque::new(),
            deferred: None,
            lose_arbitration_at: None,
            bytes_sent: 0,
            wire: Vec::new(),
            controls: Vec::new(),
            interrupts: 0,
            relaxes: 0,
        }
    }

    pub fn with_device(mut self, dev: impl SimDevice) -> Self {
        self.devices.push(Box::new(dev));
        self
    }

    /// The controller never takes a START.
    pub fn dead(mut self) -> Self {
        self.phase = Phase::Dead;
        self
    }

    /// Lose arbitration while sending the `n`th byte (address bytes count).
    pub fn lose_arbitration_at(&mut self, n: usize) {
        self.lose_arbitration_at = Some(self.bytes_sent + n);
    }

    /// Raise `code` before the next status the bus would report.
    pub fn inject(&mut self, code: u8) {
        self.injected.push_back(code);
    }

    pub fn device<T: SimDevice>(&self, addr: u8) -> &T {
        self.devices
            .iter()
            .find(|d| d.address() == addr)
            .and_then(|d| d.as_any().downcast_ref::<T>())
            .expect("no such device")
    }

    pub fn clear_log(&mut self) {
        self.wire.clear();
        self.controls.clear();
    }

    pub fn stops(&self) -> usize {
        self.wire.iter().filter(|w| **w == Wire::Stop).count()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && !self.si && !self.sto
    }

    fn raise(&mut self, code: u8) {
        if let Some(first) = self.injected.pop_front() {
            self.deferred = Some(code);
            self.status = first;
        } else {
            self.status = code;
        }
        self.si = true;
    }

    fn send_stop(&mut self) {
        self.sto = false;
        if let Some(i) = self.selected.take() {
            self.devices[i].stop();
        }
        self.wire.push(Wire::Stop);
        self.phase = Phase::Idle;
        self.status = 0xF8;
    }

    fn send_start(&mut self, repeated: bool) {
        self.phase = Phase::Started;
        if repeated {
            self.wire.push(Wire::RepeatedStart);
            self.raise(0x10);
        } else {
            self.wire.push(Wire::Start);
            self.raise(0x08);
        }
    }

    fn arbitration_lost(&mut self) -> bool {
        let hit = self.lose_arbitration_at == Some(self.bytes_sent);
        self.bytes_sent += 1;
        if hit {
            self.lose_arbitration_at = None;
            if let Some(i) = self.selected.take() {
                self.devices[i].stop();
            }
            self.wire.push(Wire::ArbitrationLost);
            self.phase = Phase::Lost;
            self.raise(0x38);
        }
        hit
    }

    /// What the controller does once SI is cleared.
    fn advance(&mut self) {
        if let Some(code) = self.deferred.take() {
            self.status = code;
            self.si = true;
            return;
        }
        match self.phase {
            Phase::Idle | Phase::Dead => {}
            Phase::Lost => {
                self.phase = Phase::Idle;
                self.status = 0xF8;
            }
            _ if self.sto => self.send_stop(),
            Phase::Started => {
                if self.arbitration_lost() {
                    return;
                }
                let byte = self.dat;
                let read = byte & 1 != 0;
                let found = self.devices.iter().position(|d| d.address() == byte & !1);
                let ack = match found {
                    Some(i) => self.devices[i].select(read),
                    None => false,
                };
                self.wire.push(Wire::Addr { byte, ack });
                self.selected = if ack { found } else { None };
                self.phase = match (ack, read) {
                    (false, _) => Phase::Rejected,
                    (true, false) => Phase::Writing,
                    (true, true) => Phase::Reading,
                };
                self.raise(match (ack, read) {
                    (true, false) => 0x18,
                    (false, false) => 0x20,
                    (true, true) => 0x40,
                    (false, true) => 0x48,
                });
            }
            Phase::Writing if self.sta => self.send_start(true),
            Phase::Writing => {
                if self.arbitration_lost() {
                    return;
                }
                let byte = self.dat;
                let ack = match self.selected {
                    Some(i) => self.devices[i].write(byte),
                    None => false,
                };
                self.wire.push(Wire::Write { byte, ack });
                if ack {
                    self.raise(0x28);
                } else {
                    self.phase = Phase::Rejected;
                    self.raise(0x30);
                }
            }
            Phase::Reading => {
                if self.status == 0x58 {
                    // master already sent NOT ACK; only STOP or START are legal
                    return;
                }
                let byte = match self.selected {
                    Some(i) => self.devices[i].read(),
                    None => 0xFF,
                };
                self.dat = byte;
                self.wire.push(Wire::Read { byte, master_ack: self.aa });
                self.raise(if self.aa { 0x50 } else { 0x58 });
            }
            Phase::Rejected if self.sta => self.send_start(true),
            Phase::Rejected => {}
        }
    }
}

impl I2cPort for SimBus<'_> {
    fn status(&self) -> u8 {
        self.status
    }

    fn write_data(&mut self, byte: u8) {
        self.dat = byte;
    }

    fn read_data(&self) -> u8 {
        self.dat
    }

    fn set_control(&mut self, flags: Control) {
        self.controls.push(ControlOp::Set(self.status, flags.bits()));
        if flags.contains(Control::AA) {
            self.aa = true;
        }
        if flags.contains(Control::STO) {
            self.sto = true;
        }
        if flags.contains(Control::STA) {
            self.sta = true;
            if self.phase == Phase::Idle && !self.si {
                self.send_start(false);
            }
        }
    }

    fn clear_control(&mut self, flags: Control) {
        self.controls.push(ControlOp::Clear(self.status, flags.bits()));
        if flags.contains(Control::AA) {
            self.aa = false;
        }
        if flags.contains(Control::STA) {
            self.sta = false;
        }
        if flags.contains(Control::SI) && self.si {
            self.si = false;
            self.advance();
        } else if flags.contains(Control::SI) && self.sto && self.phase != Phase::Dead {
            // STO with no transfer in flight still goes out
            self.send_stop();
        }
    }

    fn stop_pending(&self) -> bool {
        self.sto
    }

    /// Deliver the pending interrupt, if any, and check the handler cleared SI
    /// exactly once for it.
    fn relax(&mut self) {
        self.relaxes += 1;
        if !self.si {
            return;
        }
        let before = self.si_clears();
        self.interrupts += 1;
        let status = self.status;
        let shared = self.shared;
        shared.on_interrupt(self);
        assert_eq!(
            self.si_clears(),
            before + 1,
            "handler for status {status:#04x} must clear SI exactly once"
        );
    }
}

impl SimBus<'_> {
    fn si_clears(&self) -> usize {
        self.controls
            .iter()
            .filter(|op| matches!(op, ControlOp::Clear(_, bits) if bits & Control::SI.bits() != 0))
            .count()
    }
}

/// 24LC512-style memory: two address bytes then data, with a write cycle that
/// rejects the address for a number of selects after a write STOP.
pub struct Eeprom24 {
    addr: u8,
    pub mem: Vec<u8>,
    ptr: u16,
    received: usize,
    dirty: bool,
    busy: usize,
    pub write_cycle: usize,
    /// Reject the data byte at this index (0 = first byte after the address).
    pub nack_data_at: Option<usize>,
    /// Every data byte seen, in order, across transactions.
    pub written: Vec<u8>,
}

impl Eeprom24 {
    pub fn new(addr: u8) -> Self {
        Self {
            addr,
            mem: vec![0xFF; 0x1_0000],
            ptr: 0,
            received: 0,
            dirty: false,
            busy: 0,
            write_cycle: 0,
            nack_data_at: None,
            written: Vec::new(),
        }
    }

    pub fn with_write_cycle(mut self, selects: usize) -> Self {
        self.write_cycle = selects;
        self
    }
}

impl SimDevice for Eeprom24 {
    fn address(&self) -> u8 {
        self.addr
    }

    fn select(&mut self, _read: bool) -> bool {
        if self.busy > 0 {
            self.busy -= 1;
            return false;
        }
        self.received = 0;
        true
    }

    fn write(&mut self, byte: u8) -> bool {
        if self.nack_data_at == Some(self.received) {
            return false;
        }
        self.written.push(byte);
        match self.received {
            0 => self.ptr = (self.ptr & 0x00FF) | ((byte as u16) << 8),
            1 => self.ptr = (self.ptr & 0xFF00) | byte as u16,
            _ => {
                self.mem[self.ptr as usize] = byte;
                self.ptr = self.ptr.wrapping_add(1);
                self.dirty = true;
            }
        }
        self.received += 1;
        true
    }

    fn read(&mut self) -> u8 {
        let byte = self.mem[self.ptr as usize];
        self.ptr = self.ptr.wrapping_add(1);
        byte
    }

    fn stop(&mut self) {
        if self.dirty {
            self.dirty = false;
            self.busy = self.write_cycle;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// SCCB-style register file with an 8-bit register pointer.
pub struct RegisterFile {
    addr: u8,
    pub regs: [u8; 256],
    ptr: u8,
    received: usize,
    /// Reject this many read selects before answering.
    pub read_busy: usize,
    /// Reject this many write selects before answering.
    pub write_busy: usize,
    /// NACK this many register-pointer bytes, leaving the pointer alone.
    pub nack_register: usize,
    /// Register writes in order.
    pub log: Vec<(u8, u8)>,
}

impl RegisterFile {
    pub fn new(addr: u8) -> Self {
        Self {
            addr,
            regs: [0; 256],
            ptr: 0,
            received: 0,
            read_busy: 0,
            write_busy: 0,
            nack_register: 0,
            log: Vec::new(),
        }
    }

    pub fn with_reg(mut self, reg: u8, val: u8) -> Self {
        self.regs[reg as usize] = val;
        self
    }
}

impl SimDevice for RegisterFile {
    fn address(&self) -> u8 {
        self.addr
    }

    fn select(&mut self, read: bool) -> bool {
        if read && self.read_busy > 0 {
            self.read_busy -= 1;
            return false;
        }
        if !read && self.write_busy > 0 {
            self.write_busy -= 1;
            return false;
        }
        self.received = 0;
        true
    }

    fn write(&mut self, byte: u8) -> bool {
        if self.received == 0 {
            if self.nack_register > 0 {
                self.nack_register -= 1;
                return false;
            }
            self.ptr = byte;
        } else {
            self.regs[self.ptr as usize] = byte;
            self.log.push((self.ptr, byte));
            self.ptr = self.ptr.wrapping_add(1);
        }
        self.received += 1;
        true
    }

    fn read(&mut self) -> u8 {
        let byte = self.regs[self.ptr as usize];
        self.ptr = self.ptr.wrapping_add(1);
        byte
    }

    fn stop(&mut self) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub const VSYNC: u32 = 1 << 8;
pub const HREF: u32 = 1 << 11;
pub const PCLK: u32 = 1 << 12;

/// Pattern byte pair for pixel `(x, y)`. Neither byte is ever zero.
pub fn pixel(x: usize, y: usize) -> (u8, u8) {
    (((y * 7 + x) % 255) as u8 + 1, ((x ^ (y * 3)) as u8) | 0x80)
}

/// Port words for an image sensor, one word per read.
pub struct Waveform {
    words: Vec<u32>,
    pos: usize,
}

impl Waveform {
    /// The tail of a previous frame, then a frame of `lines` lines of `width`
    /// pixels. The frame ends after `lines_sent` lines, and `cut` optionally
    /// ends it after that many pixels of the next line.
    pub fn frame(width: usize, lines: usize, lines_sent: usize, cut: Option<usize>) -> Self {
        let mut w = Waveform { words: Vec::new(), pos: 0 };
        // previous frame still active, then vertical blanking
        w.blank(VSYNC, 3);
        w.blank(0, 4);
        w.blank(VSYNC, 2);
        for y in 0..lines.min(lines_sent) {
            w.line(width, y, width);
            w.blank(VSYNC, 3);
        }
        if let Some(pixels) = cut {
            w.line(width, lines_sent, pixels);
        }
        w.blank(0, 6);
        w
    }

    /// `full_lines` complete lines, then a line that drops HREF after `pixels`
    /// pixels and the first sample of the next one. With `resume` one more
    /// complete line (pattern row `full_lines + 1`) follows in the same frame.
    pub fn cut_mid_pixel(width: usize, full_lines: usize, pixels: usize, resume: bool) -> Self {
        let mut w = Waveform { words: Vec::new(), pos: 0 };
        w.blank(VSYNC, 3);
        w.blank(0, 4);
        w.blank(VSYNC, 2);
        for y in 0..full_lines {
            w.line(width, y, width);
            w.blank(VSYNC, 3);
        }

        let on = VSYNC | HREF;
        w.words.push(on);
        for x in 0..pixels {
            let (a, b) = pixel(x, full_lines);
            w.words.push(on | a as u32);
            w.words.push(on | PCLK | a as u32);
            w.words.push(on | b as u32);
            w.words.push(on | PCLK | b as u32);
        }
        let (a, _) = pixel(pixels, full_lines);
        w.words.push(on | a as u32);
        w.words.push(on | PCLK | a as u32);
        w.words.push(on | 0x5A);
        w.blank(VSYNC, 3);

        if resume {
            w.line(width, full_lines + 1, width);
            w.blank(VSYNC, 3);
        }
        w.blank(0, 6);
        w
    }

    /// `ticks` clock periods with HREF low and junk on the data lines.
    fn blank(&mut self, level: u32, ticks: usize) {
        for _ in 0..ticks {
            self.words.push(level | 0xAB);
            self.words.push(level | PCLK | 0xCD);
        }
    }

    fn line(&mut self, width: usize, y: usize, pixels: usize) {
        let on = VSYNC | HREF;
        self.words.push(on);
        for x in 0..pixels.min(width) {
            let (a, b) = pixel(x, y);
            self.words.push(on | a as u32);
            self.words.push(on | PCLK | a as u32);
            self.words.push(on | b as u32);
            self.words.push(on | PCLK | b as u32);
        }
        // data changes on the falling edge
        self.words.push(on | 0x5A);
    }

    pub fn reads(&self) -> usize {
        self.pos
    }

    pub fn exhausted(&self) -> bool {
        self.pos >= self.words.len()
    }
}

impl ParallelPort for Waveform {
    fn read(&mut self) -> u32 {
        let word = self.words.get(self.pos).or(self.words.last()).copied().unwrap_or(0);
        self.pos += 1;
        word
    }
}
