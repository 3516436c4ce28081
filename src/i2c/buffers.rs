//! Byte sequences and cursors describing the one in-flight transaction.

use super::I2cError;

/// Address + 2-byte key + a full 32-byte page + restart address, with headroom.
pub const WRITE_CAPACITY: usize = 64;
pub const READ_CAPACITY: usize = 64;

/// Foreground fills these between transactions; the interrupt handler owns them
/// (and the cursors) while a transaction is running.
pub struct TransactionBuffers {
    master: [u8; WRITE_CAPACITY],
    slave: [u8; READ_CAPACITY],
    write_len: usize,
    read_len: usize,
    wr_index: usize,
    rd_index: usize,
}

impl Default for TransactionBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionBuffers {
    pub const fn new() -> Self {
        Self {
            master: [0; WRITE_CAPACITY],
            slave: [0; READ_CAPACITY],
            write_len: 0,
            read_len: 0,
            wr_index: 0,
            rd_index: 0,
        }
    }

    /// Zero both sequences and forget the lengths.
    pub fn clear(&mut self) {
        self.master.fill(0);
        self.slave.fill(0);
        self.write_len = 0;
        self.read_len = 0;
        self.reset_cursors();
    }

    /// Copy a request in. `write` holds the write phase plus, when a read phase
    /// follows, the SLA+R byte used after the repeated START.
    pub fn load(&mut self, write: &[u8], write_len: usize, read_len: usize) -> Result<(), I2cError> {
        if write.len() > WRITE_CAPACITY {
            return Err(I2cError::WriteOverflow);
        }
        if read_len > READ_CAPACITY {
            return Err(I2cError::ReadOverflow);
        }
        self.clear();
        for (dst, src) in self.master.iter_mut().zip(write) {
            *dst = *src;
        }
        self.write_len = write_len;
        self.read_len = read_len;
        Ok(())
    }

    pub fn reset_cursors(&mut self) {
        self.wr_index = 0;
        self.rd_index = 0;
    }

    pub fn write_len(&self) -> usize {
        self.write_len
    }

    pub fn read_len(&self) -> usize {
        self.read_len
    }

    pub fn write_bytes(&self) -> &[u8] {
        &self.master[..self.write_len.min(WRITE_CAPACITY)]
    }

    pub fn read_bytes(&self) -> &[u8] {
        &self.slave[..self.read_len.min(READ_CAPACITY)]
    }

    // ---- interrupt side ----

    #[inline(always)]
    pub(crate) fn reset_write_cursor(&mut self) {
        self.wr_index = 0;
    }

    #[inline(always)]
    pub(crate) fn reset_read_cursor(&mut self) {
        self.rd_index = 0;
    }

    #[inline(always)]
    pub(crate) fn write_pending(&self) -> bool {
        self.wr_index < self.write_len
    }

    /// Next byte to put on the bus. Reading past the buffer yields the idle level.
    #[inline(always)]
    pub(crate) fn next_write_byte(&mut self) -> u8 {
        let byte = self.master.get(self.wr_index).copied().unwrap_or(0xFF);
        self.wr_index += 1;
        byte
    }

    #[inline(always)]
    pub(crate) fn store_read_byte(&mut self, byte: u8) {
        if let Some(slot) = self.slave.get_mut(self.rd_index) {
            *slot = byte;
        }
        self.rd_index += 1;
    }

    /// True while the byte after the next one is still wanted, i.e. the next
    /// received byte should be acknowledged.
    #[inline(always)]
    pub(crate) fn ack_next_read(&self) -> bool {
        self.rd_index < self.read_len.saturating_sub(1)
    }

    pub fn write_cursor(&self) -> usize {
        self.wr_index
    }

    pub fn read_cursor(&self) -> usize {
        self.rd_index
    }
}
