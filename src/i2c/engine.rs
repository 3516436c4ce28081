//! Foreground transaction engine.
//!
//! Arms the shared buffers, requests START and spins until the interrupt side
//! reports a terminal state. One transaction at a time; `&mut self` keeps the
//! buffers out of reach of the caller while the bus owns them.

use heapless::Vec;

use super::buffers::{READ_CAPACITY, WRITE_CAPACITY};
use super::master::{Control, I2cPort, I2cShared};
use super::state::TransactionState;
use super::{I2cConfig, I2cError};

/// Read/write bit of an address byte.
pub const RD_BIT: u8 = 0x01;

pub struct I2cMaster<'a, P: I2cPort> {
    shared: &'a I2cShared,
    port: P,
    config: I2cConfig,
}

impl<'a, P: I2cPort> I2cMaster<'a, P> {
    /// The bus must already be initialised and its interrupt routed to
    /// `shared.on_interrupt`.
    pub fn new(shared: &'a I2cShared, port: P, config: I2cConfig) -> Self {
        Self { shared, port, config }
    }

    pub fn config(&self) -> &I2cConfig {
        &self.config
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn shared(&self) -> &'a I2cShared {
        self.shared
    }

    pub fn release(self) -> P {
        self.port
    }

    /// Run one transaction.
    ///
    /// `write[..write_len]` is the write phase, address byte included. When
    /// `read` is not empty and `write_len > 0`, `write[write_len]` must be the
    /// SLA+R byte sent after the repeated START. A read-only request has
    /// `write_len == 0` and `write == [SLA+R]`.
    ///
    /// Bus outcomes (Ack, Nack, SlaNack, ArbitrationLoss) come back as `Ok`.
    /// `Err(StartTimeout)` means the controller never took the START.
    pub fn execute(
        &mut self,
        write: &[u8],
        write_len: usize,
        read: &mut [u8],
    ) -> Result<TransactionState, I2cError> {
        validate_request(write, write_len, read.len())?;
        self.shared.with_buffers(|bufs| bufs.load(write, write_len, read.len()))?;
        self.shared.set_state(TransactionState::Idle);

        if !self.start() {
            warn!("i2c: START not taken after {} spins", self.config.start_timeout);
            if !self.stop() {
                error!("i2c: STOP did not complete, bus is stuck");
            }
            return Err(I2cError::StartTimeout);
        }

        let state = loop {
            let state = self.shared.state();
            if state.is_terminal() {
                break state;
            }
            self.port.relax();
        };

        self.shared.with_buffers(|bufs| {
            for (dst, src) in read.iter_mut().zip(bufs.read_bytes()) {
                *dst = *src;
            }
        });
        if state != TransactionState::Ack {
            debug!("i2c: transaction to {:#x} ended with {:?}", write.first().copied().unwrap_or(0), state);
        }
        Ok(state)
    }

    /// Write-only transaction to `addr` (8-bit bus form, R/W bit clear).
    pub fn send(&mut self, addr: u8, bytes: &[u8]) -> Result<TransactionState, I2cError> {
        let mut frame: Vec<u8, WRITE_CAPACITY> = Vec::new();
        frame.push(addr & !RD_BIT).map_err(|_| I2cError::WriteOverflow)?;
        frame.extend_from_slice(bytes).map_err(|_| I2cError::WriteOverflow)?;
        self.execute(&frame, frame.len(), &mut [])
    }

    /// Retry `execute` while the device keeps rejecting its address, up to `polls` times.
    pub fn execute_until_ready(
        &mut self,
        write: &[u8],
        write_len: usize,
        read: &mut [u8],
        polls: u32,
    ) -> Result<TransactionState, I2cError> {
        for _ in 0..polls {
            match self.execute(write, write_len, read)? {
                TransactionState::SlaNack => continue,
                state => return Ok(state),
            }
        }
        Err(I2cError::DeviceNotReady)
    }

    fn start(&mut self) -> bool {
        self.port.set_control(Control::STA);
        let mut spins = 0;
        loop {
            // a fast nack may already have moved past Pending
            if self.shared.state() != TransactionState::Idle {
                return true;
            }
            if spins >= self.config.start_timeout {
                return false;
            }
            self.port.relax();
            spins += 1;
        }
    }

    /// Force a STOP and wait for the controller to put it on the bus.
    pub fn stop(&mut self) -> bool {
        self.port.set_control(Control::STO);
        self.port.clear_control(Control::SI);
        let mut spins = 0;
        while self.port.stop_pending() {
            if spins >= self.config.start_timeout {
                return false;
            }
            self.port.relax();
            spins += 1;
        }
        true
    }
}

/// Check the shape of a request before anything touches the bus.
pub fn validate_request(write: &[u8], write_len: usize, read_len: usize) -> Result<(), I2cError> {
    let Some(&first) = write.first() else {
        return Err(I2cError::EmptyRequest);
    };
    if write.len() > WRITE_CAPACITY {
        return Err(I2cError::WriteOverflow);
    }
    if read_len > READ_CAPACITY {
        return Err(I2cError::ReadOverflow);
    }
    if write_len > write.len() {
        return Err(I2cError::LengthMismatch);
    }
    match (write_len, read_len) {
        (0, 0) => Err(I2cError::EmptyRequest),
        (_, 0) => {
            if write.len() > write_len {
                // trailing SLA+R without a read length
                return Err(I2cError::ReadPhaseWithoutLength);
            }
            if first & RD_BIT != 0 {
                return Err(I2cError::AddressDirection);
            }
            Ok(())
        }
        (0, _) => {
            if write.len() != 1 {
                return Err(I2cError::LengthMismatch);
            }
            if first & RD_BIT == 0 {
                return Err(I2cError::AddressDirection);
            }
            Ok(())
        }
        (_, _) => {
            let Some(&restart) = write.get(write_len) else {
                return Err(I2cError::MissingReadAddress);
            };
            if write.len() != write_len + 1 {
                return Err(I2cError::LengthMismatch);
            }
            if first & RD_BIT != 0 || restart & RD_BIT == 0 {
                return Err(I2cError::AddressDirection);
            }
            Ok(())
        }
    }
}
