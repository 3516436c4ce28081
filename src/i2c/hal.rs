use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation, SevenBitAddress};
use heapless::Vec;

use super::buffers::{READ_CAPACITY, WRITE_CAPACITY};
use super::engine::{I2cMaster, RD_BIT};
use super::master::I2cPort;
use super::I2cError;

impl embedded_hal::i2c::Error for I2cError {
    fn kind(&self) -> ErrorKind {
        match self {
            I2cError::AddressNack | I2cError::DeviceNotReady => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            I2cError::DataNack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            I2cError::ArbitrationLost => ErrorKind::ArbitrationLoss,
            I2cError::StartTimeout => ErrorKind::Bus,
            _ => ErrorKind::Other,
        }
    }
}

impl<P: I2cPort> ErrorType for I2cMaster<'_, P> {
    type Error = I2cError;
}

/// Writes followed by reads become one transaction with a repeated START in
/// between. Any read before a write is rejected.
impl<P: I2cPort> embedded_hal::i2c::I2c<SevenBitAddress> for I2cMaster<'_, P> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address > 0x7F {
            return Err(I2cError::InvalidAddress);
        }
        let sla = address << 1;

        let mut frame: Vec<u8, WRITE_CAPACITY> = Vec::new();
        frame.push(sla).map_err(|_| I2cError::WriteOverflow)?;
        let mut read_len = 0;
        for op in operations.iter() {
            match op {
                Operation::Write(bytes) => {
                    if read_len > 0 {
                        return Err(I2cError::UnsupportedOperation);
                    }
                    frame.extend_from_slice(bytes).map_err(|_| I2cError::WriteOverflow)?;
                }
                Operation::Read(buf) => read_len += buf.len(),
            }
        }

        let mut write_len = frame.len();
        if read_len > 0 {
            if write_len == 1 {
                // nothing to write: plain read, SLA+R goes out with the START
                frame[0] = sla | RD_BIT;
                write_len = 0;
            } else {
                frame.push(sla | RD_BIT).map_err(|_| I2cError::WriteOverflow)?;
            }
        }

        let mut rx: Vec<u8, READ_CAPACITY> = Vec::new();
        rx.resize_default(read_len).map_err(|_| I2cError::ReadOverflow)?;
        self.execute(&frame, write_len, &mut rx)?.into_result()?;

        let mut received = rx.iter();
        for op in operations.iter_mut() {
            if let Operation::Read(buf) = op {
                for (dst, src) in buf.iter_mut().zip(&mut received) {
                    *dst = *src;
                }
            }
        }
        Ok(())
    }
}
