//! Master-mode status codes of the I2C state engine.
//!
//! The controller reports every byte-level bus outcome as a status byte in `I2STAT`
//! and raises `SI`. [`BusEvent::decode`] is the only place that knows the numbers.

/// Bus outcome reported with an interrupt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// 0x08: START transmitted.
    StartSent,
    /// 0x10: repeated START transmitted.
    RepeatedStartSent,
    /// 0x18: SLA+W transmitted, ACK received.
    AddressWriteAck,
    /// 0x20: SLA+W transmitted, NOT ACK received.
    AddressWriteNack,
    /// 0x28: data byte transmitted, ACK received.
    DataWriteAck,
    /// 0x30: data byte transmitted, NOT ACK received.
    DataWriteNack,
    /// 0x38: arbitration lost in SLA+R/W or data bytes.
    ArbitrationLost,
    /// 0x40: SLA+R transmitted, ACK received.
    AddressReadAck,
    /// 0x48: SLA+R transmitted, NOT ACK received.
    AddressReadNack,
    /// 0x50: data byte received, ACK returned. More bytes follow.
    DataReadAck,
    /// 0x58: data byte received, NOT ACK returned. Last byte.
    DataReadNack,
    /// Anything else, including slave-mode codes and 0xF8 "no information".
    Other(u8),
}

impl BusEvent {
    pub const fn decode(status: u8) -> Self {
        match status {
            0x08 => BusEvent::StartSent,
            0x10 => BusEvent::RepeatedStartSent,
            0x18 => BusEvent::AddressWriteAck,
            0x20 => BusEvent::AddressWriteNack,
            0x28 => BusEvent::DataWriteAck,
            0x30 => BusEvent::DataWriteNack,
            0x38 => BusEvent::ArbitrationLost,
            0x40 => BusEvent::AddressReadAck,
            0x48 => BusEvent::AddressReadNack,
            0x50 => BusEvent::DataReadAck,
            0x58 => BusEvent::DataReadNack,
            other => BusEvent::Other(other),
        }
    }
}
