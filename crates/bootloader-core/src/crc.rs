//! CRC-16/CCITT fingerprinting of firmware images.
//!
//! The same algorithm runs on both ends of a transfer: the supervisor feeds
//! accepted DATA payloads into an accumulator as they are written, and the
//! verify step finalises that accumulator against the peer's declared CRC.

const CRC16_INIT: u16 = 0xFFFF;

/// Incremental CRC-16/CCITT accumulator (init `0xFFFF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Crc16 {
    value: u16,
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc16 {
    /// Returns a fresh accumulator at the initial value.
    #[must_use]
    pub const fn new() -> Self {
        Self { value: CRC16_INIT }
    }

    /// Folds `bytes` into the running checksum.
    pub fn update(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.value = step(self.value, *byte);
        }
    }

    /// Returns the current checksum value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.value
    }
}

const fn step(crc: u16, byte: u8) -> u16 {
    let mut crc = (crc >> 8 & 0x00FF) | (crc << 8 & 0xFF00);
    crc ^= byte as u16;
    crc ^= (crc & 0x00FF) >> 4;
    crc ^= (crc << 8) << 4;
    crc ^= ((crc & 0x00FF) << 4) << 1;
    crc
}

/// Computes the CRC-16/CCITT of `bytes` in one shot.
#[must_use]
pub fn crc16_ccitt(bytes: &[u8]) -> u16 {
    let mut crc = Crc16::new();
    crc.update(bytes);
    crc.value()
}
