//! Per-transfer session bookkeeping and the verify-time record.

use crate::crc::Crc16;
use crate::flash::APPLICATION_START;

/// First sequence number a DATA packet may carry.
pub const FIRST_DATA_SEQUENCE: u8 = 1;

/// Bookkeeping for one transfer, populated by START_SESSION and cleared on
/// every idle entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Session {
    total_size: u32,
    expected_crc: u16,
    expected_seq: u8,
    bytes_received: u32,
    active: bool,
    fingerprint: Crc16,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            total_size: 0,
            expected_crc: 0,
            expected_seq: 0,
            bytes_received: 0,
            active: false,
            fingerprint: Crc16::new(),
        }
    }
}

impl Session {
    /// Creates an inactive session with cleared bookkeeping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `total_size` bytes with the peer's declared CRC.
    pub fn start(&mut self, total_size: u32, expected_crc: u16) {
        self.total_size = total_size;
        self.expected_crc = expected_crc;
        self.expected_seq = FIRST_DATA_SEQUENCE;
        self.bytes_received = 0;
        self.active = true;
        self.fingerprint = Crc16::new();
    }

    /// Returns every field to the idle baseline.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` while a transfer is open.
    #[must_use]
    pub const fn active(&self) -> bool {
        self.active
    }

    /// Returns the byte count the peer declared at session start.
    #[must_use]
    pub const fn total_size(&self) -> u32 {
        self.total_size
    }

    /// Returns the CRC the peer declared at session start.
    #[must_use]
    pub const fn expected_crc(&self) -> u16 {
        self.expected_crc
    }

    /// Returns the sequence number the next DATA packet must carry.
    #[must_use]
    pub const fn expected_seq(&self) -> u8 {
        self.expected_seq
    }

    /// Returns the number of payload bytes accepted so far.
    #[must_use]
    pub const fn bytes_received(&self) -> u32 {
        self.bytes_received
    }

    /// Returns the flash byte address for the next accepted chunk.
    #[must_use]
    pub const fn next_write_address(&self) -> u32 {
        APPLICATION_START + self.bytes_received
    }

    /// Returns `true` when a chunk of `len` bytes would overrun the declared
    /// total.
    #[must_use]
    pub const fn chunk_overflows(&self, len: u32) -> bool {
        match self.bytes_received.checked_add(len) {
            Some(end) => end > self.total_size,
            None => true,
        }
    }

    /// Returns `true` when every declared byte has been received.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.bytes_received == self.total_size
    }

    /// Folds one accepted chunk into the transfer.
    ///
    /// Advances the running fingerprint, the received byte count, and the
    /// expected sequence. The sequence wraps 255 -> 1, skipping zero, so it
    /// stays nonzero for the whole life of a session.
    pub fn record_chunk(&mut self, payload: &[u8]) {
        self.fingerprint.update(payload);
        #[allow(clippy::cast_possible_truncation)]
        {
            self.bytes_received = self.bytes_received.saturating_add(payload.len() as u32);
        }
        self.expected_seq = if self.expected_seq == u8::MAX {
            FIRST_DATA_SEQUENCE
        } else {
            self.expected_seq + 1
        };
    }

    /// Produces the verify-time record for this transfer.
    #[must_use]
    pub const fn validate(&self) -> ValidationRecord {
        let calculated_crc = self.fingerprint.value();
        ValidationRecord {
            size: self.bytes_received,
            calculated_crc,
            expected_crc: self.expected_crc,
            valid: calculated_crc == self.expected_crc,
        }
    }
}

/// Outcome of the verify step over one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ValidationRecord {
    /// Number of image bytes the check covered.
    pub size: u32,
    /// Fingerprint accumulated while the image was written.
    pub calculated_crc: u16,
    /// CRC the peer declared at session start.
    pub expected_crc: u16,
    /// `true` when the fingerprint matches the declaration.
    pub valid: bool,
}

impl ValidationRecord {
    /// Record used when launching the resident image without a fresh
    /// transfer: the flash contract cannot read back, so the image is
    /// launched on trust.
    #[must_use]
    pub const fn resident() -> Self {
        Self {
            size: 0,
            calculated_crc: 0,
            expected_crc: 0,
            valid: true,
        }
    }
}
