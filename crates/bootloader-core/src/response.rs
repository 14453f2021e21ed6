//! Negative-acknowledgement taxonomy carried on the wire.

use thiserror::Error;

/// Policy classes for rejection codes, used when deciding escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum NackClass {
    /// Peer violated the session protocol (wrong state, type, size, order).
    Protocol,
    /// The core cannot keep up right now; the peer should retry later.
    BackPressure,
    /// The transferred image failed an integrity check.
    Integrity,
    /// The core's own state forbids the request.
    State,
}

/// Stable rejection codes emitted in NACK frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum NackCode {
    /// Packet type is not accepted in the current state.
    #[error("packet not valid in current state")]
    UnexpectedPacket = 0x01,
    /// DATA sequence number does not match the expected sequence.
    #[error("data sequence mismatch")]
    SequenceMismatch = 0x02,
    /// Flash driver has an operation in flight; resend the same chunk.
    #[error("flash write in progress")]
    FlashBusy = 0x03,
    /// Packet type has no meaning while a transfer is active.
    #[error("invalid type during active transfer")]
    InvalidTransferType = 0x04,
    /// Declared session size is zero or exceeds the application window.
    #[error("invalid session size")]
    InvalidSessionSize = 0x05,
    /// END_SESSION arrived before the declared byte count was received.
    #[error("incomplete transfer")]
    IncompleteTransfer = 0x08,
    /// Emergency recovery accepts only diagnostic traffic.
    #[error("only emergency commands accepted")]
    RecoveryLockdown = 0x10,
    /// Current state accepts no session traffic at all.
    #[error("invalid state for request")]
    InvalidState = 0x11,
    /// Bootloader mode is latched; session start and launch are disabled.
    #[error("bootloader mode forced")]
    BootloaderForced = 0x12,
    /// Unparseable packet or defensive dispatch default.
    #[error("unknown request")]
    Unknown = 0xFF,
}

impl NackCode {
    /// Converts a rejection code to its stable wire byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a wire byte back into a rejection code.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::UnexpectedPacket),
            0x02 => Some(Self::SequenceMismatch),
            0x03 => Some(Self::FlashBusy),
            0x04 => Some(Self::InvalidTransferType),
            0x05 => Some(Self::InvalidSessionSize),
            0x08 => Some(Self::IncompleteTransfer),
            0x10 => Some(Self::RecoveryLockdown),
            0x11 => Some(Self::InvalidState),
            0x12 => Some(Self::BootloaderForced),
            0xFF => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Returns the policy class for this rejection code.
    #[must_use]
    pub const fn class(self) -> NackClass {
        match self {
            Self::UnexpectedPacket
            | Self::SequenceMismatch
            | Self::InvalidTransferType
            | Self::InvalidSessionSize => NackClass::Protocol,
            Self::FlashBusy => NackClass::BackPressure,
            Self::IncompleteTransfer => NackClass::Integrity,
            Self::RecoveryLockdown
            | Self::InvalidState
            | Self::BootloaderForced
            | Self::Unknown => NackClass::State,
        }
    }
}
