//! Core DFU bootloader state machine for Graphite devices.
//!
//! The crate is host-agnostic: every external collaborator (tick source,
//! flash peripheral, wire response path) sits behind the [`BootBus`]
//! capability, so production firmware and deterministic tests drive the same
//! code. One [`BootCore`] value owns all state; drive it by feeding framed
//! packets through [`BootCore::receive_packet`] and calling [`process_cycle`]
//! from the foreground loop.

/// Host-facing configuration, collaborator capability, and status surface.
pub mod api;
/// CRC-16/CCITT fingerprinting used at write and verify time.
pub mod crc;
/// Fixed flash layout policy for the application window.
pub mod flash;
/// Wire packet model and framing field decoders.
pub mod packet;
/// Bounded single-producer/single-consumer receive ring.
pub mod queue;
/// Negative-acknowledgement taxonomy carried on the wire.
pub mod response;
/// Per-transfer session bookkeeping and the verify-time record.
pub mod session;
/// Supervisor states and the admissible-transition table.
pub mod state;
/// Monotonic observability counters.
pub mod stats;
/// The packet-driven supervisor itself.
pub mod supervisor;

pub use api::{
    BootBus, CoreConfig, StatusReport, DEFAULT_ERROR_HOLD_US, DEFAULT_MAX_QUEUE_DROPS,
    DEFAULT_MAX_SEQUENCE_ERRORS, DEFAULT_RECOVERY_HOLD_US, DEFAULT_SESSION_TIMEOUT_US,
    DEFAULT_VALIDATION_TIMEOUT_US,
};
pub use crc::{crc16_ccitt, Crc16};
pub use flash::{
    image_size_valid, write_range_valid, APPLICATION_END, APPLICATION_START, MAX_IMAGE_BYTES,
};
pub use packet::{
    read_u16_be, read_u32_be, Packet, PacketType, MAX_DATA_PAYLOAD, MAX_PACKET_SIZE,
    PACKET_HEADER_BYTES,
};
pub use queue::{PacketQueue, QUEUE_CAPACITY};
pub use response::{NackClass, NackCode};
pub use session::{Session, ValidationRecord, FIRST_DATA_SEQUENCE};
pub use state::{
    transition_allowed, BootState, ADMISSIBLE_TRANSITIONS, BOOT_STATE_COUNT,
};
pub use stats::CoreStats;
pub use supervisor::{
    dispatch_packet, process_cycle, BootCore, DispatchOutcome, START_SESSION_PACKET_LEN,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
