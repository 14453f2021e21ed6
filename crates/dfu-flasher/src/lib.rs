//! Host-side companion for the Graphite bootloader.
//!
//! Turns a firmware image into the packet stream the bootloader consumes,
//! stores it in a simple length-prefixed container, and can replay a stream
//! against an in-process [`bootloader_core::BootCore`] over a simulated bus.

/// Replay harness: simulated bus, peer behaviour, run report.
pub mod runner;
/// Packet stream builder and container codec.
pub mod stream;

pub use runner::{replay, ReplayOptions, ReplayReport, SimBus, WireResponse};
pub use stream::{
    build_stream, decode_stream, encode_stream, next_sequence, StreamError, DEFAULT_CHUNK_LEN,
};

#[cfg(test)]
use tempfile as _;
