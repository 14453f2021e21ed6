//! Host-facing configuration, collaborator capability, and status surface.

use core::fmt;

use crate::response::NackCode;
use crate::state::BootState;
use crate::stats::CoreStats;

/// Default inactivity budget for an open session, in microseconds (30 s).
pub const DEFAULT_SESSION_TIMEOUT_US: u64 = 30_000_000;

/// Default budget for the verify state, in microseconds (5 s).
pub const DEFAULT_VALIDATION_TIMEOUT_US: u64 = 5_000_000;

/// Default hold in the error state before self-healing to idle (5 s).
pub const DEFAULT_ERROR_HOLD_US: u64 = 5_000_000;

/// Default quarantine hold in emergency recovery (10 s).
pub const DEFAULT_RECOVERY_HOLD_US: u64 = 10_000_000;

/// Sequence-error count above which the core escalates to recovery.
pub const DEFAULT_MAX_SEQUENCE_ERRORS: u32 = 5;

/// Ingress-drop count above which the core escalates to recovery.
pub const DEFAULT_MAX_QUEUE_DROPS: u32 = 10;

/// Immutable tuning for one core instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreConfig {
    /// Inactivity budget while a session is open.
    pub session_timeout_us: u64,
    /// Time budget for the verify state.
    pub validation_timeout_us: u64,
    /// Hold in the error state before returning to idle.
    pub error_hold_us: u64,
    /// Quarantine hold in emergency recovery.
    pub recovery_hold_us: u64,
    /// Protocol-error ceiling before escalation.
    pub max_sequence_errors: u32,
    /// Ingress-drop ceiling before escalation.
    pub max_queue_drops: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            session_timeout_us: DEFAULT_SESSION_TIMEOUT_US,
            validation_timeout_us: DEFAULT_VALIDATION_TIMEOUT_US,
            error_hold_us: DEFAULT_ERROR_HOLD_US,
            recovery_hold_us: DEFAULT_RECOVERY_HOLD_US,
            max_sequence_errors: DEFAULT_MAX_SEQUENCE_ERRORS,
            max_queue_drops: DEFAULT_MAX_QUEUE_DROPS,
        }
    }
}

/// Capability object binding the core to its external collaborators.
///
/// One implementation per host: the production firmware wires the hardware
/// tick, the flash peripheral, and the transport's response path; tests and
/// the flasher's simulator substitute deterministic doubles.
pub trait BootBus {
    /// Returns the monotonic microsecond counter.
    fn tick_us(&mut self) -> u64;

    /// Starts an asynchronous flash write of `data` at byte `address`.
    ///
    /// Returns `false` when an operation is already in flight. On `true` the
    /// driver copies what it needs before returning; the caller may reuse
    /// the source buffer immediately.
    fn start_flash_write(&mut self, address: u32, data: &[u8]) -> bool;

    /// Idempotent completion poll for the in-flight flash operation.
    fn flash_write_complete(&mut self) -> bool;

    /// Emits a positive acknowledgement frame.
    fn send_ack(&mut self);

    /// Emits a negative acknowledgement frame carrying `code`.
    fn send_nack(&mut self, code: NackCode);
}

/// Point-in-time observability snapshot of one core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StatusReport {
    /// Current supervisor state.
    pub state: BootState,
    /// State the supervisor occupied before the current one.
    pub previous_state: BootState,
    /// `true` once recovery has latched bootloader mode.
    pub force_bootloader_mode: bool,
    /// `true` while a transfer session is open.
    pub session_active: bool,
    /// Payload bytes accepted in the open session.
    pub bytes_received: u32,
    /// Byte count the peer declared for the open session.
    pub total_size: u32,
    /// Packets currently buffered in the receive ring.
    pub queued_packets: usize,
    /// Monotonic counters.
    pub stats: CoreStats,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "state: {:?} (from {:?})", self.state, self.previous_state)?;
        writeln!(f, "forced bootloader mode: {}", self.force_bootloader_mode)?;
        writeln!(
            f,
            "session: active={} received={}/{} bytes",
            self.session_active, self.bytes_received, self.total_size
        )?;
        writeln!(f, "queued packets: {}", self.queued_packets)?;
        writeln!(
            f,
            "packets: processed={} dropped={}",
            self.stats.packets_processed, self.stats.packets_dropped
        )?;
        write!(
            f,
            "counters: errors={} recoveries={} launches={}",
            self.stats.error_count,
            self.stats.recovery_attempts,
            self.stats.app_launch_attempts
        )
    }
}
