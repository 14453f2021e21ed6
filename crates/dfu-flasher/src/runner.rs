//! Replays a packet stream against an in-process core over a simulated bus.
//!
//! The runner plays the peer: it feeds frames one per cycle, retransmits a
//! chunk when the core pushes back with a busy NACK, and keeps cycling after
//! the stream ends until the core settles back in idle (or faults).

use bootloader_core::{
    process_cycle, BootBus, BootCore, BootState, CoreStats, NackCode, ValidationRecord,
};

/// One response frame observed on the simulated wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireResponse {
    /// Positive acknowledgement.
    Ack,
    /// Negative acknowledgement with its code.
    Nack(NackCode),
}

/// Deterministic collaborator double used by the replay harness.
pub struct SimBus {
    now_us: u64,
    tick_step_us: u64,
    flash_latency_us: u64,
    flash_busy_until_us: u64,
    responses: Vec<WireResponse>,
}

impl SimBus {
    /// Creates a bus with the given tick step and flash write latency.
    #[must_use]
    pub const fn new(tick_step_us: u64, flash_latency_us: u64) -> Self {
        Self {
            now_us: 0,
            tick_step_us,
            flash_latency_us,
            flash_busy_until_us: 0,
            responses: Vec::new(),
        }
    }

    /// Returns every response observed so far, in emission order.
    #[must_use]
    pub fn responses(&self) -> &[WireResponse] {
        &self.responses
    }

    /// Returns the current simulated time.
    #[must_use]
    pub const fn now_us(&self) -> u64 {
        self.now_us
    }
}

impl BootBus for SimBus {
    fn tick_us(&mut self) -> u64 {
        self.now_us += self.tick_step_us;
        self.now_us
    }

    fn start_flash_write(&mut self, _address: u32, _data: &[u8]) -> bool {
        if self.now_us < self.flash_busy_until_us {
            return false;
        }
        self.flash_busy_until_us = self.now_us + self.flash_latency_us;
        true
    }

    fn flash_write_complete(&mut self) -> bool {
        self.now_us >= self.flash_busy_until_us
    }

    fn send_ack(&mut self) {
        self.responses.push(WireResponse::Ack);
    }

    fn send_nack(&mut self, code: NackCode) {
        self.responses.push(WireResponse::Nack(code));
    }
}

/// Tuning for one replay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Tick advance per bus poll.
    pub tick_step_us: u64,
    /// Simulated flash write latency.
    pub flash_latency_us: u64,
    /// Retransmission ceiling per frame before the run is abandoned.
    pub max_retries: u32,
    /// Cycle ceiling while waiting for the core to settle after the stream.
    pub settle_cycles: u32,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            tick_step_us: 1_000,
            flash_latency_us: 2_000,
            max_retries: 8,
            settle_cycles: 64,
        }
    }
}

/// Outcome of replaying one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    /// Positive acknowledgements observed.
    pub acks: u32,
    /// Negative acknowledgements observed, in order.
    pub nacks: Vec<NackCode>,
    /// Frames that needed at least one retransmission.
    pub retransmissions: u32,
    /// State the core settled in.
    pub final_state: BootState,
    /// Verify-step record, when the run reached verification.
    pub validation: Option<ValidationRecord>,
    /// Core counters at the end of the run.
    pub stats: CoreStats,
    /// Simulated time consumed by the run.
    pub elapsed_us: u64,
}

impl ReplayReport {
    /// Returns `true` when the image was verified and handed off.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.validation.is_some_and(|record| record.valid) && self.stats.app_launch_attempts > 0
    }
}

/// Feeds `frames` through a fresh core and drives it until it settles.
#[must_use]
pub fn replay(frames: &[Vec<u8>], options: &ReplayOptions) -> ReplayReport {
    let mut core = BootCore::new();
    let mut bus = SimBus::new(options.tick_step_us, options.flash_latency_us);
    let mut retransmissions = 0_u32;

    'stream: for frame in frames {
        let mut attempts = 0_u32;
        loop {
            let seen = bus.responses.len();
            assert!(core.receive_packet(frame), "runner feeds one frame at a time");
            process_cycle(&mut core, &mut bus);

            match bus.responses.get(seen..) {
                Some([WireResponse::Nack(NackCode::FlashBusy)]) => {
                    attempts += 1;
                    retransmissions += 1;
                    if attempts > options.max_retries {
                        break 'stream;
                    }
                    // Give the write time to land before resending.
                    process_cycle(&mut core, &mut bus);
                }
                _ => break,
            }
        }
    }

    let mut settle = 0_u32;
    while core.state() != BootState::Idle
        && core.state() != BootState::Error
        && settle < options.settle_cycles
    {
        process_cycle(&mut core, &mut bus);
        settle += 1;
    }

    let acks = u32::try_from(
        bus.responses
            .iter()
            .filter(|response| matches!(response, WireResponse::Ack))
            .count(),
    )
    .unwrap_or(u32::MAX);
    let nacks = bus
        .responses
        .iter()
        .filter_map(|response| match response {
            WireResponse::Nack(code) => Some(*code),
            WireResponse::Ack => None,
        })
        .collect();

    ReplayReport {
        acks,
        nacks,
        retransmissions,
        final_state: core.state(),
        validation: core.validation(),
        stats: *core.stats(),
        elapsed_us: bus.now_us(),
    }
}
