//! Packet-driven supervisor: queue draining, dispatch, timeouts, transfers.
//!
//! One `process_cycle` call performs, in order: timeout and escalation
//! checks, the flash completion poll, state background work, and a full
//! drain of the receive ring. Every step returns promptly; the only
//! long-latency device (flash) is polled, never awaited, so ingress can keep
//! enqueueing while a write is in flight.

use crate::api::{BootBus, CoreConfig, StatusReport};
use crate::flash::{image_size_valid, write_range_valid};
use crate::packet::{read_u16_be, read_u32_be, Packet, PacketType};
use crate::queue::PacketQueue;
use crate::response::NackCode;
use crate::session::{Session, ValidationRecord};
use crate::state::{transition_allowed, BootState};
use crate::stats::CoreStats;

/// Minimum total length of a START_SESSION packet: two header bytes, a
/// big-endian u32 image size, and a big-endian u16 CRC.
pub const START_SESSION_PACKET_LEN: usize = 8;

/// Tagged result of dispatching one inbound packet.
///
/// Dispatch decides, one applier acts: the wire response and the state
/// transition are carried here so the dispatch logic stays testable without
/// any I/O behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Acknowledge; no state change.
    Ack,
    /// Reject with a code; no state change.
    Nack(NackCode),
    /// Acknowledge, then transition.
    AckTransition(BootState),
    /// Reject with a code, then transition.
    NackTransition(NackCode, BootState),
    /// Transition without a response frame.
    Transition(BootState),
    /// No response, no transition.
    Nop,
}

/// The supervisor instance: all mutable core state behind one value.
///
/// Construction is explicit so tests can run many cores in parallel; there
/// is no hidden global. All mutation happens on the consumer side except
/// [`BootCore::receive_packet`], which only touches the producer half of the
/// receive ring and the drop counter.
#[derive(Debug, Clone)]
pub struct BootCore {
    config: CoreConfig,
    state: BootState,
    previous_state: BootState,
    state_entry_us: u64,
    last_activity_us: u64,
    force_bootloader_mode: bool,
    session: Session,
    queue: PacketQueue,
    stats: CoreStats,
    validation: Option<ValidationRecord>,
}

impl Default for BootCore {
    fn default() -> Self {
        Self::new()
    }
}

impl BootCore {
    /// Creates an idle core with the default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&CoreConfig::default())
    }

    /// Creates an idle core with explicit tuning.
    #[must_use]
    pub fn with_config(config: &CoreConfig) -> Self {
        Self {
            config: *config,
            state: BootState::Idle,
            previous_state: BootState::Idle,
            state_entry_us: 0,
            last_activity_us: 0,
            force_bootloader_mode: false,
            session: Session::new(),
            queue: PacketQueue::new(),
            stats: CoreStats::new(),
            validation: None,
        }
    }

    /// Reinitialises the core: clears every counter, the session, the queue,
    /// and the forced-bootloader latch, and enters idle.
    ///
    /// This is the only operation that clears `force_bootloader_mode`.
    /// Calling it twice yields the same state as calling it once.
    pub fn reset(&mut self) {
        *self = Self::with_config(&self.config);
    }

    /// Transport ingress: buffers one framed packet.
    ///
    /// Returns `false` and counts a drop when the ring is full; the peer
    /// observes the loss at the protocol level and retransmits.
    pub fn receive_packet(&mut self, bytes: &[u8]) -> bool {
        if self.queue.enqueue(bytes) {
            true
        } else {
            self.stats.record_dropped();
            false
        }
    }

    /// Returns the current supervisor state.
    #[must_use]
    pub const fn state(&self) -> BootState {
        self.state
    }

    /// Returns the state occupied before the current one.
    #[must_use]
    pub const fn previous_state(&self) -> BootState {
        self.previous_state
    }

    /// Returns `true` once recovery has latched bootloader mode.
    #[must_use]
    pub const fn force_bootloader_mode(&self) -> bool {
        self.force_bootloader_mode
    }

    /// Returns the transfer session bookkeeping.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the monotonic counters.
    #[must_use]
    pub const fn stats(&self) -> &CoreStats {
        &self.stats
    }

    /// Returns the active tuning.
    #[must_use]
    pub const fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Returns the number of packets currently buffered.
    #[must_use]
    pub const fn queued_packets(&self) -> usize {
        self.queue.len()
    }

    /// Returns the record produced by the most recent verify step.
    #[must_use]
    pub const fn validation(&self) -> Option<ValidationRecord> {
        self.validation
    }

    /// Produces the observability snapshot for this core.
    #[must_use]
    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            state: self.state,
            previous_state: self.previous_state,
            force_bootloader_mode: self.force_bootloader_mode,
            session_active: self.session.active(),
            bytes_received: self.session.bytes_received(),
            total_size: self.session.total_size(),
            queued_packets: self.queue.len(),
            stats: self.stats,
        }
    }
}

/// Runs one supervisor cycle against the collaborator bus.
///
/// Non-blocking: timeouts fire here (not at wall-clock precision), the flash
/// poll is a single idempotent call, and the ring is drained with each
/// packet dispatched against the state current at its own dispatch.
pub fn process_cycle(core: &mut BootCore, bus: &mut dyn BootBus) {
    let now = bus.tick_us();

    check_timeouts(core, now);

    let flash_idle = bus.flash_write_complete();
    run_background(core, now, flash_idle);

    while let Some(packet) = core.queue.dequeue() {
        core.last_activity_us = now;
        core.stats.record_processed();
        let outcome = dispatch_packet(core, bus, &packet);
        apply_outcome(core, bus, outcome, now);
    }
}

/// Dispatches one packet against the current state and returns the decision.
///
/// The flash write for an in-order DATA chunk is started here (accepting a
/// chunk and acknowledging it are one decision); everything else about the
/// outcome is applied by the caller.
pub fn dispatch_packet(
    core: &mut BootCore,
    bus: &mut dyn BootBus,
    packet: &Packet,
) -> DispatchOutcome {
    let Some((sequence, type_byte)) = packet.header() else {
        return DispatchOutcome::Nack(NackCode::Unknown);
    };
    let packet_type = PacketType::from_u8(type_byte);

    // Types honoured across states. Quarantine narrows the set down to
    // PING and EMERGENCY_RESET; everything else falls through to lockdown.
    match packet_type {
        Some(PacketType::Ping) => return DispatchOutcome::Ack,
        Some(PacketType::GetStatus) if core.state != BootState::EmergencyRecovery => {
            return DispatchOutcome::Ack;
        }
        Some(PacketType::EmergencyReset) => {
            return if core.state == BootState::EmergencyRecovery {
                DispatchOutcome::Nop
            } else {
                DispatchOutcome::Transition(BootState::EmergencyRecovery)
            };
        }
        Some(PacketType::Abort) if core.state == BootState::DfuActive => {
            return DispatchOutcome::AckTransition(BootState::Idle);
        }
        _ => {}
    }

    match core.state {
        BootState::Idle => dispatch_idle(core, packet, packet_type),
        BootState::DfuActive => dispatch_active(core, bus, packet, sequence, packet_type),
        BootState::DfuVerify | BootState::RunningApp | BootState::Error => {
            DispatchOutcome::Nack(NackCode::InvalidState)
        }
        BootState::EmergencyRecovery => DispatchOutcome::Nack(NackCode::RecoveryLockdown),
    }
}

fn dispatch_idle(
    core: &mut BootCore,
    packet: &Packet,
    packet_type: Option<PacketType>,
) -> DispatchOutcome {
    match packet_type {
        Some(PacketType::StartSession) => dispatch_start_session(core, packet),
        Some(PacketType::JumpApp) => {
            if core.force_bootloader_mode {
                DispatchOutcome::Nack(NackCode::BootloaderForced)
            } else {
                DispatchOutcome::AckTransition(BootState::DfuVerify)
            }
        }
        _ => DispatchOutcome::Nack(NackCode::UnexpectedPacket),
    }
}

fn dispatch_start_session(core: &mut BootCore, packet: &Packet) -> DispatchOutcome {
    if core.force_bootloader_mode {
        return DispatchOutcome::Nack(NackCode::BootloaderForced);
    }
    if packet.len() < START_SESSION_PACKET_LEN {
        return DispatchOutcome::Nack(NackCode::UnexpectedPacket);
    }

    let payload = packet.payload();
    let (Some(total_size), Some(expected_crc)) =
        (read_u32_be(payload, 0), read_u16_be(payload, 4))
    else {
        return DispatchOutcome::Nack(NackCode::UnexpectedPacket);
    };

    if !image_size_valid(total_size) {
        return DispatchOutcome::Nack(NackCode::InvalidSessionSize);
    }

    core.session.start(total_size, expected_crc);
    DispatchOutcome::AckTransition(BootState::DfuActive)
}

fn dispatch_active(
    core: &mut BootCore,
    bus: &mut dyn BootBus,
    packet: &Packet,
    sequence: u8,
    packet_type: Option<PacketType>,
) -> DispatchOutcome {
    match packet_type {
        Some(PacketType::Data) => dispatch_data(core, bus, packet, sequence),
        Some(PacketType::EndSession) => {
            if core.session.is_complete() {
                DispatchOutcome::AckTransition(BootState::DfuVerify)
            } else {
                DispatchOutcome::NackTransition(NackCode::IncompleteTransfer, BootState::Error)
            }
        }
        _ => DispatchOutcome::Nack(NackCode::InvalidTransferType),
    }
}

fn dispatch_data(
    core: &mut BootCore,
    bus: &mut dyn BootBus,
    packet: &Packet,
    sequence: u8,
) -> DispatchOutcome {
    if sequence != core.session.expected_seq() {
        core.stats.record_error();
        if core.stats.error_count > core.config.max_sequence_errors {
            return DispatchOutcome::NackTransition(
                NackCode::SequenceMismatch,
                BootState::EmergencyRecovery,
            );
        }
        return DispatchOutcome::Nack(NackCode::SequenceMismatch);
    }

    let payload = packet.payload();
    #[allow(clippy::cast_possible_truncation)]
    let payload_len = payload.len() as u32;
    if core.session.chunk_overflows(payload_len) {
        core.stats.record_error();
        return DispatchOutcome::Nack(NackCode::InvalidSessionSize);
    }

    if payload.is_empty() {
        // Nothing to write; the chunk still consumes a sequence number.
        core.session.record_chunk(payload);
        return DispatchOutcome::Ack;
    }

    let address = core.session.next_write_address();
    debug_assert!(write_range_valid(address, payload_len));
    if !bus.start_flash_write(address, payload) {
        return DispatchOutcome::Nack(NackCode::FlashBusy);
    }

    // The driver has copied what it needs; the write completes on its own
    // and the completion poll picks it up next cycle.
    core.session.record_chunk(payload);
    DispatchOutcome::Ack
}

fn apply_outcome(core: &mut BootCore, bus: &mut dyn BootBus, outcome: DispatchOutcome, now: u64) {
    match outcome {
        DispatchOutcome::Ack => bus.send_ack(),
        DispatchOutcome::Nack(code) => bus.send_nack(code),
        DispatchOutcome::AckTransition(next) => {
            bus.send_ack();
            enter_state(core, next, now);
        }
        DispatchOutcome::NackTransition(code, next) => {
            bus.send_nack(code);
            enter_state(core, next, now);
        }
        DispatchOutcome::Transition(next) => enter_state(core, next, now),
        DispatchOutcome::Nop => {}
    }
}

fn check_timeouts(core: &mut BootCore, now: u64) {
    match core.state {
        BootState::Error => {
            if now.saturating_sub(core.state_entry_us) > core.config.error_hold_us {
                enter_state(core, BootState::Idle, now);
            }
        }
        BootState::EmergencyRecovery => {
            if now.saturating_sub(core.state_entry_us) > core.config.recovery_hold_us {
                core.stats.clear_escalation_counters();
                enter_state(core, BootState::Idle, now);
            }
        }
        BootState::Idle
        | BootState::DfuActive
        | BootState::DfuVerify
        | BootState::RunningApp => {}
    }

    if core.state != BootState::EmergencyRecovery
        && core.stats.packets_dropped > core.config.max_queue_drops
    {
        enter_state(core, BootState::EmergencyRecovery, now);
    }

    if core.state.is_session_bearing()
        && core.session.active()
        && now.saturating_sub(core.last_activity_us) > core.config.session_timeout_us
    {
        enter_state(core, BootState::Error, now);
    }

    if core.state == BootState::DfuVerify
        && now.saturating_sub(core.state_entry_us) > core.config.validation_timeout_us
    {
        enter_state(core, BootState::Error, now);
    }
}

fn run_background(core: &mut BootCore, now: u64, flash_idle: bool) {
    match core.state {
        BootState::DfuVerify => {
            // Validation waits for the last chunk to land.
            if flash_idle {
                let record = if core.session.active() {
                    core.session.validate()
                } else {
                    ValidationRecord::resident()
                };
                core.validation = Some(record);
                let next = if record.valid {
                    BootState::RunningApp
                } else {
                    BootState::Error
                };
                enter_state(core, next, now);
            }
        }
        BootState::RunningApp => {
            // The deployment startup shim takes over here; without one,
            // control returns to idle.
            enter_state(core, BootState::Idle, now);
        }
        BootState::Idle
        | BootState::DfuActive
        | BootState::EmergencyRecovery
        | BootState::Error => {}
    }
}

fn enter_state(core: &mut BootCore, next: BootState, now: u64) {
    if !transition_allowed(core.state, next) {
        // An inadmissible request is itself a fault.
        commit_state(core, BootState::Error, now);
        return;
    }
    commit_state(core, next, now);
}

fn commit_state(core: &mut BootCore, next: BootState, now: u64) {
    core.previous_state = core.state;
    core.state = next;
    core.state_entry_us = now;

    match next {
        BootState::Idle => core.session.clear(),
        BootState::DfuActive => {}
        BootState::DfuVerify => core.validation = None,
        BootState::RunningApp => core.stats.record_app_launch(),
        BootState::EmergencyRecovery => {
            core.stats.record_recovery();
            core.force_bootloader_mode = true;
        }
        BootState::Error => core.stats.record_error(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        dispatch_packet, process_cycle, BootCore, DispatchOutcome, START_SESSION_PACKET_LEN,
    };
    use crate::api::BootBus;
    use crate::packet::Packet;
    use crate::response::NackCode;
    use crate::state::BootState;

    #[derive(Default)]
    struct StubBus {
        now_us: u64,
        tick_step_us: u64,
        flash_busy_until_us: u64,
        flash_latency_us: u64,
        acks: u32,
        nacks: Vec<NackCode>,
        writes: Vec<(u32, usize)>,
    }

    impl StubBus {
        fn with_step(step_us: u64) -> Self {
            Self {
                tick_step_us: step_us,
                ..Self::default()
            }
        }
    }

    impl BootBus for StubBus {
        fn tick_us(&mut self) -> u64 {
            self.now_us += self.tick_step_us;
            self.now_us
        }

        fn start_flash_write(&mut self, address: u32, data: &[u8]) -> bool {
            if self.now_us < self.flash_busy_until_us {
                return false;
            }
            self.flash_busy_until_us = self.now_us + self.flash_latency_us;
            self.writes.push((address, data.len()));
            true
        }

        fn flash_write_complete(&mut self) -> bool {
            self.now_us >= self.flash_busy_until_us
        }

        fn send_ack(&mut self) {
            self.acks += 1;
        }

        fn send_nack(&mut self, code: NackCode) {
            self.nacks.push(code);
        }
    }

    fn start_frame(total_size: u32, crc: u16) -> Vec<u8> {
        let mut frame = vec![0x00, 0x01];
        frame.extend_from_slice(&total_size.to_be_bytes());
        frame.extend_from_slice(&crc.to_be_bytes());
        frame
    }

    #[test]
    fn fresh_core_is_idle_with_cleared_bookkeeping() {
        let core = BootCore::new();
        assert_eq!(core.state(), BootState::Idle);
        assert_eq!(core.previous_state(), BootState::Idle);
        assert!(!core.force_bootloader_mode());
        assert!(!core.session().active());
        assert_eq!(core.queued_packets(), 0);
        assert_eq!(core.validation(), None);
    }

    #[test]
    fn ping_dispatch_decision_is_a_plain_ack() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);
        let ping = Packet::from_bytes(&[0x42, 0x05]);

        assert_eq!(
            dispatch_packet(&mut core, &mut bus, &ping),
            DispatchOutcome::Ack
        );
    }

    #[test]
    fn start_session_opens_a_transfer_and_enters_active() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        assert!(core.receive_packet(&start_frame(512, 0x1234)));
        process_cycle(&mut core, &mut bus);

        assert_eq!(core.state(), BootState::DfuActive);
        assert_eq!(core.previous_state(), BootState::Idle);
        assert!(core.session().active());
        assert_eq!(core.session().total_size(), 512);
        assert_eq!(core.session().expected_crc(), 0x1234);
        assert_eq!(bus.acks, 1);
    }

    #[test]
    fn short_start_session_is_rejected_with_unexpected_packet() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        // The two-byte size form is below the canonical frame length.
        assert!(core.receive_packet(&[0x00, 0x01, 0x02, 0x00]));
        process_cycle(&mut core, &mut bus);

        assert_eq!(core.state(), BootState::Idle);
        assert_eq!(bus.nacks, vec![NackCode::UnexpectedPacket]);
        assert_eq!(START_SESSION_PACKET_LEN, 8);
    }

    #[test]
    fn zero_and_oversized_session_sizes_are_rejected() {
        for size in [0_u32, 1024 * 1024 + 1] {
            let mut core = BootCore::new();
            let mut bus = StubBus::with_step(1_000);

            assert!(core.receive_packet(&start_frame(size, 0)));
            process_cycle(&mut core, &mut bus);

            assert_eq!(core.state(), BootState::Idle);
            assert_eq!(bus.nacks, vec![NackCode::InvalidSessionSize]);
        }
    }

    #[test]
    fn in_order_data_is_written_and_acknowledged() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        assert!(core.receive_packet(&start_frame(4, 0)));
        process_cycle(&mut core, &mut bus);

        let mut data = vec![0x01, 0x02];
        data.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);
        assert!(core.receive_packet(&data));
        process_cycle(&mut core, &mut bus);

        assert_eq!(bus.acks, 2);
        assert_eq!(bus.writes, vec![(crate::flash::APPLICATION_START, 4)]);
        assert_eq!(core.session().bytes_received(), 4);
        assert_eq!(core.session().expected_seq(), 2);
    }

    #[test]
    fn out_of_order_data_is_rejected_without_progress() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        assert!(core.receive_packet(&start_frame(16, 0)));
        process_cycle(&mut core, &mut bus);

        assert!(core.receive_packet(&[0x09, 0x02, 0x00]));
        process_cycle(&mut core, &mut bus);

        assert_eq!(bus.nacks, vec![NackCode::SequenceMismatch]);
        assert_eq!(core.session().bytes_received(), 0);
        assert_eq!(core.session().expected_seq(), 1);
        assert_eq!(core.stats().error_count, 1);
        assert!(bus.writes.is_empty());
    }

    #[test]
    fn data_overflowing_the_declared_total_is_rejected() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        assert!(core.receive_packet(&start_frame(2, 0)));
        process_cycle(&mut core, &mut bus);

        assert!(core.receive_packet(&[0x01, 0x02, 0x11, 0x22, 0x33]));
        process_cycle(&mut core, &mut bus);

        assert_eq!(bus.nacks, vec![NackCode::InvalidSessionSize]);
        assert_eq!(core.session().bytes_received(), 0);
        assert!(bus.writes.is_empty());
    }

    #[test]
    fn busy_flash_pushes_back_without_consuming_the_sequence() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);
        bus.flash_latency_us = 10_000;

        assert!(core.receive_packet(&start_frame(8, 0)));
        process_cycle(&mut core, &mut bus);

        assert!(core.receive_packet(&[0x01, 0x02, 0x01, 0x02, 0x03, 0x04]));
        process_cycle(&mut core, &mut bus);
        assert_eq!(bus.acks, 2);

        // The second chunk arrives while the first write is in flight.
        assert!(core.receive_packet(&[0x02, 0x02, 0x05, 0x06, 0x07, 0x08]));
        process_cycle(&mut core, &mut bus);

        assert_eq!(bus.nacks, vec![NackCode::FlashBusy]);
        assert_eq!(core.session().bytes_received(), 4);
        assert_eq!(core.session().expected_seq(), 2);
    }

    #[test]
    fn global_types_win_over_state_routing() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        assert!(core.receive_packet(&start_frame(4, 0)));
        process_cycle(&mut core, &mut bus);
        assert_eq!(core.state(), BootState::DfuActive);

        // ABORT is honoured mid-transfer and clears the session.
        assert!(core.receive_packet(&[0x0A, 0x04]));
        process_cycle(&mut core, &mut bus);

        assert_eq!(core.state(), BootState::Idle);
        assert!(!core.session().active());
        assert_eq!(bus.acks, 2);
    }

    #[test]
    fn emergency_reset_transitions_silently_and_latches_forced_mode() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        assert!(core.receive_packet(&[0x00, 0x08]));
        process_cycle(&mut core, &mut bus);

        assert_eq!(core.state(), BootState::EmergencyRecovery);
        assert!(core.force_bootloader_mode());
        assert_eq!(core.stats().recovery_attempts, 1);
        assert_eq!(bus.acks, 0);
        assert!(bus.nacks.is_empty());

        // A repeat reset while quarantined is a no-op.
        assert!(core.receive_packet(&[0x01, 0x08]));
        process_cycle(&mut core, &mut bus);
        assert_eq!(core.stats().recovery_attempts, 1);
    }

    #[test]
    fn headerless_packet_gets_the_defensive_default() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        assert!(core.receive_packet(&[0x05]));
        process_cycle(&mut core, &mut bus);

        assert_eq!(bus.nacks, vec![NackCode::Unknown]);
        assert_eq!(core.state(), BootState::Idle);
    }

    #[test]
    fn jump_app_is_blocked_while_bootloader_mode_is_forced() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        assert!(core.receive_packet(&[0x00, 0x08]));
        process_cycle(&mut core, &mut bus);

        // Self-heal out of quarantine, then try to launch.
        bus.now_us += core.config().recovery_hold_us;
        process_cycle(&mut core, &mut bus);
        assert_eq!(core.state(), BootState::Idle);

        assert!(core.receive_packet(&[0x00, 0x07]));
        process_cycle(&mut core, &mut bus);

        assert_eq!(bus.nacks, vec![NackCode::BootloaderForced]);
        assert_eq!(core.state(), BootState::Idle);
    }

    #[test]
    fn reset_is_idempotent_and_clears_the_forced_latch() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        assert!(core.receive_packet(&start_frame(64, 0x0BAD)));
        process_cycle(&mut core, &mut bus);
        assert!(core.receive_packet(&[0x00, 0x08]));
        process_cycle(&mut core, &mut bus);
        assert!(core.force_bootloader_mode());

        core.reset();
        let once = core.clone();
        core.reset();

        assert_eq!(core.state(), once.state());
        assert!(!core.force_bootloader_mode());
        assert_eq!(core.stats(), once.stats());
        assert_eq!(core.queued_packets(), 0);
        assert_eq!(core.stats().packets_processed, 0);
    }

    #[test]
    fn status_report_mirrors_the_live_core() {
        let mut core = BootCore::new();
        let mut bus = StubBus::with_step(1_000);

        assert!(core.receive_packet(&start_frame(512, 0x1234)));
        process_cycle(&mut core, &mut bus);
        assert!(core.receive_packet(&[0x01, 0x05]));

        let report = core.status_report();
        assert_eq!(report.state, BootState::DfuActive);
        assert_eq!(report.previous_state, BootState::Idle);
        assert!(report.session_active);
        assert_eq!(report.total_size, 512);
        assert_eq!(report.queued_packets, 1);
        assert_eq!(report.stats.packets_processed, 1);
    }
}
