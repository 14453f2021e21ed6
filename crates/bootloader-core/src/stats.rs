//! Monotonic observability counters kept by the supervisor.

/// Saturating counters visible through the status surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreStats {
    /// Packets dequeued and dispatched by the supervisor.
    pub packets_processed: u32,
    /// Packets rejected at ingress because the receive ring was full.
    pub packets_dropped: u32,
    /// Protocol errors and error-state entries.
    pub error_count: u32,
    /// Emergency-recovery entries.
    pub recovery_attempts: u32,
    /// Application launch attempts.
    pub app_launch_attempts: u32,
}

impl CoreStats {
    /// Creates a zeroed counter block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one dispatched packet.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_processed(&mut self) {
        self.packets_processed = self.packets_processed.saturating_add(1);
    }

    /// Records one ingress drop.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_dropped(&mut self) {
        self.packets_dropped = self.packets_dropped.saturating_add(1);
    }

    /// Records one protocol error or error-state entry.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
    }

    /// Records one emergency-recovery entry.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_recovery(&mut self) {
        self.recovery_attempts = self.recovery_attempts.saturating_add(1);
    }

    /// Records one application launch attempt.
    #[allow(clippy::missing_const_for_fn)]
    pub fn record_app_launch(&mut self) {
        self.app_launch_attempts = self.app_launch_attempts.saturating_add(1);
    }

    /// Clears the counters that drive escalation decisions.
    ///
    /// Recovery self-heal forgives drops and errors but keeps the attempt
    /// counters, which only an explicit reset clears.
    #[allow(clippy::missing_const_for_fn)]
    pub fn clear_escalation_counters(&mut self) {
        self.packets_dropped = 0;
        self.error_count = 0;
    }

    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::CoreStats;

    #[test]
    fn fresh_counters_are_all_zero() {
        let stats = CoreStats::new();
        assert_eq!(stats.packets_processed, 0);
        assert_eq!(stats.packets_dropped, 0);
        assert_eq!(stats.error_count, 0);
        assert_eq!(stats.recovery_attempts, 0);
        assert_eq!(stats.app_launch_attempts, 0);
    }

    #[test]
    fn record_methods_track_each_counter_independently() {
        let mut stats = CoreStats::new();
        stats.record_processed();
        stats.record_processed();
        stats.record_dropped();
        stats.record_error();
        stats.record_recovery();
        stats.record_app_launch();

        assert_eq!(stats.packets_processed, 2);
        assert_eq!(stats.packets_dropped, 1);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.recovery_attempts, 1);
        assert_eq!(stats.app_launch_attempts, 1);
    }

    #[test]
    fn escalation_clear_keeps_the_attempt_counters() {
        let mut stats = CoreStats::new();
        stats.record_dropped();
        stats.record_error();
        stats.record_recovery();
        stats.record_app_launch();

        stats.clear_escalation_counters();

        assert_eq!(stats.packets_dropped, 0);
        assert_eq!(stats.error_count, 0);
        assert_eq!(stats.recovery_attempts, 1);
        assert_eq!(stats.app_launch_attempts, 1);
    }

    #[test]
    fn counters_saturate_instead_of_wrapping() {
        let mut stats = CoreStats {
            error_count: u32::MAX,
            ..CoreStats::default()
        };
        stats.record_error();
        assert_eq!(stats.error_count, u32::MAX);
    }

    #[test]
    fn reset_returns_to_the_zero_block() {
        let mut stats = CoreStats::new();
        stats.record_processed();
        stats.record_recovery();
        stats.reset();
        assert_eq!(stats, CoreStats::default());
    }
}
