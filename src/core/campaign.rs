//! Delivery accounting for a broadcast campaign.
//!
//! A campaign attempts one direct message per recipient, classifies each
//! outcome, and produces a single aggregate report. Nothing here is retried
//! or persisted.

/// Discord JSON error code for "Cannot send messages to this user".
pub const CANNOT_SEND_TO_USER: isize = 50007;

/// Outcome of a single direct-message attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The message reached the recipient.
    Delivered,
    /// The recipient has direct messages disabled for this server.
    MessagesDisabled,
    /// Any other send failure.
    Failed,
}

/// Aggregate result of one campaign, computed once and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Display name of the target guild.
    pub guild_name: String,
    /// Messages that reached their recipient.
    pub success: usize,
    /// Attempts that failed for any reason, disabled DMs included.
    pub failed: usize,
    /// Recipients attempted, bots excluded.
    pub total: usize,
}

impl DeliveryReport {
    /// Creates an empty report for a campaign targeting `total` recipients.
    #[must_use]
    pub fn new(guild_name: String, total: usize) -> Self {
        Self {
            guild_name,
            success: 0,
            failed: 0,
            total,
        }
    }

    /// Records one attempt. Disabled DMs count as failures in the aggregate;
    /// the distinction only matters for logging.
    pub fn record(&mut self, outcome: DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered => self.success += 1,
            DeliveryOutcome::MessagesDisabled | DeliveryOutcome::Failed => self.failed += 1,
        }
    }

    /// True when every attempted send was delivered.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Classifies a failed send from its Discord JSON error code, if any.
///
/// Transport-level failures carry no code and classify as [`DeliveryOutcome::Failed`].
#[must_use]
pub fn classify_rejection(code: Option<isize>) -> DeliveryOutcome {
    match code {
        Some(CANNOT_SEND_TO_USER) => DeliveryOutcome::MessagesDisabled,
        _ => DeliveryOutcome::Failed,
    }
}

/// Whether to pause after the send at `index` (0-based).
///
/// Pauses on every `rate_limit`-th send, the 0-th excluded, exactly as
/// configured. A `rate_limit` of zero disables pacing entirely.
#[must_use]
pub fn pause_due(index: usize, rate_limit: usize) -> bool {
    rate_limit != 0 && index != 0 && index % rate_limit == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_campaign(outcomes: &[DeliveryOutcome]) -> DeliveryReport {
        let mut report = DeliveryReport::new("Test Guild".to_owned(), outcomes.len());
        for outcome in outcomes {
            report.record(*outcome);
        }
        report
    }

    #[test]
    fn report_all_delivered() {
        let report = run_campaign(&[DeliveryOutcome::Delivered; 7]);
        assert_eq!(report.success, 7);
        assert_eq!(report.failed, 0);
        assert_eq!(report.total, 7);
        assert!(report.is_clean());
    }

    #[test]
    fn report_counts_disabled_dms_as_failures() {
        // M = 5 recipients, K = 2 with DMs disabled
        let report = run_campaign(&[
            DeliveryOutcome::Delivered,
            DeliveryOutcome::MessagesDisabled,
            DeliveryOutcome::Delivered,
            DeliveryOutcome::MessagesDisabled,
            DeliveryOutcome::Delivered,
        ]);
        assert_eq!(report.success, 3);
        assert_eq!(report.failed, 2);
        assert_eq!(report.total, 5);
        assert!(!report.is_clean());
    }

    #[test]
    fn report_mixed_failures() {
        let report = run_campaign(&[
            DeliveryOutcome::Failed,
            DeliveryOutcome::MessagesDisabled,
            DeliveryOutcome::Delivered,
        ]);
        assert_eq!(report.success, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.total, 3);
    }

    #[test]
    fn report_empty_guild_is_all_zeros() {
        let report = run_campaign(&[]);
        assert_eq!(report.success, 0);
        assert_eq!(report.failed, 0);
        assert_eq!(report.total, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn classify_dm_disabled_code() {
        assert_eq!(
            classify_rejection(Some(CANNOT_SEND_TO_USER)),
            DeliveryOutcome::MessagesDisabled
        );
    }

    #[test]
    fn classify_other_codes_as_failed() {
        assert_eq!(classify_rejection(Some(50013)), DeliveryOutcome::Failed);
        assert_eq!(classify_rejection(None), DeliveryOutcome::Failed);
    }

    #[test]
    fn pause_skips_the_first_send() {
        assert!(!pause_due(0, 5));
    }

    #[test]
    fn pause_fires_on_every_nth_send() {
        assert!(pause_due(5, 5));
        assert!(pause_due(10, 5));
        assert!(!pause_due(4, 5));
        assert!(!pause_due(6, 5));
    }

    #[test]
    fn zero_rate_limit_never_pauses() {
        for index in 0..50 {
            assert!(!pause_due(index, 0));
        }
    }
}
