//! Outcome of a poll cycle.

use chrono::{DateTime, Utc};

/// Lifecycle status of a poller's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollStatus {
    /// Not started yet.
    #[default]
    Idle,
    /// First fetch in flight, nothing to show yet.
    Loading,
    /// The latest attempt succeeded.
    Success,
    /// The latest attempt failed; `data` may still hold an older snapshot.
    Error,
}

/// Latest known state of one data domain.
///
/// `data` is only ever replaced by a successful attempt, so a failure leaves
/// the previous snapshot visible next to the error message.
#[derive(Debug, Clone)]
pub struct PollResult<T> {
    /// Last successfully fetched payload.
    pub data: Option<T>,
    /// Status of the latest applied attempt.
    pub status: PollStatus,
    /// User-facing message of the latest failure, cleared on success.
    pub error_message: Option<String>,
    /// Completion time of the latest applied attempt.
    pub fetched_at: Option<DateTime<Utc>>,
    /// Sequence number of the latest applied attempt.
    pub sequence: u64,
}

impl<T> Default for PollResult<T> {
    fn default() -> Self {
        Self {
            data: None,
            status: PollStatus::Idle,
            error_message: None,
            fetched_at: None,
            sequence: 0,
        }
    }
}

impl<T> PollResult<T> {
    /// A successful result holding `data`.
    pub fn with_data(data: T) -> Self {
        Self {
            data: Some(data),
            status: PollStatus::Success,
            fetched_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Record a successful attempt.
    pub fn apply_success(&mut self, data: T, sequence: u64, at: DateTime<Utc>) {
        self.data = Some(data);
        self.status = PollStatus::Success;
        self.error_message = None;
        self.fetched_at = Some(at);
        self.sequence = sequence;
    }

    /// Record a failed attempt, keeping the previous data.
    pub fn apply_failure(&mut self, message: String, sequence: u64, at: DateTime<Utc>) {
        self.status = PollStatus::Error;
        self.error_message = Some(message);
        self.fetched_at = Some(at);
        self.sequence = sequence;
    }

    /// Mark the first fetch as in flight. Returns `true` if anything changed.
    ///
    /// Once data exists, refreshes keep showing it instead of a spinner.
    pub fn begin_attempt(&mut self) -> bool {
        if self.data.is_some() || self.status == PollStatus::Loading {
            return false;
        }
        self.status = PollStatus::Loading;
        true
    }

    /// Whether a loading indicator should be shown.
    pub fn is_loading(&self) -> bool {
        self.status == PollStatus::Loading
    }

    /// Whether an error banner should be shown.
    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// Whether the shown data is older than the latest attempt.
    pub fn is_stale(&self) -> bool {
        self.data.is_some() && self.status == PollStatus::Error
    }

    /// Map the payload, keeping the lifecycle fields.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PollResult<U> {
        PollResult {
            data: self.data.map(f),
            status: self.status,
            error_message: self.error_message,
            fetched_at: self.fetched_at,
            sequence: self.sequence,
        }
    }
}
