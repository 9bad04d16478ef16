//! Per-user request ledger: bounded OCR history plus a sliding-window rate limit.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::clock::Clock;
use crate::error::SnapError;
use crate::record::Record;
use crate::types::{Language, UserId};

/// Records kept per user before the oldest are evicted.
pub const MAX_HISTORY: usize = 10;

/// Requests allowed inside one rate-limit window.
pub const MAX_IN_WINDOW: usize = 3;

/// Rate-limit window length in seconds.
pub const WINDOW_SECONDS: i64 = 180;

/// Retention and rate-limit bounds shared by every ledger in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPolicy {
    max_history: usize,
    max_in_window: usize,
    window_secs: i64,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            max_history: MAX_HISTORY,
            max_in_window: MAX_IN_WINDOW,
            window_secs: WINDOW_SECONDS,
        }
    }
}

impl LedgerPolicy {
    /// Build a policy, rejecting bounds the boundary-record check cannot honour.
    ///
    /// Requires `1 <= max_in_window <= max_history` and a positive window.
    pub fn new(max_history: usize, max_in_window: usize, window_secs: i64) -> Result<Self, SnapError> {
        if max_history == 0 {
            return Err(SnapError::Config("maxHistory must be >= 1".into()));
        }
        if max_in_window == 0 {
            return Err(SnapError::Config("maxInWindow must be >= 1".into()));
        }
        if max_in_window > max_history {
            return Err(SnapError::Config(format!(
                "maxInWindow ({max_in_window}) must not exceed maxHistory ({max_history})"
            )));
        }
        if window_secs <= 0 {
            return Err(SnapError::Config("windowSecs must be > 0".into()));
        }
        Ok(Self { max_history, max_in_window, window_secs })
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn max_in_window(&self) -> usize {
        self.max_in_window
    }

    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }
}

/// State tracked for a single user.
pub struct UserLedger {
    id: UserId,
    language: Language,
    records: VecDeque<Record>,
    policy: LedgerPolicy,
    clock: Arc<dyn Clock>,
}

impl UserLedger {
    pub fn new(id: UserId, policy: LedgerPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            id,
            language: Language::default(),
            records: VecDeque::with_capacity(policy.max_history + 1),
            policy,
            clock,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        debug!(user_id = self.id, %language, "Language changed");
        self.language = language;
    }

    /// Append a completed request, evicting the oldest entries past the cap.
    pub fn add_record(
        &mut self,
        result: impl Into<String>,
        image_id: impl Into<String>,
        image_path: impl Into<String>,
        submitted_at: i64,
    ) {
        let record = Record::new(result, image_id, image_path, submitted_at, self.clock.as_ref());
        self.records.push_back(record);
        while self.records.len() > self.policy.max_history {
            self.records.pop_front();
        }
        debug!(user_id = self.id, count = self.records.len(), "Record added");
    }

    /// Chronological snapshot of retained records, oldest first.
    pub fn records(&self) -> Vec<Record> {
        self.records.iter().cloned().collect()
    }

    pub fn count_records(&self) -> usize {
        self.records.len()
    }

    /// True when the `max_in_window`-th newest record was received less than
    /// `window_secs` ago. Only that boundary record is inspected.
    pub fn is_rate_limited(&self) -> bool {
        let n = self.policy.max_in_window;
        if self.records.len() < n {
            return false;
        }
        let Some(boundary) = self.records.get(self.records.len() - n) else {
            return false;
        };
        self.clock.now() - boundary.received_at() < self.policy.window_secs
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }
}

impl std::fmt::Debug for UserLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLedger")
            .field("id", &self.id)
            .field("language", &self.language)
            .field("records", &self.records.len())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn ledger_with_clock(start: i64) -> (UserLedger, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start));
        let ledger = UserLedger::new(42, LedgerPolicy::default(), clock.clone());
        (ledger, clock)
    }

    fn add(ledger: &mut UserLedger, n: usize) {
        ledger.add_record(format!("text {n}"), format!("img-{n}"), format!("photos/{n}.jpg"), n as i64);
    }

    #[test]
    fn test_new_ledger_is_empty_and_unlimited() {
        let (ledger, _) = ledger_with_clock(0);
        assert_eq!(ledger.id(), 42);
        assert_eq!(ledger.language(), Language::En);
        assert_eq!(ledger.count_records(), 0);
        assert!(ledger.records().is_empty());
        assert!(!ledger.is_rate_limited());
    }

    #[test]
    fn test_count_is_min_of_adds_and_cap() {
        let (mut ledger, clock) = ledger_with_clock(0);
        for n in 1..=25 {
            clock.advance(1000);
            add(&mut ledger, n);
            assert_eq!(ledger.count_records(), n.min(MAX_HISTORY));
            assert!(ledger.records().len() <= MAX_HISTORY);
        }
    }

    #[test]
    fn test_eviction_is_fifo() {
        let (mut ledger, _) = ledger_with_clock(0);
        for n in 0..11 {
            add(&mut ledger, n);
        }
        let ids: Vec<String> = ledger.records().iter().map(|r| r.image_id().to_string()).collect();
        let expected: Vec<String> = (1..11).map(|n| format!("img-{n}")).collect();
        assert_eq!(ids, expected);
        assert!(!ids.contains(&"img-0".to_string()));
    }

    #[test]
    fn test_records_are_a_snapshot() {
        let (mut ledger, _) = ledger_with_clock(0);
        add(&mut ledger, 1);
        let snapshot = ledger.records();
        add(&mut ledger, 2);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(ledger.count_records(), 2);
    }

    #[test]
    fn test_rate_limit_window() {
        let (mut ledger, clock) = ledger_with_clock(0);
        add(&mut ledger, 0);
        clock.set(1);
        add(&mut ledger, 1);
        assert!(!ledger.is_rate_limited());
        clock.set(2);
        add(&mut ledger, 2);
        assert!(ledger.is_rate_limited());

        // Boundary record was received at t=0.
        clock.set(179);
        assert!(ledger.is_rate_limited());
        clock.set(180);
        assert!(!ledger.is_rate_limited());
        clock.set(181);
        assert!(!ledger.is_rate_limited());
    }

    #[test]
    fn test_rate_limit_uses_third_newest_record() {
        let (mut ledger, clock) = ledger_with_clock(0);
        add(&mut ledger, 0);
        clock.set(500);
        add(&mut ledger, 1);
        add(&mut ledger, 2);
        assert!(!ledger.is_rate_limited(), "boundary record is the t=0 one");
        add(&mut ledger, 3);
        assert!(ledger.is_rate_limited());
    }

    #[test]
    fn test_example_scenario() {
        let (mut ledger, clock) = ledger_with_clock(0);
        for t in 0..3 {
            clock.set(t);
            add(&mut ledger, t as usize);
        }
        assert_eq!(ledger.count_records(), 3);
        assert!(ledger.is_rate_limited());

        clock.set(181);
        assert!(!ledger.is_rate_limited());

        for n in 3..11 {
            add(&mut ledger, n);
        }
        assert_eq!(ledger.count_records(), 10);
        assert_eq!(ledger.records()[0].image_id(), "img-1");
    }

    #[test]
    fn test_language_is_mutable() {
        let (mut ledger, _) = ledger_with_clock(0);
        ledger.set_language(Language::Ru);
        assert_eq!(ledger.language(), Language::Ru);
    }

    #[test]
    fn test_policy_rejects_window_larger_than_history() {
        assert!(LedgerPolicy::new(3, 4, 60).is_err());
        assert!(LedgerPolicy::new(10, 0, 60).is_err());
        assert!(LedgerPolicy::new(0, 0, 60).is_err());
        assert!(LedgerPolicy::new(10, 3, 0).is_err());
        let policy = LedgerPolicy::new(5, 5, 30).unwrap();
        assert_eq!(policy.max_history(), 5);
        assert_eq!(policy.max_in_window(), 5);
        assert_eq!(policy.window_secs(), 30);
    }

    #[test]
    fn test_custom_policy_bounds() {
        let clock = Arc::new(ManualClock::new(0));
        let policy = LedgerPolicy::new(2, 1, 10).unwrap();
        let mut ledger = UserLedger::new(7, policy, clock.clone());
        add(&mut ledger, 0);
        assert!(ledger.is_rate_limited());
        clock.advance(10);
        assert!(!ledger.is_rate_limited());
        add(&mut ledger, 1);
        add(&mut ledger, 2);
        assert_eq!(ledger.count_records(), 2);
    }
}
