//! Concurrent map from user id to ledger.
//!
//! Each ledger sits behind its own mutex so updates for one user never wait on
//! another. The registry lock is only held for the lookup itself.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::ledger::{LedgerPolicy, UserLedger};
use crate::types::UserId;

/// Shared handle to one user's ledger.
pub type LedgerHandle = Arc<Mutex<UserLedger>>;

/// Owns every [`UserLedger`]; ledgers are created on first lookup and never removed.
#[derive(Clone)]
pub struct UserRegistry {
    ledgers: Arc<RwLock<HashMap<UserId, LedgerHandle>>>,
    policy: LedgerPolicy,
    clock: Arc<dyn Clock>,
}

impl UserRegistry {
    pub fn new(policy: LedgerPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: LedgerPolicy, clock: Arc<dyn Clock>) -> Self {
        info!(
            max_history = policy.max_history(),
            max_in_window = policy.max_in_window(),
            window_secs = policy.window_secs(),
            "User registry initialized"
        );
        Self {
            ledgers: Arc::new(RwLock::new(HashMap::new())),
            policy,
            clock,
        }
    }

    /// Return the ledger for `id`, creating an empty one on first use.
    pub async fn resolve(&self, id: UserId) -> LedgerHandle {
        if let Some(ledger) = self.ledgers.read().await.get(&id) {
            return ledger.clone();
        }

        let mut ledgers = self.ledgers.write().await;
        ledgers
            .entry(id)
            .or_insert_with(|| {
                debug!(user_id = id, "Creating ledger");
                Arc::new(Mutex::new(UserLedger::new(id, self.policy, self.clock.clone())))
            })
            .clone()
    }

    /// Whether a ledger has been created for `id`. Never creates one.
    pub async fn contains(&self, id: UserId) -> bool {
        self.ledgers.read().await.contains_key(&id)
    }

    /// Number of ledgers created so far.
    pub async fn len(&self) -> usize {
        self.ledgers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ledgers.read().await.is_empty()
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new(LedgerPolicy::default())
    }
}
