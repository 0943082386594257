//! Bounded, keyed conversation-state storage.
//!
//! One slot per user identifier. A turn takes a [`SessionLease`], which holds
//! the slot's turn lock for its whole lifetime, so concurrent deliveries for
//! the same identifier are serialized and cannot lose profile updates.
//! Committing the lease persists the mutated state; dropping it discards the
//! turn, which is how a failed turn leaves the last good state untouched.
//!
//! Slots idle past the policy's time-to-live are purged on access, and when
//! the capacity cap is reached the longest-idle unleased slot is evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as TurnMutex;
use tokio::sync::OwnedMutexGuard;

use super::domain::{ConversationState, UserId};

/// Retention dials for the store.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    pub time_to_live: chrono::Duration,
    pub max_sessions: usize,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            time_to_live: chrono::Duration::hours(24),
            max_sessions: 4096,
        }
    }
}

struct SessionSlot {
    state: ConversationState,
    last_activity: DateTime<Utc>,
    turn: Arc<TurnMutex<()>>,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            state: ConversationState::default(),
            last_activity: Utc::now(),
            turn: Arc::new(TurnMutex::new(())),
        }
    }

    fn leased(&self) -> bool {
        Arc::strong_count(&self.turn) > 1
    }
}

/// Keyed in-memory state service for ongoing conversations.
pub struct SessionStore {
    policy: SessionPolicy,
    slots: Mutex<HashMap<UserId, SessionSlot>>,
}

impl SessionStore {
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            policy,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Open the turn for a user, creating the default state on first
    /// contact. Waits if another turn for the same user is in flight.
    pub async fn begin(&self, user_id: &UserId) -> SessionLease<'_> {
        let turn = {
            let mut slots = self.slots.lock().expect("session store mutex poisoned");
            self.evict(&mut slots, user_id);
            slots
                .entry(user_id.clone())
                .or_insert_with(SessionSlot::new)
                .turn
                .clone()
        };

        let guard = turn.lock_owned().await;

        // Re-read under the turn lock: a prior holder may have committed.
        let state = {
            let mut slots = self.slots.lock().expect("session store mutex poisoned");
            let slot = slots.entry(user_id.clone()).or_insert_with(SessionSlot::new);
            slot.last_activity = Utc::now();
            slot.state.clone()
        };

        SessionLease {
            store: self,
            user_id: user_id.clone(),
            state,
            _turn: guard,
        }
    }

    /// Read-only snapshot without touching activity or the turn lock.
    pub fn peek(&self, user_id: &UserId) -> Option<ConversationState> {
        let slots = self.slots.lock().expect("session store mutex poisoned");
        slots.get(user_id).map(|slot| slot.state.clone())
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .expect("session store mutex poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, user_id: &UserId, state: ConversationState) {
        let mut slots = self.slots.lock().expect("session store mutex poisoned");
        let slot = slots.entry(user_id.clone()).or_insert_with(SessionSlot::new);
        slot.state = state;
        slot.last_activity = Utc::now();
    }

    /// Purge expired slots, then free capacity for `incoming` if needed.
    /// Slots with a lease in flight are never evicted.
    fn evict(&self, slots: &mut HashMap<UserId, SessionSlot>, incoming: &UserId) {
        let now = Utc::now();
        let ttl = self.policy.time_to_live;
        slots.retain(|_, slot| slot.leased() || now - slot.last_activity <= ttl);

        while slots.len() >= self.policy.max_sessions && !slots.contains_key(incoming) {
            let oldest = slots
                .iter()
                .filter(|(_, slot)| !slot.leased())
                .min_by_key(|(_, slot)| slot.last_activity)
                .map(|(user_id, _)| user_id.clone());

            match oldest {
                Some(user_id) => {
                    slots.remove(&user_id);
                }
                None => break,
            }
        }
    }
}

/// Exclusive handle on one user's turn.
pub struct SessionLease<'a> {
    store: &'a SessionStore,
    user_id: UserId,
    pub state: ConversationState,
    _turn: OwnedMutexGuard<()>,
}

impl SessionLease<'_> {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Persist the turn's mutations. Dropping the lease instead abandons
    /// them, leaving the last committed state in place.
    pub fn commit(self) {
        self.store.persist(&self.user_id, self.state);
    }
}
