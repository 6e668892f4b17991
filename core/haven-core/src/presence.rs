//! Presence heartbeat: periodic liveness writes to the shared roster.
//!
//! Every tab republishes its own roster entry on a fixed cadence. The
//! roster is shared and last-writer-wins; a concurrent tab clobbering a
//! beat only delays this tab's entry until the next tick.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::CredentialProvider;
use crate::store::{keys, SharedStateStore};
use crate::types::{Role, SessionIdentity};

/// Seconds between heartbeat writes.
pub const HEARTBEAT_INTERVAL_SECS: i64 = 10;

/// The roster keeps only the most recent entries; oldest are evicted.
pub const ROSTER_LIMIT: usize = 50;

/// One tab's liveness record in the shared roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    /// Display identity at beat time, read live from the credential layer.
    pub identity: String,
    #[serde(default)]
    pub role: Role,
    pub last_seen: DateTime<Utc>,
}

/// Publishes this session's [`SessionRecord`] every heartbeat interval.
pub struct PresenceHeartbeat {
    session_id: String,
    next_beat_at: DateTime<Utc>,
}

impl PresenceHeartbeat {
    /// The first tick after construction publishes immediately.
    pub fn new(session_id: String, now: DateTime<Utc>) -> Self {
        PresenceHeartbeat {
            session_id,
            next_beat_at: now,
        }
    }

    /// Publishes a beat if the interval has elapsed. Pure side effect;
    /// never blocks, never fails visibly.
    pub fn tick(
        &mut self,
        store: &SharedStateStore,
        credentials: &dyn CredentialProvider,
        now: DateTime<Utc>,
    ) {
        if now < self.next_beat_at {
            return;
        }
        self.next_beat_at = now + Duration::seconds(HEARTBEAT_INTERVAL_SECS);
        self.publish(store, credentials, now);
    }

    fn publish(
        &self,
        store: &SharedStateStore,
        credentials: &dyn CredentialProvider,
        now: DateTime<Utc>,
    ) {
        let identity = credentials
            .current_identity()
            .unwrap_or_else(SessionIdentity::anonymous);

        let mut roster: Vec<SessionRecord> = store.get(keys::ACTIVE_SESSIONS);
        roster.retain(|record| record.session_id != self.session_id);
        roster.push(SessionRecord {
            session_id: self.session_id.clone(),
            identity: identity.display_name,
            role: identity.role,
            last_seen: now,
        });

        let excess = roster.len().saturating_sub(ROSTER_LIMIT);
        if excess > 0 {
            roster.drain(..excess);
            debug!(evicted = excess, "Evicted oldest roster entries");
        }

        store.put(keys::ACTIVE_SESSIONS, &roster);
    }
}
