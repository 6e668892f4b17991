//! Moderation enforcement: kick and ban polling.
//!
//! Directives arrive through the shared store (kicks) and the credential
//! layer's ban registry. Reads fail open: a malformed kick list is "no
//! directive". A directive that did parse is always enforced.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::host::{CredentialProvider, HostPage};
use crate::store::{keys, SharedStateStore};
use crate::types::{BanInfo, ENTRY_SURFACE_URL};

/// Seconds between kick-list polls.
pub const KICK_POLL_INTERVAL_SECS: i64 = 1;

/// Seconds between ban-registry polls.
pub const BAN_POLL_INTERVAL_SECS: i64 = 5;

pub const PERMANENT_BAN_MESSAGE: &str = "Your account has been banned.";

/// Externally appended directive forcing one session to log out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KickEntry {
    pub session_id: String,
    pub issued_at: DateTime<Utc>,
}

/// Outcome of a moderation poll that matched this session.
#[derive(Debug, Clone, PartialEq)]
pub enum Enforcement {
    /// Silent forced logout; no user-visible message.
    Kicked,
    /// Forced logout with a user-visible message.
    Banned { message: String },
}

/// Polls kick and ban directives on independent cadences and enforces the
/// first match: credentials cleared, tab state cleared, navigation to the
/// entry surface.
pub struct ModerationWatcher {
    session_id: String,
    next_kick_poll_at: DateTime<Utc>,
    next_ban_poll_at: DateTime<Utc>,
}

impl ModerationWatcher {
    pub fn new(session_id: String, now: DateTime<Utc>) -> Self {
        ModerationWatcher {
            session_id,
            next_kick_poll_at: now,
            next_ban_poll_at: now,
        }
    }

    /// Runs whichever polls are due. Returns the enforcement applied, if
    /// any; the caller must stop ticking afterwards.
    pub fn tick(
        &mut self,
        store: &SharedStateStore,
        credentials: &dyn CredentialProvider,
        page: &dyn HostPage,
        now: DateTime<Utc>,
    ) -> Option<Enforcement> {
        if now >= self.next_kick_poll_at {
            self.next_kick_poll_at = now + Duration::seconds(KICK_POLL_INTERVAL_SECS);
            if let Some(enforcement) = self.check_kicks(store, credentials, page) {
                return Some(enforcement);
            }
        }
        if now >= self.next_ban_poll_at {
            self.next_ban_poll_at = now + Duration::seconds(BAN_POLL_INTERVAL_SECS);
            if let Some(enforcement) = self.check_ban(credentials, page) {
                return Some(enforcement);
            }
        }
        None
    }

    fn check_kicks(
        &self,
        store: &SharedStateStore,
        credentials: &dyn CredentialProvider,
        page: &dyn HostPage,
    ) -> Option<Enforcement> {
        let kicks: Vec<KickEntry> = store.get(keys::KICK_LIST);
        if !kicks.iter().any(|kick| kick.session_id == self.session_id) {
            return None;
        }

        // A match consumes the whole list, including kicks aimed at other
        // sessions. Known race, replicated as-is; see DESIGN.md.
        store.remove(keys::KICK_LIST);
        debug!(session_id = %self.session_id, "Kick directive enforced");

        credentials.clear_credentials();
        page.clear_tab_state();
        page.navigate(ENTRY_SURFACE_URL);
        Some(Enforcement::Kicked)
    }

    fn check_ban(
        &self,
        credentials: &dyn CredentialProvider,
        page: &dyn HostPage,
    ) -> Option<Enforcement> {
        let identity = credentials.current_identity()?;
        let access_code = identity.access_code?;
        if !credentials.is_banned(&access_code) {
            return None;
        }

        let message = match credentials.ban_info(&access_code) {
            Some(info) if !info.is_permanent => {
                if info.time_remaining_ms <= 0 {
                    return None;
                }
                ban_message(&info)
            }
            // Registry lists the code but details are missing or permanent.
            _ => PERMANENT_BAN_MESSAGE.to_string(),
        };

        warn!(session_id = %self.session_id, "Ban directive enforced");
        credentials.clear_credentials();
        page.clear_tab_state();
        page.navigate(ENTRY_SURFACE_URL);
        Some(Enforcement::Banned { message })
    }
}

/// User-facing wording for a ban, with minutes remaining rounded up.
pub fn ban_message(info: &BanInfo) -> String {
    if info.is_permanent {
        return PERMANENT_BAN_MESSAGE.to_string();
    }
    let minutes = (info.time_remaining_ms + 59_999) / 60_000;
    format!(
        "Your account has been temporarily banned. Try again in {} minute{}.",
        minutes,
        if minutes == 1 { "" } else { "s" }
    )
}
