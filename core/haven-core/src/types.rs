//! Core types shared across the session-lifecycle subsystem.

use serde::{Deserialize, Serialize};

/// Navigation target for logout, kick, ban, and expiry flows.
pub const ENTRY_SURFACE_URL: &str = "/landing";

/// Privilege level attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    Verified,
    Admin,
    Owner,
}

/// Identity snapshot for the signed-in user, read live from the credential
/// collaborator. Signed-out tabs use [`SessionIdentity::anonymous`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Credential key for ban lookups. Absent when signed out.
    pub access_code: Option<String>,
    /// Display identity published in the presence roster.
    pub display_name: String,
    pub role: Role,
}

impl SessionIdentity {
    pub fn anonymous() -> Self {
        SessionIdentity {
            access_code: None,
            display_name: "Anonymous".to_string(),
            role: Role::Guest,
        }
    }
}

/// Ban details derived at read time by the credential collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanInfo {
    pub is_permanent: bool,
    /// Milliseconds until a temporary ban lifts. Meaningless when permanent.
    pub time_remaining_ms: i64,
}

/// Tab visibility as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Visible,
    Hidden,
}

/// Input events that qualify as user activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    PointerMove,
    PointerDown,
    KeyPress,
    Scroll,
    Touch,
}
