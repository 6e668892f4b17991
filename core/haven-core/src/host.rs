//! Platform seams supplied by the host shell.
//!
//! The core never touches the document, credential storage, or navigation
//! directly. Hosts implement these traits; test doubles implement the same
//! traits with recorded calls.

use crate::types::{BanInfo, SessionIdentity};

/// Credential collaborator: identity lookups, logout, and the ban registry.
///
/// Implementors should:
/// - Never panic; return `None`/`false` on any internal failure
/// - Treat `current_identity` as a live read, not a cached snapshot
pub trait CredentialProvider: Send + Sync {
    /// Identity of the signed-in user, or `None` when signed out.
    fn current_identity(&self) -> Option<SessionIdentity>;

    /// Clear all locally held credentials (forced logout).
    fn clear_credentials(&self);

    /// Whether the ban registry currently lists this access code.
    fn is_banned(&self, access_code: &str) -> bool;

    /// Ban details for this access code, derived at read time.
    /// Returns `None` when no details are recorded.
    fn ban_info(&self, access_code: &str) -> Option<BanInfo>;
}

/// Page collaborator: navigation, location, tab chrome, tab-scoped storage.
pub trait HostPage: Send + Sync {
    /// Full URL of the current location.
    fn current_url(&self) -> String;

    /// Origin of the current location (scheme + host + port).
    fn origin(&self) -> String;

    /// Navigate the tab. Enforcement flows rely on this never being a no-op.
    fn navigate(&self, url: &str);

    fn set_title(&self, title: &str);

    /// Point the tab icon at the given href (path or data URL).
    fn set_favicon(&self, href: &str);

    /// Clear storage scoped to this tab's lifetime.
    fn clear_tab_state(&self);
}
