//! Read-only settings snapshot.
//!
//! The settings document is owned by the settings surface; this subsystem
//! consumes a handful of flags from it. Every field carries a serde default
//! so a missing section, a missing field, or a whole missing document all
//! degrade to the built-in defaults.

use serde::Deserialize;

use crate::store::{keys, SharedStateStore};

/// Tab title shown while the tab is disguised, unless configured otherwise.
pub const DEFAULT_FAKE_TAB_NAME: &str =
    "IXL | Math, Language Arts, Science, Social Studies, and Spanish";

/// Minutes of inactivity before the idle decoy appears, unless configured.
pub const DEFAULT_IDLE_DECOY_TIMEOUT_MIN: u32 = 3;

/// Minutes a panic-return bookmark stays valid, unless configured.
pub const DEFAULT_PANIC_RETURN_TIMEOUT_MIN: i64 = 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StealthSettings {
    #[serde(default)]
    pub idle_decoy_enabled: bool,
    /// Minutes of inactivity before the decoy appears.
    #[serde(default = "default_idle_decoy_timeout")]
    pub idle_decoy_timeout: u32,
    #[serde(default = "default_true")]
    pub boss_key_enabled: bool,
}

impl Default for StealthSettings {
    fn default() -> Self {
        StealthSettings {
            idle_decoy_enabled: false,
            idle_decoy_timeout: DEFAULT_IDLE_DECOY_TIMEOUT_MIN,
            boss_key_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccessibilitySettings {
    #[serde(default = "default_true")]
    pub panic_button: bool,
    /// Cover-site key; unknown keys fall back to the default site.
    #[serde(default = "default_panic_site")]
    pub panic_site: String,
    /// Minutes before a panic-return bookmark expires. Values at or below
    /// zero, or at or above the "never" sentinel, disable expiry.
    #[serde(default = "default_panic_return_timeout")]
    pub panic_return_timeout: i64,
    #[serde(default = "default_fake_tab_name")]
    pub fake_tab_name: String,
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        AccessibilitySettings {
            panic_button: true,
            panic_site: default_panic_site(),
            panic_return_timeout: DEFAULT_PANIC_RETURN_TIMEOUT_MIN,
            fake_tab_name: DEFAULT_FAKE_TAB_NAME.to_string(),
        }
    }
}

/// Flags consumed from the settings document, captured once at mount.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SettingsSnapshot {
    #[serde(default)]
    pub stealth: StealthSettings,
    #[serde(default)]
    pub accessibility: AccessibilitySettings,
}

impl SettingsSnapshot {
    /// Loads the snapshot from the shared store, falling back to defaults
    /// on absence or corruption.
    pub fn load(store: &SharedStateStore) -> Self {
        store.get(keys::SETTINGS)
    }
}

fn default_true() -> bool {
    true
}

fn default_idle_decoy_timeout() -> u32 {
    DEFAULT_IDLE_DECOY_TIMEOUT_MIN
}

fn default_panic_site() -> String {
    "classroom".to_string()
}

fn default_panic_return_timeout() -> i64 {
    DEFAULT_PANIC_RETURN_TIMEOUT_MIN
}

fn default_fake_tab_name() -> String {
    DEFAULT_FAKE_TAB_NAME.to_string()
}
