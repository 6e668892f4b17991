//! Panic-return bookmark: resume where you left off after a cover exit.
//!
//! One tab writes the bookmark just before navigating to a cover site;
//! whichever tab next loads the entry surface validates it and may offer a
//! one-click resume. Validation is unforgiving: foreign origins, expired
//! timestamps, and malformed payloads are all discarded silently.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AccessibilitySettings;
use crate::host::HostPage;
use crate::store::{keys, SharedStateStore};

/// Timeout values at or above this many minutes mean "never expires",
/// as do values at or below zero.
pub const PANIC_RETURN_NEVER_MIN: i64 = 485;

/// Innocuous destinations for the panic hotkey, keyed by the
/// `accessibility.panic_site` setting. Unknown keys fall back to the
/// classroom entry.
pub fn cover_site(key: &str) -> &'static str {
    match key {
        "ixl" => "https://www.ixl.com",
        "canva" => "https://www.canva.com",
        "docs" => "https://docs.google.com",
        "drive" => "https://drive.google.com",
        "gmail" => "https://mail.google.com",
        "newtab" => "https://www.google.com",
        "blank" => "about:blank",
        _ => "https://classroom.google.com",
    }
}

/// Persisted resume location. Legacy writers stored the bare url string;
/// those parse with no timestamp and only survive when expiry is disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnBookmark {
    pub url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BookmarkPayload {
    Record(ReturnBookmark),
    Legacy(String),
}

impl BookmarkPayload {
    fn into_bookmark(self) -> ReturnBookmark {
        match self {
            BookmarkPayload::Record(bookmark) => bookmark,
            BookmarkPayload::Legacy(url) => ReturnBookmark {
                url,
                created_at: None,
            },
        }
    }
}

/// Saves, validates, and consumes the panic-return bookmark.
#[derive(Default)]
pub struct PanicReturnManager;

impl PanicReturnManager {
    pub fn new() -> Self {
        PanicReturnManager
    }

    /// Persists the current location as the resume target. Called just
    /// before the host navigates to a cover destination; a failed write
    /// must never block that navigation, so this is best-effort.
    pub fn save(&self, store: &SharedStateStore, page: &dyn HostPage, now: DateTime<Utc>) {
        store.put(
            keys::PANIC_RETURN,
            &ReturnBookmark {
                url: page.current_url(),
                created_at: Some(now),
            },
        );
    }

    /// Validates the stored bookmark and returns its url if a resume should
    /// be offered. Invalid bookmarks are deleted on the way out.
    pub fn pending(
        &self,
        store: &SharedStateStore,
        page: &dyn HostPage,
        settings: &AccessibilitySettings,
        now: DateTime<Utc>,
    ) -> Option<String> {
        let Some(payload) = store.get_opt::<BookmarkPayload>(keys::PANIC_RETURN) else {
            // Absent or malformed; either way nothing to offer, and a
            // malformed payload should not linger for the next load.
            store.remove(keys::PANIC_RETURN);
            return None;
        };
        let bookmark = payload.into_bookmark();

        if !bookmark.url.starts_with(&page.origin()) {
            debug!("Discarding foreign-origin return bookmark");
            store.remove(keys::PANIC_RETURN);
            return None;
        }

        let timeout_min = settings.panic_return_timeout;
        if never_expires(timeout_min) {
            return Some(bookmark.url);
        }

        match bookmark.created_at {
            Some(created_at)
                if now.signed_duration_since(created_at) < Duration::minutes(timeout_min) =>
            {
                Some(bookmark.url)
            }
            _ => {
                debug!("Discarding expired return bookmark");
                store.remove(keys::PANIC_RETURN);
                None
            }
        }
    }

    /// Consumes the bookmark and navigates to it. Returns false when no
    /// usable bookmark was stored.
    pub fn resume(&self, store: &SharedStateStore, page: &dyn HostPage) -> bool {
        let payload = store.get_opt::<BookmarkPayload>(keys::PANIC_RETURN);
        store.remove(keys::PANIC_RETURN);
        match payload {
            Some(payload) => {
                page.navigate(&payload.into_bookmark().url);
                true
            }
            None => false,
        }
    }
}

fn never_expires(timeout_min: i64) -> bool {
    timeout_min <= 0 || timeout_min >= PANIC_RETURN_NEVER_MIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_utils::FakePage;

    fn settings(timeout_min: i64) -> AccessibilitySettings {
        AccessibilitySettings {
            panic_return_timeout: timeout_min,
            ..AccessibilitySettings::default()
        }
    }

    #[test]
    fn test_save_then_pending_round_trips_before_expiry() {
        let store = SharedStateStore::in_memory();
        let page = FakePage::at("https://haven.test/habits");
        let manager = PanicReturnManager::new();
        let t0 = Utc::now();

        manager.save(&store, &page, t0);
        let pending = manager.pending(&store, &page, &settings(60), t0 + Duration::minutes(10));

        assert_eq!(pending.as_deref(), Some("https://haven.test/habits"));
        // Offering a resume does not consume the bookmark.
        assert!(manager
            .pending(&store, &page, &settings(60), t0 + Duration::minutes(10))
            .is_some());
    }

    #[test]
    fn test_expired_bookmark_is_deleted() {
        let store = SharedStateStore::in_memory();
        let page = FakePage::at("https://haven.test/habits");
        let manager = PanicReturnManager::new();
        let t0 = Utc::now();

        manager.save(&store, &page, t0);
        let pending = manager.pending(&store, &page, &settings(60), t0 + Duration::minutes(61));

        assert_eq!(pending, None);
        assert_eq!(
            store.get_opt::<ReturnBookmark>(keys::PANIC_RETURN),
            None,
            "expired bookmark must be cleared"
        );
    }

    #[test]
    fn test_foreign_origin_is_never_returned() {
        let store = SharedStateStore::in_memory();
        let manager = PanicReturnManager::new();
        let t0 = Utc::now();

        store.put(
            keys::PANIC_RETURN,
            &ReturnBookmark {
                url: "https://evil.example/landing".to_string(),
                created_at: Some(t0),
            },
        );

        let page = FakePage::at("https://haven.test/landing");
        assert_eq!(manager.pending(&store, &page, &settings(60), t0), None);
        assert_eq!(store.get_opt::<ReturnBookmark>(keys::PANIC_RETURN), None);
    }

    #[test]
    fn test_zero_and_sentinel_timeouts_never_expire() {
        let store = SharedStateStore::in_memory();
        let page = FakePage::at("https://haven.test/habits");
        let manager = PanicReturnManager::new();
        let t0 = Utc::now();
        manager.save(&store, &page, t0);

        let far_future = t0 + Duration::days(365);
        for timeout in [0, -5, PANIC_RETURN_NEVER_MIN, PANIC_RETURN_NEVER_MIN + 100] {
            assert!(
                manager
                    .pending(&store, &page, &settings(timeout), far_future)
                    .is_some(),
                "timeout {timeout} should never expire"
            );
        }
    }

    #[test]
    fn test_legacy_string_payload_parses() {
        let store = SharedStateStore::in_memory();
        let page = FakePage::at("https://haven.test/habits");
        let manager = PanicReturnManager::new();
        store.put(keys::PANIC_RETURN, &"https://haven.test/music");

        // No timestamp: only honored when expiry is disabled.
        let now = Utc::now();
        assert_eq!(
            manager
                .pending(&store, &page, &settings(0), now)
                .as_deref(),
            Some("https://haven.test/music")
        );
    }

    #[test]
    fn test_legacy_string_payload_expires_under_finite_timeout() {
        let store = SharedStateStore::in_memory();
        let page = FakePage::at("https://haven.test/habits");
        let manager = PanicReturnManager::new();
        store.put(keys::PANIC_RETURN, &"https://haven.test/music");

        assert_eq!(
            manager.pending(&store, &page, &settings(60), Utc::now()),
            None
        );
        assert_eq!(store.get_opt::<ReturnBookmark>(keys::PANIC_RETURN), None);
    }

    #[test]
    fn test_malformed_payload_is_discarded_silently() {
        let store = SharedStateStore::in_memory();
        let page = FakePage::at("https://haven.test/habits");
        let manager = PanicReturnManager::new();
        store.put(keys::PANIC_RETURN, &serde_json::json!({ "nope": true }));

        assert_eq!(manager.pending(&store, &page, &settings(60), Utc::now()), None);
    }

    #[test]
    fn test_resume_consumes_and_navigates() {
        let store = SharedStateStore::in_memory();
        let page = FakePage::at("https://haven.test/landing");
        let manager = PanicReturnManager::new();

        store.put(
            keys::PANIC_RETURN,
            &ReturnBookmark {
                url: "https://haven.test/habits".to_string(),
                created_at: Some(Utc::now()),
            },
        );

        assert!(manager.resume(&store, &page));
        assert_eq!(
            page.last_navigation().as_deref(),
            Some("https://haven.test/habits")
        );
        assert_eq!(store.get_opt::<ReturnBookmark>(keys::PANIC_RETURN), None);
    }

    #[test]
    fn test_resume_with_no_bookmark_returns_false() {
        let store = SharedStateStore::in_memory();
        let page = FakePage::at("https://haven.test/landing");
        let manager = PanicReturnManager::new();

        assert!(!manager.resume(&store, &page));
        assert_eq!(page.navigation_count(), 0);
    }

    #[test]
    fn test_cover_site_catalog_falls_back_to_classroom() {
        assert_eq!(cover_site("docs"), "https://docs.google.com");
        assert_eq!(cover_site("blank"), "about:blank");
        assert_eq!(cover_site("unknown-key"), "https://classroom.google.com");
        assert_eq!(cover_site("classroom"), "https://classroom.google.com");
    }
}
