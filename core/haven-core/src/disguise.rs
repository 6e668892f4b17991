//! Tab title and favicon camouflage on focus loss.
//!
//! Event-driven only: the host reports visibility changes; no timers here.

use crate::config::AccessibilitySettings;
use crate::host::HostPage;
use crate::types::VisibilityState;

/// Generated neutral icon used while the tab is hidden.
pub const NEUTRAL_FAVICON_HREF: &str = r#"data:image/svg+xml,<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><text x="50" y="70" font-size="70" text-anchor="middle" fill="%23333">&#128218;</text></svg>"#;

/// The tab's real title and favicon, restored when visibility returns.
#[derive(Debug, Clone, PartialEq)]
pub struct PageChrome {
    pub title: String,
    pub favicon_href: String,
}

impl Default for PageChrome {
    fn default() -> Self {
        PageChrome {
            title: "Haven".to_string(),
            favicon_href: "/favicon.ico".to_string(),
        }
    }
}

/// Swaps tab chrome on hidden, restores it on visible. Idempotent under
/// repeated same-state signals.
pub struct TabVisibilityDisguiser {
    chrome: PageChrome,
    disguised: bool,
}

impl TabVisibilityDisguiser {
    pub fn new(chrome: PageChrome) -> Self {
        TabVisibilityDisguiser {
            chrome,
            disguised: false,
        }
    }

    pub fn is_disguised(&self) -> bool {
        self.disguised
    }

    pub fn handle_visibility(
        &mut self,
        visibility: VisibilityState,
        settings: &AccessibilitySettings,
        page: &dyn HostPage,
    ) {
        match visibility {
            VisibilityState::Hidden if !self.disguised => {
                page.set_title(&settings.fake_tab_name);
                page.set_favicon(NEUTRAL_FAVICON_HREF);
                self.disguised = true;
            }
            VisibilityState::Visible if self.disguised => {
                page.set_title(&self.chrome.title);
                page.set_favicon(&self.chrome.favicon_href);
                self.disguised = false;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_utils::FakePage;

    fn settings() -> AccessibilitySettings {
        AccessibilitySettings {
            fake_tab_name: "Algebra Practice".to_string(),
            ..AccessibilitySettings::default()
        }
    }

    #[test]
    fn test_hidden_applies_disguise() {
        let page = FakePage::default();
        let mut disguiser = TabVisibilityDisguiser::new(PageChrome::default());

        disguiser.handle_visibility(VisibilityState::Hidden, &settings(), &page);

        assert!(disguiser.is_disguised());
        assert_eq!(*page.titles.lock().unwrap(), ["Algebra Practice"]);
        assert_eq!(*page.favicons.lock().unwrap(), [NEUTRAL_FAVICON_HREF]);
    }

    #[test]
    fn test_visible_restores_original_chrome() {
        let page = FakePage::default();
        let chrome = PageChrome {
            title: "Haven - Student Hub".to_string(),
            favicon_href: "/haven.ico".to_string(),
        };
        let mut disguiser = TabVisibilityDisguiser::new(chrome);

        disguiser.handle_visibility(VisibilityState::Hidden, &settings(), &page);
        disguiser.handle_visibility(VisibilityState::Visible, &settings(), &page);

        assert!(!disguiser.is_disguised());
        assert_eq!(
            page.titles.lock().unwrap().last().map(String::as_str),
            Some("Haven - Student Hub")
        );
        assert_eq!(
            page.favicons.lock().unwrap().last().map(String::as_str),
            Some("/haven.ico")
        );
    }

    #[test]
    fn test_repeated_hidden_is_idempotent() {
        let page = FakePage::default();
        let mut disguiser = TabVisibilityDisguiser::new(PageChrome::default());

        disguiser.handle_visibility(VisibilityState::Hidden, &settings(), &page);
        disguiser.handle_visibility(VisibilityState::Hidden, &settings(), &page);

        assert_eq!(page.titles.lock().unwrap().len(), 1);
        assert_eq!(page.favicons.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_visible_without_disguise_is_noop() {
        let page = FakePage::default();
        let mut disguiser = TabVisibilityDisguiser::new(PageChrome::default());

        disguiser.handle_visibility(VisibilityState::Visible, &settings(), &page);

        assert!(page.titles.lock().unwrap().is_empty());
        assert!(page.favicons.lock().unwrap().is_empty());
    }
}
