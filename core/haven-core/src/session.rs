//! Session controller: mounts the whole subsystem for one tab.
//!
//! Owns the per-tab session id and drives every poll from `tick`. The host
//! forwards input, key, and visibility events, renders according to
//! [`CamouflageMode`], and reacts to the returned [`SessionEvent`]s. All
//! scheduling is cooperative; hosts without their own timer loop can wrap
//! the controller in a [`SessionPump`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use ulid::Ulid;

use crate::activity::{ActivityMonitor, IDLE_DECOY_TIMER, SESSION_EXPIRY_TIMER};
use crate::camouflage::{CamouflageController, CamouflageMode};
use crate::config::SettingsSnapshot;
use crate::disguise::{PageChrome, TabVisibilityDisguiser};
use crate::host::{CredentialProvider, HostPage};
use crate::moderation::{Enforcement, ModerationWatcher};
use crate::panic_return::{cover_site, PanicReturnManager};
use crate::presence::PresenceHeartbeat;
use crate::store::SharedStateStore;
use crate::types::{InputKind, VisibilityState, ENTRY_SURFACE_URL};

/// Seconds of inactivity before the session is expired.
pub const SESSION_EXPIRY_SECS: i64 = 30 * 60;

/// Suggested tick cadence; the fastest poll runs at one second.
pub const DEFAULT_TICK_INTERVAL: std::time::Duration = std::time::Duration::from_millis(250);

pub const SESSION_EXPIRED_MESSAGE: &str =
    "Your session has expired due to inactivity. Please login again.";

/// Hotkeys that toggle the boss-key decoy.
pub const BOSS_KEYS: [&str; 2] = ["`", "~"];

/// Key that triggers the panic cover-site exit.
pub const PANIC_KEY: &str = "Escape";

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Kicked,
    Banned,
    Expired,
}

/// Host-visible outcomes of a tick or forwarded event.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Render passthrough children on Normal, the decoy overlay on Decoy.
    CamouflageChanged(CamouflageMode),
    /// The session is over and the tab has been navigated away. `notice` is
    /// user-visible wording; kicks are silent.
    Ended {
        reason: EndReason,
        notice: Option<String>,
    },
}

/// One tab's session-lifecycle and covert-mode subsystem.
pub struct SessionController {
    session_id: String,
    store: SharedStateStore,
    credentials: Arc<dyn CredentialProvider>,
    page: Arc<dyn HostPage>,
    settings: SettingsSnapshot,
    monitor: ActivityMonitor,
    heartbeat: PresenceHeartbeat,
    watcher: ModerationWatcher,
    camouflage: CamouflageController,
    disguiser: TabVisibilityDisguiser,
    panic_return: PanicReturnManager,
    ended: bool,
}

impl SessionController {
    pub fn mount(
        store: SharedStateStore,
        credentials: Arc<dyn CredentialProvider>,
        page: Arc<dyn HostPage>,
        chrome: PageChrome,
    ) -> Self {
        Self::mount_at(store, credentials, page, chrome, Utc::now())
    }

    pub fn mount_at(
        store: SharedStateStore,
        credentials: Arc<dyn CredentialProvider>,
        page: Arc<dyn HostPage>,
        chrome: PageChrome,
        now: DateTime<Utc>,
    ) -> Self {
        let session_id = Ulid::new().to_string();
        let settings = SettingsSnapshot::load(&store);

        let mut monitor = ActivityMonitor::new(now);
        if settings.stealth.idle_decoy_enabled {
            monitor.arm(
                IDLE_DECOY_TIMER,
                Duration::minutes(i64::from(settings.stealth.idle_decoy_timeout)),
                now,
            );
        }
        monitor.arm(SESSION_EXPIRY_TIMER, Duration::seconds(SESSION_EXPIRY_SECS), now);

        info!(%session_id, "Session mounted");
        SessionController {
            heartbeat: PresenceHeartbeat::new(session_id.clone(), now),
            watcher: ModerationWatcher::new(session_id.clone(), now),
            session_id,
            store,
            credentials,
            page,
            settings,
            monitor,
            camouflage: CamouflageController::new(),
            disguiser: TabVisibilityDisguiser::new(chrome),
            panic_return: PanicReturnManager::new(),
            ended: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn mode(&self) -> CamouflageMode {
        self.camouflage.mode()
    }

    pub fn settings(&self) -> &SettingsSnapshot {
        &self.settings
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Runs every due poll: heartbeat, moderation, idle deadlines.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.ended {
            return events;
        }

        self.heartbeat
            .tick(&self.store, self.credentials.as_ref(), now);

        if let Some(enforcement) = self.watcher.tick(
            &self.store,
            self.credentials.as_ref(),
            self.page.as_ref(),
            now,
        ) {
            let (reason, notice) = match enforcement {
                Enforcement::Kicked => (EndReason::Kicked, None),
                Enforcement::Banned { message } => (EndReason::Banned, Some(message)),
            };
            self.end(reason, notice, &mut events);
            return events;
        }

        for label in self.monitor.fired(now) {
            match label {
                IDLE_DECOY_TIMER => {
                    if let Some(mode) = self.camouflage.idle_elapsed() {
                        debug!("Idle timeout reached, decoy up");
                        events.push(SessionEvent::CamouflageChanged(mode));
                    }
                }
                SESSION_EXPIRY_TIMER => {
                    self.expire(&mut events);
                    return events;
                }
                _ => {}
            }
        }

        events
    }

    /// Forwards a qualifying input event. Input resets idle deadlines but
    /// never dismisses a decoy.
    pub fn handle_input(&mut self, kind: InputKind) {
        self.handle_input_at(kind, Utc::now());
    }

    pub fn handle_input_at(&mut self, kind: InputKind, now: DateTime<Utc>) {
        if self.ended {
            return;
        }
        self.monitor.record_input(kind, now);
    }

    /// Forwards a key press (DOM-style key name). Handles the boss key and
    /// the panic key; every key also counts as activity.
    pub fn handle_key(&mut self, key: &str) -> Vec<SessionEvent> {
        self.handle_key_at(key, Utc::now())
    }

    pub fn handle_key_at(&mut self, key: &str, now: DateTime<Utc>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.ended {
            return events;
        }

        if BOSS_KEYS.contains(&key) && self.settings.stealth.boss_key_enabled {
            if let Some(mode) = self.camouflage.press_boss_key() {
                match mode {
                    CamouflageMode::Normal => self.rearm_idle_timer(now),
                    CamouflageMode::Decoy { .. } => self.monitor.disarm(IDLE_DECOY_TIMER),
                }
                events.push(SessionEvent::CamouflageChanged(mode));
            }
        } else if key == PANIC_KEY && self.settings.accessibility.panic_button {
            self.panic_return.save(&self.store, self.page.as_ref(), now);
            self.page
                .navigate(cover_site(&self.settings.accessibility.panic_site));
        }

        self.monitor.record_input(InputKind::KeyPress, now);
        events
    }

    /// Forwards a tab visibility change to the disguiser.
    pub fn handle_visibility(&mut self, visibility: VisibilityState) {
        if self.ended {
            return;
        }
        self.disguiser
            .handle_visibility(visibility, &self.settings.accessibility, self.page.as_ref());
    }

    /// Explicit decoy dismissal from the host-rendered control.
    pub fn dismiss_decoy(&mut self) -> Vec<SessionEvent> {
        self.dismiss_decoy_at(Utc::now())
    }

    pub fn dismiss_decoy_at(&mut self, now: DateTime<Utc>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.ended {
            return events;
        }
        if let Some(mode) = self.camouflage.dismiss() {
            self.rearm_idle_timer(now);
            events.push(SessionEvent::CamouflageChanged(mode));
        }
        events
    }

    /// Checks for a resumable panic bookmark. Entry-surface hosts call this
    /// on load and render a one-click resume when it returns a url.
    pub fn pending_resume(&self) -> Option<String> {
        self.pending_resume_at(Utc::now())
    }

    pub fn pending_resume_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.panic_return.pending(
            &self.store,
            self.page.as_ref(),
            &self.settings.accessibility,
            now,
        )
    }

    /// Consumes the panic bookmark and navigates back to it.
    pub fn resume_now(&self) -> bool {
        self.panic_return.resume(&self.store, self.page.as_ref())
    }

    /// Tears down all timers. Subsequent ticks and events are no-ops.
    pub fn unmount(&mut self) {
        self.monitor.disarm(IDLE_DECOY_TIMER);
        self.monitor.disarm(SESSION_EXPIRY_TIMER);
        self.ended = true;
        debug!(session_id = %self.session_id, "Session unmounted");
    }

    fn rearm_idle_timer(&mut self, now: DateTime<Utc>) {
        if self.settings.stealth.idle_decoy_enabled {
            self.monitor.arm(
                IDLE_DECOY_TIMER,
                Duration::minutes(i64::from(self.settings.stealth.idle_decoy_timeout)),
                now,
            );
        }
    }

    fn expire(&mut self, events: &mut Vec<SessionEvent>) {
        info!(session_id = %self.session_id, "Session expired after inactivity");
        self.credentials.clear_credentials();
        self.page.clear_tab_state();
        self.page.navigate(ENTRY_SURFACE_URL);
        self.end(
            EndReason::Expired,
            Some(SESSION_EXPIRED_MESSAGE.to_string()),
            events,
        );
    }

    fn end(&mut self, reason: EndReason, notice: Option<String>, events: &mut Vec<SessionEvent>) {
        self.monitor.disarm(IDLE_DECOY_TIMER);
        self.monitor.disarm(SESSION_EXPIRY_TIMER);
        self.ended = true;
        events.push(SessionEvent::Ended { reason, notice });
    }
}

/// Thread-based driver for hosts without their own timer loop.
///
/// Ticks the shared controller on a fixed cadence and hands events to the
/// callback. Dropping the pump stops the thread and joins it.
pub struct SessionPump {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SessionPump {
    pub fn spawn(
        controller: Arc<Mutex<SessionController>>,
        interval: std::time::Duration,
        mut on_event: impl FnMut(SessionEvent) + Send + 'static,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                let events = match controller.lock() {
                    Ok(mut controller) => controller.tick(),
                    Err(_) => break,
                };
                for event in events {
                    on_event(event);
                }
                thread::sleep(interval);
            }
        });
        SessionPump {
            stop,
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SessionPump {
    fn drop(&mut self) {
        self.stop();
    }
}
