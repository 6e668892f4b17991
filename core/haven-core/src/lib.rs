//! # haven-core
//!
//! Core session-lifecycle and covert-mode library for Haven, providing the
//! shared business logic for all client shells (web, desktop, TUI).
//!
//! One instance of [`SessionController`] runs per tab against a shared
//! key-value store. The store is the only cross-tab channel: presence
//! heartbeats, kick directives, and the panic-return bookmark all travel
//! through it on independent poll cadences, with last-write-wins semantics
//! and no transactions.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. The host drives `tick()`
//!   and forwards platform events; [`SessionPump`] wraps that in a thread
//!   for hosts without their own loop.
//! - **Not thread-safe**: Clients provide their own synchronization
//!   (`Mutex`, `RwLock`).
//! - **Graceful degradation**: Missing or corrupt store payloads become
//!   defaults, failed writes are dropped and retried next cycle, and every
//!   enforcement ambiguity resolves toward hiding content.
//! - **Platform seams are traits**: Navigation, tab chrome, and credentials
//!   live behind [`HostPage`] and [`CredentialProvider`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use haven_core::{PageChrome, SessionController, SharedStateStore};
//!
//! let store = SharedStateStore::new(std::sync::Arc::new(medium));
//! let mut session = SessionController::mount(store, credentials, page, PageChrome::default());
//! loop {
//!     for event in session.tick() {
//!         render(event);
//!     }
//! }
//! ```

// Public modules
pub mod activity;
pub mod camouflage;
pub mod config;
pub mod disguise;
pub mod error;
pub mod host;
pub mod moderation;
pub mod panic_return;
pub mod presence;
pub mod session;
pub mod store;
pub mod types;

// Re-export commonly used items at crate root
pub use activity::ActivityMonitor;
pub use camouflage::{CamouflageController, CamouflageMode, DecoyReason, DecoyVariant};
pub use config::{AccessibilitySettings, SettingsSnapshot, StealthSettings};
pub use disguise::{PageChrome, TabVisibilityDisguiser};
pub use error::{HavenError, Result};
pub use host::{CredentialProvider, HostPage};
pub use moderation::{Enforcement, KickEntry, ModerationWatcher};
pub use panic_return::{PanicReturnManager, ReturnBookmark};
pub use presence::{PresenceHeartbeat, SessionRecord};
pub use session::{EndReason, SessionController, SessionEvent, SessionPump};
pub use store::{FileMedium, MemoryMedium, SharedStateStore, StorageMedium};
pub use types::{BanInfo, InputKind, Role, SessionIdentity, VisibilityState};
