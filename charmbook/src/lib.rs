//! # Charmbook
//!
//! Multi-tenant pages of charms with cookie sessions and ownership-scoped
//! access control.
//!
//! Users own pages; pages hold ordered decorative charms and may be flagged
//! public for anonymous reading. Every write, and every read that is not a
//! public read, requires the caller to own the page, directly or (for charms)
//! through the charm's parent page.
//!
//! ## Core Modules
//!
//! - [`auth`]: Passcode hashing, session tokens and cookies, registration and
//!   login, the authorization guard
//! - [`policy`]: The ownership policy and resource error taxonomy
//! - [`pages`], [`charms`]: Owner-scoped resource operations
//! - [`db`]: Storage adapters (PostgreSQL and in-memory)
//!
//! ## Example
//!
//! ```
//! use charmbook::auth::Identity;
//! use charmbook::db::MemoryStore;
//! use charmbook::pages::{PageInput, PageManager};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = MemoryStore::new();
//! let pages = PageManager::new(Arc::new(store));
//! let nobody = Identity::new("nobody");
//! assert!(pages.list_mine(&nobody).await.unwrap().is_empty());
//! # let _ = PageInput::default();
//! # }
//! ```

/// Credential verification, session tokens and identity resolution.
pub mod auth;

/// Owned charm annotations.
pub mod charms;

/// Storage adapters.
pub mod db;

/// Owned pages.
pub mod pages;

/// Ownership policy.
pub mod policy;

pub use auth::{AuthError, AuthGuard, AuthMode, Identity, SessionManager};
pub use charms::CharmManager;
pub use pages::PageManager;
pub use policy::ResourceError;
