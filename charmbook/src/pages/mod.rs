//! Pages: owned, optionally public collections of charms.
//!
//! Every page has exactly one owner. Only the owner may list, read, update or
//! delete it; a public page is additionally readable by anyone through
//! [`PageManager::get_public`], but stays writable only by its owner.

pub mod manager;
pub mod models;

pub use manager::PageManager;
pub use models::{Page, PageId, PageInput};
