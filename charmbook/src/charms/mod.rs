//! Charms: decorative annotations attached to a page.

pub mod manager;
pub mod models;

pub use manager::CharmManager;
pub use models::{
    Charm, CharmId, CharmInput, CharmPatch, Color, MAX_TEXT_LEN, Shape, UnknownVariant,
};
