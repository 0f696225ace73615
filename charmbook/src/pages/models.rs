//! Page data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;

/// Page ID type
pub type PageId = String;

/// Page model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub owner_id: UserId,
    pub title: String,
    pub note: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Page create/update request
///
/// Updates replace every field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub is_public: bool,
}
