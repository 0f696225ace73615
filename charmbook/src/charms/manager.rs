//! Charm manager implementation.
//!
//! Charms carry no owner field. Every operation first resolves the owner of
//! the parent page from the store (by the page id in the route for list and
//! create, by the persisted `page_id` link for update and delete) and applies
//! the ownership policy to that.

use super::models::{Charm, CharmId, CharmInput, CharmPatch, Color, MAX_TEXT_LEN, Shape};
use crate::auth::Identity;
use crate::db::{CharmRepository, PageRepository};
use crate::policy::{self, ResourceError, ResourceResult};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Charm manager
#[derive(Clone)]
pub struct CharmManager {
    pages: Arc<dyn PageRepository>,
    charms: Arc<dyn CharmRepository>,
}

impl CharmManager {
    pub fn new(pages: Arc<dyn PageRepository>, charms: Arc<dyn CharmRepository>) -> Self {
        Self { pages, charms }
    }

    /// List the charms of one of the caller's pages
    pub async fn list_by_page(&self, caller: &Identity, page_id: &str) -> ResourceResult<Vec<Charm>> {
        self.require_page_owner(caller, page_id).await?;
        Ok(self.charms.list_by_page(page_id).await?)
    }

    /// Add a charm to one of the caller's pages
    ///
    /// # Errors
    ///
    /// * `ResourceError::NotFound` - Page absent or owned by someone else
    /// * `ResourceError::Validation` - Unknown shape or color, or text too long
    pub async fn create(
        &self,
        caller: &Identity,
        page_id: &str,
        input: CharmInput,
    ) -> ResourceResult<CharmId> {
        self.require_page_owner(caller, page_id).await?;

        let shape = parse_shape(&input.shape)?;
        let color = parse_color(&input.color)?;
        check_text(&input.text_value)?;

        let now = Utc::now();
        let charm = Charm {
            id: Uuid::new_v4().to_string(),
            page_id: page_id.to_string(),
            shape,
            color,
            title: input.title,
            text_value: input.text_value,
            created_at: now,
            updated_at: now,
        };
        self.charms.insert(&charm).await?;

        tracing::debug!(charm_id = %charm.id, page_id = %page_id, "Charm created");
        Ok(charm.id)
    }

    /// Update a charm on one of the caller's pages
    ///
    /// Absent or empty patch fields keep their stored values.
    pub async fn update(
        &self,
        caller: &Identity,
        charm_id: &str,
        patch: CharmPatch,
    ) -> ResourceResult<()> {
        let mut charm = self.owned_charm(caller, charm_id).await?;

        if let Some(shape) = non_empty(patch.shape) {
            charm.shape = parse_shape(&shape)?;
        }
        if let Some(color) = non_empty(patch.color) {
            charm.color = parse_color(&color)?;
        }
        if let Some(title) = non_empty(patch.title) {
            charm.title = title;
        }
        if let Some(text_value) = non_empty(patch.text_value) {
            check_text(&text_value)?;
            charm.text_value = text_value;
        }
        charm.updated_at = Utc::now();

        let rows = self.charms.update(&charm).await?;
        policy::require_affected(rows)
    }

    /// Delete a charm on one of the caller's pages
    pub async fn delete(&self, caller: &Identity, charm_id: &str) -> ResourceResult<()> {
        self.owned_charm(caller, charm_id).await?;
        let rows = self.charms.delete(charm_id).await?;
        policy::require_affected(rows)
    }

    async fn require_page_owner(&self, caller: &Identity, page_id: &str) -> ResourceResult<()> {
        let page = self.pages.find(page_id).await?;
        policy::require_owner(caller, page.as_ref().map(|p| p.owner_id.as_str()))
    }

    async fn owned_charm(&self, caller: &Identity, charm_id: &str) -> ResourceResult<Charm> {
        let found = self.charms.find_with_owner(charm_id).await?;
        policy::require_owner(caller, found.as_ref().map(|(_, owner)| owner.as_str()))?;
        found
            .map(|(charm, _)| charm)
            .ok_or(ResourceError::NotFound)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_shape(value: &str) -> ResourceResult<Shape> {
    value
        .parse()
        .map_err(|_| ResourceError::Validation("invalid shape".to_string()))
}

fn parse_color(value: &str) -> ResourceResult<Color> {
    value
        .parse()
        .map_err(|_| ResourceError::Validation("invalid color".to_string()))
}

fn check_text(value: &str) -> ResourceResult<()> {
    if value.len() > MAX_TEXT_LEN {
        return Err(ResourceError::Validation(format!(
            "text_value longer than {MAX_TEXT_LEN} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
    }

    #[test]
    fn test_text_limit() {
        assert!(check_text(&"a".repeat(MAX_TEXT_LEN)).is_ok());
        assert!(matches!(
            check_text(&"a".repeat(MAX_TEXT_LEN + 1)),
            Err(ResourceError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(parse_shape("").is_err());
        assert!(parse_color("").is_err());
        assert_eq!(parse_shape("heart").unwrap(), Shape::Heart);
    }
}
