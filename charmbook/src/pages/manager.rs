//! Page manager implementation.

use super::models::{Page, PageId, PageInput};
use crate::auth::Identity;
use crate::db::PageRepository;
use crate::policy::{self, ResourceError, ResourceResult};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Page manager
#[derive(Clone)]
pub struct PageManager {
    pages: Arc<dyn PageRepository>,
}

impl PageManager {
    pub fn new(pages: Arc<dyn PageRepository>) -> Self {
        Self { pages }
    }

    /// List the caller's pages, most recently updated first
    pub async fn list_mine(&self, caller: &Identity) -> ResourceResult<Vec<Page>> {
        Ok(self.pages.list_by_owner(&caller.user_id).await?)
    }

    /// Create a page owned by the caller
    ///
    /// # Returns
    ///
    /// * `ResourceResult<PageId>` - ID of the new page
    pub async fn create(&self, caller: &Identity, input: PageInput) -> ResourceResult<PageId> {
        let now = Utc::now();
        let page = Page {
            id: Uuid::new_v4().to_string(),
            owner_id: caller.user_id.clone(),
            title: input.title,
            note: input.note,
            is_public: input.is_public,
            created_at: now,
            updated_at: now,
        };
        self.pages.insert(&page).await?;

        tracing::debug!(page_id = %page.id, owner_id = %page.owner_id, "Page created");
        Ok(page.id)
    }

    /// Fetch one of the caller's pages
    ///
    /// # Errors
    ///
    /// * `ResourceError::NotFound` - Page absent or owned by someone else
    pub async fn get_mine(&self, caller: &Identity, page_id: &str) -> ResourceResult<Page> {
        let page = self.pages.find(page_id).await?;
        policy::require_owner(caller, page.as_ref().map(|p| p.owner_id.as_str()))?;
        page.ok_or(ResourceError::NotFound)
    }

    /// Replace the title, note and visibility of one of the caller's pages
    pub async fn update(
        &self,
        caller: &Identity,
        page_id: &str,
        input: &PageInput,
    ) -> ResourceResult<()> {
        let rows = self
            .pages
            .update_owned(page_id, &caller.user_id, input, Utc::now())
            .await?;
        policy::require_affected(rows)
    }

    /// Delete one of the caller's pages and its charms
    pub async fn delete(&self, caller: &Identity, page_id: &str) -> ResourceResult<()> {
        let rows = self.pages.delete_owned(page_id, &caller.user_id).await?;
        policy::require_affected(rows)?;

        tracing::debug!(page_id = %page_id, "Page deleted");
        Ok(())
    }

    /// Fetch a page for anonymous reading
    ///
    /// # Errors
    ///
    /// * `ResourceError::NotFound` - Page absent
    /// * `ResourceError::Forbidden` - Page exists but is not public
    pub async fn get_public(&self, page_id: &str) -> ResourceResult<Page> {
        let page = self
            .pages
            .find(page_id)
            .await?
            .ok_or(ResourceError::NotFound)?;
        policy::require_public(&page)?;
        Ok(page)
    }
}
