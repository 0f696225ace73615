//! In-memory implementation of every repository trait.
//!
//! Behaves like the PostgreSQL adapters, including unique ids and emails,
//! owner-filtered mutations and cascading page deletes, so managers can be
//! exercised without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::repository::{CharmRepository, PageRepository, UserRepository};
use crate::auth::{User, UserId};
use crate::charms::{Charm, CharmId};
use crate::pages::{Page, PageId, PageInput};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    pages: HashMap<PageId, Page>,
    charms: HashMap<CharmId, Charm>,
}

/// Shared in-memory store; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Number of stored charms
    pub async fn charm_count(&self) -> usize {
        self.tables.read().await.charms.len()
    }
}

fn newest_first<T>(items: &mut [T], updated_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(updated_at(item)));
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let taken = tables.users.contains_key(&user.id)
            || tables.users.values().any(|u| u.email == user.email);
        if taken {
            return Err(StoreError::DuplicateKey);
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn ensure_user(&self, user: &User) -> StoreResult<()> {
        match self.insert_user(user).await {
            Err(StoreError::DuplicateKey) => Ok(()),
            other => other,
        }
    }
}

#[async_trait]
impl PageRepository for MemoryStore {
    async fn list_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Page>> {
        let tables = self.tables.read().await;
        let mut pages: Vec<Page> = tables
            .pages
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        newest_first(&mut pages, |p| p.updated_at);
        Ok(pages)
    }

    async fn find(&self, page_id: &str) -> StoreResult<Option<Page>> {
        Ok(self.tables.read().await.pages.get(page_id).cloned())
    }

    async fn insert(&self, page: &Page) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&page.owner_id) {
            return Err(StoreError::Other(format!(
                "owner {} violates users foreign key",
                page.owner_id
            )));
        }
        if tables.pages.contains_key(&page.id) {
            return Err(StoreError::DuplicateKey);
        }
        tables.pages.insert(page.id.clone(), page.clone());
        Ok(())
    }

    async fn update_owned(
        &self,
        page_id: &str,
        owner_id: &str,
        input: &PageInput,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        match tables.pages.get_mut(page_id) {
            Some(page) if page.owner_id == owner_id => {
                page.title = input.title.clone();
                page.note = input.note.clone();
                page.is_public = input.is_public;
                page.updated_at = updated_at;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_owned(&self, page_id: &str, owner_id: &str) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .pages
            .get(page_id)
            .is_some_and(|p| p.owner_id == owner_id);
        if !owned {
            return Ok(0);
        }
        tables.pages.remove(page_id);
        tables.charms.retain(|_, c| c.page_id != page_id);
        Ok(1)
    }
}

#[async_trait]
impl CharmRepository for MemoryStore {
    async fn list_by_page(&self, page_id: &str) -> StoreResult<Vec<Charm>> {
        let tables = self.tables.read().await;
        let mut charms: Vec<Charm> = tables
            .charms
            .values()
            .filter(|c| c.page_id == page_id)
            .cloned()
            .collect();
        newest_first(&mut charms, |c| c.updated_at);
        Ok(charms)
    }

    async fn find_with_owner(&self, charm_id: &str) -> StoreResult<Option<(Charm, UserId)>> {
        let tables = self.tables.read().await;
        let found = tables.charms.get(charm_id).and_then(|charm| {
            tables
                .pages
                .get(&charm.page_id)
                .map(|page| (charm.clone(), page.owner_id.clone()))
        });
        Ok(found)
    }

    async fn insert(&self, charm: &Charm) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.pages.contains_key(&charm.page_id) {
            return Err(StoreError::Other(format!(
                "page {} violates pages foreign key",
                charm.page_id
            )));
        }
        if tables.charms.contains_key(&charm.id) {
            return Err(StoreError::DuplicateKey);
        }
        tables.charms.insert(charm.id.clone(), charm.clone());
        Ok(())
    }

    async fn update(&self, charm: &Charm) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        match tables.charms.get_mut(&charm.id) {
            Some(stored) => {
                stored.shape = charm.shape;
                stored.color = charm.color;
                stored.title = charm.title.clone();
                stored.text_value = charm.text_value.clone();
                stored.updated_at = charm.updated_at;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, charm_id: &str) -> StoreResult<u64> {
        let removed = self.tables.write().await.charms.remove(charm_id);
        Ok(u64::from(removed.is_some()))
    }
}
