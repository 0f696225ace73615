//! Repository trait definitions and their PostgreSQL implementations.
//!
//! Managers depend on these traits rather than on a pool, so the same
//! ownership logic runs against PostgreSQL in production and against
//! [`super::MemoryStore`] in tests.
//!
//! Owner-filtered mutations (`update_owned`, `delete_owned`) both mutate and
//! enforce ownership in one round trip; they report the number of affected
//! rows and callers treat zero as "not found".
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::errors::{StoreError, StoreResult};
use crate::auth::{User, UserId};
use crate::charms::{Charm, CharmId};
use crate::pages::{Page, PageId, PageInput};

/// Credential store operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by normalized email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<User>>;

    /// Insert a new user; a taken id or email yields `StoreError::DuplicateKey`
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Insert the user unless a row with the same id or email already exists
    async fn ensure_user(&self, user: &User) -> StoreResult<()>;

    /// Check that the store is reachable
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Page store operations
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// List pages owned by `owner_id`, most recently updated first
    async fn list_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Page>>;

    /// Find page by ID regardless of owner
    async fn find(&self, page_id: &str) -> StoreResult<Option<Page>>;

    /// Insert a new page
    async fn insert(&self, page: &Page) -> StoreResult<()>;

    /// Replace title, note and visibility of a page owned by `owner_id`
    async fn update_owned(
        &self,
        page_id: &str,
        owner_id: &str,
        input: &PageInput,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<u64>;

    /// Delete a page owned by `owner_id` together with its charms
    async fn delete_owned(&self, page_id: &str, owner_id: &str) -> StoreResult<u64>;
}

/// Charm store operations
#[async_trait]
pub trait CharmRepository: Send + Sync {
    /// List charms of a page, most recently updated first
    async fn list_by_page(&self, page_id: &str) -> StoreResult<Vec<Charm>>;

    /// Find a charm together with the owner of its persisted parent page
    async fn find_with_owner(&self, charm_id: &str) -> StoreResult<Option<(Charm, UserId)>>;

    /// Insert a new charm
    async fn insert(&self, charm: &Charm) -> StoreResult<()>;

    /// Overwrite the mutable fields of a charm
    async fn update(&self, charm: &Charm) -> StoreResult<u64>;

    /// Delete a charm
    async fn delete(&self, charm_id: &str) -> StoreResult<u64>;
}

fn user_from_row(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        email: r.get("email"),
        password_hash: r.get("pass_hash"),
        created_at: r.get("created_at"),
    }
}

fn page_from_row(r: &PgRow) -> Page {
    Page {
        id: r.get("id"),
        owner_id: r.get("owner_id"),
        title: r.get("title"),
        note: r.get("note"),
        is_public: r.get("is_public"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn charm_from_row(r: &PgRow) -> StoreResult<Charm> {
    let shape: String = r.get("shape");
    let color: String = r.get("color");
    Ok(Charm {
        id: r.get("id"),
        page_id: r.get("page_id"),
        shape: shape
            .parse()
            .map_err(|e| StoreError::Other(format!("stored shape: {e}")))?,
        color: color
            .parse()
            .map_err(|e| StoreError::Other(format!("stored color: {e}")))?,
        title: r.get("title"),
        text_value: r.get("text_value"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

/// PostgreSQL implementation of `UserRepository`
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, pass_hash, created_at FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, pass_hash, created_at FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, pass_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ensure_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, pass_hash, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// PostgreSQL implementation of `PageRepository`
pub struct PgPageRepository {
    pool: PgPool,
}

impl PgPageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageRepository for PgPageRepository {
    async fn list_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Page>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, title, note, is_public, created_at, updated_at
            FROM pages
            WHERE owner_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(page_from_row).collect())
    }

    async fn find(&self, page_id: &str) -> StoreResult<Option<Page>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, title, note, is_public, created_at, updated_at
            FROM pages
            WHERE id = $1
            "#,
        )
        .bind(page_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(page_from_row))
    }

    async fn insert(&self, page: &Page) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pages (id, owner_id, title, note, is_public, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&page.id)
        .bind(&page.owner_id)
        .bind(&page.title)
        .bind(&page.note)
        .bind(page.is_public)
        .bind(page.created_at)
        .bind(page.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_owned(
        &self,
        page_id: &str,
        owner_id: &str,
        input: &PageInput,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE pages SET title = $1, note = $2, is_public = $3, updated_at = $4
            WHERE id = $5 AND owner_id = $6
            "#,
        )
        .bind(&input.title)
        .bind(&input.note)
        .bind(input.is_public)
        .bind(updated_at)
        .bind(page_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_owned(&self, page_id: &str, owner_id: &str) -> StoreResult<u64> {
        // charms follow through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM pages WHERE id = $1 AND owner_id = $2")
            .bind(page_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// PostgreSQL implementation of `CharmRepository`
pub struct PgCharmRepository {
    pool: PgPool,
}

impl PgCharmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CharmRepository for PgCharmRepository {
    async fn list_by_page(&self, page_id: &str) -> StoreResult<Vec<Charm>> {
        let rows = sqlx::query(
            r#"
            SELECT id, page_id, shape, color, title, text_value, created_at, updated_at
            FROM charms
            WHERE page_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(charm_from_row).collect()
    }

    async fn find_with_owner(&self, charm_id: &str) -> StoreResult<Option<(Charm, UserId)>> {
        let row = sqlx::query(
            r#"
            SELECT c.id, c.page_id, c.shape, c.color, c.title, c.text_value,
                   c.created_at, c.updated_at, p.owner_id
            FROM charms c
            JOIN pages p ON p.id = c.page_id
            WHERE c.id = $1
            "#,
        )
        .bind(charm_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((charm_from_row(&r)?, r.get("owner_id")))),
            None => Ok(None),
        }
    }

    async fn insert(&self, charm: &Charm) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO charms (id, page_id, shape, color, title, text_value, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&charm.id)
        .bind(&charm.page_id)
        .bind(charm.shape.as_str())
        .bind(charm.color.as_str())
        .bind(&charm.title)
        .bind(&charm.text_value)
        .bind(charm.created_at)
        .bind(charm.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, charm: &Charm) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE charms SET shape = $1, color = $2, title = $3, text_value = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(charm.shape.as_str())
        .bind(charm.color.as_str())
        .bind(&charm.title)
        .bind(&charm.text_value)
        .bind(charm.updated_at)
        .bind(&charm.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, charm_id: &str) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM charms WHERE id = $1")
            .bind(charm_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
