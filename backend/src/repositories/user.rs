//! User repository for database operations

use super::{ImageSwap, RepoError, RepoResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storefront_shared::types::UserResponse;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            image_path: record.image_path,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserSwapRow {
    #[sqlx(flatten)]
    user: UserRecord,
    replaced_image_path: Option<String>,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A taken email yields `RepoError::UniqueViolation("email")`.
    async fn create(&self, input: NewUser) -> RepoResult<UserRecord>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<UserRecord>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>>;

    /// All users, oldest first
    async fn list(&self) -> RepoResult<Vec<UserRecord>>;

    /// Apply a partial update, returning `None` when the user does not exist
    async fn update(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<UserRecord>>;

    /// Replace (or clear) the stored image path, returning the path it
    /// replaced. The read and the write happen under one row lock.
    async fn set_image(
        &self,
        id: Uuid,
        image_path: Option<&str>,
    ) -> RepoResult<Option<ImageSwap<UserRecord>>>;

    /// Delete a user, returning the removed row
    async fn delete(&self, id: Uuid) -> RepoResult<Option<UserRecord>>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
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
    async fn create(&self, input: NewUser) -> RepoResult<UserRecord> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, image_path, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::on_write(e, "email"))
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, image_path, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, image_path, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> RepoResult<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, image_path, created_at, updated_at
            FROM users
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, image_path, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::on_write(e, "email"))
    }

    async fn set_image(
        &self,
        id: Uuid,
        image_path: Option<&str>,
    ) -> RepoResult<Option<ImageSwap<UserRecord>>> {
        let row = sqlx::query_as::<_, UserSwapRow>(
            r#"
            UPDATE users AS u SET image_path = $2, updated_at = NOW()
            FROM (SELECT id, image_path FROM users WHERE id = $1 FOR UPDATE) AS old
            WHERE u.id = old.id
            RETURNING u.id, u.name, u.email, u.password_hash, u.image_path,
                      u.created_at, u.updated_at, old.image_path AS replaced_image_path
            "#,
        )
        .bind(id)
        .bind(image_path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ImageSwap {
            record: row.user,
            replaced: row.replaced_image_path,
        }))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            DELETE FROM users
            WHERE id = $1
            RETURNING id, name, email, password_hash, image_path, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
