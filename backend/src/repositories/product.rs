//! Product repository for database operations

use super::{ImageSwap, RepoResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use storefront_shared::types::ProductResponse;
use uuid::Uuid;

/// Product record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRecord> for ProductResponse {
    fn from(record: ProductRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            price: record.price.to_f64().unwrap_or_default(),
            quantity: record.quantity,
            image_path: record.image_path,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductSwapRow {
    #[sqlx(flatten)]
    product: ProductRecord,
    replaced_image_path: Option<String>,
}

/// Input for creating a product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, input: NewProduct) -> RepoResult<ProductRecord>;

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ProductRecord>>;

    /// All products, oldest first
    async fn list(&self) -> RepoResult<Vec<ProductRecord>>;

    /// Apply a partial update, returning `None` when the product does not exist
    async fn update(&self, id: Uuid, changes: ProductChanges)
        -> RepoResult<Option<ProductRecord>>;

    /// Replace (or clear) the stored image path, returning the path it
    /// replaced. The read and the write happen under one row lock.
    async fn set_image(
        &self,
        id: Uuid,
        image_path: Option<&str>,
    ) -> RepoResult<Option<ImageSwap<ProductRecord>>>;

    /// Delete a product, returning the removed row
    async fn delete(&self, id: Uuid) -> RepoResult<Option<ProductRecord>>;
}

/// PostgreSQL-backed product repository
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: NewProduct) -> RepoResult<ProductRecord> {
        let product = sqlx::query_as::<_, ProductRecord>(
            r#"
            INSERT INTO products (name, description, price, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price, quantity, image_path, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ProductRecord>> {
        let product = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT id, name, description, price, quantity, image_path, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn list(&self) -> RepoResult<Vec<ProductRecord>> {
        let products = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT id, name, description, price, quantity, image_path, created_at, updated_at
            FROM products
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> RepoResult<Option<ProductRecord>> {
        let product = sqlx::query_as::<_, ProductRecord>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                quantity = COALESCE($5, quantity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, price, quantity, image_path, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.price)
        .bind(changes.quantity)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn set_image(
        &self,
        id: Uuid,
        image_path: Option<&str>,
    ) -> RepoResult<Option<ImageSwap<ProductRecord>>> {
        let row = sqlx::query_as::<_, ProductSwapRow>(
            r#"
            UPDATE products AS p SET image_path = $2, updated_at = NOW()
            FROM (SELECT id, image_path FROM products WHERE id = $1 FOR UPDATE) AS old
            WHERE p.id = old.id
            RETURNING p.id, p.name, p.description, p.price, p.quantity, p.image_path,
                      p.created_at, p.updated_at, old.image_path AS replaced_image_path
            "#,
        )
        .bind(id)
        .bind(image_path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ImageSwap {
            record: row.product,
            replaced: row.replaced_image_path,
        }))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<Option<ProductRecord>> {
        let product = sqlx::query_as::<_, ProductRecord>(
            r#"
            DELETE FROM products
            WHERE id = $1
            RETURNING id, name, description, price, quantity, image_path, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }
}
