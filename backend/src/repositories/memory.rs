//! In-memory repositories for unit tests
//!
//! Behave like the PostgreSQL implementations (insertion order, unique
//! emails, partial updates) without a database.

use super::{
    ImageSwap, NewProduct, NewUser, ProductChanges, ProductRecord, ProductRepository, RepoError,
    RepoResult, UserChanges, UserRecord, UserRepository,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

fn simulated_failure() -> RepoError {
    RepoError::Database(sqlx::Error::PoolTimedOut)
}

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: RwLock<Vec<UserRecord>>,
    fail_image_writes: AtomicBool,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `set_image` call fail from now on
    pub fn fail_image_writes(&self) {
        self.fail_image_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, input: NewUser) -> RepoResult<UserRecord> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|u| u.email == input.email) {
            return Err(RepoError::UniqueViolation("email"));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            image_path: None,
            created_at: now,
            updated_at: now,
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<UserRecord>> {
        Ok(self.rows.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self) -> RepoResult<Vec<UserRecord>> {
        Ok(self.rows.read().await.clone())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<UserRecord>> {
        let mut rows = self.rows.write().await;

        if let Some(email) = &changes.email {
            if rows.iter().any(|u| u.id != id && &u.email == email) {
                return Err(RepoError::UniqueViolation("email"));
            }
        }

        let Some(user) = rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_image(
        &self,
        id: Uuid,
        image_path: Option<&str>,
    ) -> RepoResult<Option<ImageSwap<UserRecord>>> {
        if self.fail_image_writes.load(Ordering::SeqCst) {
            return Err(simulated_failure());
        }

        let mut rows = self.rows.write().await;
        Ok(rows.iter_mut().find(|u| u.id == id).map(|user| {
            let new_path = image_path.map(str::to_string);
            let replaced = std::mem::replace(&mut user.image_path, new_path);
            user.updated_at = Utc::now();
            ImageSwap {
                record: user.clone(),
                replaced,
            }
        }))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<Option<UserRecord>> {
        let mut rows = self.rows.write().await;
        let position = rows.iter().position(|u| u.id == id);
        Ok(position.map(|i| rows.remove(i)))
    }
}

#[derive(Default)]
pub struct MemoryProductRepository {
    rows: RwLock<Vec<ProductRecord>>,
    fail_image_writes: AtomicBool,
}

impl MemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `set_image` call fail from now on
    pub fn fail_image_writes(&self) {
        self.fail_image_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductRepository for MemoryProductRepository {
    async fn create(&self, input: NewProduct) -> RepoResult<ProductRecord> {
        let now = Utc::now();
        let record = ProductRecord {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            image_path: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ProductRecord>> {
        Ok(self.rows.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<ProductRecord>> {
        Ok(self.rows.read().await.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> RepoResult<Option<ProductRecord>> {
        let mut rows = self.rows.write().await;
        let Some(product) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(description) = changes.description {
            product.description = description;
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(quantity) = changes.quantity {
            product.quantity = quantity;
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn set_image(
        &self,
        id: Uuid,
        image_path: Option<&str>,
    ) -> RepoResult<Option<ImageSwap<ProductRecord>>> {
        if self.fail_image_writes.load(Ordering::SeqCst) {
            return Err(simulated_failure());
        }

        let mut rows = self.rows.write().await;
        Ok(rows.iter_mut().find(|p| p.id == id).map(|product| {
            let new_path = image_path.map(str::to_string);
            let replaced = std::mem::replace(&mut product.image_path, new_path);
            product.updated_at = Utc::now();
            ImageSwap {
                record: product.clone(),
                replaced,
            }
        }))
    }

    async fn delete(&self, id: Uuid) -> RepoResult<Option<ProductRecord>> {
        let mut rows = self.rows.write().await;
        let position = rows.iter().position(|p| p.id == id);
        Ok(position.map(|i| rows.remove(i)))
    }
}
