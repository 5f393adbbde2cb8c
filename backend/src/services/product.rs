//! Product catalog service

use super::images::replace_image;
use crate::error::{ApiError, ApiResult};
use crate::repositories::{NewProduct, ProductChanges, ProductRepository};
use crate::storage::{self, FileStore, ImageUpload, Namespace};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use storefront_shared::errors::FieldError;
use storefront_shared::types::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use storefront_shared::validation::{
    provided, validate_price, validate_quantity, validate_required_text,
};
use tracing::info;
use uuid::Uuid;

const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Validate a price and convert it to the two-decimal column representation
fn to_price(price: f64) -> Result<Decimal, FieldError> {
    validate_price(price)?;
    Decimal::from_f64(price)
        .map(|d| d.round_dp(2))
        .ok_or_else(|| FieldError::new("price", "Price must be a valid number"))
}

pub struct ProductService;

impl ProductService {
    pub async fn create(
        products: &dyn ProductRepository,
        req: CreateProductRequest,
    ) -> ApiResult<ProductResponse> {
        let name = req.name.trim().to_string();
        validate_required_text("name", &name)?;
        let description = req.description.trim().to_string();
        validate_required_text("description", &description)?;
        let price = to_price(req.price)?;
        validate_quantity(req.quantity)?;

        let product = products
            .create(NewProduct {
                name,
                description,
                price,
                quantity: req.quantity,
            })
            .await?;

        info!(product_id = %product.id, "Product created");
        Ok(product.into())
    }

    pub async fn get(products: &dyn ProductRepository, id: Uuid) -> ApiResult<ProductResponse> {
        products
            .find_by_id(id)
            .await?
            .map(ProductResponse::from)
            .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))
    }

    pub async fn list(products: &dyn ProductRepository) -> ApiResult<Vec<ProductResponse>> {
        let records = products.list().await?;
        Ok(records.into_iter().map(ProductResponse::from).collect())
    }

    /// Apply a partial update
    ///
    /// Text fields left blank are ignored. Numeric fields are applied whenever
    /// present, including zero.
    pub async fn update(
        products: &dyn ProductRepository,
        id: Uuid,
        req: UpdateProductRequest,
    ) -> ApiResult<ProductResponse> {
        let name = provided(req.name).map(|n| n.trim().to_string());
        if let Some(name) = &name {
            validate_required_text("name", name)?;
        }
        let description = provided(req.description).map(|d| d.trim().to_string());
        let price = req.price.map(to_price).transpose()?;
        if let Some(quantity) = req.quantity {
            validate_quantity(quantity)?;
        }

        let product = products
            .update(
                id,
                ProductChanges {
                    name,
                    description,
                    price,
                    quantity: req.quantity,
                },
            )
            .await?
            .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

        info!(product_id = %id, "Product updated");
        Ok(product.into())
    }

    /// Delete a product, then remove its image
    pub async fn delete(
        products: &dyn ProductRepository,
        files: &dyn FileStore,
        id: Uuid,
    ) -> ApiResult<()> {
        let removed = products
            .delete(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

        if let Some(path) = removed.image_path.as_deref() {
            storage::discard(files, path).await;
        }

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    pub async fn upload_image(
        products: &dyn ProductRepository,
        files: &dyn FileStore,
        allowed_types: &[String],
        id: Uuid,
        upload: ImageUpload,
    ) -> ApiResult<ProductResponse> {
        // Unknown ids fail before anything is written to disk
        if products.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound(PRODUCT_NOT_FOUND.to_string()));
        }

        let product = replace_image(
            files,
            Namespace::Products,
            allowed_types,
            upload,
            PRODUCT_NOT_FOUND,
            |path| async move { products.set_image(id, Some(&path)).await },
        )
        .await?;

        Ok(product.into())
    }
}
