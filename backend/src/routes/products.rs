//! Product catalog routes
//!
//! Reads are public; writes are mounted separately so `create_router` can
//! put them behind `require_auth`.

use super::upload::{parse_id, read_image};
use crate::error::ApiResult;
use crate::services::ProductService;
use crate::state::AppState;
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use storefront_shared::types::{
    CreateProductRequest, MessageResponse, ProductEnvelope, ProductListResponse,
    UpdateProductRequest,
};

const INVALID_PRODUCT_ID: &str = "Invalid product ID";

/// Public catalog reads
pub fn public_product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
}

/// Catalog writes, require authentication
pub fn protected_product_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(create_product))
        .route("/:id", axum::routing::put(update_product).delete(delete_product))
        .route(
            "/:id/image",
            post(upload_product_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// GET /products
async fn list_products(State(state): State<AppState>) -> ApiResult<Json<ProductListResponse>> {
    let products = ProductService::list(state.products.as_ref()).await?;
    Ok(Json(ProductListResponse { products }))
}

/// GET /products/:id
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductEnvelope>> {
    let id = parse_id(&id, INVALID_PRODUCT_ID)?;
    let product = ProductService::get(state.products.as_ref(), id).await?;
    Ok(Json(ProductEnvelope { product }))
}

/// POST /products
async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProductEnvelope>)> {
    let Json(req) = payload?;
    let product = ProductService::create(state.products.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(ProductEnvelope { product })))
}

/// PUT /products/:id
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> ApiResult<Json<ProductEnvelope>> {
    let id = parse_id(&id, INVALID_PRODUCT_ID)?;
    let Json(req) = payload?;
    let product = ProductService::update(state.products.as_ref(), id, req).await?;
    Ok(Json(ProductEnvelope { product }))
}

/// DELETE /products/:id
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, INVALID_PRODUCT_ID)?;
    ProductService::delete(state.products.as_ref(), state.files.as_ref(), id).await?;
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

/// POST /products/:id/image (multipart field `image`)
async fn upload_product_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ProductEnvelope>> {
    let id = parse_id(&id, INVALID_PRODUCT_ID)?;
    let upload = read_image(multipart).await?;
    let product = ProductService::upload_image(
        state.products.as_ref(),
        state.files.as_ref(),
        &state.config().uploads.allowed_types,
        id,
        upload,
    )
    .await?;
    Ok(Json(ProductEnvelope { product }))
}
