use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::product_images::{CreateProductImageRequest, UpdateProductImageRequest},
    error::AppResult,
    middleware::auth::{AuthStrategy, protect},
    models::ProductImage,
    response::ApiResponse,
    routes::params::ProductImageQuery,
    services::product_image_service,
    state::AppState,
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_product_images).merge(protect(
                state,
                AuthStrategy::EmployeeSession,
                post(create_product_image),
            )),
        )
        .route(
            "/{id}",
            get(get_product_image).merge(protect(
                state,
                AuthStrategy::EmployeeSession,
                put(update_product_image).delete(delete_product_image),
            )),
        )
}

#[utoipa::path(
    get,
    path = "/productImages",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("product_id" = Option<Uuid>, Query, description = "Only images of this product"),
    ),
    responses(
        (status = 200, description = "List product images", body = ApiResponse<Vec<ProductImage>>)
    ),
    tag = "Product images"
)]
pub async fn list_product_images(
    State(state): State<AppState>,
    Query(query): Query<ProductImageQuery>,
) -> AppResult<Json<ApiResponse<Vec<ProductImage>>>> {
    let resp = product_image_service::list_product_images(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/productImages/{id}",
    params(("id" = Uuid, Path, description = "Product image ID")),
    responses(
        (status = 200, description = "Get product image", body = ApiResponse<ProductImage>),
        (status = 404, description = "Product image not found"),
    ),
    tag = "Product images"
)]
pub async fn get_product_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductImage>>> {
    let resp = product_image_service::get_product_image(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/productImages",
    request_body = CreateProductImageRequest,
    responses(
        (status = 201, description = "Create product image", body = ApiResponse<ProductImage>),
        (status = 400, description = "Validation failed or unknown product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Product images"
)]
pub async fn create_product_image(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductImageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductImage>>)> {
    let resp = product_image_service::create_product_image(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/productImages/{id}",
    params(("id" = Uuid, Path, description = "Product image ID")),
    request_body = UpdateProductImageRequest,
    responses(
        (status = 200, description = "Updated product image", body = ApiResponse<ProductImage>),
        (status = 404, description = "Product image not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Product images"
)]
pub async fn update_product_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductImageRequest>,
) -> AppResult<Json<ApiResponse<ProductImage>>> {
    let resp = product_image_service::update_product_image(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/productImages/{id}",
    params(("id" = Uuid, Path, description = "Product image ID")),
    responses(
        (status = 200, description = "Deleted product image"),
        (status = 404, description = "Product image not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Product images"
)]
pub async fn delete_product_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_image_service::delete_product_image(&state, id).await?;
    Ok(Json(resp))
}
