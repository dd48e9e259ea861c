use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::shipping_addresses::{CreateShippingAddressRequest, UpdateShippingAddressRequest},
    error::AppResult,
    middleware::auth::{AuthStrategy, protect},
    models::ShippingAddress,
    response::ApiResponse,
    routes::params::Pagination,
    services::shipping_address_service,
    state::AppState,
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            protect(
                state,
                AuthStrategy::EmployeeSession,
                get(list_shipping_addresses).post(create_shipping_address),
            ),
        )
        .route(
            "/{id}",
            protect(
                state,
                AuthStrategy::EmployeeSession,
                get(get_shipping_address)
                    .put(update_shipping_address)
                    .delete(delete_shipping_address),
            ),
        )
}

#[utoipa::path(
    get,
    path = "/shippingAddresses",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List shipping addresses", body = ApiResponse<Vec<ShippingAddress>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping addresses"
)]
pub async fn list_shipping_addresses(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<ShippingAddress>>>> {
    let resp = shipping_address_service::list_shipping_addresses(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/shippingAddresses/{id}",
    params(("id" = Uuid, Path, description = "Shipping address ID")),
    responses(
        (status = 200, description = "Get shipping address", body = ApiResponse<ShippingAddress>),
        (status = 404, description = "Shipping address not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping addresses"
)]
pub async fn get_shipping_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ShippingAddress>>> {
    let resp = shipping_address_service::get_shipping_address(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/shippingAddresses",
    request_body = CreateShippingAddressRequest,
    responses(
        (status = 201, description = "Create shipping address", body = ApiResponse<ShippingAddress>),
        (status = 400, description = "Validation failed or unknown customer"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping addresses"
)]
pub async fn create_shipping_address(
    State(state): State<AppState>,
    Json(payload): Json<CreateShippingAddressRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ShippingAddress>>)> {
    let resp = shipping_address_service::create_shipping_address(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/shippingAddresses/{id}",
    params(("id" = Uuid, Path, description = "Shipping address ID")),
    request_body = UpdateShippingAddressRequest,
    responses(
        (status = 200, description = "Updated shipping address", body = ApiResponse<ShippingAddress>),
        (status = 404, description = "Shipping address not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping addresses"
)]
pub async fn update_shipping_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShippingAddressRequest>,
) -> AppResult<Json<ApiResponse<ShippingAddress>>> {
    let resp = shipping_address_service::update_shipping_address(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/shippingAddresses/{id}",
    params(("id" = Uuid, Path, description = "Shipping address ID")),
    responses(
        (status = 200, description = "Deleted shipping address"),
        (status = 404, description = "Shipping address not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Shipping addresses"
)]
pub async fn delete_shipping_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = shipping_address_service::delete_shipping_address(&state, id).await?;
    Ok(Json(resp))
}
