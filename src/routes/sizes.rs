use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::sizes::{CreateSizeRequest, UpdateSizeRequest},
    error::AppResult,
    middleware::auth::{AuthStrategy, protect},
    models::Size,
    response::ApiResponse,
    routes::params::Pagination,
    services::size_service,
    state::AppState,
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_sizes).merge(protect(
                state,
                AuthStrategy::EmployeeSession,
                post(create_size),
            )),
        )
        .route(
            "/{id}",
            get(get_size).merge(protect(
                state,
                AuthStrategy::EmployeeSession,
                put(update_size).delete(delete_size),
            )),
        )
}

#[utoipa::path(
    get,
    path = "/sizes",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List sizes", body = ApiResponse<Vec<Size>>)
    ),
    tag = "Sizes"
)]
pub async fn list_sizes(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<Size>>>> {
    let resp = size_service::list_sizes(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/sizes/{id}",
    params(("id" = Uuid, Path, description = "Size ID")),
    responses(
        (status = 200, description = "Get size", body = ApiResponse<Size>),
        (status = 404, description = "Size not found"),
    ),
    tag = "Sizes"
)]
pub async fn get_size(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Size>>> {
    let resp = size_service::get_size(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/sizes",
    request_body = CreateSizeRequest,
    responses(
        (status = 201, description = "Create size", body = ApiResponse<Size>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Employee session required"),
        (status = 409, description = "Size name taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sizes"
)]
pub async fn create_size(
    State(state): State<AppState>,
    Json(payload): Json<CreateSizeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Size>>)> {
    let resp = size_service::create_size(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/sizes/{id}",
    params(("id" = Uuid, Path, description = "Size ID")),
    request_body = UpdateSizeRequest,
    responses(
        (status = 200, description = "Updated size", body = ApiResponse<Size>),
        (status = 404, description = "Size not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sizes"
)]
pub async fn update_size(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSizeRequest>,
) -> AppResult<Json<ApiResponse<Size>>> {
    let resp = size_service::update_size(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/sizes/{id}",
    params(("id" = Uuid, Path, description = "Size ID")),
    responses(
        (status = 200, description = "Deleted size"),
        (status = 404, description = "Size not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sizes"
)]
pub async fn delete_size(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = size_service::delete_size(&state, id).await?;
    Ok(Json(resp))
}
