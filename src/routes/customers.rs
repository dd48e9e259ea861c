use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse},
        customers::{CreateCustomerRequest, UpdateCustomerRequest},
    },
    error::AppResult,
    middleware::auth::{AuthStrategy, Identity, protect},
    models::Customer,
    response::ApiResponse,
    routes::params::Pagination,
    services::{auth_service::{self, Directory}, customer_service},
    state::AppState,
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(register).merge(protect(
                state,
                AuthStrategy::EmployeeSession,
                get(list_customers),
            )),
        )
        .route(
            "/login",
            protect(state, AuthStrategy::Local(Directory::Customers), post(login)),
        )
        .route(
            "/me",
            protect(state, AuthStrategy::CustomerSession, get(me)),
        )
        .route(
            "/{id}",
            protect(
                state,
                AuthStrategy::EmployeeSession,
                get(get_customer)
                    .put(update_customer)
                    .delete(delete_customer),
            ),
        )
}

#[utoipa::path(
    post,
    path = "/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer registered", body = ApiResponse<Customer>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Customers"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Customer>>)> {
    let resp = customer_service::create_customer(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/customers/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Customer session token", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid email or password"),
    ),
    tag = "Customers"
)]
pub async fn login(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login(&state.config, &identity)?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/customers/me",
    responses(
        (status = 200, description = "Calling customer", body = ApiResponse<Customer>),
        (status = 401, description = "Customer session required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::me(&state, &identity).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/customers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List customers", body = ApiResponse<Vec<Customer>>),
        (status = 401, description = "Employee session required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<Customer>>>> {
    let resp = customer_service::list_customers(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Get customer", body = ApiResponse<Customer>),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::get_customer(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Updated customer", body = ApiResponse<Customer>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Email already registered"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = customer_service::update_customer(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Deleted customer"),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = customer_service::delete_customer(&state, id).await?;
    Ok(Json(resp))
}
