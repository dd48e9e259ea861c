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
        employees::{CreateEmployeeRequest, UpdateEmployeeRequest},
    },
    error::AppResult,
    middleware::auth::{AuthStrategy, Identity, protect},
    models::Employee,
    response::ApiResponse,
    routes::params::Pagination,
    services::{auth_service::{self, Directory}, employee_service},
    state::AppState,
};

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            protect(
                state,
                AuthStrategy::EmployeeSession,
                get(list_employees).post(create_employee),
            ),
        )
        .route(
            "/login",
            protect(state, AuthStrategy::Local(Directory::Employees), post(login)),
        )
        .route(
            "/me",
            protect(state, AuthStrategy::EmployeeSession, get(me)),
        )
        .route(
            "/{id}",
            protect(
                state,
                AuthStrategy::EmployeeSession,
                get(get_employee)
                    .put(update_employee)
                    .delete(delete_employee),
            ),
        )
}

#[utoipa::path(
    post,
    path = "/employees/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Employee session token", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid email or password"),
    ),
    tag = "Employees"
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
    path = "/employees/me",
    responses(
        (status = 200, description = "Calling employee", body = ApiResponse<Employee>),
        (status = 401, description = "Employee session required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let resp = employee_service::me(&state, &identity).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/employees",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List employees", body = ApiResponse<Vec<Employee>>),
        (status = 401, description = "Employee session required"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<Vec<Employee>>>> {
    let resp = employee_service::list_employees(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = ApiResponse<Employee>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Employee>>)> {
    let resp = employee_service::create_employee(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Get employee", body = ApiResponse<Employee>),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let resp = employee_service::get_employee(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Updated employee", body = ApiResponse<Employee>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Email already registered"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let resp = employee_service::update_employee(&state, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Deleted employee"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = employee_service::delete_employee(&state, id).await?;
    Ok(Json(resp))
}
