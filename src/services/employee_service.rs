use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::employees::{CreateEmployeeRequest, UpdateEmployeeRequest},
    entity::employees::{ActiveModel, Column, Entity as Employees, Model},
    error::{AppError, AppResult},
    middleware::auth::Identity,
    models::Employee,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        auth_service::{hash_password, normalize_email},
        timestamp,
    },
    state::AppState,
    validation::ValidationErrors,
};

pub async fn list_employees(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Employee>>> {
    let conn = state.conn();
    let (_, limit, offset) = pagination.normalize();
    let finder = Employees::find()
        .order_by_asc(Column::LastName)
        .order_by_asc(Column::FirstName);

    let total = finder.clone().count(&*conn).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset)
        .all(&*conn)
        .await?
        .into_iter()
        .map(Employee::from)
        .collect();

    Ok(ApiResponse::success(
        "Employees",
        items,
        Some(Meta::paged(&pagination, total)),
    ))
}

pub async fn get_employee(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Employee>> {
    let employee = Employees::find_by_id(id)
        .one(&*state.conn())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok("Employee", employee.into()))
}

/// The profile of the employee the session belongs to.
pub async fn me(state: &AppState, identity: &Identity) -> AppResult<ApiResponse<Employee>> {
    let employee = Employees::find_by_id(identity.id)
        .one(&*state.conn())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok("Me", employee.into()))
}

async fn ensure_email_free<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Employees::find().filter(Column::Email.eq(email));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(conn).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }
    Ok(())
}

pub async fn create_employee(
    state: &AppState,
    payload: CreateEmployeeRequest,
) -> AppResult<ApiResponse<Employee>> {
    let mut errors = payload
        .validate()
        .err()
        .map(ValidationErrors::from)
        .unwrap_or_default();
    let conn = state.conn();
    let now = timestamp();
    let mut candidate = Model {
        id: Uuid::new_v4(),
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: normalize_email(&payload.email),
        phone_number: payload.phone_number,
        address: payload.address,
        password_hash: String::new(),
        created_at: now,
        updated_at: now,
    };

    if let Err(found) = candidate.validate() {
        errors.merge(found.into());
    }
    errors.into_result()?;

    ensure_email_free(&*conn, &candidate.email, None).await?;
    candidate.password_hash = hash_password(&payload.password)?;

    let employee = ActiveModel::from(candidate).reset_all().insert(&*conn).await?;
    tracing::info!(employee_id = %employee.id, "employee created");

    Ok(ApiResponse::ok("Employee created", employee.into()))
}

pub async fn update_employee(
    state: &AppState,
    id: Uuid,
    payload: UpdateEmployeeRequest,
) -> AppResult<ApiResponse<Employee>> {
    let mut errors = payload
        .validate()
        .err()
        .map(ValidationErrors::from)
        .unwrap_or_default();
    let conn = state.conn();
    let mut candidate = Employees::find_by_id(id)
        .one(&*conn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(first_name) = payload.first_name {
        candidate.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        candidate.last_name = last_name;
    }
    if let Some(email) = payload.email {
        candidate.email = normalize_email(&email);
    }
    if let Some(phone_number) = payload.phone_number {
        candidate.phone_number = Some(phone_number);
    }
    if let Some(address) = payload.address {
        candidate.address = Some(address);
    }
    candidate.updated_at = timestamp();

    if let Err(found) = candidate.validate() {
        errors.merge(found.into());
    }
    errors.into_result()?;

    ensure_email_free(&*conn, &candidate.email, Some(id)).await?;
    if let Some(password) = payload.password.as_deref() {
        candidate.password_hash = hash_password(password)?;
    }

    let employee = ActiveModel::from(candidate).reset_all().update(&*conn).await?;
    tracing::info!(employee_id = %employee.id, "employee updated");

    Ok(ApiResponse::ok("Updated", employee.into()))
}

pub async fn delete_employee(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Employees::delete_by_id(id).exec(&*state.conn()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(employee_id = %id, "employee deleted");

    Ok(ApiResponse::ok("Deleted", serde_json::json!({ "id": id })))
}
