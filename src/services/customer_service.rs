use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::customers::{CreateCustomerRequest, UpdateCustomerRequest},
    entity::customers::{ActiveModel, Column, Entity as Customers, Model},
    error::{AppError, AppResult},
    middleware::auth::Identity,
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        auth_service::{hash_password, normalize_email},
        timestamp,
    },
    state::AppState,
    validation::ValidationErrors,
};

pub async fn list_customers(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Customer>>> {
    let conn = state.conn();
    let (_, limit, offset) = pagination.normalize();
    let finder = Customers::find()
        .order_by_asc(Column::LastName)
        .order_by_asc(Column::FirstName);

    let total = finder.clone().count(&*conn).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset)
        .all(&*conn)
        .await?
        .into_iter()
        .map(Customer::from)
        .collect();

    Ok(ApiResponse::success(
        "Customers",
        items,
        Some(Meta::paged(&pagination, total)),
    ))
}

pub async fn get_customer(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Customer>> {
    let customer = Customers::find_by_id(id)
        .one(&*state.conn())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok("Customer", customer.into()))
}

/// The profile of the customer the session belongs to.
pub async fn me(state: &AppState, identity: &Identity) -> AppResult<ApiResponse<Customer>> {
    let customer = Customers::find_by_id(identity.id)
        .one(&*state.conn())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok("Me", customer.into()))
}

async fn ensure_email_free<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Customers::find().filter(Column::Email.eq(email));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(conn).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }
    Ok(())
}

/// Used both by public registration and by employees creating accounts.
pub async fn create_customer(
    state: &AppState,
    payload: CreateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
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

    let customer = ActiveModel::from(candidate).reset_all().insert(&*conn).await?;
    tracing::info!(customer_id = %customer.id, "customer created");

    Ok(ApiResponse::ok("Customer created", customer.into()))
}

pub async fn update_customer(
    state: &AppState,
    id: Uuid,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    let mut errors = payload
        .validate()
        .err()
        .map(ValidationErrors::from)
        .unwrap_or_default();
    let conn = state.conn();
    let mut candidate = Customers::find_by_id(id)
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

    let customer = ActiveModel::from(candidate).reset_all().update(&*conn).await?;
    tracing::info!(customer_id = %customer.id, "customer updated");

    Ok(ApiResponse::ok("Updated", customer.into()))
}

pub async fn delete_customer(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Customers::delete_by_id(id).exec(&*state.conn()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(customer_id = %id, "customer deleted");

    Ok(ApiResponse::ok("Deleted", serde_json::json!({ "id": id })))
}
