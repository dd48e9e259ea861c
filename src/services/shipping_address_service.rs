use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::shipping_addresses::{CreateShippingAddressRequest, UpdateShippingAddressRequest},
    entity::{
        customers::Entity as Customers,
        shipping_addresses::{ActiveModel, Column, Entity as ShippingAddresses, Model},
    },
    error::{AppError, AppResult},
    models::ShippingAddress,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::timestamp,
    state::AppState,
    validation::ValidationErrors,
};

pub async fn list_shipping_addresses(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<ShippingAddress>>> {
    let conn = state.conn();
    let (_, limit, offset) = pagination.normalize();
    let finder = ShippingAddresses::find().order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&*conn).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset)
        .all(&*conn)
        .await?
        .into_iter()
        .map(ShippingAddress::from)
        .collect();

    Ok(ApiResponse::success(
        "Shipping addresses",
        items,
        Some(Meta::paged(&pagination, total)),
    ))
}

pub async fn get_shipping_address(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<ShippingAddress>> {
    let address = ShippingAddresses::find_by_id(id)
        .one(&*state.conn())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok("Shipping address", address.into()))
}

async fn ensure_customer_exists<C: ConnectionTrait>(
    conn: &C,
    customer_id: Option<Uuid>,
) -> AppResult<()> {
    let Some(customer_id) = customer_id else {
        return Ok(());
    };
    if Customers::find_by_id(customer_id).one(conn).await?.is_none() {
        let mut errors = ValidationErrors::new();
        errors.reject(
            "customerId",
            customer_id,
            "Customer {VALUE} does not exist",
        );
        return Err(errors.into());
    }
    Ok(())
}

pub async fn create_shipping_address(
    state: &AppState,
    payload: CreateShippingAddressRequest,
) -> AppResult<ApiResponse<ShippingAddress>> {
    let conn = state.conn();
    let now = timestamp();
    let candidate = Model {
        id: Uuid::new_v4(),
        customer_id: payload.customer_id,
        full_name: payload.full_name,
        phone_number: payload.phone_number,
        address: payload.address,
        created_at: now,
        updated_at: now,
    };
    candidate.validate()?;
    ensure_customer_exists(&*conn, candidate.customer_id).await?;

    let address = ActiveModel::from(candidate).reset_all().insert(&*conn).await?;
    tracing::info!(shipping_address_id = %address.id, "shipping address created");

    Ok(ApiResponse::ok("Shipping address created", address.into()))
}

pub async fn update_shipping_address(
    state: &AppState,
    id: Uuid,
    payload: UpdateShippingAddressRequest,
) -> AppResult<ApiResponse<ShippingAddress>> {
    let conn = state.conn();
    let mut candidate = ShippingAddresses::find_by_id(id)
        .one(&*conn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(customer_id) = payload.customer_id {
        candidate.customer_id = Some(customer_id);
    }
    if let Some(full_name) = payload.full_name {
        candidate.full_name = full_name;
    }
    if let Some(phone_number) = payload.phone_number {
        candidate.phone_number = Some(phone_number);
    }
    if let Some(address) = payload.address {
        candidate.address = address;
    }
    candidate.updated_at = timestamp();
    candidate.validate()?;
    if payload.customer_id.is_some() {
        ensure_customer_exists(&*conn, candidate.customer_id).await?;
    }

    let address = ActiveModel::from(candidate).reset_all().update(&*conn).await?;
    tracing::info!(shipping_address_id = %address.id, "shipping address updated");

    Ok(ApiResponse::ok("Updated", address.into()))
}

pub async fn delete_shipping_address(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = ShippingAddresses::delete_by_id(id)
        .exec(&*state.conn())
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(shipping_address_id = %id, "shipping address deleted");

    Ok(ApiResponse::ok("Deleted", serde_json::json!({ "id": id })))
}
