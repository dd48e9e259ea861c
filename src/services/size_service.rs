use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::sizes::{CreateSizeRequest, UpdateSizeRequest},
    entity::sizes::{ActiveModel, Column, Entity as Sizes, Model},
    error::{AppError, AppResult},
    models::Size,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::timestamp,
    state::AppState,
};

pub async fn list_sizes(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Size>>> {
    let conn = state.conn();
    let (_, limit, offset) = pagination.normalize();
    let finder = Sizes::find().order_by_asc(Column::Name);

    let total = finder.clone().count(&*conn).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset)
        .all(&*conn)
        .await?
        .into_iter()
        .map(Size::from)
        .collect();

    Ok(ApiResponse::success("Sizes", items, Some(Meta::paged(&pagination, total))))
}

pub async fn get_size(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Size>> {
    let size = Sizes::find_by_id(id)
        .one(&*state.conn())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok("Size", size.into()))
}

async fn ensure_name_free<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Sizes::find().filter(Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!("Size {name} already exists")));
    }
    Ok(())
}

pub async fn create_size(
    state: &AppState,
    payload: CreateSizeRequest,
) -> AppResult<ApiResponse<Size>> {
    let conn = state.conn();
    let now = timestamp();
    let candidate = Model {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        description: payload.description,
        created_at: now,
        updated_at: now,
    };
    candidate.validate()?;
    ensure_name_free(&*conn, &candidate.name, None).await?;

    let size = ActiveModel::from(candidate).reset_all().insert(&*conn).await?;
    tracing::info!(size_id = %size.id, name = %size.name, "size created");

    Ok(ApiResponse::ok("Size created", size.into()))
}

pub async fn update_size(
    state: &AppState,
    id: Uuid,
    payload: UpdateSizeRequest,
) -> AppResult<ApiResponse<Size>> {
    let conn = state.conn();
    let mut candidate = Sizes::find_by_id(id)
        .one(&*conn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(name) = payload.name {
        candidate.name = name.trim().to_string();
    }
    if let Some(description) = payload.description {
        candidate.description = Some(description);
    }
    candidate.updated_at = timestamp();
    candidate.validate()?;
    ensure_name_free(&*conn, &candidate.name, Some(id)).await?;

    let size = ActiveModel::from(candidate).reset_all().update(&*conn).await?;
    tracing::info!(size_id = %size.id, "size updated");

    Ok(ApiResponse::ok("Updated", size.into()))
}

pub async fn delete_size(state: &AppState, id: Uuid) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Sizes::delete_by_id(id).exec(&*state.conn()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(size_id = %id, "size deleted");

    Ok(ApiResponse::ok("Deleted", serde_json::json!({ "id": id })))
}
