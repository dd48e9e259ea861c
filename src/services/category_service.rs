use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::categories::{CreateCategoryRequest, UpdateCategoryRequest},
    entity::categories::{ActiveModel, Column, Entity as Categories, Model},
    error::{AppError, AppResult},
    models::Category,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::timestamp,
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<Vec<Category>>> {
    let conn = state.conn();
    let (_, limit, offset) = pagination.normalize();
    let finder = Categories::find().order_by_asc(Column::Name);

    let total = finder.clone().count(&*conn).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset)
        .all(&*conn)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        items,
        Some(Meta::paged(&pagination, total)),
    ))
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Category>> {
    let category = Categories::find_by_id(id)
        .one(&*state.conn())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok("Category", category.into()))
}

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let now = timestamp();
    let candidate = Model {
        id: Uuid::new_v4(),
        name: payload.name,
        description: payload.description,
        created_at: now,
        updated_at: now,
    };
    candidate.validate()?;

    let category = ActiveModel::from(candidate)
        .reset_all()
        .insert(&*state.conn())
        .await?;
    tracing::info!(category_id = %category.id, "category created");

    Ok(ApiResponse::ok("Category created", category.into()))
}

pub async fn update_category(
    state: &AppState,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let conn = state.conn();
    let mut candidate = Categories::find_by_id(id)
        .one(&*conn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(name) = payload.name {
        candidate.name = name;
    }
    if let Some(description) = payload.description {
        candidate.description = Some(description);
    }
    candidate.updated_at = timestamp();
    candidate.validate()?;

    let category = ActiveModel::from(candidate).reset_all().update(&*conn).await?;
    tracing::info!(category_id = %category.id, "category updated");

    Ok(ApiResponse::ok("Updated", category.into()))
}

pub async fn delete_category(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Categories::delete_by_id(id).exec(&*state.conn()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(category_id = %id, "category deleted");

    Ok(ApiResponse::ok("Deleted", serde_json::json!({ "id": id })))
}
