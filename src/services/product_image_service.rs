use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::product_images::{CreateProductImageRequest, UpdateProductImageRequest},
    entity::{
        product_images::{ActiveModel, Column, Entity as ProductImages, Model},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    models::ProductImage,
    response::{ApiResponse, Meta},
    routes::params::ProductImageQuery,
    services::timestamp,
    state::AppState,
    validation::ValidationErrors,
};

pub async fn list_product_images(
    state: &AppState,
    query: ProductImageQuery,
) -> AppResult<ApiResponse<Vec<ProductImage>>> {
    let conn = state.conn();
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();

    let mut finder = ProductImages::find();
    if let Some(product_id) = query.product_id {
        finder = finder.filter(Column::ProductId.eq(product_id));
    }
    let finder = finder
        .order_by_asc(Column::ProductId)
        .order_by_asc(Column::SortOrder);

    let total = finder.clone().count(&*conn).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset)
        .all(&*conn)
        .await?
        .into_iter()
        .map(ProductImage::from)
        .collect();

    Ok(ApiResponse::success(
        "Product images",
        items,
        Some(Meta::paged(&pagination, total)),
    ))
}

pub async fn get_product_image(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<ProductImage>> {
    let image = ProductImages::find_by_id(id)
        .one(&*state.conn())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok("Product image", image.into()))
}

pub async fn create_product_image(
    state: &AppState,
    payload: CreateProductImageRequest,
) -> AppResult<ApiResponse<ProductImage>> {
    let conn = state.conn();
    let now = timestamp();
    let candidate = Model {
        id: Uuid::new_v4(),
        product_id: payload.product_id,
        url: payload.url,
        sort_order: payload.sort_order,
        created_at: now,
        updated_at: now,
    };
    candidate.validate()?;

    if Products::find_by_id(candidate.product_id).one(&*conn).await?.is_none() {
        let mut errors = ValidationErrors::new();
        errors.reject(
            "productId",
            candidate.product_id,
            "Product {VALUE} does not exist",
        );
        return Err(errors.into());
    }

    let image = ActiveModel::from(candidate).reset_all().insert(&*conn).await?;
    tracing::info!(image_id = %image.id, product_id = %image.product_id, "product image created");

    Ok(ApiResponse::ok("Product image created", image.into()))
}

pub async fn update_product_image(
    state: &AppState,
    id: Uuid,
    payload: UpdateProductImageRequest,
) -> AppResult<ApiResponse<ProductImage>> {
    let conn = state.conn();
    let mut candidate = ProductImages::find_by_id(id)
        .one(&*conn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(url) = payload.url {
        candidate.url = url;
    }
    if let Some(sort_order) = payload.sort_order {
        candidate.sort_order = sort_order;
    }
    candidate.updated_at = timestamp();
    candidate.validate()?;

    let image = ActiveModel::from(candidate).reset_all().update(&*conn).await?;
    tracing::info!(image_id = %image.id, "product image updated");

    Ok(ApiResponse::ok("Updated", image.into()))
}

pub async fn delete_product_image(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = ProductImages::delete_by_id(id).exec(&*state.conn()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(image_id = %id, "product image deleted");

    Ok(ApiResponse::ok("Deleted", serde_json::json!({ "id": id })))
}
