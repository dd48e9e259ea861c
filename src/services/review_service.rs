use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::reviews::{CreateReviewRequest, UpdateReviewRequest},
    entity::{
        products::Entity as Products,
        reviews::{ActiveModel, Column, Entity as Reviews, Model},
    },
    error::{AppError, AppResult},
    middleware::auth::Identity,
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::ReviewQuery,
    services::timestamp,
    state::AppState,
    validation::ValidationErrors,
};

pub async fn list_reviews(
    state: &AppState,
    query: ReviewQuery,
) -> AppResult<ApiResponse<Vec<Review>>> {
    let conn = state.conn();
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();

    let mut condition = Condition::all();
    if let Some(product_id) = query.product_id {
        condition = condition.add(Column::ProductId.eq(product_id));
    }
    if let Some(customer_id) = query.customer_id {
        condition = condition.add(Column::CustomerId.eq(customer_id));
    }
    let finder = Reviews::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&*conn).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset)
        .all(&*conn)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();

    Ok(ApiResponse::success(
        "Reviews",
        items,
        Some(Meta::paged(&pagination, total)),
    ))
}

pub async fn get_review(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Review>> {
    let review = Reviews::find_by_id(id)
        .one(&*state.conn())
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok("Review", review.into()))
}

/// The author is always the authenticated customer.
pub async fn create_review(
    state: &AppState,
    author: &Identity,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let conn = state.conn();
    let now = timestamp();
    let candidate = Model {
        id: Uuid::new_v4(),
        product_id: payload.product_id,
        customer_id: Some(author.id),
        rating: payload.rating,
        comment: payload.comment,
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

    let review = ActiveModel::from(candidate).reset_all().insert(&*conn).await?;
    tracing::info!(
        review_id = %review.id,
        product_id = %review.product_id,
        customer_id = %author.id,
        "review created"
    );

    Ok(ApiResponse::ok("Review created", review.into()))
}

pub async fn update_review(
    state: &AppState,
    id: Uuid,
    payload: UpdateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let conn = state.conn();
    let mut candidate = Reviews::find_by_id(id)
        .one(&*conn)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(rating) = payload.rating {
        candidate.rating = rating;
    }
    if let Some(comment) = payload.comment {
        candidate.comment = Some(comment);
    }
    candidate.updated_at = timestamp();
    candidate.validate()?;

    let review = ActiveModel::from(candidate).reset_all().update(&*conn).await?;
    tracing::info!(review_id = %review.id, "review updated");

    Ok(ApiResponse::ok("Updated", review.into()))
}

pub async fn delete_review(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Reviews::delete_by_id(id).exec(&*state.conn()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(review_id = %id, "review deleted");

    Ok(ApiResponse::ok("Deleted", serde_json::json!({ "id": id })))
}
