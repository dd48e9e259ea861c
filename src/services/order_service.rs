use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CheckoutRequest, CreateOrderRequest, OrderDetailRequest, ShipOrderRequest,
        UpdateOrderRequest, UpdateOrderStatusRequest,
    },
    entity::{
        customers::Entity as Customers,
        employees::Entity as Employees,
        orders::{self, ActiveModel, Column, Entity as Orders, OrderDetail, OrderDetails},
        products::{self, Entity as Products},
        shipping_addresses::Entity as ShippingAddresses,
    },
    error::{AppError, AppResult},
    middleware::auth::Identity,
    models::{Order, OrderDetailView, OrderView},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::timestamp,
    state::AppState,
    validation::{
        ValidationErrors,
        order::{
            DEFAULT_PAYMENT_TYPE, DEFAULT_STATUS, OrderDetailDraft, OrderDraft, validate_order,
        },
    },
};

fn detail_from_request(line: OrderDetailRequest) -> OrderDetailDraft {
    OrderDetailDraft {
        id: Uuid::new_v4(),
        product_id: line.product_id,
        quantity: line.quantity,
        price: line.price.unwrap_or(0),
        discount: line.discount.unwrap_or(0.0),
    }
}

/// Apply defaults to a create request.
pub fn draft_from_request(payload: CreateOrderRequest, now: DateTime<Utc>) -> OrderDraft {
    OrderDraft {
        description: payload.description,
        created_date: payload.created_date.unwrap_or(now),
        shipped_date: payload.shipped_date,
        email_order: payload.email_order,
        phone_number_order: payload.phone_number_order,
        payment_type: payload
            .payment_type
            .unwrap_or_else(|| DEFAULT_PAYMENT_TYPE.to_string()),
        status: payload.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        shipping_address_id: payload.shipping_address_id,
        customer_id: payload.customer_id,
        employee_id: payload.employee_id,
        order_details: payload
            .order_details
            .into_iter()
            .map(detail_from_request)
            .collect(),
    }
}

/// The stored record as a candidate, so a patch can be merged over it.
pub fn draft_from_model(model: &orders::Model) -> OrderDraft {
    OrderDraft {
        description: model.description.clone(),
        created_date: model.created_date.with_timezone(&Utc),
        shipped_date: model.shipped_date.map(|dt| dt.with_timezone(&Utc)),
        email_order: Some(model.email_order.clone()),
        phone_number_order: model.phone_number_order.clone(),
        payment_type: model.payment_type.clone(),
        status: model.status.clone(),
        shipping_address_id: model.shipping_address_id,
        customer_id: model.customer_id,
        employee_id: model.employee_id,
        order_details: model
            .order_details
            .0
            .iter()
            .map(|line| OrderDetailDraft {
                id: line.id,
                product_id: Some(line.product_id),
                quantity: Some(line.quantity),
                price: line.price,
                discount: line.discount,
            })
            .collect(),
    }
}

pub fn apply_patch(draft: &mut OrderDraft, patch: UpdateOrderRequest) {
    if let Some(description) = patch.description {
        draft.description = Some(description);
    }
    if let Some(created_date) = patch.created_date {
        draft.created_date = created_date;
    }
    if let Some(shipped_date) = patch.shipped_date {
        draft.shipped_date = Some(shipped_date);
    }
    if let Some(email_order) = patch.email_order {
        draft.email_order = Some(email_order);
    }
    if let Some(phone_number_order) = patch.phone_number_order {
        draft.phone_number_order = Some(phone_number_order);
    }
    if let Some(payment_type) = patch.payment_type {
        draft.payment_type = payment_type;
    }
    if let Some(status) = patch.status {
        draft.status = status;
    }
    if let Some(shipping_address_id) = patch.shipping_address_id {
        draft.shipping_address_id = Some(shipping_address_id);
    }
    if let Some(customer_id) = patch.customer_id {
        draft.customer_id = Some(customer_id);
    }
    if let Some(employee_id) = patch.employee_id {
        draft.employee_id = Some(employee_id);
    }
    if let Some(lines) = patch.order_details {
        draft.order_details = lines.into_iter().map(detail_from_request).collect();
    }
}

/// Turn a validated draft into a row.
fn into_model(
    draft: OrderDraft,
    id: Uuid,
    created_at: sea_orm::prelude::DateTimeWithTimeZone,
) -> AppResult<orders::Model> {
    let incomplete = || AppError::Internal(anyhow::anyhow!("order line was not validated"));
    let lines = draft
        .order_details
        .into_iter()
        .map(|line| -> AppResult<OrderDetail> {
            Ok(OrderDetail {
                id: line.id,
                product_id: line.product_id.ok_or_else(incomplete)?,
                quantity: line.quantity.ok_or_else(incomplete)?,
                price: line.price,
                discount: line.discount,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(orders::Model {
        id,
        description: draft.description,
        created_date: draft.created_date.into(),
        shipped_date: draft.shipped_date.map(Into::into),
        email_order: draft.email_order.unwrap_or_default(),
        phone_number_order: draft.phone_number_order,
        payment_type: draft.payment_type,
        status: draft.status,
        shipping_address_id: draft.shipping_address_id,
        customer_id: draft.customer_id,
        employee_id: draft.employee_id,
        order_details: OrderDetails(lines),
        created_at,
        updated_at: timestamp(),
    })
}

async fn insert_draft<C: ConnectionTrait>(conn: &C, draft: OrderDraft) -> AppResult<orders::Model> {
    validate_order(&draft)?;
    let model = into_model(draft, Uuid::new_v4(), timestamp())?;
    Ok(ActiveModel::from(model).reset_all().insert(conn).await?)
}

async fn replace_with_draft<C: ConnectionTrait>(
    conn: &C,
    stored: orders::Model,
    draft: OrderDraft,
) -> AppResult<orders::Model> {
    validate_order(&draft)?;
    let model = into_model(draft, stored.id, stored.created_at)?;
    Ok(ActiveModel::from(model).reset_all().update(conn).await?)
}

async fn find_order<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<orders::Model> {
    Orders::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Look up the order's references. Missing targets resolve to `None`;
/// detail products are fetched in a single query.
pub async fn resolve_order<C: ConnectionTrait>(
    conn: &C,
    model: orders::Model,
) -> AppResult<OrderView> {
    let customer = match model.customer_id {
        Some(id) => Customers::find_by_id(id).one(conn).await?,
        None => None,
    };
    let shipping_address = match model.shipping_address_id {
        Some(id) => ShippingAddresses::find_by_id(id).one(conn).await?,
        None => None,
    };
    let employee = match model.employee_id {
        Some(id) => Employees::find_by_id(id).one(conn).await?,
        None => None,
    };

    let products_by_id: HashMap<Uuid, products::Model> = if model.order_details.0.is_empty() {
        HashMap::new()
    } else {
        let mut ids: Vec<Uuid> = model.order_details.0.iter().map(|l| l.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        Products::find()
            .filter(products::Column::Id.is_in(ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    let order = Order::from(model);
    let order_details = order
        .order_details
        .into_iter()
        .map(|line| OrderDetailView {
            product: products_by_id.get(&line.product_id).cloned().map(Into::into),
            id: line.id,
            product_id: line.product_id,
            quantity: line.quantity,
            price: line.price,
            discount: line.discount,
        })
        .collect();

    Ok(OrderView {
        id: order.id,
        description: order.description,
        created_date: order.created_date,
        shipped_date: order.shipped_date,
        email_order: order.email_order,
        phone_number_order: order.phone_number_order,
        payment_type: order.payment_type,
        status: order.status,
        shipping_address_id: order.shipping_address_id,
        customer_id: order.customer_id,
        employee_id: order.employee_id,
        order_details,
        created_at: order.created_at,
        updated_at: order.updated_at,
        customer: customer.map(Into::into),
        shipping_address: shipping_address.map(Into::into),
        employee: employee.map(Into::into),
    })
}

async fn list_with(
    state: &AppState,
    condition: Condition,
    query: &OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let conn = state.conn();
    let pagination = query.pagination();
    let (_, limit, offset) = pagination.normalize();

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(Column::CreatedDate),
        SortOrder::Desc => finder.order_by_desc(Column::CreatedDate),
    };

    let total = finder.clone().count(&*conn).await?;
    let items = finder
        .limit(limit as u64)
        .offset(offset)
        .all(&*conn)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        items,
        Some(Meta::paged(&pagination, total)),
    ))
}

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Status.eq(status.clone()));
    }
    if let Some(customer_id) = query.customer_id {
        condition = condition.add(Column::CustomerId.eq(customer_id));
    }
    list_with(state, condition, &query).await
}

/// Orders placed by the calling customer; a `customer_id` filter is ignored.
pub async fn list_my_orders(
    state: &AppState,
    customer: &Identity,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let mut condition = Condition::all().add(Column::CustomerId.eq(customer.id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Status.eq(status.clone()));
    }
    list_with(state, condition, &query).await
}

pub async fn get_order(state: &AppState, id: Uuid) -> AppResult<ApiResponse<OrderView>> {
    let conn = state.conn();
    let order = find_order(&*conn, id).await?;
    let view = resolve_order(&*conn, order).await?;
    Ok(ApiResponse::success("OK", view, Some(Meta::empty())))
}

pub async fn create_order(
    state: &AppState,
    employee: &Identity,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let mut draft = draft_from_request(payload, Utc::now());
    if draft.employee_id.is_none() {
        draft.employee_id = Some(employee.id);
    }

    let order = insert_draft(&*state.conn(), draft).await?;
    tracing::info!(
        order_id = %order.id,
        lines = order.order_details.0.len(),
        employee_id = %employee.id,
        "order created"
    );

    Ok(ApiResponse::ok("Order created", order.into()))
}

pub async fn update_order(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let conn = state.conn();
    let stored = find_order(&*conn, id).await?;
    let mut draft = draft_from_model(&stored);
    apply_patch(&mut draft, payload);

    let order = replace_with_draft(&*conn, stored, draft).await?;
    tracing::info!(order_id = %order.id, "order updated");

    Ok(ApiResponse::ok("Updated", order.into()))
}

pub async fn update_order_status(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let conn = state.conn();
    let stored = find_order(&*conn, id).await?;
    let mut draft = draft_from_model(&stored);
    draft.status = payload.status;

    let order = replace_with_draft(&*conn, stored, draft).await?;
    tracing::info!(order_id = %order.id, status = %order.status, "order status changed");

    Ok(ApiResponse::ok("Status updated", order.into()))
}

pub async fn ship_order(
    state: &AppState,
    id: Uuid,
    payload: ShipOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let conn = state.conn();
    let stored = find_order(&*conn, id).await?;
    let mut draft = draft_from_model(&stored);
    draft.shipped_date = Some(payload.shipped_date.unwrap_or_else(Utc::now));

    let order = replace_with_draft(&*conn, stored, draft).await?;
    tracing::info!(order_id = %order.id, "order shipped");

    Ok(ApiResponse::ok("Shipped", order.into()))
}

pub async fn delete_order(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Orders::delete_by_id(id).exec(&*state.conn()).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(order_id = %id, "order deleted");

    Ok(ApiResponse::ok("Deleted", serde_json::json!({ "id": id })))
}

/// Build the order a customer checks out. Line prices and discounts come from
/// `catalog`; lines naming a product it lacks are rejected by index.
pub fn checkout_draft(
    customer: &Identity,
    payload: CheckoutRequest,
    catalog: &HashMap<Uuid, products::Model>,
    now: DateTime<Utc>,
) -> Result<OrderDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut lines = Vec::with_capacity(payload.order_details.len());
    for (index, line) in payload.order_details.into_iter().enumerate() {
        let mut detail = OrderDetailDraft::new(line.product_id, line.quantity);
        match catalog.get(&line.product_id) {
            Some(product) => {
                detail.price = product.price;
                detail.discount = product.discount;
            }
            None => errors.reject(
                format!("orderDetails.{index}.productId"),
                line.product_id,
                "Product {VALUE} does not exist",
            ),
        }
        lines.push(detail);
    }

    let mut draft = OrderDraft::new(
        payload.email_order.unwrap_or_else(|| customer.email.clone()),
        now,
    );
    draft.description = payload.description;
    draft.phone_number_order = payload.phone_number_order;
    if let Some(payment_type) = payload.payment_type {
        draft.payment_type = payment_type;
    }
    draft.shipping_address_id = payload.shipping_address_id;
    draft.customer_id = Some(customer.id);
    draft.order_details = lines;

    if let Err(found) = validate_order(&draft) {
        errors.merge(found);
    }
    errors.into_result()?;
    Ok(draft)
}

/// Place an order for the calling customer at current catalog prices.
pub async fn checkout(
    state: &AppState,
    customer: &Identity,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<Order>> {
    if payload.order_details.is_empty() {
        return Err(AppError::BadRequest("Order has no lines".into()));
    }

    let conn = state.conn();
    let ids: Vec<Uuid> = payload.order_details.iter().map(|l| l.product_id).collect();
    let catalog: HashMap<Uuid, products::Model> = Products::find()
        .filter(products::Column::Id.is_in(ids))
        .all(&*conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let draft = checkout_draft(customer, payload, &catalog, Utc::now())?;
    let order = insert_draft(&*conn, draft).await?;
    tracing::info!(order_id = %order.id, customer_id = %customer.id, "checkout completed");

    Ok(ApiResponse::ok("Checkout success", order.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::orders::CheckoutLine;
    use crate::entity::customers;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn stored_order(customer_id: Option<Uuid>, product_id: Uuid) -> orders::Model {
        let now = timestamp();
        orders::Model {
            id: Uuid::new_v4(),
            description: None,
            created_date: now,
            shipped_date: None,
            email_order: "buyer@shop.com".into(),
            phone_number_order: None,
            payment_type: "CASH".into(),
            status: "WAITING".into(),
            shipping_address_id: None,
            customer_id,
            employee_id: None,
            order_details: OrderDetails(vec![OrderDetail {
                id: Uuid::new_v4(),
                product_id,
                quantity: 2,
                price: 1500,
                discount: 10.0,
            }]),
            created_at: now,
            updated_at: now,
        }
    }

    fn product(id: Uuid) -> products::Model {
        let now = timestamp();
        products::Model {
            id,
            name: "Linen shirt".into(),
            description: None,
            price: 1500,
            discount: 10.0,
            stock: 4,
            category_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_request_gets_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let draft = draft_from_request(
            CreateOrderRequest {
                email_order: Some("a@b.com".into()),
                order_details: vec![OrderDetailRequest {
                    product_id: Some(Uuid::new_v4()),
                    quantity: Some(1),
                    ..Default::default()
                }],
                ..Default::default()
            },
            now,
        );

        assert_eq!(draft.created_date, now);
        assert_eq!(draft.payment_type, "CASH");
        assert_eq!(draft.status, "WAITING");
        assert_eq!(draft.order_details[0].price, 0);
        assert_eq!(draft.order_details[0].discount, 0.0);
        assert!(validate_order(&draft).is_ok());
    }

    #[test]
    fn missing_email_is_reported() {
        let draft = draft_from_request(CreateOrderRequest::default(), Utc::now());
        let errors = validate_order(&draft).unwrap_err();
        assert_eq!(
            errors.get("emailOrder").map(|e| e.message.as_str()),
            Some("email is required")
        );
    }

    #[test]
    fn patch_merges_and_revalidates_the_whole_order() {
        let stored = stored_order(None, Uuid::new_v4());
        let mut draft = draft_from_model(&stored);
        let created = draft.created_date;

        apply_patch(
            &mut draft,
            UpdateOrderRequest {
                status: Some("COMPLETED".into()),
                shipped_date: Some(created - chrono::Duration::days(5)),
                ..Default::default()
            },
        );

        assert_eq!(draft.status, "COMPLETED");
        assert_eq!(draft.order_details.len(), 1);
        let errors = validate_order(&draft).unwrap_err();
        assert!(errors.contains("shippedDate"));
        assert!(!errors.contains("status"));
    }

    #[test]
    fn patch_replaces_lines_when_given() {
        let stored = stored_order(None, Uuid::new_v4());
        let mut draft = draft_from_model(&stored);
        apply_patch(
            &mut draft,
            UpdateOrderRequest {
                order_details: Some(vec![
                    OrderDetailRequest {
                        product_id: Some(Uuid::new_v4()),
                        quantity: Some(1),
                        ..Default::default()
                    },
                    OrderDetailRequest {
                        product_id: Some(Uuid::new_v4()),
                        quantity: Some(3),
                        discount: Some(80.0),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            },
        );

        assert_eq!(draft.order_details.len(), 2);
        let errors = validate_order(&draft).unwrap_err();
        assert!(errors.contains("orderDetails.1.discount"));
        assert!(!errors.contains("orderDetails.0.discount"));
    }

    #[test]
    fn model_round_trip_keeps_line_ids() {
        let stored = stored_order(Some(Uuid::new_v4()), Uuid::new_v4());
        let draft = draft_from_model(&stored);
        let rebuilt = into_model(draft, stored.id, stored.created_at).unwrap();

        assert_eq!(rebuilt.id, stored.id);
        assert_eq!(rebuilt.order_details, stored.order_details);
        assert_eq!(rebuilt.customer_id, stored.customer_id);
    }

    #[tokio::test]
    async fn resolution_yields_null_for_missing_customer() {
        let product_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customers::Model>::new()])
            .append_query_results([vec![product(product_id)]])
            .into_connection();

        let view = resolve_order(&db, stored_order(Some(Uuid::new_v4()), product_id))
            .await
            .unwrap();

        assert!(view.customer.is_none());
        assert!(view.shipping_address.is_none());
        assert!(view.employee.is_none());
        assert_eq!(view.order_details.len(), 1);
        assert_eq!(
            view.order_details[0].product.as_ref().map(|p| p.id),
            Some(product_id)
        );
    }

    #[tokio::test]
    async fn resolution_skips_lookups_without_references() {
        let mut order = stored_order(None, Uuid::new_v4());
        order.order_details = OrderDetails::default();
        // no query results queued: any lookup would fail
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let view = resolve_order(&db, order).await.unwrap();
        assert!(view.customer.is_none());
        assert!(view.order_details.is_empty());
    }

    #[tokio::test]
    async fn resolution_leaves_deleted_products_null() {
        let order = stored_order(None, Uuid::new_v4());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<products::Model>::new()])
            .into_connection();

        let view = resolve_order(&db, order).await.unwrap();
        assert!(view.order_details[0].product.is_none());
    }

    fn buyer() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "buyer@shop.com".into(),
            role: crate::middleware::auth::Role::Customer,
        }
    }

    fn checkout_request(lines: Vec<(Uuid, i32)>) -> CheckoutRequest {
        CheckoutRequest {
            order_details: lines
                .into_iter()
                .map(|(product_id, quantity)| CheckoutLine {
                    product_id,
                    quantity,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn checkout_takes_prices_from_the_catalog() {
        let shirt = Uuid::new_v4();
        let mut catalog = HashMap::new();
        let mut listed = product(shirt);
        listed.price = 123_457;
        listed.discount = 12.5;
        catalog.insert(shirt, listed);

        let customer = buyer();
        let draft = checkout_draft(&customer, checkout_request(vec![(shirt, 3)]), &catalog, Utc::now())
            .expect("valid checkout");

        assert_eq!(draft.customer_id, Some(customer.id));
        assert_eq!(draft.email_order.as_deref(), Some("buyer@shop.com"));
        assert_eq!(draft.status, "WAITING");
        assert_eq!(draft.order_details.len(), 1);
        assert_eq!(draft.order_details[0].quantity, Some(3));
        assert_eq!(draft.order_details[0].price, 123_457);
        assert_eq!(draft.order_details[0].discount, 12.5);
    }

    #[test]
    fn checkout_reports_unknown_products_and_bad_lines_together() {
        let shirt = Uuid::new_v4();
        let ghost = Uuid::new_v4();
        let catalog = HashMap::from([(shirt, product(shirt))]);

        let errors = checkout_draft(
            &buyer(),
            checkout_request(vec![(ghost, 1), (shirt, -2)]),
            &catalog,
            Utc::now(),
        )
        .unwrap_err();

        let unknown = errors.get("orderDetails.0.productId").expect("unknown product");
        assert_eq!(unknown.message, format!("Product {ghost} does not exist"));
        assert!(errors.contains("orderDetails.1.quantity"));
        assert!(!errors.contains("orderDetails.0.quantity"));
    }

    #[test]
    fn checkout_keeps_an_explicit_order_email() {
        let shirt = Uuid::new_v4();
        let catalog = HashMap::from([(shirt, product(shirt))]);
        let mut request = checkout_request(vec![(shirt, 1)]);
        request.email_order = Some("gift@shop.com".into());
        request.payment_type = Some("credit card".into());

        let draft = checkout_draft(&buyer(), request, &catalog, Utc::now()).expect("valid");
        assert_eq!(draft.email_order.as_deref(), Some("gift@shop.com"));
        assert_eq!(draft.payment_type, "credit card");
    }
}
