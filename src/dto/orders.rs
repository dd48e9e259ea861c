use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// One line of an order. Missing fields are reported by validation, not by the decoder.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub price: Option<i64>,
    pub discount: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub description: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub email_order: Option<String>,
    pub phone_number_order: Option<String>,
    pub payment_type: Option<String>,
    pub status: Option<String>,
    pub shipping_address_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    #[serde(default)]
    pub order_details: Vec<OrderDetailRequest>,
}

/// Fields present are applied over the stored order; `orderDetails`, when
/// present, replaces all lines.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub description: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub email_order: Option<String>,
    pub phone_number_order: Option<String>,
    pub payment_type: Option<String>,
    pub status: Option<String>,
    pub shipping_address_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub order_details: Option<Vec<OrderDetailRequest>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipOrderRequest {
    /// Defaults to now.
    pub shipped_date: Option<DateTime<Utc>>,
}

/// Customer checkout: prices come from the catalog, the customer from the session.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub description: Option<String>,
    /// Defaults to the customer's account email.
    pub email_order: Option<String>,
    pub phone_number_order: Option<String>,
    pub payment_type: Option<String>,
    pub shipping_address_id: Option<Uuid>,
    #[serde(default)]
    pub order_details: Vec<CheckoutLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub quantity: i32,
}
