//! Rules for the order aggregate: the order record and its embedded lines.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{EMAIL_RE, PHONE_RE, ValidationErrors, rule_error};

pub const PAYMENT_TYPES: [&str; 2] = ["CASH", "CREDIT CARD"];
pub const ORDER_STATUSES: [&str; 3] = ["WAITING", "COMPLETED", "CANCELED"];
pub const DEFAULT_PAYMENT_TYPE: &str = "CASH";
pub const DEFAULT_STATUS: &str = "WAITING";
pub const MAX_DISCOUNT: f64 = 75.0;

/// Case-insensitive against [`PAYMENT_TYPES`].
pub fn is_valid_payment_type(value: &str) -> bool {
    let upper = value.to_uppercase();
    PAYMENT_TYPES.contains(&upper.as_str())
}

/// Exact match against [`ORDER_STATUSES`].
pub fn is_valid_status(value: &str) -> bool {
    ORDER_STATUSES.contains(&value)
}

fn payment_type(value: &str) -> Result<(), ValidationError> {
    if is_valid_payment_type(value) {
        return Ok(());
    }
    Err(rule_error("payment_type", "Payment type: {VALUE} is invalid!", value))
}

fn order_status(value: &str) -> Result<(), ValidationError> {
    if is_valid_status(value) {
        return Ok(());
    }
    Err(rule_error("status", "Status: {VALUE} is invalid!", value))
}

fn shipped_after_created(order: &OrderDraft) -> Result<(), ValidationError> {
    match order.shipped_date {
        Some(shipped) if shipped < order.created_date => {
            let mut err = rule_error(
                "shipped_date",
                "Shipped date: {VALUE} is invalid!",
                shipped.to_rfc3339(),
            );
            err.add_param("field".into(), &"shippedDate");
            Err(err)
        }
        _ => Ok(()),
    }
}

/// A line item with defaults applied, as it would be stored.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct OrderDetailDraft {
    pub id: Uuid,
    #[validate(required)]
    pub product_id: Option<Uuid>,
    #[validate(required, range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0.0, max = MAX_DISCOUNT))]
    pub discount: f64,
}

impl OrderDetailDraft {
    pub fn new(product_id: Uuid, quantity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: Some(product_id),
            quantity: Some(quantity),
            price: 0,
            discount: 0.0,
        }
    }
}

/// The complete candidate order, defaults applied, before it is written.
#[derive(Debug, Clone, PartialEq, Validate)]
#[validate(schema(function = "shipped_after_created", skip_on_field_errors = false))]
pub struct OrderDraft {
    pub description: Option<String>,
    pub created_date: DateTime<Utc>,
    pub shipped_date: Option<DateTime<Utc>>,
    #[validate(
        required(message = "email is required"),
        regex(path = *EMAIL_RE, message = "{VALUE} is not a valid email!")
    )]
    pub email_order: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "{VALUE} is not a valid phone!"))]
    pub phone_number_order: Option<String>,
    #[validate(custom(function = "payment_type"))]
    pub payment_type: String,
    #[validate(custom(function = "order_status"))]
    pub status: String,
    pub shipping_address_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    #[validate(nested)]
    pub order_details: Vec<OrderDetailDraft>,
}

impl OrderDraft {
    pub fn new(email_order: impl Into<String>, created_date: DateTime<Utc>) -> Self {
        Self {
            description: None,
            created_date,
            shipped_date: None,
            email_order: Some(email_order.into()),
            phone_number_order: None,
            payment_type: DEFAULT_PAYMENT_TYPE.to_string(),
            status: DEFAULT_STATUS.to_string(),
            shipping_address_id: None,
            customer_id: None,
            employee_id: None,
            order_details: Vec::new(),
        }
    }
}

/// Validate one line; `path` prefixes the field names (e.g. `orderDetails.2`).
pub fn validate_order_detail(path: &str, detail: &OrderDetailDraft, errors: &mut ValidationErrors) {
    if let Err(found) = detail.validate() {
        for mut error in ValidationErrors::from(found).errors {
            let field = format!("{path}.{}", error.field);
            error.message = error.message.replace(
                &format!("`{}`", error.field),
                &format!("`{field}`"),
            );
            error.field = field;
            errors.errors.push(error);
        }
    }
}

/// Collect every violation of the order aggregate.
pub fn validate_order(order: &OrderDraft) -> Result<(), ValidationErrors> {
    order.validate().map_err(ValidationErrors::from)
}
