use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub description: Option<String>,
    pub created_date: DateTimeWithTimeZone,
    pub shipped_date: Option<DateTimeWithTimeZone>,
    pub email_order: String,
    pub phone_number_order: Option<String>,
    pub payment_type: String,
    pub status: String,
    pub shipping_address_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub order_details: OrderDetails,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

/// Line items stored inside the order row, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct OrderDetails(pub Vec<OrderDetail>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub discount: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
