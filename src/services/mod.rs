use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;

pub mod auth_service;
pub mod category_service;
pub mod customer_service;
pub mod employee_service;
pub mod order_service;
pub mod product_image_service;
pub mod product_service;
pub mod review_service;
pub mod shipping_address_service;
pub mod size_service;

pub(crate) fn timestamp() -> DateTimeWithTimeZone {
    Utc::now().into()
}
