pub mod auth;
pub mod categories;
pub mod customers;
pub mod employees;
pub mod orders;
pub mod product_images;
pub mod products;
pub mod reviews;
pub mod shipping_addresses;
pub mod sizes;
