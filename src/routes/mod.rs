use axum::Router;

use crate::state::AppState;

pub mod categories;
pub mod customers;
pub mod doc;
pub mod employees;
pub mod health;
pub mod orders;
pub mod params;
pub mod product_images;
pub mod products;
pub mod reviews;
pub mod shipping_addresses;
pub mod sizes;

// Auth layers capture the state when the router is built; the state itself
// is provided at the top level.
pub fn create_api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router(state))
        .nest("/sizes", sizes::router(state))
        .nest("/products", products::router(state))
        .nest("/productImages", product_images::router(state))
        .nest("/reviews", reviews::router(state))
        .nest("/customers", customers::router(state))
        .nest("/employees", employees::router(state))
        .nest("/shippingAddresses", shipping_addresses::router(state))
        .nest("/orders", orders::router(state))
}
