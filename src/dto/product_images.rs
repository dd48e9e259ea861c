use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductImageRequest {
    pub product_id: Uuid,
    pub url: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductImageRequest {
    pub url: Option<String>,
    pub sort_order: Option<i32>,
}
