use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShippingAddressRequest {
    pub customer_id: Option<Uuid>,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub address: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShippingAddressRequest {
    pub customer_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}
