use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[validate(length(max = 20, message = "Ensure this value has at most 20 characters."))]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}
