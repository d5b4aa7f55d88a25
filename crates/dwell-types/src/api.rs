use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Inquiry, Property};

// -- JWT Claims --

/// Bearer token claims. Canonical definition lives here so the API
/// middleware and any future consumer decode the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub exp: usize,
}

// -- Action results --

/// Successful form submission. `redirect` is set when the workflow moves on
/// to another view; absent when the caller should stay and render inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user_id: Uuid,
    pub name: String,
    pub token: String,
}

// -- Listings --

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryView {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub asker_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetailResponse {
    pub property: Property,
    pub owner_name: String,
    /// Seller contact details; `None` when the account no longer exists.
    pub owner_email: Option<String>,
    pub owner_phone_number: Option<String>,
    pub is_owner: bool,
    pub inquiries: Vec<InquiryView>,
}

// -- Uploads --

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub size: u64,
}
