//! OpenAPI schemas for wire shapes that have no domain type of their own.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One page of a listing, as produced by `pagination::Page`.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageSchema<T> {
    /// Entries on this page.
    items: Vec<T>,
    /// One-based page number.
    #[schema(example = 1)]
    page: u32,
    /// Requested page size.
    #[schema(example = 10)]
    limit: u32,
    /// Entries across all pages.
    total_items: u64,
    /// Number of pages at this limit.
    total_pages: u64,
}

/// Plain acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "address deleted")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Freshly issued access token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

/// `PATCH …/active` body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ActiveBody {
    pub is_active: Option<bool>,
}
