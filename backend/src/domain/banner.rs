//! Home page banners.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::catalog::ProductView;
use super::validation::{http_url, length_between};
use super::{BannerId, Error, ProductId};

/// Promotional banner pointing at a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: BannerId,
    pub product_id: ProductId,
    pub title: String,
    pub subtitle: String,
    pub image: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated banner form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerDraft {
    pub product_id: ProductId,
    pub title: String,
    pub subtitle: String,
    pub image: String,
}

impl BannerDraft {
    /// Trim and length-check the copy and validate the image URL.
    pub fn parse(product_id: ProductId, title: &str, subtitle: &str, image: &str) -> Result<Self, Error> {
        Ok(Self {
            product_id,
            title: length_between("title", title, 5, 50)?,
            subtitle: length_between("subtitle", subtitle, 5, 100)?,
            image: http_url("image", image)?,
        })
    }
}

/// Active banner with the product it advertises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BannerView {
    #[serde(flatten)]
    pub banner: Banner,
    pub product: ProductView,
}
