//! Request parsing helpers shared by handlers.

use chrono::NaiveDate;
use pagination::{PageRequest, PaginationError};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::listing::ListQuery;
use crate::domain::validation::field_error;
use crate::domain::{BrandId, Error};

/// `page` and `limit` query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// One-based page number (default 1).
    pub page: Option<u32>,
    /// Page size, 1 to 100 (default 10).
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn to_request(&self) -> Result<PageRequest, Error> {
        page_request(self.page, self.limit)
    }
}

/// Paging plus an optional free-text search.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Case-insensitive substring filter.
    pub search: Option<String>,
}

impl SearchParams {
    pub fn to_query(&self) -> Result<ListQuery, Error> {
        Ok(ListQuery::new(
            self.search.clone(),
            page_request(self.page, self.limit)?,
        ))
    }
}

pub(crate) fn page_request(page: Option<u32>, limit: Option<u32>) -> Result<PageRequest, Error> {
    PageRequest::from_query(page, limit).map_err(|err| {
        let field = match err {
            PaginationError::InvalidPage => "page",
            PaginationError::InvalidLimit { .. } => "limit",
        };
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": field, "code": "out_of_range" }))
    })
}

/// Parse a `YYYY-MM-DD` body or query field.
pub(crate) fn date(field: &str, raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| field_error(field, "invalid_date", format!("{field} must be formatted YYYY-MM-DD")))
}

/// Split a comma-separated id list, ignoring entries that are not UUIDs.
pub(crate) fn brand_ids(raw: Option<&str>) -> Vec<BrandId> {
    raw.map(|list| {
        list.split(',')
            .filter_map(|candidate| candidate.parse().ok())
            .collect()
    })
    .unwrap_or_default()
}

/// A body field that the schema allows to be absent but the operation needs.
pub(crate) fn present<T>(field: &str, value: Option<T>) -> Result<T, Error> {
    value.ok_or_else(|| field_error(field, "missing_field", format!("{field} is required")))
}
