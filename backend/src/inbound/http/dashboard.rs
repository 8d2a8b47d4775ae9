//! Admin dashboard and sales reporting.
//!
//! ```text
//! GET /api/v1/admin/dashboard?filter&startDate&endDate
//! GET /api/v1/admin/dashboard/bar-graph?period
//! GET /api/v1/admin/dashboard/pie-chart
//! GET /api/v1/admin/sales-report?period&startDate&endDate&page&limit
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::report::{DashboardSummary, GraphPoint, SalesReport, StatusCount};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentAdmin;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::page_request;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SummaryParams {
    /// `day`, `week`, `month`, `year`, `all` or `custom` (default `day`).
    pub filter: Option<String>,
    /// `YYYY-MM-DD`, required with `custom`.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, required with `custom`.
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GraphParams {
    /// `monthly` (default) or `weekly`.
    pub period: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct SalesReportParams {
    /// `day`, `week`, `month`, `year`, `all` (default) or `custom`.
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    params(SummaryParams),
    responses(
        (status = 200, description = "Counters and top-10 rankings", body = DashboardSummary),
        (status = 400, description = "Invalid filter or dates", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "dashboardSummary"
)]
#[get("/dashboard")]
pub async fn summary(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<SummaryParams>,
) -> ApiResult<web::Json<DashboardSummary>> {
    let summary = state
        .dashboard
        .summary(
            query.filter.as_deref(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;
    Ok(web::Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard/bar-graph",
    params(GraphParams),
    responses(
        (status = 200, description = "Revenue per bucket", body = [GraphPoint]),
        (status = 400, description = "Unknown period", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "dashboardBarGraph"
)]
#[get("/dashboard/bar-graph")]
pub async fn bar_graph(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<GraphParams>,
) -> ApiResult<web::Json<Vec<GraphPoint>>> {
    Ok(web::Json(
        state.dashboard.bar_graph(query.period.as_deref()).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard/pie-chart",
    responses(
        (status = 200, description = "Item counts per status", body = [StatusCount]),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "dashboardPieChart"
)]
#[get("/dashboard/pie-chart")]
pub async fn pie_chart(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
) -> ApiResult<web::Json<Vec<StatusCount>>> {
    Ok(web::Json(state.dashboard.pie_chart().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/sales-report",
    params(SalesReportParams),
    responses(
        (status = 200, description = "Window totals and one page of orders", body = SalesReport),
        (status = 400, description = "Invalid period, dates or paging", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["dashboard"],
    operation_id = "salesReport"
)]
#[get("/sales-report")]
pub async fn sales_report(
    state: web::Data<HttpState>,
    _admin: CurrentAdmin,
    query: web::Query<SalesReportParams>,
) -> ApiResult<web::Json<SalesReport>> {
    let page = page_request(query.page, query.limit)?;
    let report = state
        .dashboard
        .sales_report(
            query.period.as_deref(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            page,
        )
        .await?;
    Ok(web::Json(report))
}
