//! Admin dashboard figures and the sales report.
//!
//! Every figure is computed from confirmed orders fetched for a window.
//! Aggregation happens in memory, which keeps the persistence port down to
//! a single windowed read.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::debug;

use super::Error;
use super::ports::{OrderRepository, ProductRepository, UserRepository};
use super::report::{
    DashboardSummary, GraphPeriod, GraphPoint, ReportFilter, ReportWindow, SalesReport,
    SalesRow, SalesTotals, StatusCount, bar_graph, status_counts,
};

/// Read-only reporting over orders, users and products.
#[derive(Clone)]
pub struct DashboardService {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    products: Arc<dyn ProductRepository>,
    clock: Arc<dyn Clock>,
}

impl DashboardService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            users,
            products,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    fn window(
        &self,
        filter: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        fallback: ReportFilter,
    ) -> Result<ReportWindow, Error> {
        let filter = ReportFilter::parse(filter, start_date, end_date, fallback)?;
        Ok(filter.window(self.now()))
    }

    /// Headline counters and top-10 rankings. Defaults to today.
    pub async fn summary(
        &self,
        filter: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<DashboardSummary, Error> {
        let window = self.window(filter, start_date, end_date, ReportFilter::Day)?;
        let orders = self.orders.confirmed_between(&window).await?;
        let users = self.users.count_created(&window).await?;
        let products = self.products.count_created(&window).await?;
        debug!(orders = orders.len(), users, products, "dashboard summary");
        Ok(DashboardSummary::build(&orders, users, products))
    }

    /// Revenue per month of the current year, or per day of the current week.
    pub async fn bar_graph(&self, period: Option<&str>) -> Result<Vec<GraphPoint>, Error> {
        let period = GraphPeriod::parse(period)?;
        let orders = self.orders.confirmed_between(&period.window(self.now())).await?;
        Ok(bar_graph(&orders, period))
    }

    /// Item counts per status across every confirmed order.
    pub async fn pie_chart(&self) -> Result<Vec<StatusCount>, Error> {
        let orders = self
            .orders
            .confirmed_between(&ReportFilter::All.window(self.now()))
            .await?;
        Ok(status_counts(&orders))
    }

    /// Totals for the window plus one page of order rows. Defaults to all time.
    pub async fn sales_report(
        &self,
        filter: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        page: PageRequest,
    ) -> Result<SalesReport, Error> {
        let window = self.window(filter, start_date, end_date, ReportFilter::All)?;
        let orders = self.orders.confirmed_between(&window).await?;
        let totals = SalesTotals::of(&orders);
        let rows: Vec<SalesRow> = orders.iter().map(SalesRow::from).collect();
        Ok(SalesReport {
            totals,
            orders: Page::from_all(rows, page),
        })
    }
}

#[cfg(test)]
#[path = "dashboard_service_tests.rs"]
mod tests;
