//! Reporting windows and sales aggregation for the admin dashboard.
//!
//! Aggregation works over confirmed orders already fetched for a window;
//! initiated and failed orders never reach these functions.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::order::{CustomerOrder, ItemStatus, OrderItem, PaymentMethod, PaymentStatus};
use super::promotion::{end_of_day, start_of_day};
use super::validation::field_error;
use super::{Error, OrderId};

/// Number of entries in each top-N ranking.
pub const TOP_N: usize = 10;

/// Inclusive time range; `None` bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ReportWindow {
    /// Whether `at` lies inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| from <= at) && self.to.is_none_or(|to| at <= to)
    }
}

/// Named reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFilter {
    Day,
    Week,
    Month,
    Year,
    All,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl ReportFilter {
    /// Parse the `filter` query with its optional custom dates. A missing
    /// filter means `fallback`.
    pub fn parse(
        filter: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        fallback: Self,
    ) -> Result<Self, Error> {
        let Some(name) = filter.map(str::trim).filter(|name| !name.is_empty()) else {
            return Ok(fallback);
        };
        match name.to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            "all" => Ok(Self::All),
            "custom" => {
                let start = parse_date("startDate", start_date)?;
                let end = parse_date("endDate", end_date)?;
                if end < start {
                    return Err(field_error(
                        "endDate",
                        "before_start",
                        "endDate must not be before startDate",
                    ));
                }
                Ok(Self::Custom { start, end })
            }
            _ => Err(field_error(
                "filter",
                "invalid_filter",
                "filter must be one of day, week, month, year, all, custom",
            )),
        }
    }

    /// The window this period covers around `now`.
    pub fn window(self, now: DateTime<Utc>) -> ReportWindow {
        let today = now.date_naive();
        let (start, end) = match self {
            Self::All => return ReportWindow::default(),
            Self::Day => (today, today),
            Self::Week => {
                let start = week_start(today);
                (start, start + Duration::days(6))
            }
            Self::Month => {
                let start = today.with_day(1).unwrap_or(today);
                (start, last_day_of_month(start))
            }
            Self::Year => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
                (start, end)
            }
            Self::Custom { start, end } => (start, end),
        };
        ReportWindow {
            from: Some(start_of_day(start)),
            to: Some(end_of_day(end)),
        }
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<NaiveDate, Error> {
    let raw = value.map(str::trim).filter(|raw| !raw.is_empty()).ok_or_else(|| {
        field_error(field, "missing_field", format!("{field} is required for a custom range"))
    })?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        field_error(field, "invalid_date", format!("{field} must be formatted YYYY-MM-DD"))
    })
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|next| next - Duration::days(1))
        .unwrap_or(first)
}

/// Revenue kept from paid orders: bill minus refunds.
pub fn revenue<'a>(orders: impl IntoIterator<Item = &'a CustomerOrder>) -> i64 {
    orders
        .into_iter()
        .filter(|entry| entry.order.payment_status == PaymentStatus::Success)
        .map(|entry| entry.order.bill_amount - entry.order.refunded_amount)
        .sum()
}

/// Name and units sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub name: String,
    pub quantity: i64,
}

fn counts_as_sold(item: &OrderItem) -> bool {
    !matches!(item.status, ItemStatus::Cancelled | ItemStatus::ReturnAccepted)
}

/// Top `TOP_N` entries by units sold, ties broken by name.
///
/// Lines are grouped by the first half of `key`; the second half is the
/// name shown for the group.
pub fn rank_by_quantity<'a, K>(
    orders: &'a [CustomerOrder],
    key: impl Fn(&'a OrderItem) -> (K, &'a str),
) -> Vec<RankEntry>
where
    K: Eq + Hash,
{
    let mut totals: HashMap<K, (&str, i64)> = HashMap::new();
    for item in orders
        .iter()
        .flat_map(|entry| entry.order.items.iter())
        .filter(|item| counts_as_sold(item))
    {
        let (group, name) = key(item);
        totals.entry(group).or_insert((name, 0)).1 += i64::from(item.quantity);
    }
    let mut ranked: Vec<RankEntry> = totals
        .into_values()
        .map(|(name, quantity)| RankEntry {
            name: name.to_owned(),
            quantity,
        })
        .collect();
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(TOP_N);
    ranked
}

/// Number of order lines in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ItemStatus,
    pub count: i64,
}

/// Item status histogram, most frequent first.
pub fn status_counts(orders: &[CustomerOrder]) -> Vec<StatusCount> {
    let mut counts: HashMap<ItemStatus, i64> = HashMap::new();
    for item in orders.iter().flat_map(|entry| entry.order.items.iter()) {
        *counts.entry(item.status).or_default() += 1;
    }
    let mut out: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    out.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.status.as_str().cmp(b.status.as_str()))
    });
    out
}

/// Dashboard headline figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_users: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: i64,
    pub top_brands: Vec<RankEntry>,
    pub top_categories: Vec<RankEntry>,
    pub top_products: Vec<RankEntry>,
    pub status_counts: Vec<StatusCount>,
}

impl DashboardSummary {
    /// Aggregate `orders` with the externally counted users and products.
    pub fn build(orders: &[CustomerOrder], total_users: i64, total_products: i64) -> Self {
        Self {
            total_users,
            total_products,
            total_orders: i64::try_from(orders.len()).unwrap_or(i64::MAX),
            total_revenue: revenue(orders),
            top_brands: rank_by_quantity(orders, |item| {
                (item.brand_name.as_str(), item.brand_name.as_str())
            }),
            top_categories: rank_by_quantity(orders, |item| {
                (item.category_name.as_str(), item.category_name.as_str())
            }),
            top_products: rank_by_quantity(orders, |item| {
                (item.product_id, item.product_name.as_str())
            }),
            status_counts: status_counts(orders),
        }
    }
}

/// Granularity of the revenue bar graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GraphPeriod {
    /// Jan..Dec of the current year.
    #[default]
    Monthly,
    /// Sun..Sat of the current week.
    Weekly,
}

impl GraphPeriod {
    /// Parse `monthly`/`weekly`; anything else is rejected.
    pub fn parse(value: Option<&str>) -> Result<Self, Error> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("monthly") => Ok(Self::Monthly),
            Some("weekly") => Ok(Self::Weekly),
            Some(_) => Err(field_error(
                "period",
                "invalid_period",
                "period must be monthly or weekly",
            )),
        }
    }

    /// Window the graph spans at `now`.
    pub fn window(self, now: DateTime<Utc>) -> ReportWindow {
        match self {
            Self::Monthly => ReportFilter::Year.window(now),
            Self::Weekly => ReportFilter::Week.window(now),
        }
    }
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One bar of the revenue graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphPoint {
    pub label: String,
    pub revenue: i64,
}

/// Zero-filled revenue per month or weekday.
pub fn bar_graph(orders: &[CustomerOrder], period: GraphPeriod) -> Vec<GraphPoint> {
    let labels: &[&str] = match period {
        GraphPeriod::Monthly => &MONTHS,
        GraphPeriod::Weekly => &WEEKDAYS,
    };
    let mut buckets = vec![0_i64; labels.len()];
    for entry in orders
        .iter()
        .filter(|entry| entry.order.payment_status == PaymentStatus::Success)
    {
        let created = entry.order.created_at;
        let index = match period {
            GraphPeriod::Monthly => created.month0() as usize,
            GraphPeriod::Weekly => created.weekday().num_days_from_sunday() as usize,
        };
        if let Some(bucket) = buckets.get_mut(index) {
            *bucket += entry.order.bill_amount - entry.order.refunded_amount;
        }
    }
    labels
        .iter()
        .zip(buckets)
        .map(|(label, revenue)| GraphPoint {
            label: (*label).to_owned(),
            revenue,
        })
        .collect()
}

/// One order in the sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesRow {
    pub order_id: OrderId,
    pub order_number: String,
    pub date: DateTime<Utc>,
    pub customer_name: String,
    pub bill_amount: i64,
    pub coupon_amount: i64,
    pub offer_discount: i64,
    pub refunded_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

impl From<&CustomerOrder> for SalesRow {
    fn from(entry: &CustomerOrder) -> Self {
        let order = &entry.order;
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            date: order.created_at,
            customer_name: entry.customer_name.clone(),
            bill_amount: order.bill_amount,
            coupon_amount: order.coupon_amount,
            offer_discount: order.offer_discount,
            refunded_amount: order.refunded_amount,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
        }
    }
}

/// Totals across every order in the report window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    pub order_count: i64,
    pub gross_amount: i64,
    pub coupon_total: i64,
    pub offer_discount_total: i64,
    pub refund_total: i64,
    pub net_amount: i64,
}

impl SalesTotals {
    /// Sum the report columns.
    pub fn of(orders: &[CustomerOrder]) -> Self {
        let mut totals = Self::default();
        for entry in orders {
            let order = &entry.order;
            totals.order_count += 1;
            totals.gross_amount += order.bill_amount;
            totals.coupon_total += order.coupon_amount;
            totals.offer_discount_total += order.offer_discount;
            totals.refund_total += order.refunded_amount;
        }
        totals.net_amount = totals.gross_amount - totals.refund_total;
        totals
    }
}

/// Paged sales report with window totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub totals: SalesTotals,
    #[schema(value_type = Object)]
    pub orders: pagination::Page<SalesRow>,
}
