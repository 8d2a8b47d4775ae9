//! Percentage offers and coupon codes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{at_least, field_error, in_range, length_between};
use super::{CouponId, Error, OfferId};

/// What an offer may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OfferKind {
    /// Applied to a single product.
    Product,
    /// Applied to a category and cascaded to its products.
    Category,
}

impl OfferKind {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Category => "category",
        }
    }
}

impl std::str::FromStr for OfferKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" => Ok(Self::Product),
            "category" => Ok(Self::Category),
            _ => Err(field_error(
                "type",
                "invalid_offer_type",
                "type must be product or category",
            )),
        }
    }
}

/// Time-boxed percentage discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    pub description: String,
    pub discount: i32,
    #[serde(rename = "type")]
    pub kind: OfferKind,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// The pricing window of this offer.
    pub fn window(&self) -> OfferWindow {
        OfferWindow {
            id: self.id,
            discount: self.discount,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    /// Whether the end date has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.window().is_expired(now)
    }
}

/// The parts of an offer that affect pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferWindow {
    pub id: OfferId,
    pub discount: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl OfferWindow {
    /// `start <= now <= end`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }

    /// `end < now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_date < now
    }
}

/// Validated offer creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferDraft {
    pub title: String,
    pub description: String,
    pub discount: i32,
    pub kind: OfferKind,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Raw offer input.
#[derive(Debug, Clone)]
pub struct OfferInput {
    pub title: String,
    pub description: String,
    pub discount: i64,
    pub kind: OfferKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl OfferDraft {
    /// Validate an offer. `today` is the current UTC date; the window runs from
    /// the start of `start_date` to the last second of `end_date`.
    pub fn parse(input: OfferInput, today: NaiveDate) -> Result<Self, Error> {
        let title = length_between("title", &input.title, 3, 100)?;
        let description = length_between("description", &input.description, 10, 500)?;
        let discount = in_range("discount", input.discount, 0, 100)?;
        if input.start_date < today {
            return Err(field_error(
                "startDate",
                "in_past",
                "startDate cannot be before today",
            ));
        }
        if input.end_date < input.start_date {
            return Err(field_error(
                "endDate",
                "before_start",
                "endDate must not be before startDate",
            ));
        }
        Ok(Self {
            title,
            description,
            discount: i32::try_from(discount).unwrap_or(0),
            kind: input.kind,
            start_date: start_of_day(input.start_date),
            end_date: end_of_day(input.end_date),
        })
    }
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// The last second of `date` in UTC.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + chrono::Duration::days(1) - chrono::Duration::seconds(1)
}

/// Whether a coupon may currently be redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    Active,
    Blocked,
}

impl CouponStatus {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }
}

impl std::str::FromStr for CouponStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "blocked" => Ok(Self::Blocked),
            _ => Err(field_error(
                "status",
                "invalid_status",
                "status must be active or blocked",
            )),
        }
    }
}

/// Percentage coupon redeemable at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub description: Option<String>,
    pub discount: i32,
    pub max_discount_amount: i64,
    pub min_purchase_amount: i64,
    pub expiration_date: DateTime<Utc>,
    pub usage_limit_per_user: i32,
    pub status: CouponStatus,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// `expiration_date < now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date < now
    }

    /// Active and not expired.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.status == CouponStatus::Active && !self.is_expired(now)
    }
}

/// Coupon with its total redemption count, for the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CouponWithUsage {
    #[serde(flatten)]
    pub coupon: Coupon,
    pub times_used: i64,
}

/// Validated coupon creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponDraft {
    pub code: String,
    pub description: Option<String>,
    pub discount: i32,
    pub max_discount_amount: i64,
    pub min_purchase_amount: i64,
    pub expiration_date: DateTime<Utc>,
    pub usage_limit_per_user: i32,
}

/// Raw coupon input.
#[derive(Debug, Clone)]
pub struct CouponInput {
    pub code: String,
    pub description: Option<String>,
    pub discount: i64,
    pub max_discount_amount: i64,
    pub min_purchase_amount: i64,
    pub expiration_date: NaiveDate,
    pub usage_limit_per_user: Option<i64>,
}

impl CouponDraft {
    /// Validate a coupon; the code is upper-cased and the expiry must be after
    /// `today`.
    pub fn parse(input: CouponInput, today: NaiveDate) -> Result<Self, Error> {
        let code = length_between("code", &input.code, 5, 15)?.to_uppercase();
        if code.contains(char::is_whitespace) {
            return Err(field_error(
                "code",
                "invalid_code",
                "code must not contain spaces",
            ));
        }
        let discount = in_range("discount", input.discount, 1, 100)?;
        let max_discount_amount = at_least("maxDiscountAmount", input.max_discount_amount, 1)?;
        let min_purchase_amount = at_least("minPurchaseAmount", input.min_purchase_amount, 1)?;
        if input.expiration_date <= today {
            return Err(field_error(
                "expirationDate",
                "not_in_future",
                "expirationDate must be in the future",
            ));
        }
        let usage_limit = at_least(
            "usageLimitPerUser",
            input.usage_limit_per_user.unwrap_or(1),
            1,
        )?;
        Ok(Self {
            code,
            description: input
                .description
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
            discount: i32::try_from(discount).unwrap_or(1),
            max_discount_amount,
            min_purchase_amount,
            expiration_date: end_of_day(input.expiration_date),
            usage_limit_per_user: i32::try_from(usage_limit).unwrap_or(i32::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 10).expect("valid date")
    }

    fn offer_input() -> OfferInput {
        OfferInput {
            title: "Summer sale".into(),
            description: "Ten percent off selected shoes".into(),
            discount: 10,
            kind: OfferKind::Product,
            start_date: today(),
            end_date: today() + Duration::days(5),
        }
    }

    fn coupon_input() -> CouponInput {
        CouponInput {
            code: "save10".into(),
            description: None,
            discount: 10,
            max_discount_amount: 500,
            min_purchase_amount: 1000,
            expiration_date: today() + Duration::days(30),
            usage_limit_per_user: None,
        }
    }

    #[test]
    fn offer_window_spans_whole_days() {
        let draft = OfferDraft::parse(offer_input(), today()).expect("valid offer");
        assert_eq!(
            draft.start_date,
            Utc.with_ymd_and_hms(2026, 5, 10, 0, 0, 0).single().expect("ts")
        );
        assert_eq!(
            draft.end_date,
            Utc.with_ymd_and_hms(2026, 5, 15, 23, 59, 59).single().expect("ts")
        );
    }

    #[rstest]
    #[case::past_start(|i: &mut OfferInput| i.start_date = today() - Duration::days(1), "startDate")]
    #[case::end_before_start(|i: &mut OfferInput| i.end_date = today() - Duration::days(1), "endDate")]
    #[case::discount_too_high(|i: &mut OfferInput| i.discount = 101, "discount")]
    #[case::short_title(|i: &mut OfferInput| i.title = "ab".into(), "title")]
    fn offer_validation(#[case] mutate: fn(&mut OfferInput), #[case] field: &str) {
        let mut input = offer_input();
        mutate(&mut input);
        let error = OfferDraft::parse(input, today()).expect_err("invalid offer");
        assert_eq!(
            error.details().and_then(|d| d.get("field")),
            Some(&serde_json::json!(field))
        );
    }

    #[test]
    fn coupon_code_is_upper_cased_and_limit_defaults() {
        let draft = CouponDraft::parse(coupon_input(), today()).expect("valid coupon");
        assert_eq!(draft.code, "SAVE10");
        assert_eq!(draft.usage_limit_per_user, 1);
    }

    #[rstest]
    #[case::expiry_today(|i: &mut CouponInput| i.expiration_date = today(), "expirationDate")]
    #[case::zero_discount(|i: &mut CouponInput| i.discount = 0, "discount")]
    #[case::long_code(|i: &mut CouponInput| i.code = "ABCDEFGHIJKLMNOP".into(), "code")]
    #[case::zero_limit(|i: &mut CouponInput| i.usage_limit_per_user = Some(0), "usageLimitPerUser")]
    fn coupon_validation(#[case] mutate: fn(&mut CouponInput), #[case] field: &str) {
        let mut input = coupon_input();
        mutate(&mut input);
        let error = CouponDraft::parse(input, today()).expect_err("invalid coupon");
        assert_eq!(
            error.details().and_then(|d| d.get("field")),
            Some(&serde_json::json!(field))
        );
    }

    #[test]
    fn window_activity() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).single().expect("ts");
        let window = OfferWindow {
            id: OfferId::random(),
            discount: 10,
            start_date: start,
            end_date: start + Duration::days(1),
        };
        assert!(!window.is_active(start - Duration::seconds(1)));
        assert!(window.is_active(start));
        assert!(window.is_active(start + Duration::days(1)));
        assert!(window.is_expired(start + Duration::days(2)));
    }
}
