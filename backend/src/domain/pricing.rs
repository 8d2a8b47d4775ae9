//! Integer rupee arithmetic for offers, coupons and refunds.
//!
//! All amounts are whole rupees held in `i64`. Percentages are whole numbers
//! in `0..=100`. Rounding mirrors what customers see on the storefront:
//! offer prices round half up, coupon discounts round up, refunds round down.

/// Price after applying a percentage offer to the sale price.
///
/// # Examples
/// ```
/// use storefront::domain::pricing::offer_price;
///
/// assert_eq!(offer_price(999, 15), 849);
/// ```
pub fn offer_price(sale_price: i64, discount_percent: i32) -> i64 {
    let scaled = sale_price.saturating_mul(i64::from(100 - discount_percent));
    (scaled + 50).div_euclid(100)
}

/// Coupon discount on `cart_total`: the percentage rounded up, capped at
/// `max_discount`.
pub fn coupon_discount(cart_total: i64, discount_percent: i32, max_discount: i64) -> i64 {
    if cart_total <= 0 {
        return 0;
    }
    let raw = (cart_total.saturating_mul(i64::from(discount_percent)) + 99).div_euclid(100);
    raw.min(max_discount).max(0)
}

/// Refund owed for one cancelled or returned order line.
///
/// When a coupon reduced the bill, the refund is the line's share of what the
/// customer actually paid: `floor(item_total * bill / (bill + coupon))`.
pub fn refund_amount(item_total: i64, bill_amount: i64, coupon_amount: i64) -> i64 {
    if coupon_amount <= 0 {
        return item_total;
    }
    let gross = bill_amount + coupon_amount;
    if gross <= 0 {
        return 0;
    }
    item_total.saturating_mul(bill_amount).div_euclid(gross)
}

/// Convert rupees to the gateway's minor unit.
pub fn to_paise(amount: i64) -> i64 {
    amount.saturating_mul(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1000, 10, 900)]
    #[case(999, 15, 849)]
    #[case(1001, 50, 501)]
    #[case(500, 0, 500)]
    #[case(500, 100, 0)]
    fn offer_price_rounds_half_up(#[case] sale: i64, #[case] pct: i32, #[case] expected: i64) {
        assert_eq!(offer_price(sale, pct), expected);
    }

    #[rstest]
    #[case(1000, 10, 500, 100)]
    #[case(1001, 10, 500, 101)]
    #[case(10_000, 20, 500, 500)]
    #[case(0, 20, 500, 0)]
    fn coupon_discount_rounds_up_and_caps(
        #[case] total: i64,
        #[case] pct: i32,
        #[case] cap: i64,
        #[case] expected: i64,
    ) {
        assert_eq!(coupon_discount(total, pct, cap), expected);
    }

    #[rstest]
    #[case(1000, 1800, 200, 900)]
    #[case(1000, 2000, 0, 1000)]
    #[case(333, 900, 100, 299)]
    fn refund_is_proportional_to_amount_paid(
        #[case] item_total: i64,
        #[case] bill: i64,
        #[case] coupon: i64,
        #[case] expected: i64,
    ) {
        assert_eq!(refund_amount(item_total, bill, coupon), expected);
    }

    #[test]
    fn paise_conversion() {
        assert_eq!(to_paise(1499), 149_900);
    }
}
