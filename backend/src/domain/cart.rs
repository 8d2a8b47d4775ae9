//! Shopping cart, wishlist and checkout totals.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::catalog::{ProductDetails, ProductView};
use super::pricing::coupon_discount;
use super::promotion::Coupon;
use super::{CartItemId, CouponId, Error, ProductId, UserId};

/// One product/size pairing in a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub size: String,
    pub quantity: i32,
}

/// A customer's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub user_id: UserId,
    pub lines: Vec<CartLine>,
    pub applied_coupon_id: Option<CouponId>,
}

impl Cart {
    /// An empty cart for `user_id`.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            lines: Vec::new(),
            applied_coupon_id: None,
        }
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find a line by id.
    pub fn line(&self, id: CartItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Quantity already in the cart for `product_id`/`size`.
    pub fn quantity_of(&self, product_id: ProductId, size: &str) -> i32 {
        self.lines
            .iter()
            .filter(|line| line.product_id == product_id && line.size == size)
            .map(|line| line.quantity)
            .sum()
    }

    /// Add `quantity` units, merging with an existing line for the same
    /// product and size. Returns the affected line id.
    pub fn add(&mut self, product_id: ProductId, size: &str, quantity: i32) -> CartItemId {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id && line.size == size)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return line.id;
        }
        let id = CartItemId::random();
        self.lines.push(CartLine {
            id,
            product_id,
            size: size.to_owned(),
            quantity: quantity.max(1),
        });
        id
    }

    /// Change a line's quantity and/or size.
    ///
    /// Quantities below one clamp to one. Moving a line onto a size that is
    /// already in the cart folds both lines together.
    pub fn update_line(
        &mut self,
        id: CartItemId,
        quantity: Option<i32>,
        size: Option<&str>,
    ) -> Result<(), Error> {
        let index = self
            .lines
            .iter()
            .position(|line| line.id == id)
            .ok_or_else(|| Error::not_found("cart item not found"))?;
        let mut line = self.lines.remove(index);
        if let Some(quantity) = quantity {
            line.quantity = quantity.max(1);
        }
        if let Some(size) = size {
            line.size = size.to_owned();
        }
        match self
            .lines
            .iter_mut()
            .find(|other| other.product_id == line.product_id && other.size == line.size)
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => self.lines.insert(index, line),
        }
        Ok(())
    }

    /// Drop a line; returns whether it existed.
    pub fn remove_line(&mut self, id: CartItemId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        before != self.lines.len()
    }

    /// Empty the cart and forget the applied coupon.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.applied_coupon_id = None;
    }

    /// Reset lines to one unit when their size is down to its last unit or
    /// can no longer cover the requested quantity. Returns whether anything
    /// changed.
    pub fn adjust_for_stock(&mut self, stock_of: impl Fn(&CartLine) -> i32) -> bool {
        let mut adjusted = false;
        for line in &mut self.lines {
            let available = stock_of(line);
            if (available == 1 || available < line.quantity) && line.quantity != 1 {
                line.quantity = 1;
                adjusted = true;
            }
        }
        adjusted
    }
}

/// A cart line joined with its product.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub line: CartLine,
    pub details: ProductDetails,
}

impl PricedLine {
    /// Units of the line's size currently on hand.
    pub fn available(&self) -> i32 {
        self.details.product.stock_for(&self.line.size).unwrap_or(0)
    }
}

/// Checkout totals derived from the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Sum of applicable price times quantity.
    pub cart_total: i64,
    /// Sum of sale price times quantity.
    #[serde(rename = "totalMRP")]
    pub total_mrp: i64,
    /// Savings from running offers.
    pub total_discount: i64,
    pub total_quantity: i64,
    pub coupon_discount: i64,
    /// Offer savings per cart line.
    pub discount_map: BTreeMap<String, i64>,
    /// What the customer pays.
    pub total_amount: i64,
}

impl CartSummary {
    /// Price every line at `now` and apply `coupon` when it has not expired.
    pub fn compute(lines: &[PricedLine], coupon: Option<&Coupon>, now: DateTime<Utc>) -> Self {
        let mut summary = Self::default();
        for priced in lines {
            let quantity = i64::from(priced.line.quantity);
            let sale = priced.details.product.sale_price;
            let applicable = priced.details.applicable_price(now);
            summary.cart_total += applicable * quantity;
            summary.total_mrp += sale * quantity;
            summary.total_quantity += quantity;
            if priced.details.active_offer(now).is_some() {
                let saving = (sale - applicable) * quantity;
                summary.total_discount += saving;
                summary
                    .discount_map
                    .insert(priced.line.id.to_string(), saving);
            }
        }
        summary.coupon_discount = match coupon {
            Some(coupon) if !coupon.is_expired(now) => coupon_discount(
                summary.cart_total,
                coupon.discount,
                coupon.max_discount_amount,
            ),
            _ => 0,
        };
        summary.total_amount = summary.cart_total - summary.coupon_discount;
        summary
    }
}

/// Cart line as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub id: CartItemId,
    pub product: ProductView,
    pub size: String,
    pub quantity: i32,
    pub available_stock: i32,
    pub in_stock: bool,
    pub unit_price: i64,
    pub line_total: i64,
}

/// Coupon currently applied to a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub id: CouponId,
    pub code: String,
    pub discount: i32,
    pub max_discount_amount: i64,
}

/// Cart with product details and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub applied_coupon: Option<AppliedCoupon>,
    pub summary: CartSummary,
    /// Set when quantities were reduced to match stock on this read.
    pub stock_adjusted: bool,
}

impl CartView {
    /// Render priced lines and totals.
    pub fn new(
        lines: &[PricedLine],
        coupon: Option<&Coupon>,
        now: DateTime<Utc>,
        stock_adjusted: bool,
    ) -> Self {
        let items = lines
            .iter()
            .map(|priced| {
                let unit_price = priced.details.applicable_price(now);
                let available = priced.available();
                CartLineView {
                    id: priced.line.id,
                    product: ProductView::new(&priced.details, now),
                    size: priced.line.size.clone(),
                    quantity: priced.line.quantity,
                    available_stock: available,
                    in_stock: available >= priced.line.quantity && priced.details.is_purchasable(),
                    unit_price,
                    line_total: unit_price * i64::from(priced.line.quantity),
                }
            })
            .collect();
        Self {
            items,
            applied_coupon: coupon.map(|coupon| AppliedCoupon {
                id: coupon.id,
                code: coupon.code.clone(),
                discount: coupon.discount,
                max_discount_amount: coupon.max_discount_amount,
            }),
            summary: CartSummary::compute(lines, coupon, now),
            stock_adjusted,
        }
    }
}

/// A wishlisted product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistEntry {
    pub product_id: ProductId,
    pub added_at: DateTime<Utc>,
}

/// Wishlisted product as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemView {
    pub product: ProductView,
    pub added_at: DateTime<Utc>,
}
