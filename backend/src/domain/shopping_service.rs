//! Cart, applied coupon and wishlist.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info};

use super::cart::{Cart, CartView, PricedLine, WishlistItemView};
use super::catalog::{ProductDetails, ProductView, normalise_size};
use super::ports::{CartRepository, CouponRepository, ProductRepository, WishlistRepository};
use super::promotion::Coupon;
use super::validation::field_error;
use super::{CartItemId, Error, ProductId, UserId};

/// Join cart lines with their products, dropping lines whose product has
/// disappeared.
pub(crate) async fn price_lines(
    products: &dyn ProductRepository,
    cart: &Cart,
) -> Result<Vec<PricedLine>, Error> {
    let ids: Vec<ProductId> = cart.lines.iter().map(|line| line.product_id).collect();
    let found: HashMap<ProductId, ProductDetails> = products
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|details| (details.product.id, details))
        .collect();
    Ok(cart
        .lines
        .iter()
        .filter_map(|line| {
            found.get(&line.product_id).map(|details| PricedLine {
                line: line.clone(),
                details: details.clone(),
            })
        })
        .collect())
}

/// Cart and wishlist operations for signed-in customers.
#[derive(Clone)]
pub struct ShoppingService {
    carts: Arc<dyn CartRepository>,
    wishlist: Arc<dyn WishlistRepository>,
    products: Arc<dyn ProductRepository>,
    coupons: Arc<dyn CouponRepository>,
    clock: Arc<dyn Clock>,
}

impl ShoppingService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        wishlist: Arc<dyn WishlistRepository>,
        products: Arc<dyn ProductRepository>,
        coupons: Arc<dyn CouponRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            carts,
            wishlist,
            products,
            coupons,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    async fn existing_cart(&self, user_id: UserId) -> Result<Cart, Error> {
        self.carts
            .find(&user_id)
            .await?
            .ok_or_else(|| Error::not_found("cart not found"))
    }

    async fn applied_coupon(&self, cart: &Cart) -> Result<Option<Coupon>, Error> {
        match cart.applied_coupon_id {
            Some(id) => Ok(self.coupons.find(&id).await?),
            None => Ok(None),
        }
    }

    async fn render(&self, cart: &Cart, stock_adjusted: bool) -> Result<CartView, Error> {
        let lines = price_lines(self.products.as_ref(), cart).await?;
        let coupon = self.applied_coupon(cart).await?;
        Ok(CartView::new(&lines, coupon.as_ref(), self.now(), stock_adjusted))
    }

    /// A purchasable product and the normalised size, checked to exist.
    async fn sized_product(&self, product_id: ProductId, size: &str) -> Result<(ProductDetails, String, i32), Error> {
        let details = self
            .products
            .find(&product_id)
            .await?
            .filter(ProductDetails::is_purchasable)
            .ok_or_else(|| Error::not_found("product not found"))?;
        let size = normalise_size(size);
        let stock = details
            .product
            .stock_for(&size)
            .ok_or_else(|| field_error("size", "unknown_size", format!("size {size} is not offered")))?;
        Ok((details, size, stock))
    }

    /// Add units of a product size, merging with an existing line.
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
        quantity: i32,
    ) -> Result<CartView, Error> {
        if quantity < 1 {
            return Err(field_error("quantity", "too_small", "quantity must be at least 1"));
        }
        let (details, size, stock) = self.sized_product(product_id, size).await?;
        let mut cart = self
            .carts
            .find(&user_id)
            .await?
            .unwrap_or_else(|| Cart::empty(user_id));
        let wanted = cart.quantity_of(product_id, &size).saturating_add(quantity);
        if stock < wanted {
            return Err(Error::invalid_request(format!(
                "only {stock} left in stock for {} size {size}",
                details.product.name
            ))
            .with_details(serde_json::json!({
                "code": "insufficient_stock",
                "product": details.product.name,
                "size": size,
            })));
        }
        cart.add(product_id, &size, quantity);
        self.carts.save(&cart).await?;
        debug!(%user_id, %product_id, quantity, "cart line added");
        self.render(&cart, false).await
    }

    /// The cart with prices and totals. Lines the stock can no longer cover
    /// are reset to a single unit and persisted.
    pub async fn cart(&self, user_id: UserId) -> Result<CartView, Error> {
        let mut cart = self.existing_cart(user_id).await?;
        let lines = price_lines(self.products.as_ref(), &cart).await?;
        let available: HashMap<CartItemId, i32> = lines
            .iter()
            .map(|priced| (priced.line.id, priced.available()))
            .collect();
        let adjusted =
            cart.adjust_for_stock(|line| available.get(&line.id).copied().unwrap_or(0));
        if adjusted {
            self.carts.save(&cart).await?;
            info!(%user_id, "cart quantities reduced to match stock");
        }
        self.render(&cart, adjusted).await
    }

    pub async fn update_cart_item(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: Option<i32>,
        size: Option<&str>,
    ) -> Result<CartView, Error> {
        if quantity.is_none() && size.is_none() {
            return Err(Error::invalid_request("provide a quantity or a size"));
        }
        let mut cart = self.existing_cart(user_id).await?;
        let product_id = cart
            .line(item_id)
            .map(|line| line.product_id)
            .ok_or_else(|| Error::not_found("cart item not found"))?;
        let size = match size {
            Some(raw) => Some(self.sized_product(product_id, raw).await?.1),
            None => None,
        };
        cart.update_line(item_id, quantity, size.as_deref())?;
        self.carts.save(&cart).await?;
        self.render(&cart, false).await
    }

    pub async fn remove_cart_item(&self, user_id: UserId, item_id: CartItemId) -> Result<CartView, Error> {
        let mut cart = self.existing_cart(user_id).await?;
        if !cart.remove_line(item_id) {
            return Err(Error::not_found("cart item not found"));
        }
        self.carts.save(&cart).await?;
        self.render(&cart, false).await
    }

    /// Empty the cart and drop its coupon.
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), Error> {
        let mut cart = self.existing_cart(user_id).await?;
        cart.clear();
        self.carts.save(&cart).await?;
        Ok(())
    }

    /// Apply a coupon code to the cart.
    pub async fn apply_coupon(&self, user_id: UserId, code: &str) -> Result<CartView, Error> {
        let now = self.now();
        let coupon = self
            .coupons
            .find_by_code(&code.trim().to_uppercase())
            .await?
            .ok_or_else(|| Error::not_found("coupon not found"))?;
        if !coupon.is_redeemable(now) {
            return Err(Error::invalid_request("coupon is blocked or expired"));
        }
        let used = self.coupons.usage_count(&coupon.id, &user_id).await?;
        if used >= i64::from(coupon.usage_limit_per_user) {
            return Err(Error::invalid_request("coupon usage limit reached"));
        }
        let mut cart = self
            .carts
            .find(&user_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or_else(|| Error::invalid_request("cart is empty"))?;
        if cart.applied_coupon_id.is_some() {
            return Err(Error::conflict("a coupon is already applied"));
        }
        let lines = price_lines(self.products.as_ref(), &cart).await?;
        let cart_total: i64 = lines
            .iter()
            .map(|priced| priced.details.applicable_price(now) * i64::from(priced.line.quantity))
            .sum();
        if cart_total < coupon.min_purchase_amount {
            return Err(Error::invalid_request(format!(
                "cart total must be at least {} to use this coupon",
                coupon.min_purchase_amount
            )));
        }
        cart.applied_coupon_id = Some(coupon.id);
        self.carts.save(&cart).await?;
        info!(%user_id, code = %coupon.code, "coupon applied");
        Ok(CartView::new(&lines, Some(&coupon), now, false))
    }

    pub async fn remove_coupon(&self, user_id: UserId) -> Result<CartView, Error> {
        let mut cart = self
            .carts
            .find(&user_id)
            .await?
            .filter(|cart| cart.applied_coupon_id.is_some())
            .ok_or_else(|| Error::invalid_request("no coupon is applied"))?;
        cart.applied_coupon_id = None;
        self.carts.save(&cart).await?;
        self.render(&cart, false).await
    }

    /// Wishlisted products, newest first. Deleted products are left out.
    pub async fn wishlist(&self, user_id: UserId) -> Result<Vec<WishlistItemView>, Error> {
        let entries = self.wishlist.list(&user_id).await?;
        let ids: Vec<ProductId> = entries.iter().map(|entry| entry.product_id).collect();
        let found: HashMap<ProductId, ProductDetails> = self
            .products
            .find_many(&ids)
            .await?
            .into_iter()
            .filter(|details| details.product.deleted_at.is_none())
            .map(|details| (details.product.id, details))
            .collect();
        let now = self.now();
        Ok(entries
            .iter()
            .filter_map(|entry| {
                found.get(&entry.product_id).map(|details| WishlistItemView {
                    product: ProductView::new(details, now),
                    added_at: entry.added_at,
                })
            })
            .collect())
    }

    pub async fn add_to_wishlist(&self, user_id: UserId, product_id: ProductId) -> Result<(), Error> {
        self.products
            .find(&product_id)
            .await?
            .filter(|details| details.product.deleted_at.is_none())
            .ok_or_else(|| Error::not_found("product not found"))?;
        self.wishlist.add(&user_id, &product_id, self.now()).await?;
        Ok(())
    }

    pub async fn remove_from_wishlist(&self, user_id: UserId, product_id: ProductId) -> Result<(), Error> {
        if !self.wishlist.remove(&user_id, &product_id).await? {
            return Err(Error::not_found("product is not in the wishlist"));
        }
        Ok(())
    }

    /// Put one unit of a wishlisted product in the cart and unsave it.
    pub async fn move_to_bag(
        &self,
        user_id: UserId,
        product_id: ProductId,
        size: &str,
    ) -> Result<CartView, Error> {
        let view = self.add_to_cart(user_id, product_id, size, 1).await?;
        self.wishlist.remove(&user_id, &product_id).await?;
        Ok(view)
    }
}

#[cfg(test)]
#[path = "shopping_service_tests.rs"]
mod tests;
