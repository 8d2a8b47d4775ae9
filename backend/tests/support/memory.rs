//! In-memory port adapters for driving the assembled HTTP app.
//!
//! Accounts and the category/brand catalog keep real state so auth and
//! catalog flows can run end to end. Every other port is served by
//! [`EmptyStore`], which holds nothing and refuses writes that would need a
//! stored record.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use storefront::domain::address::Address;
use storefront::domain::banner::Banner;
use storefront::domain::cart::{Cart, WishlistEntry};
use storefront::domain::catalog::{Brand, CatalogQuery, Category, Product, ProductDetails};
use storefront::domain::listing::ListQuery;
use storefront::domain::order::{
    CustomerOrder, ItemChange, Order, OrderStatus, PaymentStatus, ReturnRequest, ReturnStatus,
    ReturnView,
};
use storefront::domain::ports::{
    AddressRepository, AdminRepository, BannerRepository, BrandRepository, CartRepository,
    CategoryRepository, CouponRepository, GatewayError, GatewayOrder, MailMessage, Mailer,
    MailerError, OfferRepository, OrderRepository, OtpRepository, PaymentGateway, PaymentProof,
    PersistenceError, PricedProduct, ProductRepository, UserRepository, WalletRepository,
    WishlistRepository,
};
use storefront::domain::promotion::{Coupon, CouponStatus, CouponWithUsage, Offer, OfferKind};
use storefront::domain::report::ReportWindow;
use storefront::domain::user::{Admin, Otp, User};
use storefront::domain::wallet::{Wallet, WalletTransaction};
use storefront::domain::{
    AddressId, AdminId, BannerId, BrandId, CategoryId, CouponId, OfferId, OrderId, OrderItemId,
    ProductId, TransactionId, UserId,
};

fn locked<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().expect("store lock")
}

fn missing(what: &str) -> PersistenceError {
    PersistenceError::query(format!("{what} is not stored in memory"))
}

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<Vec<User>>,
}

impl MemoryUsers {
    pub fn snapshot(&self) -> Vec<User> {
        locked(&self.users).clone()
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, PersistenceError> {
        Ok(locked(&self.users).iter().find(|u| u.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        Ok(locked(&self.users).iter().find(|u| u.email == email).cloned())
    }

    async fn mobile_in_use(
        &self,
        mobile: &str,
        exclude: Option<UserId>,
    ) -> Result<bool, PersistenceError> {
        Ok(locked(&self.users)
            .iter()
            .any(|u| u.mobile.as_deref() == Some(mobile) && Some(u.id) != exclude))
    }

    async fn insert(&self, user: &User) -> Result<(), PersistenceError> {
        let mut users = locked(&self.users);
        if users.iter().any(|u| u.email == user.email) {
            return Err(PersistenceError::duplicate("email already registered"));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), PersistenceError> {
        let mut users = locked(&self.users);
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| missing("user"))?;
        *slot = user.clone();
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Page<User>, PersistenceError> {
        let matching: Vec<User> = locked(&self.users)
            .iter()
            .filter(|u| !u.is_deleted())
            .filter(|u| query.matches([u.first_name.as_str(), u.last_name.as_str(), u.email.as_str()]))
            .cloned()
            .collect();
        Ok(Page::from_all(matching, query.page))
    }

    async fn count_created(&self, _window: &ReportWindow) -> Result<i64, PersistenceError> {
        let count = locked(&self.users).iter().filter(|u| !u.is_deleted()).count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

#[derive(Default)]
pub struct MemoryAdmins {
    admins: Mutex<Vec<Admin>>,
}

#[async_trait]
impl AdminRepository for MemoryAdmins {
    async fn find_by_id(&self, id: &AdminId) -> Result<Option<Admin>, PersistenceError> {
        Ok(locked(&self.admins).iter().find(|a| a.id == *id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, PersistenceError> {
        Ok(locked(&self.admins).iter().find(|a| a.email == email).cloned())
    }

    async fn upsert(&self, admin: &Admin) -> Result<(), PersistenceError> {
        let mut admins = locked(&self.admins);
        admins.retain(|a| a.email != admin.email);
        admins.push(admin.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryOtps {
    otps: Mutex<Vec<Otp>>,
}

#[async_trait]
impl OtpRepository for MemoryOtps {
    async fn insert(&self, otp: &Otp) -> Result<(), PersistenceError> {
        locked(&self.otps).push(otp.clone());
        Ok(())
    }

    async fn latest(&self, email: &str) -> Result<Option<Otp>, PersistenceError> {
        Ok(locked(&self.otps)
            .iter()
            .filter(|otp| otp.email == email)
            .max_by_key(|otp| otp.created_at)
            .cloned())
    }

    async fn delete_for(&self, email: &str) -> Result<(), PersistenceError> {
        locked(&self.otps).retain(|otp| otp.email != email);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAddresses {
    addresses: Mutex<Vec<Address>>,
}

#[async_trait]
impl AddressRepository for MemoryAddresses {
    async fn list(&self, user_id: &UserId) -> Result<Vec<Address>, PersistenceError> {
        Ok(locked(&self.addresses)
            .iter()
            .filter(|a| a.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn find(
        &self,
        user_id: &UserId,
        id: &AddressId,
    ) -> Result<Option<Address>, PersistenceError> {
        Ok(locked(&self.addresses)
            .iter()
            .find(|a| a.user_id == *user_id && a.id == *id)
            .cloned())
    }

    async fn insert(&self, address: &Address) -> Result<(), PersistenceError> {
        let mut addresses = locked(&self.addresses);
        if address.is_default {
            for other in addresses.iter_mut().filter(|a| a.user_id == address.user_id) {
                other.is_default = false;
            }
        }
        addresses.push(address.clone());
        Ok(())
    }

    async fn update(&self, address: &Address) -> Result<(), PersistenceError> {
        let mut addresses = locked(&self.addresses);
        let slot = addresses
            .iter_mut()
            .find(|a| a.id == address.id)
            .ok_or_else(|| missing("address"))?;
        *slot = address.clone();
        Ok(())
    }

    async fn delete(&self, user_id: &UserId, id: &AddressId) -> Result<bool, PersistenceError> {
        let mut addresses = locked(&self.addresses);
        let before = addresses.len();
        addresses.retain(|a| !(a.user_id == *user_id && a.id == *id));
        Ok(addresses.len() < before)
    }

    async fn set_default(
        &self,
        user_id: &UserId,
        id: &AddressId,
        at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        for address in locked(&self.addresses)
            .iter_mut()
            .filter(|a| a.user_id == *user_id)
        {
            address.is_default = address.id == *id;
            address.updated_at = at;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCategories {
    categories: Mutex<Vec<Category>>,
}

#[async_trait]
impl CategoryRepository for MemoryCategories {
    async fn find(&self, id: &CategoryId) -> Result<Option<Category>, PersistenceError> {
        Ok(locked(&self.categories)
            .iter()
            .find(|c| c.id == *id && c.deleted_at.is_none())
            .cloned())
    }

    async fn name_taken(
        &self,
        name: &str,
        exclude: Option<CategoryId>,
    ) -> Result<bool, PersistenceError> {
        Ok(locked(&self.categories).iter().any(|c| {
            c.deleted_at.is_none() && c.name.eq_ignore_ascii_case(name) && Some(c.id) != exclude
        }))
    }

    async fn insert(&self, category: &Category) -> Result<(), PersistenceError> {
        locked(&self.categories).push(category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), PersistenceError> {
        let mut categories = locked(&self.categories);
        let slot = categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| missing("category"))?;
        *slot = category.clone();
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Page<Category>, PersistenceError> {
        let matching: Vec<Category> = locked(&self.categories)
            .iter()
            .filter(|c| c.deleted_at.is_none() && query.matches([c.name.as_str()]))
            .cloned()
            .collect();
        Ok(Page::from_all(matching, query.page))
    }

    async fn list_all(&self) -> Result<Vec<Category>, PersistenceError> {
        Ok(locked(&self.categories)
            .iter()
            .filter(|c| c.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn list_listed(&self) -> Result<Vec<Category>, PersistenceError> {
        Ok(locked(&self.categories)
            .iter()
            .filter(|c| c.is_listed())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryBrands {
    brands: Mutex<Vec<Brand>>,
}

#[async_trait]
impl BrandRepository for MemoryBrands {
    async fn find(&self, id: &BrandId) -> Result<Option<Brand>, PersistenceError> {
        Ok(locked(&self.brands)
            .iter()
            .find(|b| b.id == *id && b.deleted_at.is_none())
            .cloned())
    }

    async fn name_taken(
        &self,
        name: &str,
        exclude: Option<BrandId>,
    ) -> Result<bool, PersistenceError> {
        Ok(locked(&self.brands).iter().any(|b| {
            b.deleted_at.is_none() && b.name.eq_ignore_ascii_case(name) && Some(b.id) != exclude
        }))
    }

    async fn insert(&self, brand: &Brand) -> Result<(), PersistenceError> {
        locked(&self.brands).push(brand.clone());
        Ok(())
    }

    async fn update(&self, brand: &Brand) -> Result<(), PersistenceError> {
        let mut brands = locked(&self.brands);
        let slot = brands
            .iter_mut()
            .find(|b| b.id == brand.id)
            .ok_or_else(|| missing("brand"))?;
        *slot = brand.clone();
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<Page<Brand>, PersistenceError> {
        let matching: Vec<Brand> = locked(&self.brands)
            .iter()
            .filter(|b| b.deleted_at.is_none() && query.matches([b.name.as_str()]))
            .cloned()
            .collect();
        Ok(Page::from_all(matching, query.page))
    }

    async fn list_all(&self) -> Result<Vec<Brand>, PersistenceError> {
        Ok(locked(&self.brands)
            .iter()
            .filter(|b| b.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn list_listed(&self) -> Result<Vec<Brand>, PersistenceError> {
        Ok(locked(&self.brands)
            .iter()
            .filter(|b| b.is_listed())
            .cloned()
            .collect())
    }
}

/// Captures outgoing mail so tests can read one-time codes.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMailer {
    /// The six-digit code in the latest message sent to `to`.
    pub fn latest_code(&self, to: &str) -> Option<String> {
        locked(&self.sent)
            .iter()
            .rev()
            .find(|message| message.to == to)
            .and_then(|message| {
                message
                    .body
                    .split_whitespace()
                    .map(|word| word.trim_end_matches('.'))
                    .find(|word| word.len() == 6 && word.chars().all(|c| c.is_ascii_digit()))
                    .map(str::to_owned)
            })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailerError> {
        locked(&self.sent).push(message.clone());
        Ok(())
    }
}

/// Gateway for a deployment without payment credentials.
pub struct OfflineGateway;

#[async_trait]
impl PaymentGateway for OfflineGateway {
    async fn create_order(
        &self,
        _amount_paise: i64,
        _currency: &str,
        _receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        Err(GatewayError::not_configured())
    }

    fn verify_signature(&self, _proof: &PaymentProof) -> Result<bool, GatewayError> {
        Err(GatewayError::not_configured())
    }
}

/// Stateless stand-in for ports the integration flows only read from.
#[derive(Clone, Copy, Default)]
pub struct EmptyStore;

#[async_trait]
impl ProductRepository for EmptyStore {
    async fn find(&self, _id: &ProductId) -> Result<Option<ProductDetails>, PersistenceError> {
        Ok(None)
    }

    async fn find_many(&self, _ids: &[ProductId]) -> Result<Vec<ProductDetails>, PersistenceError> {
        Ok(Vec::new())
    }

    async fn insert(&self, _product: &Product) -> Result<(), PersistenceError> {
        Err(missing("product"))
    }

    async fn update(&self, _product: &Product) -> Result<(), PersistenceError> {
        Err(missing("product"))
    }

    async fn list_admin(
        &self,
        query: &ListQuery,
    ) -> Result<Page<ProductDetails>, PersistenceError> {
        Ok(Page::from_all(Vec::new(), query.page))
    }

    async fn list_catalog(
        &self,
        query: &CatalogQuery,
    ) -> Result<Page<ProductDetails>, PersistenceError> {
        Ok(Page::from_all(Vec::new(), query.page))
    }

    async fn related(
        &self,
        _category_id: &CategoryId,
        _exclude: &ProductId,
        _limit: i64,
    ) -> Result<Vec<ProductDetails>, PersistenceError> {
        Ok(Vec::new())
    }

    async fn list_by_category(
        &self,
        _category_id: &CategoryId,
    ) -> Result<Vec<ProductDetails>, PersistenceError> {
        Ok(Vec::new())
    }

    async fn list_with_active_offer(
        &self,
        _now: DateTime<Utc>,
    ) -> Result<Vec<ProductDetails>, PersistenceError> {
        Ok(Vec::new())
    }

    async fn count_created(&self, _window: &ReportWindow) -> Result<i64, PersistenceError> {
        Ok(0)
    }
}

#[async_trait]
impl OfferRepository for EmptyStore {
    async fn insert(&self, _offer: &Offer) -> Result<(), PersistenceError> {
        Err(missing("offer"))
    }

    async fn find(&self, _id: &OfferId) -> Result<Option<Offer>, PersistenceError> {
        Ok(None)
    }

    async fn list(
        &self,
        _kind: Option<OfferKind>,
        _now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<Offer>, PersistenceError> {
        Ok(Page::from_all(Vec::new(), page))
    }

    async fn delete(&self, _id: &OfferId) -> Result<bool, PersistenceError> {
        Ok(false)
    }

    async fn attach_to_product(
        &self,
        _offer_id: &OfferId,
        _priced: PricedProduct,
    ) -> Result<(), PersistenceError> {
        Err(missing("offer"))
    }

    async fn attach_to_category(
        &self,
        _offer_id: &OfferId,
        _category_id: &CategoryId,
        _products: &[PricedProduct],
    ) -> Result<(), PersistenceError> {
        Err(missing("offer"))
    }
}

#[async_trait]
impl CouponRepository for EmptyStore {
    async fn insert(&self, _coupon: &Coupon) -> Result<(), PersistenceError> {
        Err(missing("coupon"))
    }

    async fn find(&self, _id: &CouponId) -> Result<Option<Coupon>, PersistenceError> {
        Ok(None)
    }

    async fn find_by_code(&self, _code: &str) -> Result<Option<Coupon>, PersistenceError> {
        Ok(None)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<CouponWithUsage>, PersistenceError> {
        Ok(Page::from_all(Vec::new(), page))
    }

    async fn set_status(
        &self,
        _id: &CouponId,
        _status: CouponStatus,
    ) -> Result<Option<Coupon>, PersistenceError> {
        Ok(None)
    }

    async fn delete(&self, _id: &CouponId) -> Result<bool, PersistenceError> {
        Ok(false)
    }

    async fn usage_count(
        &self,
        _coupon_id: &CouponId,
        _user_id: &UserId,
    ) -> Result<i64, PersistenceError> {
        Ok(0)
    }

    async fn available_for(
        &self,
        _user_id: &UserId,
        _now: DateTime<Utc>,
    ) -> Result<Vec<Coupon>, PersistenceError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl CartRepository for EmptyStore {
    async fn find(&self, _user_id: &UserId) -> Result<Option<Cart>, PersistenceError> {
        Ok(None)
    }

    async fn save(&self, _cart: &Cart) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[async_trait]
impl WishlistRepository for EmptyStore {
    async fn list(&self, _user_id: &UserId) -> Result<Vec<WishlistEntry>, PersistenceError> {
        Ok(Vec::new())
    }

    async fn add(
        &self,
        _user_id: &UserId,
        _product_id: &ProductId,
        _at: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        Ok(())
    }

    async fn remove(
        &self,
        _user_id: &UserId,
        _product_id: &ProductId,
    ) -> Result<bool, PersistenceError> {
        Ok(false)
    }
}

#[async_trait]
impl OrderRepository for EmptyStore {
    async fn place_confirmed(
        &self,
        _order: &Order,
        _wallet_debit: Option<WalletTransaction>,
    ) -> Result<(), PersistenceError> {
        Err(missing("order"))
    }

    async fn insert_initiated(&self, _order: &Order) -> Result<(), PersistenceError> {
        Err(missing("order"))
    }

    async fn confirm_payment(
        &self,
        _order_id: &OrderId,
        _gateway_payment_id: &str,
        _at: DateTime<Utc>,
    ) -> Result<Order, PersistenceError> {
        Err(missing("order"))
    }

    async fn fail_payment(
        &self,
        _order_id: &OrderId,
        _payment_status: PaymentStatus,
        _gateway_payment_id: Option<String>,
        _refund: Option<WalletTransaction>,
        _at: DateTime<Utc>,
    ) -> Result<Order, PersistenceError> {
        Err(missing("order"))
    }

    async fn find(&self, _id: &OrderId) -> Result<Option<Order>, PersistenceError> {
        Ok(None)
    }

    async fn find_with_customer(
        &self,
        _id: &OrderId,
    ) -> Result<Option<CustomerOrder>, PersistenceError> {
        Ok(None)
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Order>, PersistenceError> {
        Ok(Page::from_all(Vec::new(), page))
    }

    async fn list_all(
        &self,
        _status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<CustomerOrder>, PersistenceError> {
        Ok(Page::from_all(Vec::new(), page))
    }

    async fn apply_item_change(&self, _change: &ItemChange) -> Result<Order, PersistenceError> {
        Err(missing("order"))
    }

    async fn create_return(&self, _request: &ReturnRequest) -> Result<(), PersistenceError> {
        Err(missing("order"))
    }

    async fn find_return(
        &self,
        _order_id: &OrderId,
        _item_id: &OrderItemId,
    ) -> Result<Option<ReturnRequest>, PersistenceError> {
        Ok(None)
    }

    async fn list_returns(
        &self,
        _status: Option<ReturnStatus>,
        page: PageRequest,
    ) -> Result<Page<ReturnView>, PersistenceError> {
        Ok(Page::from_all(Vec::new(), page))
    }

    async fn confirmed_between(
        &self,
        _window: &ReportWindow,
    ) -> Result<Vec<CustomerOrder>, PersistenceError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl WalletRepository for EmptyStore {
    async fn find(&self, _user_id: &UserId) -> Result<Option<Wallet>, PersistenceError> {
        Ok(None)
    }

    async fn create(&self, _wallet: &Wallet) -> Result<(), PersistenceError> {
        Err(missing("wallet"))
    }

    async fn statement(
        &self,
        _user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<WalletTransaction>, PersistenceError> {
        Ok(Page::from_all(Vec::new(), page))
    }

    async fn record(&self, _transaction: &WalletTransaction) -> Result<(), PersistenceError> {
        Err(missing("wallet"))
    }

    async fn find_initiated(
        &self,
        _user_id: &UserId,
        _gateway_order_id: &str,
    ) -> Result<Option<WalletTransaction>, PersistenceError> {
        Ok(None)
    }

    async fn complete_top_up(
        &self,
        _id: &TransactionId,
        _gateway_payment_id: &str,
        _at: DateTime<Utc>,
    ) -> Result<Wallet, PersistenceError> {
        Err(missing("wallet"))
    }

    async fn fail_top_up(&self, _id: &TransactionId) -> Result<(), PersistenceError> {
        Err(missing("wallet"))
    }
}

#[async_trait]
impl BannerRepository for EmptyStore {
    async fn insert(&self, _banner: &Banner) -> Result<(), PersistenceError> {
        Err(missing("banner"))
    }

    async fn update(&self, _banner: &Banner) -> Result<(), PersistenceError> {
        Err(missing("banner"))
    }

    async fn find(&self, _id: &BannerId) -> Result<Option<Banner>, PersistenceError> {
        Ok(None)
    }

    async fn delete(&self, _id: &BannerId) -> Result<bool, PersistenceError> {
        Ok(false)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Banner>, PersistenceError> {
        Ok(Page::from_all(Vec::new(), page))
    }

    async fn list_active(&self) -> Result<Vec<Banner>, PersistenceError> {
        Ok(Vec::new())
    }
}

/// Stores shared between the app and the test body.
#[derive(Clone, Default)]
pub struct Stores {
    pub users: Arc<MemoryUsers>,
    pub admins: Arc<MemoryAdmins>,
    pub mailer: Arc<RecordingMailer>,
}
