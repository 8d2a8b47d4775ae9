//! Port for home page banners.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::BannerId;
use crate::domain::banner::Banner;

use super::PersistenceError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BannerRepository: Send + Sync {
    async fn insert(&self, banner: &Banner) -> Result<(), PersistenceError>;

    async fn update(&self, banner: &Banner) -> Result<(), PersistenceError>;

    async fn find(&self, id: &BannerId) -> Result<Option<Banner>, PersistenceError>;

    /// Hard delete; returns whether the banner existed.
    async fn delete(&self, id: &BannerId) -> Result<bool, PersistenceError>;

    /// Newest first.
    async fn list(&self, page: PageRequest) -> Result<Page<Banner>, PersistenceError>;

    /// Active banners, newest first.
    async fn list_active(&self) -> Result<Vec<Banner>, PersistenceError>;
}
