//! Coupon Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{COUPON_TABLE, Coupon};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct CouponRepository {
    base: BaseRepository,
}

impl CouponRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Coupon>> {
        let coupons: Vec<Coupon> = self
            .base
            .db()
            .query("SELECT * FROM coupon WHERE code = $code LIMIT 1")
            .bind(("code", code.to_string()))
            .await?
            .take(0)?;
        Ok(coupons.into_iter().next())
    }

    pub async fn create(&self, coupon: Coupon) -> RepoResult<Coupon> {
        let created: Option<Coupon> = self
            .base
            .db()
            .create(COUPON_TABLE)
            .content(Coupon { id: None, ..coupon })
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create coupon".to_string()))
    }
}
