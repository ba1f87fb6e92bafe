//! Customer Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Customer;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct CustomerRepository {
    base: BaseRepository,
}

impl CustomerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_key(&self, key: &str) -> RepoResult<Option<Customer>> {
        let customer: Option<Customer> = self.base.db().select(Customer::record_id(key)).await?;
        Ok(customer)
    }

    /// Create or replace a customer record under a fixed key
    pub async fn upsert(&self, key: &str, name: &str) -> RepoResult<Customer> {
        let customer: Option<Customer> = self
            .base
            .db()
            .upsert(Customer::record_id(key))
            .content(Customer {
                id: None,
                name: name.to_string(),
                used_coupons: Vec::new(),
                orders: Vec::new(),
            })
            .await?;
        customer.ok_or_else(|| RepoError::Database("Failed to upsert customer".to_string()))
    }
}
