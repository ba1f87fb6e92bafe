//! Shared test fixtures: in-memory database, fast retry policy, seeding.
#![allow(dead_code)]

use std::collections::BTreeMap;

use storefront_server::auth::JwtConfig;
use storefront_server::core::{AppState, Config};
use storefront_server::db::DbService;
use storefront_server::db::models::{Coupon, Product, ProductCreate};
use storefront_server::inventory::Stock;

pub fn test_config() -> Config {
    Config {
        work_dir: "./target/test-data".to_string(),
        http_port: 0,
        environment: "test".to_string(),
        jwt: JwtConfig::new("test-secret-at-least-32-bytes-long!!", 60),
        webhook_secret: "test-webhook-secret".to_string(),
        shipping_cost: 5.0,
        reservation_ttl_hours: 48,
        stock_retry_attempts: 3,
        stock_retry_delay_ms: 5,
    }
}

pub async fn test_state() -> AppState {
    let db = DbService::memory().await.expect("in-memory db");
    AppState::with_db(test_config(), db)
}

pub async fn seed_product(state: &AppState, name: &str, price: f64, stock: i64) -> Product {
    state
        .products
        .create(ProductCreate {
            name: name.to_string(),
            category: None,
            price,
            stock: Stock::Simple(stock),
        })
        .await
        .expect("seed product")
}

pub async fn seed_variant_product(
    state: &AppState,
    name: &str,
    price: f64,
    variants: &[(&str, i64)],
) -> Product {
    let map: BTreeMap<String, i64> = variants
        .iter()
        .map(|(label, qty)| (label.to_string(), *qty))
        .collect();
    state
        .products
        .create(ProductCreate {
            name: name.to_string(),
            category: Some("apparel".to_string()),
            price,
            stock: Stock::ByVariant(map),
        })
        .await
        .expect("seed variant product")
}

pub async fn seed_coupon(state: &AppState, code: &str, percent: i64, expires_at: i64) -> Coupon {
    use storefront_server::db::repository::CouponRepository;

    CouponRepository::new(state.db.db.clone())
        .create(Coupon {
            id: None,
            code: code.to_string(),
            discount_percent: percent,
            expires_at,
            total_usage: 0,
            total_discount_given: 0.0,
        })
        .await
        .expect("seed coupon")
}

/// Current simple stock of a product
pub async fn stock_of(state: &AppState, product: &Product) -> i64 {
    let current = state
        .products
        .find_by_id(&product.key())
        .await
        .expect("read product")
        .expect("product exists");
    match current.stock {
        Stock::Simple(qty) => qty,
        Stock::ByVariant(_) => panic!("expected simple stock"),
    }
}

/// Current stock for one variant
pub async fn variant_stock_of(state: &AppState, product: &Product, variant: &str) -> i64 {
    let current = state
        .products
        .find_by_id(&product.key())
        .await
        .expect("read product")
        .expect("product exists");
    current.stock.available(Some(variant)).expect("variant")
}
