//! Server Configuration
//!
//! Every setting has a default and can be overridden by environment
//! variable (loaded after `dotenv`):
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | ./data | Database and log files |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | JWT_SECRET | (dev default) | HS256 secret, 32+ bytes |
//! | JWT_EXPIRATION_MINUTES | 1440 | Token lifetime |
//! | WEBHOOK_SECRET | (dev default) | HMAC secret for payment notifications |
//! | SHIPPING_COST | 5.0 | Flat shipping per order |
//! | RESERVATION_TTL_HOURS | 48 | Cart hold lifetime |
//! | STOCK_RETRY_ATTEMPTS | 3 | Conditional-write retry ceiling |
//! | STOCK_RETRY_DELAY_MS | 50 | Base backoff between attempts |

use std::time::Duration;

use crate::auth::JwtConfig;
use crate::inventory::RetryPolicy;

const DEV_JWT_SECRET: &str = "storefront-development-jwt-secret-key!!";
const DEV_WEBHOOK_SECRET: &str = "storefront-development-webhook-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub jwt: JwtConfig,
    /// HMAC-SHA256 secret shared with the payment provider
    pub webhook_secret: String,
    /// Flat per-order shipping cost
    pub shipping_cost: f64,
    pub reservation_ttl_hours: i64,
    pub stock_retry_attempts: u32,
    pub stock_retry_delay_ms: u64,
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from environment variables, falling back to defaults.
    /// Production refuses to start on the development secrets.
    pub fn from_env() -> anyhow::Result<Self> {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string());
        let webhook_secret =
            std::env::var("WEBHOOK_SECRET").unwrap_or_else(|_| DEV_WEBHOOK_SECRET.to_string());

        if environment == "production" {
            anyhow::ensure!(
                jwt_secret != DEV_JWT_SECRET,
                "JWT_SECRET must be set in production"
            );
            anyhow::ensure!(
                webhook_secret != DEV_WEBHOOK_SECRET,
                "WEBHOOK_SECRET must be set in production"
            );
        }
        anyhow::ensure!(
            jwt_secret.len() >= 32,
            "JWT_SECRET must be at least 32 bytes"
        );

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".to_string()),
            http_port: env_parsed("HTTP_PORT", 3000),
            environment,
            jwt: JwtConfig::new(jwt_secret, env_parsed("JWT_EXPIRATION_MINUTES", 1440)),
            webhook_secret,
            shipping_cost: env_parsed("SHIPPING_COST", 5.0),
            reservation_ttl_hours: env_parsed("RESERVATION_TTL_HOURS", 48),
            stock_retry_attempts: env_parsed("STOCK_RETRY_ATTEMPTS", 3),
            stock_retry_delay_ms: env_parsed("STOCK_RETRY_DELAY_MS", 50),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn db_path(&self) -> String {
        format!("{}/storefront.db", self.work_dir)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.stock_retry_attempts,
            Duration::from_millis(self.stock_retry_delay_ms),
        )
    }

    pub fn reservation_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.reservation_ttl_hours)
    }
}
