//! Authentication Module
//!
//! Interface boundary to the external authentication service: HS256 JWT
//! validation and the request extractor. Role "admin" gates product
//! administration and the maintenance endpoint.

pub mod extractor;
pub mod jwt;

pub use jwt::{AuthUser, Claims, JwtConfig, JwtError, JwtService};
