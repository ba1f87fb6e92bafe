//! Database Models

pub mod coupon;
pub mod customer;
pub mod order;
pub mod product;
pub mod reservation;

pub use coupon::{COUPON_TABLE, Coupon};
pub use customer::{CUSTOMER_TABLE, Customer};
pub use order::{ORDER_TABLE, Order, OrderItem, OrderStatus};
pub use product::{PRODUCT_TABLE, Product, ProductCreate};
pub use reservation::{RESERVATION_TABLE, Reservation, ReservedItem};
