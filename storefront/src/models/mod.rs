// storefront/src/models/mod.rs

//! Data structures for the stored entities and the transient checkout input.

pub mod cart_item;
pub mod coupon;
pub mod order;
pub mod product;
pub mod user;

pub use cart_item::{CartLine, CartProductView};
pub use coupon::Coupon;
pub use order::{Order, OrderLineItem, OrderStatus};
pub use product::{NewProduct, Product};
pub use user::{CartEntry, User, UserRole};
