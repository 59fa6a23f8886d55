// storefront/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod checkout_handlers;
pub mod coupon_handlers;
pub mod product_handlers;
