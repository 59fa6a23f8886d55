// storefront/src/services/mod.rs

pub mod auth_service;
pub mod coupon_service;
pub mod pricing;
