// storefront/src/lib.rs

//! Storefront backend: product catalog, carts, coupons, and a checkout flow that opens
//! hosted payment sessions and reconciles them once the buyer has paid.

pub mod cache;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod pipelines;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);

  let installed = match format {
    LogFormat::Json => builder.json().try_init(),
    LogFormat::Text => builder.try_init(),
  };
  if let Err(e) = installed {
    eprintln!("Tracing subscriber was already installed: {}", e);
  }
}
