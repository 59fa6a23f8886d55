// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

const MAX_CACHE_TTL_SECS: i64 = 30 * 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
  Paystack,
  Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// No URL means the in-memory stores are used.
  pub database_url: Option<String>,
  pub apply_schema: bool,
  pub seed_demo_data: bool,
  pub client_url: String,

  pub payment_gateway: GatewayKind,
  pub paystack_base_url: String,
  pub paystack_secret_key: Option<String>,
  pub gateway_timeout_secs: u64,

  pub access_token_secret: String,

  pub featured_cache_ttl_secs: i64,
  pub reward_threshold: Decimal,
  pub enforce_coupon_expiration: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|var_name| env::var(var_name).ok())
  }

  /// Builds the configuration from any key lookup, so tests need not touch the process
  /// environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| {
      lookup(var_name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };
    let env_or = |var_name: &str, default: &str| get_env(var_name).unwrap_or_else(|_| default.to_string());

    let server_host = env_or("SERVER_HOST", "127.0.0.1");
    let server_port = env_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL").ok();
    let apply_schema = parse_bool(&env_or("DB_APPLY_SCHEMA", "false"), "DB_APPLY_SCHEMA")?;
    let seed_demo_data = parse_bool(&env_or("SEED_DEMO_DATA", "false"), "SEED_DEMO_DATA")?;
    let client_url = env_or("CLIENT_URL", "http://localhost:5173")
      .trim_end_matches('/')
      .to_string();

    let payment_gateway = match env_or("PAYMENT_GATEWAY", "paystack").to_ascii_lowercase().as_str() {
      "paystack" => GatewayKind::Paystack,
      "mock" => GatewayKind::Mock,
      other => {
        return Err(AppError::Config(format!(
          "Invalid PAYMENT_GATEWAY '{}': expected 'paystack' or 'mock'",
          other
        )))
      }
    };
    let paystack_base_url = env_or("PAYSTACK_BASE_URL", "https://api.paystack.co");
    let paystack_secret_key = get_env("PAYSTACK_SECRET_KEY").ok();
    if payment_gateway == GatewayKind::Paystack && paystack_secret_key.is_none() {
      return Err(AppError::Config(
        "PAYSTACK_SECRET_KEY is required when PAYMENT_GATEWAY=paystack".to_string(),
      ));
    }
    let gateway_timeout_secs = env_or("PAYMENT_GATEWAY_TIMEOUT_SECS", "30")
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid PAYMENT_GATEWAY_TIMEOUT_SECS: {}", e)))?;

    let access_token_secret = get_env("ACCESS_TOKEN_SECRET")?;

    let featured_cache_ttl_secs = env_or("FEATURED_CACHE_TTL_SECS", "3600")
      .parse::<i64>()
      .ok()
      .filter(|ttl| (1..=MAX_CACHE_TTL_SECS).contains(ttl))
      .ok_or_else(|| {
        AppError::Config(format!(
          "FEATURED_CACHE_TTL_SECS must be between 1 and {}",
          MAX_CACHE_TTL_SECS
        ))
      })?;
    let reward_threshold = Decimal::from_str(&env_or("REWARD_THRESHOLD", "200"))
      .map_err(|e| AppError::Config(format!("Invalid REWARD_THRESHOLD: {}", e)))?;
    let enforce_coupon_expiration = parse_bool(
      &env_or("ENFORCE_COUPON_EXPIRATION", "false"),
      "ENFORCE_COUPON_EXPIRATION",
    )?;
    let log_format = match env_or("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
      "text" => LogFormat::Text,
      "json" => LogFormat::Json,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT '{}'", other))),
    };

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      apply_schema,
      seed_demo_data,
      client_url,
      payment_gateway,
      paystack_base_url,
      paystack_secret_key,
      gateway_timeout_secs,
      access_token_secret,
      featured_cache_ttl_secs,
      reward_threshold,
      enforce_coupon_expiration,
      log_format,
    })
  }

  /// Where the gateway redirects the buyer after payment.
  pub fn payment_callback_url(&self) -> String {
    format!("{}/payment/callback", self.client_url)
  }

  pub fn server_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_bool(value: &str, var_name: &str) -> Result<bool> {
  value
    .to_ascii_lowercase()
    .parse::<bool>()
    .map_err(|e| AppError::Config(format!("Invalid {} value: {}", var_name, e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key: &str| map.get(key).cloned()
  }

  #[test]
  fn defaults_apply_for_mock_gateway() {
    let config = AppConfig::from_lookup(lookup_from(&[
      ("ACCESS_TOKEN_SECRET", "secret"),
      ("PAYMENT_GATEWAY", "mock"),
    ]))
    .unwrap();

    assert_eq!(config.server_address(), "127.0.0.1:8080");
    assert_eq!(config.database_url, None);
    assert_eq!(config.payment_gateway, GatewayKind::Mock);
    assert_eq!(config.payment_callback_url(), "http://localhost:5173/payment/callback");
    assert_eq!(config.featured_cache_ttl_secs, 3600);
    assert_eq!(config.reward_threshold, Decimal::from(200));
    assert!(!config.enforce_coupon_expiration);
    assert_eq!(config.log_format, LogFormat::Text);
  }

  #[test]
  fn paystack_requires_secret_key() {
    let err = AppConfig::from_lookup(lookup_from(&[("ACCESS_TOKEN_SECRET", "secret")])).unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("PAYSTACK_SECRET_KEY")));
  }

  #[test]
  fn access_token_secret_is_required() {
    let err = AppConfig::from_lookup(lookup_from(&[("PAYMENT_GATEWAY", "mock")])).unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("ACCESS_TOKEN_SECRET")));
  }

  #[test]
  fn invalid_values_are_config_errors() {
    let base = [("ACCESS_TOKEN_SECRET", "secret"), ("PAYMENT_GATEWAY", "mock")];
    for (key, value) in [
      ("SERVER_PORT", "eighty"),
      ("ENFORCE_COUPON_EXPIRATION", "sometimes"),
      ("REWARD_THRESHOLD", "lots"),
      ("FEATURED_CACHE_TTL_SECS", "0"),
      ("LOG_FORMAT", "xml"),
    ] {
      let mut pairs = base.to_vec();
      pairs.push((key, value));
      let result = AppConfig::from_lookup(lookup_from(&pairs));
      assert!(matches!(result, Err(AppError::Config(_))), "{} = {} should be rejected", key, value);
    }
  }

  #[test]
  fn client_url_trailing_slash_is_trimmed() {
    let config = AppConfig::from_lookup(lookup_from(&[
      ("ACCESS_TOKEN_SECRET", "secret"),
      ("PAYMENT_GATEWAY", "mock"),
      ("CLIENT_URL", "https://shop.example.com/"),
      ("ENFORCE_COUPON_EXPIRATION", "TRUE"),
    ]))
    .unwrap();
    assert_eq!(config.payment_callback_url(), "https://shop.example.com/payment/callback");
    assert!(config.enforce_coupon_expiration);
  }
}
