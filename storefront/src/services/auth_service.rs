// storefront/src/services/auth_service.rs

//! Access-token verification. Tokens are HS256 JWTs carrying the user id in a
//! `userId` claim.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  #[serde(rename = "userId")]
  pub user_id: Uuid,
  /// Expiry as seconds since the epoch.
  pub exp: i64,
}

fn expired() -> AppError {
  AppError::Auth("Unauthorized - Token has expired".to_string())
}

/// Decodes and validates `token`. Expiry is judged against `now`, the application
/// clock, not the host's wall time.
///
/// # Errors
/// `AppError::Auth` for an expired, malformed or wrongly signed token.
#[instrument(name = "auth_service::decode_access_token", skip_all, err(Display))]
pub fn decode_access_token(token: &str, secret: &str, now: DateTime<Utc>) -> Result<Claims> {
  let mut validation = Validation::new(Algorithm::HS256);
  validation.validate_exp = false;
  let claims = match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
    Ok(data) => data.claims,
    Err(e) => {
      return match e.kind() {
        ErrorKind::ExpiredSignature => Err(expired()),
        _ => {
          warn!(error = %e, "Access token rejected.");
          Err(AppError::Auth("Unauthorized - Invalid token".to_string()))
        }
      };
    }
  };

  if claims.exp <= now.timestamp() {
    debug!(user_id = %claims.user_id, exp = claims.exp, "Access token expired.");
    return Err(expired());
  }
  debug!(user_id = %claims.user_id, "Access token accepted.");
  Ok(claims)
}

/// Issues an access token for `user_id`, valid for `ttl` from `now`. Used when seeding and
/// in tests; sign-in lives elsewhere.
pub fn issue_access_token(user_id: Uuid, secret: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String> {
  let claims = Claims {
    user_id,
    exp: (now + ttl).timestamp(),
  };
  encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
    .map_err(|e| AppError::Internal(format!("Failed to sign access token: {}", e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  const SECRET: &str = "test-secret";

  fn issued_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
  }

  #[test]
  fn issued_token_round_trips_user_id() {
    let user_id = Uuid::new_v4();
    let token = issue_access_token(user_id, SECRET, Duration::minutes(15), Utc::now()).unwrap();
    assert_eq!(decode_access_token(&token, SECRET, Utc::now()).unwrap().user_id, user_id);
  }

  #[test]
  fn expiry_follows_supplied_clock_not_wall_time() {
    let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::hours(1), issued_at()).unwrap();

    assert!(decode_access_token(&token, SECRET, issued_at() + Duration::minutes(59)).is_ok());

    let err = decode_access_token(&token, SECRET, issued_at() + Duration::hours(1)).unwrap_err();
    assert!(matches!(err, AppError::Auth(ref m) if m.contains("expired")));
  }

  #[test]
  fn expired_token_is_unauthorized() {
    let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::minutes(15), Utc::now() - Duration::days(1)).unwrap();
    let err = decode_access_token(&token, SECRET, Utc::now()).unwrap_err();
    assert!(matches!(err, AppError::Auth(ref m) if m.contains("expired")));
  }

  #[test]
  fn wrong_secret_and_garbage_are_unauthorized() {
    let token = issue_access_token(Uuid::new_v4(), SECRET, Duration::minutes(15), Utc::now()).unwrap();
    assert!(matches!(decode_access_token(&token, "other", Utc::now()), Err(AppError::Auth(_))));
    assert!(matches!(decode_access_token("not-a-jwt", SECRET, Utc::now()), Err(AppError::Auth(_))));
  }
}
