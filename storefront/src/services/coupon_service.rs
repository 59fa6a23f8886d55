// storefront/src/services/coupon_service.rs

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::Coupon;
use crate::store::CouponStore;

pub const REWARD_CODE_PREFIX: &str = "GIFT";
pub const REWARD_DISCOUNT_PERCENTAGE: i32 = 10;
pub const REWARD_VALIDITY_DAYS: i64 = 30;

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_SUFFIX_LEN: usize = 6;

/// `GIFT` followed by six random uppercase alphanumerics. Collisions are not checked.
pub fn generate_reward_code() -> String {
  let mut rng = rand::thread_rng();
  let suffix: String = (0..CODE_SUFFIX_LEN)
    .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
    .collect();
  format!("{}{}", REWARD_CODE_PREFIX, suffix)
}

pub fn new_reward_coupon(owner_user_id: Uuid, now: DateTime<Utc>) -> Coupon {
  Coupon {
    code: generate_reward_code(),
    discount_percentage: REWARD_DISCOUNT_PERCENTAGE,
    expiration_date: now + Duration::days(REWARD_VALIDITY_DAYS),
    owner_user_id,
    is_active: true,
    created_at: now,
  }
}

/// Mints a reward coupon and makes it the owner's only coupon.
#[instrument(name = "coupon_service::issue_reward_coupon", skip(store, now))]
pub async fn issue_reward_coupon(store: &dyn CouponStore, owner_user_id: Uuid, now: DateTime<Utc>) -> Result<Coupon> {
  let coupon = new_reward_coupon(owner_user_id, now);
  store.replace_for_owner(&coupon).await?;
  info!(code = %coupon.code, "Reward coupon issued.");
  Ok(coupon)
}

/// Active coupons are redeemable; expiry only counts when `enforce_expiration` is set.
pub fn is_redeemable(coupon: &Coupon, now: DateTime<Utc>, enforce_expiration: bool) -> bool {
  coupon.is_active && !(enforce_expiration && coupon.is_expired_at(now))
}

/// Looks up `code` for `owner_user_id` and applies the expiration policy.
pub async fn find_redeemable(
  store: &dyn CouponStore,
  code: &str,
  owner_user_id: Uuid,
  now: DateTime<Utc>,
  enforce_expiration: bool,
) -> Result<Option<Coupon>> {
  let coupon = store.find_active(code.trim(), owner_user_id).await?;
  Ok(coupon.filter(|c| is_redeemable(c, now, enforce_expiration)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryStore;

  #[test]
  fn reward_codes_have_prefix_and_uppercase_suffix() {
    for _ in 0..50 {
      let code = generate_reward_code();
      assert_eq!(code.len(), REWARD_CODE_PREFIX.len() + CODE_SUFFIX_LEN);
      assert!(code.starts_with(REWARD_CODE_PREFIX));
      assert!(code[4..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
  }

  #[test]
  fn reward_coupon_is_ten_percent_for_thirty_days() {
    let now = Utc::now();
    let coupon = new_reward_coupon(Uuid::new_v4(), now);
    assert_eq!(coupon.discount_percentage, 10);
    assert_eq!(coupon.expiration_date - now, Duration::days(30));
    assert!(coupon.is_active);
  }

  #[test]
  fn expiration_is_a_policy_choice() {
    let now = Utc::now();
    let mut coupon = new_reward_coupon(Uuid::new_v4(), now - Duration::days(40));
    assert!(coupon.is_expired_at(now));
    assert!(is_redeemable(&coupon, now, false));
    assert!(!is_redeemable(&coupon, now, true));

    coupon.is_active = false;
    assert!(!is_redeemable(&coupon, now, false));
  }

  #[tokio::test]
  async fn issuing_twice_leaves_only_the_newest_coupon() {
    let store = MemoryStore::default();
    let owner = Uuid::new_v4();
    let now = Utc::now();

    let first = issue_reward_coupon(&store, owner, now).await.unwrap();
    let second = issue_reward_coupon(&store, owner, now).await.unwrap();

    let active = store.find_active_for_owner(owner).await.unwrap().unwrap();
    assert_eq!(active.code, second.code);
    if first.code != second.code {
      assert!(find_redeemable(&store, &first.code, owner, now, false).await.unwrap().is_none());
    }
  }
}
