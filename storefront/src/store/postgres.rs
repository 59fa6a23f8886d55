// storefront/src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::{CouponStore, OrderStore, ProductStore, UserStore};
use crate::errors::{AppError, Result};
use crate::models::{CartEntry, Coupon, Order, Product, User};

/// Schema applied at startup when `DB_APPLY_SCHEMA=true`.
pub const SCHEMA_SQL: &str = include_str!("../../schema.sql");

const PRODUCT_COLUMNS: &str = "id, name, description, price, image, category, is_featured, created_at, updated_at";
const USER_COLUMNS: &str = "id, name, email, role, cart_items, created_at, updated_at";
const COUPON_COLUMNS: &str = "code, discount_percentage, expiration_date, owner_user_id, is_active, created_at";
const ORDER_COLUMNS: &str =
  "id, owner_user_id, line_items, total_amount, payment_session_id, status, paid_at, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn apply_schema(&self) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
    tracing::info!("Database schema applied.");
    Ok(())
  }
}

#[async_trait]
impl ProductStore for PgStore {
  async fn list_all(&self) -> Result<Vec<Product>> {
    let sql = format!("SELECT {} FROM products ORDER BY created_at, name", PRODUCT_COLUMNS);
    Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?)
  }

  async fn list_featured(&self) -> Result<Vec<Product>> {
    let sql = format!(
      "SELECT {} FROM products WHERE is_featured ORDER BY created_at, name",
      PRODUCT_COLUMNS
    );
    Ok(sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await?)
  }

  async fn list_by_category(&self, category: &str) -> Result<Vec<Product>> {
    let sql = format!(
      "SELECT {} FROM products WHERE category = $1 ORDER BY created_at, name",
      PRODUCT_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(category)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn sample(&self, size: usize) -> Result<Vec<Product>> {
    let sql = format!("SELECT {} FROM products ORDER BY random() LIMIT $1", PRODUCT_COLUMNS);
    let limit = i64::try_from(size).map_err(|_| AppError::Validation("Sample size too large".to_string()))?;
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS);
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::insert_product", skip_all, fields(product_id = %product.id))]
  async fn insert(&self, product: &Product) -> Result<()> {
    sqlx::query(
      "INSERT INTO products (id, name, description, price, image, category, is_featured, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.image)
    .bind(&product.category)
    .bind(product.is_featured)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn toggle_featured(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Product>> {
    let sql = format!(
      "UPDATE products SET is_featured = NOT is_featured, updated_at = $2 WHERE id = $1 RETURNING {}",
      PRODUCT_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?,
    )
  }
}

#[async_trait]
impl UserStore for PgStore {
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    Ok(
      sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn insert(&self, user: &User) -> Result<()> {
    sqlx::query(
      "INSERT INTO users (id, name, email, role, cart_items, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (email) DO NOTHING",
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.role)
    .bind(Json(&user.cart_items))
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn save_cart(&self, user_id: Uuid, cart_items: &[CartEntry], now: DateTime<Utc>) -> Result<()> {
    let result = sqlx::query("UPDATE users SET cart_items = $2, updated_at = $3 WHERE id = $1")
      .bind(user_id)
      .bind(Json(cart_items))
      .bind(now)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::NotFound(format!("User {} not found", user_id)));
    }
    Ok(())
  }
}

#[async_trait]
impl CouponStore for PgStore {
  async fn find_active(&self, code: &str, owner_user_id: Uuid) -> Result<Option<Coupon>> {
    let sql = format!(
      "SELECT {} FROM coupons WHERE code = $1 AND owner_user_id = $2 AND is_active",
      COUPON_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Coupon>(&sql)
        .bind(code)
        .bind(owner_user_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn find_active_for_owner(&self, owner_user_id: Uuid) -> Result<Option<Coupon>> {
    let sql = format!(
      "SELECT {} FROM coupons WHERE owner_user_id = $1 AND is_active",
      COUPON_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Coupon>(&sql)
        .bind(owner_user_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  #[instrument(name = "PgStore::replace_coupon", skip_all, fields(owner_user_id = %coupon.owner_user_id))]
  async fn replace_for_owner(&self, coupon: &Coupon) -> Result<()> {
    sqlx::query(
      "INSERT INTO coupons (code, discount_percentage, expiration_date, owner_user_id, is_active, created_at) \
       VALUES ($1, $2, $3, $4, $5, $6) \
       ON CONFLICT (owner_user_id) DO UPDATE SET \
         code = EXCLUDED.code, \
         discount_percentage = EXCLUDED.discount_percentage, \
         expiration_date = EXCLUDED.expiration_date, \
         is_active = EXCLUDED.is_active, \
         created_at = EXCLUDED.created_at",
    )
    .bind(&coupon.code)
    .bind(coupon.discount_percentage)
    .bind(coupon.expiration_date)
    .bind(coupon.owner_user_id)
    .bind(coupon.is_active)
    .bind(coupon.created_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn deactivate(&self, code: &str, owner_user_id: Uuid) -> Result<bool> {
    let result =
      sqlx::query("UPDATE coupons SET is_active = FALSE WHERE code = $1 AND owner_user_id = $2 AND is_active")
        .bind(code)
        .bind(owner_user_id)
        .execute(&self.pool)
        .await?;
    Ok(result.rows_affected() > 0)
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "PgStore::insert_order", skip_all, fields(order_id = %order.id))]
  async fn insert(&self, order: &Order) -> Result<Uuid> {
    sqlx::query(
      "INSERT INTO orders (id, owner_user_id, line_items, total_amount, payment_session_id, status, paid_at, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(order.id)
    .bind(order.owner_user_id)
    .bind(Json(&order.line_items))
    .bind(order.total_amount)
    .bind(&order.payment_session_id)
    .bind(order.status)
    .bind(order.paid_at)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(order.id)
  }

  async fn find_by_session_reference(&self, reference: &str) -> Result<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE payment_session_id = $1", ORDER_COLUMNS);
    Ok(
      sqlx::query_as::<_, Order>(&sql)
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn save(&self, order: &Order) -> Result<()> {
    let result = sqlx::query(
      "UPDATE orders SET line_items = $2, total_amount = $3, status = $4, paid_at = $5, updated_at = $6 WHERE id = $1",
    )
    .bind(order.id)
    .bind(Json(&order.line_items))
    .bind(order.total_amount)
    .bind(order.status)
    .bind(order.paid_at)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::NotFound(format!("Order {} not found", order.id)));
    }
    Ok(())
  }
}
