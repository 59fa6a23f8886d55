// storefront/src/main.rs

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

use storefront::config::AppConfig;
use storefront::gateway::build_gateway;
use storefront::pipelines::register_all_pipelines;
use storefront::state::AppState;
use storefront::store::{PgStore, Stores};
use storefront::web::{configure_app_routes, json_config, path_config};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  storefront::init_tracing(app_config.log_format);
  info!("Starting storefront server...");

  let stores = match &app_config.database_url {
    Some(database_url) => {
      let pool = PgPool::connect(database_url)
        .await
        .context("Failed to connect to the database")?;
      info!("Connected to the database.");
      if app_config.apply_schema {
        PgStore::new(pool.clone()).apply_schema().await?;
      }
      Stores::postgres(pool)
    }
    None => {
      warn!("DATABASE_URL is not set; using in-memory stores.");
      Stores::in_memory()
    }
  };

  let gateway = build_gateway(&app_config)?;
  let app_state = AppState::new(app_config.clone(), stores, gateway, Arc::new(mockable::DefaultClock));
  register_all_pipelines(&app_state.sagas);

  if app_config.seed_demo_data {
    storefront::seed::seed_demo_data(&app_state).await?;
  }

  let server_address = app_config.server_address();
  info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone()))
      .app_data(json_config())
      .app_data(path_config())
      .wrap(TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await?;

  Ok(())
}
