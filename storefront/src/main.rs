// storefront/src/main.rs

use std::sync::Arc;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use plant_storefront::config::AppConfig;
use plant_storefront::state::AppState;
use plant_storefront::store::{self, MemoryStore, PgStore, Store};
use plant_storefront::web::{configure_app_routes, cors_headers};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting plant storefront server...");

  let app_config = AppConfig::from_env().context("failed to load configuration")?;

  let store: Arc<dyn Store> = match &app_config.database_url {
    Some(url) => {
      let pg = PgStore::connect(url).await.context("failed to connect to the database")?;
      if app_config.apply_schema {
        pg.ensure_schema().await.context("failed to apply database schema")?;
      }
      Arc::new(pg)
    }
    None => {
      tracing::warn!("DATABASE_URL is not set; using the in-memory store. Data is lost on restart.");
      Arc::new(MemoryStore::new())
    }
  };

  if app_config.seed_db {
    store::seed_demo_data(store.as_ref()).await.context("failed to seed demo data")?;
  }

  let server_address = app_config.bind_address();
  let app_state = AppState::new(store, app_config);

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .configure(configure_app_routes)
      .wrap(cors_headers())
      .wrap(tracing_actix_web::TracingLogger::default())
  })
  .bind(&server_address)
  .with_context(|| format!("failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
