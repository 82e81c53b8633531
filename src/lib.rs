#[macro_use]
extern crate rocket;

use std::sync::Arc;

use bson::doc;
use mongodb::Client;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::{Config, StorageBackend};
use crate::data::memory::MemoryStore;
use crate::data::store::Stores;
use crate::enrollment::Enrollment;
use crate::error::{BackendError, ConfigurationError};
use crate::route::mount_api;

pub mod config;
pub mod data;
pub mod enrollment;
pub mod error;
pub mod resp;
pub mod route;
pub mod util;

fn init_logging(level: Level) {
    if let Err(err) = tracing_log::LogTracer::init() {
        eprintln!("Unable to forward log records: {}", err);
    }

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Unable to set global logger: {}", err);
    };
}

fn load_config() -> Result<Config, ConfigurationError> {
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(dir)) => {
            tracing::info!("No configuration in '{}', using defaults.", dir.display());
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other);
        }
    };

    c.validate()?;
    Ok(c)
}

async fn connect_mongodb(c: &Config) -> Result<Stores, BackendError> {
    tracing::info!("Connecting to MongoDB: {}", c.mongodb_uri);
    let client = Client::with_uri_str(c.mongodb_uri.as_str()).await?;

    tracing::info!("Using MongoDB database: {}", c.mongodb_db);
    let db = client.database(c.mongodb_db.as_str());

    if let Err(e) = db.run_command(doc! { "ping": 1 }, None).await {
        tracing::error!("Unable to connect to MongoDB.");
        return Err(e.into());
    }

    tracing::info!("Ensuring selection indexes...");
    data::selection::db::ensure_indexes(&db).await?;

    Ok(Stores::mongodb(db))
}

pub async fn create(log_level: Option<Level>) -> Result<Rocket<Build>, BackendError> {
    if let Some(l) = log_level {
        init_logging(l);
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = load_config()?;

    let stores = match c.storage {
        StorageBackend::MongoDb => connect_mongodb(&c).await?,
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data will be lost on shutdown.");
            Stores::memory(Arc::new(MemoryStore::new()))
        }
    };

    build(c, stores)
}

/// Assembles the HTTP server around already connected stores.
pub fn build(c: Config, stores: Stores) -> Result<Rocket<Build>, BackendError> {
    tracing::info!("Starting HTTP server...");
    let figment = rocket::Config::figment().merge(("port", c.port));
    let enrollment = Enrollment::from_stores(&stores);
    let mut r = rocket::custom(figment)
        .manage(c)
        .manage(stores)
        .manage(enrollment);

    tracing::info!("Setting up CORS...");
    let cors = rocket_cors::CorsOptions {
        allowed_origins: AllowedOrigins::All,
        allowed_methods: vec![Method::Get, Method::Put, Method::Post, Method::Delete]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: AllowedHeaders::All,
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()?;

    r = r.attach(cors);
    r = mount_api(r);

    Ok(r)
}
