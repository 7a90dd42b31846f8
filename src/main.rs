use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use env_logger::Env;

use crate::config::Config;
use crate::db::ledger_store::LedgerStore;
use crate::routes::{configure, initialize_app_state, json_config};

mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("invalid configuration")?;

    // A ledger that exists but cannot be read stops startup here
    let store = LedgerStore::open(&config.backend)
        .await
        .context("failed to open ledger store")?;
    let app_state = web::Data::new(
        initialize_app_state(store, &config)
            .await
            .context("failed to load ledger")?,
    );

    let json_limit = config.json_limit;
    log::info!("Backend running on http://{}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(json_config(json_limit))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
