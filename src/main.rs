use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use env_logger::Env;

use crate::app_state::AppState;
use crate::args::Args;
use crate::config::Config;

mod address;
mod app_state;
mod args;
mod cache;
mod clock;
mod config;
mod handlers;
mod json_rpc;
mod metrics;
mod resolver;
mod rpc_client;
mod units;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let env_file = config::load_env_file(dotenvy::dotenv());

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if let Some(path) = env_file? {
        tracing::info!("Loaded environment from {}", path.display());
    }

    let args = Args::parse();
    let config = Config::from_args(&args).context("fail to load configuration")?;

    tracing::info!(
        "Linked mainnet to endpoint host {}",
        config.rpc_url.host_str().unwrap_or("<none>")
    );
    tracing::info!("Cache ttl is {}s", config.cache_ttl.as_secs());

    let app_state = web::Data::new(AppState::new(&config)?);

    tracing::info!("Server listening on {}:{}", args.bind, args.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(handlers::configure)
    })
    .bind((args.bind.as_str(), args.port))?
    .run()
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}
