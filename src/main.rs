mod api;
mod cli;
mod config;
mod error;
mod lens;
mod logger;
mod observe;
mod telemetry;

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::lens::LensClient;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Cli::parse();

    let cfg = match Config::init_global() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Failed to load config: {err}");
            std::process::exit(1);
        }
    };

    let provider = match telemetry::init_tracer_provider() {
        Ok(provider) => provider,
        Err(err) => {
            eprintln!("Failed to init telemetry: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = logger::init_logger(cfg, provider.as_ref()) {
        eprintln!("Failed to init logger: {err}");
        std::process::exit(1);
    }

    let code = match args.command {
        Command::Serve { address } => serve(cfg, &address).await,
        Command::Status { jobid } => cli::status_command(&cfg.lens_url, &jobid).await,
    };

    telemetry::shutdown(provider);
    std::process::exit(code);
}

async fn serve(cfg: &Config, address: &str) -> i32 {
    // A missing LENS_URL is not fatal for the server: /metrics still
    // serves, and every status lookup reports the initialization failure.
    let lens = match LensClient::new(&cfg.lens_url) {
        Ok(client) => {
            info!(lens_url = %client.url(), "lens client configured");
            Some(Arc::new(client))
        }
        Err(err) => {
            error!("lens client unavailable: {err}");
            None
        }
    };

    let app = api::router(api::AppState { lens });

    let listener = match tokio::net::TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {address}: {err}");
            return 1;
        }
    };
    info!("Listening on {address}");

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    if let Err(err) = server.with_graceful_shutdown(shutdown_signal()).await {
        error!("Server error: {err}");
        return 1;
    }
    0
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
