use clap::Parser;
use dotenv::dotenv;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use recipe_api::db;
use recipe_api::server::config::ServerConfig;
use recipe_api::web;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Listen address override, e.g. 0.0.0.0:8000
    #[arg(short, long)]
    listen: Option<String>,
}

fn init_logging() {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily("logs", "recipe-api.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    // Default to `info` level if RUST_LOG is not set.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    init_logging();
    dotenv().ok();

    let mut config = ServerConfig::from_env().map_err(|e| {
        error!("Failed to load server configuration: {}", e);
        e
    })?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    let config = Arc::new(config);

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(10);

    let db_pool: DatabaseConnection = Database::connect(opt).await?;

    db::create_tables(&db_pool).await?;

    let app = web::create_axum_router(db_pool, config.clone());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("recipe-api listening on {}", config.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    info!("shutting down");
}
