use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use clap::{Parser, Subcommand};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portfolio_server::{open_store, routes, seed, AppState, Config};

#[derive(Parser)]
#[command(name = "portfolio-server", version, about = "Portfolio management API over CSV tables")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Reset the demo user's data to the sample dataset
    SeedDemo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::SeedDemo => seed_demo(config).await,
    }
}

async fn seed_demo(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config.data_dir)?;
    let cost = config.bcrypt_cost;

    let user_id =
        tokio::task::spawn_blocking(move || seed::seed_demo_data(&store, cost)).await??;

    tracing::info!("Demo data ready for user {}. Log in as demo / demo.", user_id);
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting Portfolio Server...");
    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY is not set; using the development default");
    }

    let store = open_store(&config.data_dir)?;

    let seed_store = store.clone();
    let cost = config.bcrypt_cost;
    tokio::task::spawn_blocking(move || seed::ensure_default_user(&seed_store, cost)).await??;

    // Configure CORS
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let state = AppState::new(store, config.clone());

    let app = routes::router(state).layer(cors);
    let app = if config.log_requests {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    };

    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
