//! Exercise tracker HTTP server entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use exercise_tracker::api::docs::openapi_json;
use exercise_tracker::api::{create_router, AppState, StaticAssets};
use exercise_tracker::config::{Config, LogFormat};
use exercise_tracker::metrics;
use exercise_tracker::store::{self, StoreUrl};
use exercise_tracker::utils::shutdown_signal;
use exercise_tracker::AppError;

/// Exercise tracking REST API.
#[derive(Parser, Debug)]
#[command(name = "exercise-tracker")]
#[command(about = "Record users and their exercises, and serve filtered exercise logs")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port (overrides PORT).
    #[arg(short, long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Store connection string (overrides DATABASE_URL).
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print the OpenAPI document as JSON.
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    config.verbose |= args.verbose;

    init_logging(&config);

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Openapi) => cmd_openapi(),
        Some(Command::Serve { database_url }) => {
            if let Some(url) = database_url {
                config.database_url = url;
            }
            cmd_serve(config).await
        }
        None => cmd_serve(config).await,
    }
}

/// Initialize the tracing subscriber.
fn init_logging(config: &Config) {
    let filter = if config.verbose {
        EnvFilter::new("exercise_tracker=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("EXERCISE TRACKER - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    match config.database_url.parse::<StoreUrl>() {
        Ok(StoreUrl::Memory(name)) => println!("  Store: in-memory ({})", name),
        Ok(StoreUrl::File(path)) => println!("  Store: file ({})", path.display()),
        Err(e) => println!("  Store: {}", e),
    }
    println!("  Public dir: {}", config.public_dir.display());
    println!("  Landing page: {}", config.index_page().display());
    match config.metrics_port {
        Some(port) => println!("  Metrics: port {}", port),
        None => println!("  Metrics: Disabled"),
    }
    println!("  Log format: {}", config.log_format);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the OpenAPI document.
fn cmd_openapi() -> anyhow::Result<()> {
    println!("{}", openapi_json()?);
    Ok(())
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    config.validate().map_err(AppError::InvalidConfig)?;

    metrics::init_metrics();
    if let Some(port) = config.metrics_port {
        metrics::install_exporter(SocketAddr::from(([0, 0, 0, 0], port))).map_err(AppError::from)?;
    }

    let store = store::connect(&config.database_url).await.map_err(AppError::from)?;
    let state = AppState::new(store);
    let router = create_router(state, &StaticAssets::from_config(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await.map_err(AppError::from)?;
    info!("Your app is listening on port {}", listener.local_addr()?.port());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
