use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brainboard::ai::{DisabledGenerator, GeminiClient, TextGenerator};
use brainboard::api::{self, AppState};
use brainboard::auth::{DisabledIdentityProvider, GoogleOAuth, IdentityProvider, TokenIssuer};
use brainboard::config::{self, Config};
use brainboard::db::Database;
use brainboard::storage::{CloudinaryStorage, DisabledStorage, ObjectStorage};

#[derive(Parser)]
#[command(name = "brainboard")]
#[command(about = "Tasks, AI note summaries and AI learning plans")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database file (overrides DATABASE_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Apply pending database migrations and exit
    Migrate {
        /// SQLite database file (overrides DATABASE_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "brainboard=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<Database> {
    let db = match path {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate().context("Failed to run migrations")?;
    Ok(db)
}

fn build_state(config: &Config, db: Database) -> anyhow::Result<AppState> {
    let ai: Arc<dyn TextGenerator> = match &config.gemini {
        Some(gemini) => Arc::new(GeminiClient::new(gemini.clone())?),
        None => Arc::new(DisabledGenerator),
    };

    let storage: Arc<dyn ObjectStorage> = match &config.cloudinary {
        Some(cloudinary) => Arc::new(CloudinaryStorage::new(cloudinary.clone())?),
        None => Arc::new(DisabledStorage),
    };

    let identity: Arc<dyn IdentityProvider> = match &config.google {
        Some(google) => Arc::new(GoogleOAuth::new(google.clone())?),
        None => Arc::new(DisabledIdentityProvider),
    };

    Ok(AppState {
        db,
        ai,
        storage,
        identity,
        tokens: TokenIssuer::new(&config.jwt_secret),
    })
}

async fn serve(config: Config, port: Option<u16>, db_path: Option<PathBuf>) -> anyhow::Result<()> {
    let port = port.unwrap_or(config.port);
    tracing::info!("Starting brainboard server on port {}", port);

    let db = open_database(db_path.or_else(|| config.database_path.clone()))?;
    let state = build_state(&config, db)?;
    let app = api::create_router(state, &config.client_url);

    let addr = format!("{}:{}", config.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("brainboard listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port, db }) => serve(Config::from_env()?, port, db).await?,
        Some(Commands::Migrate { db }) => {
            open_database(db.or_else(config::database_path_from_env))?;
            tracing::info!("Migrations applied");
        }
        None => serve(Config::from_env()?, None, None).await?,
    }

    Ok(())
}
