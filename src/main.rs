use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use coursegate::api::{self, middleware::SecurityConfig};
use coursegate::config::Config;
use coursegate::db::Database;
use coursegate::engine::Engine;

#[derive(Parser)]
#[command(name = "cgate")]
#[command(about = "Course progression gating and learning analytics")]
struct Cli {
    /// SQLite database file (overrides COURSEGATE_DATABASE)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides the port in COURSEGATE_BIND)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit
    Migrate,
    /// Print a student's analytics summary as JSON
    Summary {
        /// Student UUID
        student_id: Uuid,
    },
    /// Print a team leader's analytics as JSON
    Team {
        /// Team leader UUID
        team_leader_id: Uuid,
    },
}

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        // Logs go to stderr so JSON reports on stdout stay clean.
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    let db = Database::open(config.database_path.clone())?;
    db.migrate()?;
    Ok(db)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    init_tracing(&config.log_filter);

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.bind_address.set_port(port);
            }
            serve(config).await?;
        }
        Commands::Migrate => {
            open_database(&config)?;
            tracing::info!("Database at {} is up to date", config.database_path.display());
        }
        Commands::Summary { student_id } => {
            let engine = Engine::new(open_database(&config)?);
            let summary = engine.student_summary(student_id)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Team { team_leader_id } => {
            let engine = Engine::new(open_database(&config)?);
            let analytics = engine.team_leader_analytics(team_leader_id)?;
            println!("{}", serde_json::to_string_pretty(&analytics)?);
        }
    }

    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let db = open_database(&config)?;
    let security = SecurityConfig::from_env();

    if let Some(limiter) = security.rate_limiter.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup();
            }
        });
    }
    if security.api_key.is_none() {
        tracing::warn!("COURSEGATE_API_KEY is not set; the API is unauthenticated");
    }

    let app = api::create_router_with_security(db, security);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    tracing::info!("coursegate listening on http://{}", config.bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
