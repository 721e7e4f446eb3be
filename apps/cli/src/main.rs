//! OPJ Capture command-line client.

#![forbid(unsafe_code)]

mod commands;
mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use opj_capture_application::FieldService;
use opj_capture_core::{AppError, AppResult};
use opj_capture_infrastructure::{FileSessionStore, HttpFieldApiClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "opj-capture")]
#[command(about = "Field client for the OPJ capture API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate and persist the session
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Clear the persisted session
    Logout,
    /// Show the current user, role and capabilities
    Whoami,
    /// List visible bandits
    Bandits {
        /// Keep bandits whose name or alias contains this text
        #[arg(short, long)]
        query: Option<String>,
    },
    /// List visible captures
    Captures,
    /// List validated captures
    Validated,
    /// List the infraction catalogue
    Infractions,
    /// Show capture and bandit counters
    Dashboard,
    /// Register a new bandit
    CreateBandit(commands::NewBandit),
    /// Delete a bandit
    DeleteBandit {
        /// Bandit id
        id: i64,
    },
    /// Record a capture
    CreateCapture(commands::NewCapture),
    /// Delete a capture
    DeleteCapture {
        /// Capture id
        id: i64,
    },
    /// Reject a capture under review
    RejectCapture {
        /// Capture id
        id: i64,
    },
    /// Attach a reviewer comment to a capture
    CommentCapture {
        /// Capture id
        id: i64,
        /// Comment text
        comment: String,
    },
    /// Create an infraction
    CreateInfraction {
        /// Short title
        libelle: String,
        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete an infraction
    DeleteInfraction {
        /// Infraction id
        id: i64,
    },
    /// Approve an infraction
    ApproveInfraction {
        /// Infraction id
        id: i64,
    },
    /// Reject an infraction
    RejectInfraction {
        /// Infraction id
        id: i64,
    },
    /// Change the current user's password
    ChangePassword {
        /// Current password
        current: String,
        /// New password
        new: String,
        /// New password again
        confirm: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(error) = run(Cli::parse()).await {
        eprintln!("Error: {error}");
        std::process::exit(exit_code(&error));
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = CliConfig::load()?;
    let service = build_service(&config)?;

    info!(
        api_base_url = %config.api_base_url,
        session_path = %config.session_path.display(),
        "opj-capture started"
    );

    match cli.command {
        Command::Login { email, password } => {
            commands::login(&service, email.as_str(), password.as_str()).await
        }
        Command::Logout => commands::logout(&service).await,
        Command::Whoami => commands::whoami(&service).await,
        Command::Bandits { query } => commands::bandits(&service, query.as_deref()).await,
        Command::Captures => commands::captures(&service).await,
        Command::Validated => commands::validated(&service).await,
        Command::Infractions => commands::infractions(&service).await,
        Command::Dashboard => commands::dashboard(&service).await,
        Command::CreateBandit(bandit) => commands::create_bandit(&service, bandit).await,
        Command::DeleteBandit { id } => commands::delete_bandit(&service, id).await,
        Command::CreateCapture(capture) => commands::create_capture(&service, capture).await,
        Command::DeleteCapture { id } => commands::delete_capture(&service, id).await,
        Command::RejectCapture { id } => commands::reject_capture(&service, id).await,
        Command::CommentCapture { id, comment } => {
            commands::comment_capture(&service, id, comment.as_str()).await
        }
        Command::CreateInfraction {
            libelle,
            description,
        } => commands::create_infraction(&service, libelle, description).await,
        Command::DeleteInfraction { id } => commands::delete_infraction(&service, id).await,
        Command::ApproveInfraction { id } => commands::approve_infraction(&service, id).await,
        Command::RejectInfraction { id } => commands::reject_infraction(&service, id).await,
        Command::ChangePassword {
            current,
            new,
            confirm,
        } => commands::change_password(&service, current, new, confirm).await,
    }
}

fn build_service(config: &CliConfig) -> AppResult<FieldService> {
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    Ok(FieldService::new(
        Arc::new(HttpFieldApiClient::new(
            http_client,
            config.api_base_url.as_str(),
        )),
        Arc::new(FileSessionStore::new(config.session_path.clone())),
    ))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn exit_code(error: &AppError) -> i32 {
    match error {
        AppError::Validation(_) => 2,
        AppError::Unauthorized(_) | AppError::Forbidden(_) => 3,
        AppError::NotFound(_) | AppError::Conflict(_) => 4,
        AppError::Internal(_) => 1,
    }
}
