//! MailPal - a Gmail drafting assistant
//!
//! Serves the analyze/refine/feedback HTTP API over the user's Gmail drafts.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use mailpal::assistant::Assistant;
use mailpal::config::{parse_addr, Config};
use mailpal::error::Result;
use mailpal::feedback::FeedbackCollector;
use mailpal::gmail::auth::Authenticator;
use mailpal::gmail::client::GmailClient;
use mailpal::llm::client::ChatClient;
use mailpal::server::{self, AppState};

#[derive(Parser)]
#[command(name = "mailpal")]
#[command(author, version, about = "MailPal - refine Gmail drafts with a language model")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with Gmail (run this first)
    Auth,

    /// Run the HTTP API (default)
    Serve {
        /// Bind address, overrides MAILPAL_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::new()?;

    match cli.command {
        Some(Commands::Auth) => {
            let authenticator = Authenticator::new(config).await?;
            authenticator.authenticate_interactive().await?;
            eprintln!("Authentication completed successfully!");
        }
        Some(Commands::Serve { addr }) => {
            if let Some(addr) = addr {
                config.server_addr = parse_addr(&addr)?;
            }
            run_server(config).await?;
        }
        None => run_server(config).await?,
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    config.find_and_copy_oauth_keys()?;
    if !config.oauth_keys_exist() {
        eprintln!("Error: OAuth keys file not found.");
        eprintln!(
            "Please place gcp-oauth.keys.json in current directory or {}",
            config.config_dir.display()
        );
        std::process::exit(1);
    }

    let model = ChatClient::from_config(&config.llm)?;
    tracing::info!(model = model.model(), "Using language model");

    let addr = config.server_addr;
    let feedback = FeedbackCollector::new(config.feedback_dir.clone());
    let gmail_base = config.gmail_api_base_url.clone();

    let authenticator = Authenticator::new(config).await?;
    if !authenticator.is_authenticated().await {
        eprintln!("Error: Not authenticated. Please run 'mailpal auth' first.");
        std::process::exit(1);
    }

    let drafts = GmailClient::new(Arc::new(authenticator), gmail_base);
    let assistant = Assistant::new(Arc::new(drafts), Arc::new(model), feedback);

    server::serve(
        addr,
        AppState {
            assistant: Arc::new(assistant),
        },
    )
    .await
}
