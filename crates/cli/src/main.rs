//! GodChat CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize the config directory
//! - `serve`   — Start the HTTP gateway
//! - `chat`    — Talk to the assistant from the terminal
//! - `history` — Inspect the persisted transcript

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "godchat",
    about = "GodChat — conversational relay to an LLM completion endpoint",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Continue an existing session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Show the persisted transcript
    History {
        /// Restrict to one session
        #[arg(short, long)]
        session: Option<String>,

        /// Maximum turns to show
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Chat { message, session } => commands::chat::run(message, session).await?,
        Commands::History { session, limit } => commands::history::run(session, limit).await?,
    }

    Ok(())
}
