#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use clap::{Parser, Subcommand};
use command::{
    ChatInput, ChatStrategy, CommandStrategy, DoctorStrategy, InfoStrategy, InitStrategy,
    ServeInput, ServeStrategy, VersionStrategy,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aura")]
#[command(about = "aura emotional-support companion", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(short = 'p', long)]
        port: Option<u16>,
    },
    /// Talk to the companion in the terminal
    Chat {
        /// Conversation to continue (a new one is created if omitted)
        #[arg(short = 'c', long)]
        conversation: Option<String>,

        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Detected emotion to hint to the companion
        #[arg(short = 'e', long)]
        emotion: Option<String>,

        /// Keep the conversation in memory only
        #[arg(long)]
        ephemeral: bool,
    },
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// Check the database and Gemini connections
    Doctor,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            ServeStrategy
                .execute(ServeInput { host, port })
                .await?;
        }
        Commands::Chat {
            conversation,
            message,
            emotion,
            ephemeral,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    conversation,
                    message,
                    emotion,
                    ephemeral,
                })
                .await?;
        }
        Commands::Init => InitStrategy.execute(()).await?,
        Commands::Info => InfoStrategy.execute(()).await?,
        Commands::Doctor => DoctorStrategy.execute(()).await?,
        Commands::Version => VersionStrategy.execute(()).await?,
    }

    Ok(())
}
