use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chatdesk", about = "Local chat sessions with a filesystem side panel")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the hub server (default)
    Hub,

    /// Print the sub-directories of DIR as JSON
    Browse {
        /// Directory to list; defaults to the configured browse root
        dir: Option<String>,
    },

    /// Print one page of a session's messages as JSON
    Messages {
        session: String,
        /// Page size, clamped to 1..=500
        #[arg(long)]
        limit: Option<i64>,
        /// Only messages with a row id below this cursor
        #[arg(long)]
        before: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Hub) | None => chatdesk_hub::run_hub().await,
        Some(Commands::Browse { dir }) => {
            let listing = chatdesk_hub::run_browse(dir).await?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(())
        }
        Some(Commands::Messages {
            session,
            limit,
            before,
        }) => {
            let page = chatdesk_hub::run_messages(&session, limit, before)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
            Ok(())
        }
    }
}
