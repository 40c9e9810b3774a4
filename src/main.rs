//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::{commands, server, Folio, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Blog content pipeline for a personal portfolio site", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./folio.yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Directory served under /static
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// List posts on the content host
    List {
        /// Only posts whose title contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a single post
    Show {
        /// Slug of the post
        slug: String,

        /// Print rendered HTML instead of markdown
        #[arg(long)]
        html: bool,
    },

    /// Fetch, validate and render every post
    Check,

    /// Create a new post file
    New {
        /// Title of the new post
        title: String,

        /// Post description (defaults to the title)
        #[arg(long)]
        description: Option<String>,

        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug { "folio=debug,info" } else { "folio=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    match cli.command {
        Commands::Serve {
            port,
            ip,
            static_dir,
        } => {
            let folio = Arc::new(Folio::new(&config_path)?);
            tracing::info!("Starting server at http://{}:{}", ip, port);
            server::start(folio, &ip, port, static_dir).await?;
        }

        Commands::List { search } => {
            let folio = Folio::new(&config_path)?;
            commands::list::run(&folio, search.as_deref()).await?;
        }

        Commands::Show { slug, html } => {
            let folio = Folio::new(&config_path)?;
            commands::show::run(&folio, &slug, html).await?;
        }

        Commands::Check => {
            let folio = Folio::new(&config_path)?;
            tracing::info!("Checking posts...");
            commands::check::run(&folio).await?;
        }

        Commands::New {
            title,
            description,
            output,
        } => {
            tracing::info!("Creating new post with title: {}", title);
            commands::new::create_post(
                &output,
                &title,
                description.as_deref(),
                chrono::Utc::now(),
            )?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
