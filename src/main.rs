//! mdgraph CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::MdgraphConfig;

#[derive(Parser)]
#[command(name = "mdgraph")]
#[command(about = "Live link graph of a directory of markdown notes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to mdgraph.toml in the source directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Args)]
struct PathArgs {
    /// Directory of documents
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Rendered HTML output file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the graph, then re-render on every change until interrupted
    Watch {
        #[command(flatten)]
        paths: PathArgs,

        /// Open the rendered page in the browser
        #[arg(long)]
        open: bool,
    },
    /// Render the graph once and exit
    Render {
        #[command(flatten)]
        paths: PathArgs,
    },
    /// Watch and serve a live-reloading preview
    Serve {
        #[command(flatten)]
        paths: PathArgs,

        /// Port to listen on
        #[arg(short, long, default_value = "7890")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Open the preview in the browser
        #[arg(long)]
        open: bool,
    },
    /// Show version
    Version,
}

fn load_config(config: Option<&PathBuf>, paths: PathArgs) -> anyhow::Result<MdgraphConfig> {
    let config = MdgraphConfig::load(config.map(PathBuf::as_path), paths.source.as_deref())?;
    Ok(config.with_overrides(paths.source, paths.output))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mdgraph={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Watch { paths, open } => {
            let config = load_config(cli.config.as_ref(), paths)?;
            commands::watch(config, open).await
        }
        Commands::Render { paths } => {
            let config = load_config(cli.config.as_ref(), paths)?;
            commands::render(config).await
        }
        Commands::Serve {
            paths,
            port,
            host,
            open,
        } => {
            let config = load_config(cli.config.as_ref(), paths)?;
            commands::serve(config, host, port, open).await
        }
        Commands::Version => {
            println!("mdgraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
