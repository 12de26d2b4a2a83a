//! Command-line inspector for strategy sources.

mod summary;
mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use shared::flow::build_flow;
use shared::strategy_parser::parse;
use shared::{init_logging, loader, render_report, Config};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "inspector")]
#[command(about = "Show what the strategy visualizer extracts from Python strategy code", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the strategy source comes from
#[derive(Debug, Args)]
struct Input {
    /// Strategy file, or `-` to read stdin
    #[arg(value_name = "FILE", required_unless_present = "name", conflicts_with = "name")]
    file: Option<PathBuf>,

    /// Resolve a stored strategy by name through the configured directories
    #[arg(long, value_name = "NAME")]
    name: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the parse outcome as JSON
    Parse {
        #[command(flatten)]
        input: Input,

        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Print a human-readable summary
    Summary {
        #[command(flatten)]
        input: Input,
    },

    /// Print the flow graph as JSON
    Flow {
        #[command(flatten)]
        input: Input,
    },

    /// Render the HTML report
    Report {
        #[command(flatten)]
        input: Input,

        /// Output HTML file
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,
    },

    /// Show build information
    Version,
}

async fn read_source(input: &Input, config: &Config) -> Result<String> {
    if let Some(name) = &input.name {
        let loaded = loader::load_strategy(name, config).await?;
        return Ok(loaded.code);
    }
    match input.file.as_deref() {
        Some(path) if path == Path::new("-") => {
            let mut code = String::new();
            tokio::io::stdin()
                .read_to_string(&mut code)
                .await
                .context("Failed to read strategy code from stdin")?;
            Ok(code)
        }
        Some(path) => loader::load_from_path(path).await,
        None => anyhow::bail!("either FILE or --name is required"),
    }
}

fn to_json(value: &impl serde::Serialize, compact: bool) -> Result<String> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(text)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_logging(&config);

    match cli.command {
        Commands::Parse { input, compact } => {
            let code = read_source(&input, &config).await?;
            println!("{}", to_json(&parse(&code), compact)?);
        }
        Commands::Summary { input } => {
            let code = read_source(&input, &config).await?;
            match parse(&code).strategy() {
                Some(strategy) => print!("{}", summary::render_summary(strategy)),
                None => println!("Nothing to visualize"),
            }
        }
        Commands::Flow { input } => {
            let code = read_source(&input, &config).await?;
            let output = match parse(&code).strategy() {
                Some(strategy) => json!({ "status": "parsed", "graph": build_flow(strategy) }),
                None => json!({ "status": "empty" }),
            };
            println!("{}", to_json(&output, false)?);
        }
        Commands::Report { input, output } => {
            let code = read_source(&input, &config).await?;
            let outcome = parse(&code);
            let Some(strategy) = outcome.strategy() else {
                warn!("Strategy has nothing to visualize, no report written");
                return Ok(());
            };
            let html = render_report(strategy, &code).context("Failed to render report")?;
            tokio::fs::write(&output, html)
                .await
                .with_context(|| format!("Failed to write report to {}", output.display()))?;
            info!("Report written to {}", output.display());
        }
        Commands::Version => {
            println!("{}", version::version_info());
        }
    }

    Ok(())
}
