// Promptraits - portrait-prompt processor
// Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use promptraits::config::{load_config, CliOverrides};
use promptraits::knowledge::load_knowledge_base;
use promptraits::server::{self, AppState};

#[derive(Parser, Debug)]
#[command(name = "promptraits")]
#[command(author, version, about = "Turns portrait requests and photos into detailed image-generation prompts")]
struct Cli {
    /// Config file (default: ~/.promptraits/config.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Knowledge base directory
    #[arg(long, global = true, value_name = "DIR")]
    knowledge_dir: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Bind address, e.g. 0.0.0.0:8888
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,

        /// Gemini model identifier
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,
    },
    /// Print the aggregated knowledge block and exit
    Knowledge,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "promptraits=debug,tower_http=debug"
    } else {
        "promptraits=info,tower_http=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut overrides = CliOverrides {
        config_path: cli.config,
        knowledge_dir: cli.knowledge_dir,
        ..Default::default()
    };
    if let Some(Command::Serve { bind, model }) = &cli.command {
        overrides.bind_address = bind.clone();
        overrides.model = model.clone();
    }

    let config = load_config(&overrides)?;

    match cli.command {
        Some(Command::Knowledge) => {
            let block = load_knowledge_base(&config.knowledge.directory);
            eprintln!(
                "{} file(s) from {}{}",
                block.files().len(),
                config.knowledge.directory.display(),
                if block.is_degraded() { " (degraded)" } else { "" }
            );
            for name in block.files() {
                eprintln!("  - {}", name);
            }
            print!("{}", block);
            Ok(())
        }
        Some(Command::Serve { .. }) | None => {
            let state = Arc::new(AppState::from_config(&config)?);
            server::serve(state, &config.server).await
        }
    }
}
