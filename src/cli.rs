//! CLI interface for babytalk

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::brain::{Brain, JsonFileStore, ListTarget, OneOrMany, Request};
use crate::config::{self, Config};

#[derive(Parser)]
#[command(name = "babytalk")]
#[command(about = "A bot you teach to talk: trigger/reply pairs with a small HTTP API", long_about = None)]
#[command(version)]
struct Cli {
    /// Data file to use instead of the configured one
    #[arg(long, global = true, env = "BABYTALK_DATA_FILE")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
    /// Ask for a reply to a message
    Ask {
        text: String,
    },
    /// Teach one or more replies for a trigger
    Teach {
        trigger: String,
        #[arg(required = true)]
        replies: Vec<String>,
        /// Identity credited for this teach
        #[arg(short, long)]
        sender: Option<String>,
    },
    /// Replace all replies of a trigger with one reply
    Edit {
        trigger: String,
        replacement: String,
    },
    /// Remove a trigger, or a single reply with --index
    Remove {
        trigger: String,
        #[arg(short, long)]
        index: Option<String>,
    },
    /// Show trigger/teacher totals, or the reply count of one trigger
    List {
        #[arg(default_value = "all")]
        target: String,
    },
    /// Show aggregate statistics
    Stats,
    /// Show or initialize the configuration file
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,
    },
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(path) = cli.data_file {
        config.storage.data_file = Some(path);
    }

    match cli.command {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            crate::server::start(&config).await
        }
        Commands::Ask { text } => {
            let brain = local_brain(&config)?;
            println!("{}", brain.lookup(&text));
            Ok(())
        }
        Commands::Teach {
            trigger,
            replies,
            sender,
        } => {
            let replies = OneOrMany::many(replies).context("At least one reply is required")?;
            dispatch(&config, Request::Teach { trigger, replies, teacher: sender }).await
        }
        Commands::Edit {
            trigger,
            replacement,
        } => dispatch(&config, Request::Edit { trigger, replacement }).await,
        Commands::Remove { trigger, index } => {
            dispatch(&config, Request::Remove { trigger, index }).await
        }
        Commands::List { target } => {
            dispatch(&config, Request::List(ListTarget::from(target.as_str()))).await
        }
        Commands::Stats => {
            let brain = local_brain(&config)?;
            print_json(&brain.stats())
        }
        Commands::Config { init } => {
            if init {
                config.save()?;
                println!("Wrote {}", config::config_path()?.display());
            }
            println!("Config file: {}", config::config_path()?.display());
            println!("Data file:   {}", config.data_file()?.display());
            println!();
            print!("{}", toml::to_string_pretty(&config).unwrap_or_else(|_| config::default_config_toml()));
            Ok(())
        }
    }
}

fn local_brain(config: &Config) -> Result<Brain> {
    let store = JsonFileStore::new(config.data_file()?);
    Ok(Brain::new(Arc::new(store)))
}

async fn dispatch(config: &Config, request: Request) -> Result<()> {
    let brain = local_brain(config)?;
    let response = brain.handle(request).await?;
    print_json(&response)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
