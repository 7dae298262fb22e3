//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use askgem_core::config;
use clap::Parser;

use crate::{interrupt, logging};

mod commands;

#[derive(Parser)]
#[command(name = "askgem")]
#[command(version)]
#[command(about = "Ask Gemini a question and render the answer as HTML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sends a prompt and prints the formatted answer
    Ask {
        /// The question to ask
        prompt: String,

        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,

        /// Write the HTML to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Open the written file in the browser
        #[arg(long, requires = "output")]
        open: bool,

        /// Print only the formatted answer, without the page around it
        #[arg(long)]
        fragment: bool,

        /// Skip wrapping raw code spans before formatting
        #[arg(long = "no-prewrap")]
        no_prewrap: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show or change the page theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

#[derive(clap::Subcommand)]
enum ThemeCommands {
    /// Print the effective theme
    Show,
    /// Switch between light and dark and save the choice
    Toggle,
    /// Save a specific theme
    Set {
        /// light or dark
        #[arg(value_name = "THEME")]
        theme: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init();
    interrupt::init();

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;

    match cli.command {
        Commands::Ask {
            prompt,
            model,
            output,
            open,
            fragment,
            no_prewrap,
        } => {
            commands::ask::run(commands::ask::AskOptions {
                prompt: &prompt,
                config: &config,
                model_override: model.as_deref(),
                output: output.as_deref(),
                open,
                fragment,
                no_prewrap,
            })
            .await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },

        Commands::Theme { command } => match command.unwrap_or(ThemeCommands::Show) {
            ThemeCommands::Show => {
                commands::theme::show(&config);
                Ok(())
            }
            ThemeCommands::Toggle => commands::theme::toggle(&config),
            ThemeCommands::Set { theme } => commands::theme::set(&theme),
        },
    }
}
