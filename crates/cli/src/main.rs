//! GhDispatch CLI entry point.
//!
//! This binary is the composition root:
//!
//! 1. **Parse configuration**: load `ghdispatch.toml` (or `--config`) and apply
//!    flag and environment overrides.
//! 2. **Wire observability**: configure `tracing-subscriber` with an
//!    `EnvFilter` and either a pretty or a JSON layer on stderr.
//! 3. **Construct infrastructure**: a [`github::ReqwestTransport`] inside a
//!    [`github::GithubClient`], injected into [`trigger::TriggerActions`].
//! 4. **Run one subcommand** and print its result on stdout.

mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use github::{GithubClient, ReqwestTransport};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use trigger::TriggerActions;

use crate::commands::{parse_key_value, TriggerArgs};
use crate::config::{AppConfig, Overrides, DEFAULT_CONFIG_FILE};

#[derive(Debug, Parser)]
#[command(name = "ghdispatch", version, about = "Trigger GitHub Actions workflows by hand")]
struct Cli {
    /// Config file. Missing is fine unless given explicitly.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository owner (user or organisation).
    #[arg(long, global = true, env = "GHDISPATCH_OWNER")]
    owner: Option<String>,

    /// Repository name.
    #[arg(long, global = true, env = "GHDISPATCH_REPO")]
    repo: Option<String>,

    /// Personal access token.
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API base URL, for GitHub Enterprise.
    #[arg(long, global = true, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the repository's workflows.
    Workflows,
    /// List every branch, optionally filtered.
    Branches {
        /// Case-insensitive substring to match.
        #[arg(long)]
        search: Option<String>,
    },
    /// Show the options a workflow accepts.
    Options {
        /// Workflow id or name.
        workflow: String,
    },
    /// Dispatch a workflow.
    Trigger {
        /// Workflow id or name.
        workflow: String,
        /// Branch to run on.
        #[arg(long = "ref")]
        git_ref: String,
        /// Set a string option.
        #[arg(long = "input", value_name = "NAME=VALUE", value_parser = parse_key_value)]
        inputs: Vec<(String, String)>,
        /// Switch a boolean option on.
        #[arg(long, value_name = "NAME")]
        enable: Vec<String>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = AppConfig::load(&config_path, cli.config.is_some())?;
    config.apply(Overrides {
        owner: cli.owner,
        repo: cli.repo,
        token: cli.token,
        api_url: cli.api_url,
    });
    debug!(path = %config_path.display(), api_url = %config.github.api_url, "Configuration loaded");

    let transport = ReqwestTransport::new(config.timeout()).context("failed to build HTTP client")?;
    let client = GithubClient::new(config.github_config()?, transport)?;
    info!(repository = %client.repository(), "Using repository");
    let actions = TriggerActions::new(Arc::new(client), config.pagination());

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Workflows => commands::list_workflows(&actions, &mut out).await,
        Commands::Branches { search } => {
            commands::list_branches(&actions, search.as_deref(), &mut out).await
        }
        Commands::Options { workflow } => commands::list_options(&actions, &workflow, &mut out).await,
        Commands::Trigger { workflow, git_ref, inputs, enable } => {
            let args = TriggerArgs { workflow, git_ref, inputs, enable };
            commands::trigger(&actions, &args, &mut out).await
        }
    }
}
