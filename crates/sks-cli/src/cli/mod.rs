//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use sks_core::config::{self, Config};
use sks_core::context::Context;
use sks_core::logging;
use sks_core::storage::FileStorage;
use tokio::runtime::Runtime;
use tracing::debug;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "sks")]
#[command(version)]
#[command(about = "Script-kill booking client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the API base URL (takes precedence over `SKS_BASE_URL` and config)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(flatten)]
    Session(SessionCommands),

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Commands that run against the stored session and the API.
#[derive(clap::Subcommand)]
enum SessionCommands {
    /// Log in with username and password
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (read from stdin when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the stored session without contacting the server
    Status,

    /// Refresh the profile from the server and print it
    Whoami,

    /// Check whether a view path may be entered
    Open {
        /// View path, e.g. /orders or /scripts/12
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// Browse scripts
    Scripts {
        #[command(subcommand)]
        command: ScriptCommands,
    },

    /// Player orders
    Orders {
        #[command(subcommand)]
        command: MineCommands,
    },

    /// Player seat locks
    Locks {
        #[command(subcommand)]
        command: MineCommands,
    },

    /// Raw API access through the request pipeline
    Api {
        #[command(subcommand)]
        command: ApiCommands,
    },
}

#[derive(clap::Subcommand)]
enum ScriptCommands {
    /// List scripts
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
    },
    /// Most booked scripts
    Hot {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Show one script
    Show {
        #[arg(value_name = "SCRIPT_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum MineCommands {
    /// List the current user's records
    Mine,
}

#[derive(clap::Subcommand)]
enum ApiCommands {
    /// GET a path relative to the base URL and print the unwrapped data
    Get {
        #[arg(value_name = "PATH")]
        path: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Persist the API base URL in the config file
    SetBaseUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;
    let _log_guard = logging::init(config.log_file.as_deref())?;

    let Cli { command, base_url } = cli;

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::SetBaseUrl { url } => commands::config::set_base_url(&url),
        },
        Commands::Session(command) => {
            let ctx = build_context(&config, base_url.as_deref())?;
            run_session_command(&ctx, command).await
        }
    }
}

async fn run_session_command(ctx: &Context, command: SessionCommands) -> Result<()> {
    match command {
        SessionCommands::Login { username, password } => {
            commands::auth::login(ctx, &username, password).await
        }
        SessionCommands::Logout => {
            commands::auth::logout(ctx);
            Ok(())
        }
        SessionCommands::Status => {
            commands::auth::status(ctx);
            Ok(())
        }
        SessionCommands::Whoami => commands::auth::whoami(ctx).await,
        SessionCommands::Open { path } => commands::navigate::open(ctx, &path).await,
        SessionCommands::Scripts { command } => match command {
            ScriptCommands::List { status } => {
                commands::data::scripts_list(ctx, status.as_deref()).await
            }
            ScriptCommands::Hot { limit } => commands::data::scripts_hot(ctx, limit).await,
            ScriptCommands::Show { id } => commands::data::scripts_show(ctx, &id).await,
        },
        SessionCommands::Orders {
            command: MineCommands::Mine,
        } => commands::data::orders_mine(ctx).await,
        SessionCommands::Locks {
            command: MineCommands::Mine,
        } => commands::data::locks_mine(ctx).await,
        SessionCommands::Api {
            command: ApiCommands::Get { path },
        } => commands::data::api_get(ctx, &path).await,
    }
}

fn build_context(config: &Config, base_url_override: Option<&str>) -> Result<Context> {
    let base_url = match base_url_override {
        Some(url) => config::resolve_base_url(Some(url), &config.base_url)?,
        None => config.effective_base_url()?,
    };
    debug!(%base_url, "using API base URL");

    Context::with_base_url(
        &base_url,
        config,
        Arc::new(FileStorage::default_location()),
        Arc::new(output::CliNavigator),
        Arc::new(output::StderrNotifier),
    )
}
