//! CLI entry and dispatch.
//!
//! Every interactive command is a scripted sequence of UI events driven through
//! the runtime, followed by rendering of the resulting state.

use std::path::PathBuf;

use anyhow::{Context, Result};
use calmmap_core::config::Config;
use calmmap_core::session::{FileStorage, TokenStore};
use calmmap_ui::Runtime;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "calmmap")]
#[command(version)]
#[command(about = "Calm map listing client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CALMMAP_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CALMMAP_PASSWORD", hide_env_values = true)]
        password: String,
        /// Account role (default: user)
        #[arg(long)]
        role: Option<String>,
    },

    /// Sign out (forget the stored credential)
    Logout,

    /// Show the signed-in profile
    Whoami,

    /// Show or change sensory preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },

    /// Manage organizations
    Org {
        #[command(subcommand)]
        command: OrgCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum PrefsCommands {
    /// Print all preferences
    Show,
    /// Set preferences and save them, e.g. `smell=true lighting=off`
    Set {
        #[arg(value_name = "KEY=BOOL", required = true)]
        assignments: Vec<String>,
    },
}

#[derive(clap::Subcommand)]
enum OrgCommands {
    /// Create an organization at an address, optionally attaching images
    Create {
        /// Selected address label
        #[arg(long)]
        address: String,
        /// Organization type
        #[arg(long = "type", value_name = "TYPE")]
        organization_type: String,
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,
        /// Map image to upload
        #[arg(long, value_name = "PATH")]
        map: Option<PathBuf>,
        /// Picture to upload
        #[arg(long, value_name = "PATH")]
        picture: Option<PathBuf>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write the default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;
    // Commands still run when the log directory is unusable, just without a log file.
    let _log_guard = match calmmap_core::logging::init(&config) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: file logging disabled: {err:#}");
            None
        }
    };

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        Commands::Whoami => commands::auth::whoami(),
        Commands::Login { email, password } => {
            commands::auth::login(runtime(&config)?, email, password).await
        }
        Commands::Register {
            name,
            email,
            password,
            role,
        } => {
            let fields = calmmap_core::flows::AuthFields {
                name,
                email,
                password,
                role: role.unwrap_or_default(),
            };
            commands::auth::register(runtime(&config)?, fields).await
        }
        Commands::Logout => commands::auth::logout(runtime(&config)?).await,
        Commands::Prefs { command } => match command {
            PrefsCommands::Show => commands::prefs::show(runtime(&config)?).await,
            PrefsCommands::Set { assignments } => {
                commands::prefs::set(runtime(&config)?, &assignments).await
            }
        },
        Commands::Org { command } => match command {
            OrgCommands::Create {
                address,
                organization_type,
                lat,
                lon,
                map,
                picture,
            } => {
                let request = commands::org::CreateRequest {
                    address,
                    organization_type,
                    coordinates: lon.zip(lat),
                    map,
                    picture,
                };
                commands::org::create(runtime(&config)?, request).await
            }
        },
    }
}

/// Builds a runtime over the persisted credential.
fn runtime(config: &Config) -> Result<Runtime> {
    let tokens = TokenStore::new(FileStorage::default_location()).into_context();
    Runtime::from_config(config, tokens).context("create API client")
}
