//! deskhost - desktop shell host
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};

use deskhost_backend::{User, DEFAULT_BASE_URL};
use deskhost_core::RuntimeMode;

/// deskhost - desktop shell that supervises a local backend process
#[derive(Parser, Debug)]
#[command(name = "deskhost")]
#[command(about = "Desktop shell host that supervises a local backend process", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Application root (defaults to the current directory)
    #[arg(long, value_name = "PATH", global = true)]
    root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the shell (default)
    Run {
        /// development or packaged (falls back to DESKHOST_MODE, then the build profile)
        #[arg(long, value_parser = parse_mode)]
        mode: Option<RuntimeMode>,

        /// Packaged resources directory (defaults to `resources` next to the executable)
        #[arg(long, value_name = "PATH")]
        resources_dir: Option<PathBuf>,
    },

    /// Write a default .deskhost/config.toml under the application root
    Init,

    /// Call the backend's HTTP API
    Api {
        /// Backend base URL
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,

        #[command(subcommand)]
        call: ApiCall,
    },
}

#[derive(Subcommand, Debug)]
enum ApiCall {
    /// GET /api/hello
    Hello,

    /// POST /api/user
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        salary: f64,
        #[arg(long)]
        job: Option<String>,
        #[arg(long)]
        tax: Option<f64>,
    },
}

fn parse_mode(value: &str) -> std::result::Result<RuntimeMode, String> {
    RuntimeMode::parse(value)
        .ok_or_else(|| format!("unknown mode `{}` (expected development or packaged)", value))
}

/// `<exe dir>/resources`, or `resources` under the root when that can't be determined
fn default_resources_dir(app_root: &Path) -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("resources")))
        .unwrap_or_else(|| app_root.join("resources"))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    deskhost_core::logging::init()?;

    let args = Args::parse();

    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let app_root = dunce::canonicalize(&root)
        .map_err(|e| eyre!("Application root {} is not accessible: {}", root.display(), e))?;

    match args.command.unwrap_or(Command::Run {
        mode: None,
        resources_dir: None,
    }) {
        Command::Run {
            mode,
            resources_dir,
        } => {
            let mode = RuntimeMode::detect(mode);
            let resources_dir = resources_dir.unwrap_or_else(|| default_resources_dir(&app_root));
            let resources_dir = dunce::canonicalize(&resources_dir).unwrap_or(resources_dir);

            deskhost::run_console(mode, &app_root, &resources_dir).await?;
        }

        Command::Init => {
            let path = deskhost_app::config::init_config_dir(&app_root)?;
            eprintln!("Config written to {}", path.display());
        }

        Command::Api { base_url, call } => match call {
            ApiCall::Hello => deskhost::api::hello(&base_url).await?,
            ApiCall::CreateUser {
                name,
                salary,
                job,
                tax,
            } => {
                let user = User {
                    name,
                    job,
                    salary,
                    tax,
                };
                deskhost::api::create_user(&base_url, user).await?;
            }
        },
    }

    Ok(())
}
