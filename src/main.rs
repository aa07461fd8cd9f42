//! Status Supervisor - supervise a child process and relay embedded status updates.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use status_supervisor::child::ChildCommandBuilder;
use status_supervisor::config::{ConfigError, ConfigLoader, SupervisorConfig};
use status_supervisor::display;
use status_supervisor::report::HttpReporter;
use status_supervisor::supervisor::{Supervisor, SupervisorError};

#[derive(Parser)]
#[command(
    name = "status-supervisor",
    about = "Supervise a child process and relay embedded status updates",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to a TOML config file (skips the default search).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Working directory for the child process.
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Do not echo the child's diagnostic output.
    #[arg(long)]
    no_echo: bool,

    /// Callback URL that receives status reports.
    callback_url: Url,

    /// Child command and its arguments, forwarded untouched.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Supervise(#[from] SupervisorError),
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Logs go to stderr; stdout belongs to the child's passthrough.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<SupervisorConfig, ConfigError> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path.clone()),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;
    if cli.no_echo {
        config.echo_diagnostics = false;
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<i32, AppError> {
    let config = load_config(&cli)?;

    let mut builder = ChildCommandBuilder::new(&cli.command[0]).args(&cli.command[1..]);
    if let Some(dir) = &cli.workdir {
        builder = builder.working_dir(dir);
    }

    let reporter = Arc::new(HttpReporter::new(cli.callback_url.clone(), &config.report));
    tracing::info!(
        callback = %cli.callback_url,
        command = %builder.render(),
        "Starting supervision"
    );

    let supervisor = Supervisor::launch(&builder, reporter, config)?;
    let outcome = supervisor.run().await?;
    Ok(outcome.exit_code)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            display::print_error(&e.to_string());
            tracing::error!(error = %e, "Supervision failed");
            std::process::exit(1);
        }
    }
}
