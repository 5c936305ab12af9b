use crate::commands::{run_batch, run_single_signup};
use crate::server;
use clap::{Args, Parser, Subcommand};
use mnet_signup::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mnet-signup",
    about = "Mnet signup bot (authToken -> save-tmp): serve the web front-end or run signups from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one signup
    Single(SingleArgs),
    /// Run batch signups from a CSV file
    Batch(BatchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) transport: TransportArgs,
}

#[derive(Args, Debug)]
pub(crate) struct SingleArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) password: String,
    #[command(flatten)]
    pub(crate) signup: SignupArgs,
    #[command(flatten)]
    pub(crate) transport: TransportArgs,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV columns: email,password[,gender,birth_year,device_name,locale,marketing_terms_version]
    #[arg(long)]
    pub(crate) csv: PathBuf,
    #[command(flatten)]
    pub(crate) signup: SignupArgs,
    #[command(flatten)]
    pub(crate) transport: TransportArgs,
}

/// Field defaults shared by `single` and `batch`.
#[derive(Args, Debug, Clone)]
pub(crate) struct SignupArgs {
    #[arg(long, default_value = "en")]
    pub(crate) locale: String,
    #[arg(long, default_value = "m", value_parser = ["m", "f"])]
    pub(crate) gender: String,
    #[arg(long, default_value = "1998")]
    pub(crate) birth_year: String,
    #[arg(long)]
    pub(crate) device_name: Option<String>,
    #[arg(long)]
    pub(crate) marketing_terms_version: Option<String>,
}

/// Per-invocation overrides of the configured transport policy.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct TransportArgs {
    /// Per-request timeout in seconds
    #[arg(long)]
    pub(crate) timeout: Option<u64>,
    /// Retries after the first attempt for transient failures
    #[arg(long)]
    pub(crate) retries: Option<u32>,
    /// Base backoff in seconds; doubles on each retry
    #[arg(long)]
    pub(crate) backoff: Option<f64>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Single(args) => run_single_signup(args).await,
        Command::Batch(args) => run_batch(args).await,
    }
}
