use crate::commands::{run_estimate, run_models, EstimateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rent_estimate::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Gwangjin Rent Estimator",
    about = "Serve and query rent and deposit estimates for Gwangjin-gu listings",
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
    /// Price a single listing and print the quote
    Estimate(EstimateArgs),
    /// List the housing/rent combinations in the model artifact
    Models,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Estimate(args) => run_estimate(args).await,
        Command::Models => run_models(),
    }
}
