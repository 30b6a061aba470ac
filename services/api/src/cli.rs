use crate::demo::{run_demo, run_reprice, DemoArgs, RepriceArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fixzit_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fixzit Scoring Engine",
    about = "Run the Fixzit marketplace pricing and dispatch engines from the command line",
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
    /// Run the auto-repricer batch against the bundled demo dataset
    Reprice(RepriceArgs),
    /// Run an end-to-end CLI demo covering Buy Box, repricing, and dispatch
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the in-memory stores with the demo marketplace and work orders
    #[arg(long)]
    pub(crate) demo_data: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Reprice(args) => run_reprice(args),
        Command::Demo(args) => run_demo(args),
    }
}
