use crate::demo::{run_demo, run_tier_report, DemoArgs, TierArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use logos_pay::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Logos Pay",
    about = "Run and demonstrate the Logos Pay card issuance service from the command line",
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
    /// Resolve a reputation score against the tier ladder
    Tier(TierArgs),
    /// Run an offline end-to-end order lifecycle demo
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
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Tier(args) => run_tier_report(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
