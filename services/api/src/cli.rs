use clap::{Args, Parser, Subcommand};

use visa_ai::error::AppError;

use crate::demo::{print_checklist, run_demo, ChecklistArgs, DemoArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Immigration Assistant",
    about = "Run and demonstrate the WhatsApp immigration assistant from the command line",
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
    /// Print the document checklist for a destination and visa route
    Checklist(ChecklistArgs),
    /// Play a scripted end-to-end conversation through the real dispatcher
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
        Command::Checklist(args) => print_checklist(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
