use crate::report::{
    run_observation, run_report, run_teacher, ObservationArgs, ReportArgs, TeacherArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use observation_report::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Class Observation Reports",
    about = "Score, classify, and summarize class observations from form exports",
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
    /// Print per-service, per-teacher, and per-period summaries
    Report(ReportArgs),
    /// Print one teacher's rollup and area breakdown
    Teacher(TeacherArgs),
    /// Print a single observation with its items and qualitative feedback
    Observation(ObservationArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory holding the CSV sources
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Teacher(args) => run_teacher(args),
        Command::Observation(args) => run_observation(args),
    }
}
