use crate::commands::{run_profile, run_quizzes, run_score, ProfileArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use soulscore::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "soulscore",
    about = "Score personality quizzes and build composite profiles",
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
    /// List the quizzes in the catalog
    Quizzes(CatalogArgs),
    /// Score an answer file against one quiz
    Score(ScoreArgs),
    /// Build a composite profile from an attempt export
    Profile(ProfileArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Directory of quiz JSON files layered over the seeded catalog
    #[arg(long)]
    pub(crate) quiz_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Directory of quiz JSON files layered over the seeded catalog
    #[arg(long)]
    pub(crate) quiz_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quizzes(args) => run_quizzes(args),
        Command::Score(args) => run_score(args),
        Command::Profile(args) => run_profile(args),
    }
}
