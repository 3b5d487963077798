use clap::Parser;
use std::process::ExitCode;
use task_cli::cli::{self, Cli};
use task_cli::config::Settings;
use task_cli::JsonFileStore;
use tracing::Level;

fn init_logging(level: Level) {
    // stdout carries command output, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn run(args: Cli) -> task_cli::Result<()> {
    let mut settings = Settings::new()?;
    if let Some(file) = args.file {
        settings.file = file;
    }
    init_logging(settings.effective_level(args.verbose)?);

    let store = JsonFileStore::new(settings.file);
    cli::run(args.command, &store, &mut std::io::stdout().lock())
}

fn main() -> ExitCode {
    let args = Cli::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
