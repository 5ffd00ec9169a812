#![warn(clippy::all, clippy::pedantic)]
use clap::Parser;
use std::path::PathBuf;
use wilo::{logging, Config, Editor, Error, FileBuffer, Terminal};

/// A small terminal text editor
#[derive(Parser, Debug)]
#[command(name = "wilo", version, about, long_about = None)]
struct Args {
    /// File to open; starts with an empty document when omitted
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    if let Some(path) = logging::init() {
        tracing::info!(path = %path.display(), version = env!("CARGO_PKG_VERSION"), "logging started");
    }
    let config = Config::from_env();
    if let Err(error) = run(&args, config) {
        die(&error);
    }
}

/// Takes the parsed arguments and the config.
/// Loads the document, takes over the terminal and runs the editor.
fn run(args: &Args, config: Config) -> Result<(), Error> {
    let buffer = match &args.file {
        Some(path) => FileBuffer::open(path, config.tab_stop)?,
        None => FileBuffer::new(config.tab_stop),
    };
    let terminal = Terminal::new()?;
    Editor::new(terminal, buffer, config).run()
}

/// Takes an error.
/// Kills the program intentionally and displays the error. The terminal has
/// already been restored by the time this runs.
fn die(error: &Error) -> ! {
    tracing::error!(%error, "fatal");
    eprintln!("wilo: {error}");
    std::process::exit(1);
}
