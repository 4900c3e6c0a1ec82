use chordquiz::repl;
use colored::*;
use env_logger::{Builder, Env};
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = "chordquiz.yaml";

fn main() {
    Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    if let Err(e) = repl::start(config_path) {
        eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
        std::process::exit(1);
    }
}
