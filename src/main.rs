mod cli;
mod config;
mod consts;
mod error;
mod logging;
mod output;
mod presence;
mod remote;
mod runner;
mod store;
mod utils;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use cli::Cli;
use config::Config;
use logging::init_logging;
use output::print_summary;
use remote::HttpConnector;
use runner::{RunSettings, dispatch};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Nothing is logged before the settings are known.
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => cli.apply_to(config),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config.logging, cli.debug) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let settings = match RunSettings::from_config(&config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let connector = Arc::new(HttpConnector::new(&config.remote));
    let code = match dispatch(&settings, connector) {
        Ok(summary) => {
            print_summary(&summary, cli.use_color());
            if summary.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    };

    if cli.should_pause() {
        wait_for_enter();
    }
    code
}

fn wait_for_enter() {
    print!("Press Enter to exit...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
