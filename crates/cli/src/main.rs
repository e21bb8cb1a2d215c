//! txprop CLI: runs the propagation scenarios one request at a time.
//!
//! - `txprop list`: the catalog with expected outcomes
//! - `txprop run SCENARIO [--name NAME]`: one request against a fresh database
//! - `txprop run-all [--name NAME]`: every request against one shared database
//!
//! Exit code is 0 when every report matches its expectation, 1 otherwise.

mod commands;
mod format;
mod parse;

use std::process;

use tracing_subscriber::EnvFilter;
use txprop_engine::{Config, Database, Scenario};

use commands::build_cli;
use format::{format_catalog, format_error, format_report, format_summary, OutputMode};
use parse::{matches_to_action, CliAction};

fn main() {
    let matches = build_cli().get_matches();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    };

    init_tracing(&config);
    tracing::debug!(?config, "Configuration loaded");

    let exit_code = match matches_to_action(&matches) {
        Ok(action) => execute(action, &config, output_mode),
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            1
        }
    };
    process::exit(exit_code);
}

fn load_config(matches: &clap::ArgMatches) -> Result<Config, String> {
    match matches.get_one::<String>("config") {
        Some(path) => Config::from_path(path).map_err(|e| format!("Failed to load config: {}", e)),
        None => Ok(Config::default()),
    }
}

/// `RUST_LOG` wins over the configured filter. Logs go to stderr.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_database(config: &Config) -> Result<Database, String> {
    Database::open(config.clone()).map_err(|e| format!("Failed to open database: {}", e))
}

fn execute(action: CliAction, config: &Config, mode: OutputMode) -> i32 {
    match action {
        CliAction::List => {
            println!("{}", format_catalog(mode));
            0
        }
        CliAction::Run { scenario, name } => {
            let db = match open_database(config) {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("{}", format_error(&e, mode));
                    return 1;
                }
            };
            let name = name.unwrap_or_else(|| config.demo.default_name.clone());
            let report = scenario.run(&db, &name);
            println!("{}", format_report(&report, mode));
            if report.matches_expectation {
                0
            } else {
                1
            }
        }
        CliAction::RunAll { name } => {
            let db = match open_database(config) {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("{}", format_error(&e, mode));
                    return 1;
                }
            };
            let name = name.unwrap_or_else(|| config.demo.default_name.clone());
            let reports: Vec<_> = Scenario::ALL.iter().map(|s| s.run(&db, &name)).collect();
            if mode == OutputMode::Human {
                for report in &reports {
                    println!("{}", format_report(report, mode));
                }
            }
            println!("{}", format_summary(&reports, mode));
            if reports.iter().all(|r| r.matches_expectation) {
                0
            } else {
                1
            }
        }
    }
}
