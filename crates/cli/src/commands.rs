//! clap command tree.

use clap::{Arg, ArgAction, Command};

/// Build the `txprop` command.
pub fn build_cli() -> Command {
    Command::new("txprop")
        .about("Run transaction propagation scenarios against an in-memory store")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_name("PATH")
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print reports as JSON"),
        )
        .subcommand(Command::new("list").about("List every scenario with its expected outcome"))
        .subcommand(
            Command::new("run")
                .about("Run one scenario as a single request")
                .arg(
                    Arg::new("scenario")
                        .required(true)
                        .value_name("SCENARIO")
                        .help("Scenario name, see `txprop list`"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .short('n')
                        .value_name("NAME")
                        .help("User name to save (defaults to demo.default_name)"),
                ),
        )
        .subcommand(
            Command::new("run-all")
                .about("Run every scenario against one shared database")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .short('n')
                        .value_name("NAME")
                        .help("User name to save (defaults to demo.default_name)"),
                ),
        )
}
