//! ArgMatches → CliAction conversion.

use clap::ArgMatches;
use txprop_engine::Scenario;

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Print the catalog
    List,
    /// Run one scenario
    Run {
        scenario: Scenario,
        name: Option<String>,
    },
    /// Run the whole catalog
    RunAll { name: Option<String> },
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "list" => Ok(CliAction::List),
        "run" => {
            let raw = sub_matches
                .get_one::<String>("scenario")
                .ok_or_else(|| "Missing scenario".to_string())?;
            let scenario = raw.parse::<Scenario>().map_err(|_| {
                format!(
                    "Unknown scenario '{}' (try `txprop list`)",
                    raw
                )
            })?;
            Ok(CliAction::Run {
                scenario,
                name: sub_matches.get_one::<String>("name").cloned(),
            })
        }
        "run-all" => Ok(CliAction::RunAll {
            name: sub_matches.get_one::<String>("name").cloned(),
        }),
        other => Err(format!("Unknown command: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_cli;

    fn parse(args: &[&str]) -> Result<CliAction, String> {
        let matches = build_cli()
            .try_get_matches_from(args)
            .map_err(|e| e.to_string())?;
        matches_to_action(&matches)
    }

    #[test]
    fn test_parse_run_with_name() {
        let action = parse(&["txprop", "run", "create-couple-of-users", "--name", "Jane"]).unwrap();
        assert_eq!(
            action,
            CliAction::Run {
                scenario: Scenario::CreateCoupleOfUsers,
                name: Some("Jane".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_unknown_scenario() {
        let err = parse(&["txprop", "run", "nope"]).unwrap_err();
        assert!(err.contains("Unknown scenario 'nope'"));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["txprop", "run-all", "--json"])
            .unwrap();
        assert!(matches.get_flag("json"));
        assert_eq!(
            matches_to_action(&matches).unwrap(),
            CliAction::RunAll { name: None }
        );
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse(&["txprop", "list"]).unwrap(), CliAction::List);
    }
}
