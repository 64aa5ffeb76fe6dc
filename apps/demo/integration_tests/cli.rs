use demo::cli::{Cli, Commands};

use models::BROADCAST_VIEWER;

use std::path::PathBuf;

use clap::Parser;

/// **VALUE**: Verifies the exact command line the agent uses to start workers.
///
/// **BUG THIS CATCHES**: The agent prepends `--config-dir` before the `worker`
/// subcommand. Renaming the flag or the subcommand here without updating the
/// supervisor would make every worker exit at start-up.
#[test]
fn given_worker_command_line_when_parsed_then_config_dir_and_capability_are_read() {
    let capability = BROADCAST_VIEWER.uid().to_string();

    let cli = Cli::try_parse_from([
        "demo",
        "--config-dir",
        "/tmp/demo-config",
        demo_core::supervisor::WORKER_COMMAND,
        demo_core::supervisor::CAPABILITY_FLAG,
        capability.as_str(),
    ])
    .unwrap();

    assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/demo-config")));
    assert!(matches!(cli.command, Commands::Worker { capability } if capability == BROADCAST_VIEWER.uid()));
    assert_eq!(cli.command.log_file_name(), "demo-worker.log");
}

#[test]
fn given_controller_without_own_address_when_parsed_then_error() {
    assert!(Cli::try_parse_from(["demo", "controller"]).is_err());
}

#[test]
fn given_worker_with_invalid_uuid_when_parsed_then_error() {
    assert!(Cli::try_parse_from(["demo", "worker", "--capability", "nope"]).is_err());
}

#[test]
fn given_agent_without_config_dir_when_parsed_then_default_dir_is_left_to_runtime() {
    let cli = Cli::try_parse_from(["demo", "agent"]).unwrap();

    assert!(cli.config_dir.is_none());
    assert!(matches!(cli.command, Commands::Agent));
}
