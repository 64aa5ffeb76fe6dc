use crate::console::{ConsoleCommand, parse_command};
use crate::error::DemoError;

use models::{FULLSCREEN_DEMO, WINDOW_DEMO};

#[test]
fn given_start_line_when_parsed_then_mode_and_targets_are_read() {
    let command = parse_command("start window 10.0.0.1  10.0.0.2").unwrap().unwrap();

    let ConsoleCommand::Start {
        capability,
        targets,
    } = command
    else {
        panic!("expected start, got {command:?}");
    };
    assert_eq!(capability, WINDOW_DEMO);
    let addresses: Vec<&str> = targets.iter().map(|m| m.address.as_str()).collect();
    assert_eq!(addresses, vec!["10.0.0.1", "10.0.0.2"]);
}

#[test]
fn given_fullscreen_start_when_parsed_then_fullscreen_capability() {
    let command = parse_command("start fullscreen pc-01").unwrap().unwrap();

    assert!(matches!(command, ConsoleCommand::Start { capability, .. } if capability == FULLSCREEN_DEMO));
}

#[test]
fn given_blank_line_when_parsed_then_none() {
    assert!(parse_command("   ").unwrap().is_none());
}

#[test]
fn given_reconcile_without_addresses_when_parsed_then_empty_reachable_set() {
    let command = parse_command("reconcile").unwrap().unwrap();

    assert_eq!(command, ConsoleCommand::Reconcile { reachable: Vec::new() });
}

/// **VALUE**: Verifies that incomplete commands are rejected instead of sent.
///
/// **BUG THIS CATCHES**: A `stop` with no addresses would release nobody but still
/// stop the source if membership happened to be empty.
#[test]
fn given_incomplete_or_unknown_lines_when_parsed_then_console_errors() {
    for line in ["stop", "start", "start window", "start slideshow 10.0.0.1", "dance"] {
        let result = parse_command(line);
        assert!(
            matches!(result, Err(DemoError::Console { .. })),
            "'{line}' should be rejected"
        );
    }
}

#[test]
fn given_members_and_quit_when_parsed_then_simple_commands() {
    assert_eq!(parse_command("members").unwrap(), Some(ConsoleCommand::Members));
    assert_eq!(parse_command("quit").unwrap(), Some(ConsoleCommand::Quit));
    assert_eq!(parse_command("exit").unwrap(), Some(ConsoleCommand::Quit));
}
