//! Line-oriented controller console.
//!
//! ```text
//! start fullscreen|window <addr>...
//! stop <addr>...
//! reconcile <addr>...
//! members
//! quit
//! ```

use crate::error::DemoError;

use common::ErrorLocation;
use demo_core::Controller;
use models::{Capability, FULLSCREEN_DEMO, Machine, MachineBuilder, WINDOW_DEMO};

use std::panic::Location;

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Start {
        capability: Capability,
        targets: Vec<Machine>,
    },
    Stop {
        targets: Vec<Machine>,
    },
    Reconcile {
        reachable: Vec<Machine>,
    },
    Members,
    Quit,
}

/// Parse one console line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns [`DemoError::Console`] for unknown commands, a missing or unknown
/// demo mode, missing addresses, or addresses that do not form a machine.
#[track_caller]
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, DemoError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb {
        "start" => {
            let capability = match words.next() {
                Some("fullscreen") => FULLSCREEN_DEMO,
                Some("window") => WINDOW_DEMO,
                Some(other) => return Err(console_error(format!("Unknown demo mode '{other}'"))),
                None => return Err(console_error("Usage: start fullscreen|window <addr>...")),
            };
            ConsoleCommand::Start {
                capability,
                targets: required_machines(verb, words)?,
            }
        }
        "stop" => ConsoleCommand::Stop {
            targets: required_machines(verb, words)?,
        },
        // An empty reachable set is meaningful: nothing answered
        "reconcile" => ConsoleCommand::Reconcile {
            reachable: to_machines(words)?,
        },
        "members" => ConsoleCommand::Members,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(console_error(format!("Unknown command '{other}'"))),
    };

    Ok(Some(command))
}

/// Read commands from `input` until `quit` or end of input.
///
/// Errors from individual lines are reported on `output` and do not end
/// the console. The demo mode of the last `start` is used by `stop`.
pub async fn run_console<R, W>(
    input: R,
    mut output: W,
    controller: &Controller,
    own_machine: &Machine,
) -> Result<(), DemoError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut mode = FULLSCREEN_DEMO;

    while let Some(line) = lines.next_line().await.map_err(io_error)? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!("{e}");
                write_line(&mut output, &format!("error: {e}")).await?;
                continue;
            }
        };

        let reply = match command {
            ConsoleCommand::Start {
                capability,
                targets,
            } => {
                mode = capability;
                let handled = controller.start_session(capability.uid(), &targets, own_machine);
                format!("start {}: {}", capability.label(), outcome(handled))
            }
            ConsoleCommand::Stop { targets } => {
                let handled = controller.stop_session(mode.uid(), &targets, own_machine);
                format!("stop {}: {}", mode.label(), outcome(handled))
            }
            ConsoleCommand::Reconcile { reachable } => {
                let removed = controller.reconcile(&reachable, own_machine);
                format!("reconcile: {removed} member(s) dropped")
            }
            ConsoleCommand::Members => {
                let members = controller.members();
                if members.is_empty() {
                    String::from("members: none")
                } else {
                    format!("members: {}", members.join(" "))
                }
            }
            ConsoleCommand::Quit => {
                info!("Console quit");
                break;
            }
        };
        write_line(&mut output, &reply).await?;
    }

    Ok(())
}

fn outcome(handled: bool) -> &'static str {
    if handled { "ok" } else { "not handled" }
}

#[track_caller]
fn required_machines<'a>(
    verb: &str,
    addresses: impl Iterator<Item = &'a str>,
) -> Result<Vec<Machine>, DemoError> {
    let machines = to_machines(addresses)?;
    if machines.is_empty() {
        return Err(console_error(format!("'{verb}' needs at least one address")));
    }
    Ok(machines)
}

#[track_caller]
fn to_machines<'a>(addresses: impl Iterator<Item = &'a str>) -> Result<Vec<Machine>, DemoError> {
    addresses
        .map(|address| {
            MachineBuilder::default()
                .with_address(address)
                .build()
                .map_err(DemoError::from)
        })
        .collect()
}

#[track_caller]
fn console_error(message: impl Into<String>) -> DemoError {
    DemoError::Console {
        message: message.into(),
        location: ErrorLocation::from(Location::caller()),
    }
}

#[track_caller]
fn io_error(e: std::io::Error) -> DemoError {
    DemoError::Demo {
        message: format!("Console I/O failed: {e}"),
        location: ErrorLocation::from(Location::caller()),
    }
}

async fn write_line<W>(output: &mut W, line: &str) -> Result<(), DemoError>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(line.as_bytes()).await.map_err(io_error)?;
    output.write_all(b"\n").await.map_err(io_error)?;
    output.flush().await.map_err(io_error)
}
