//! Entry points for the three process roles.

use crate::console::run_console;
use crate::engine::LoggingEngines;
use crate::error::DemoError;

use common::{ErrorLocation, RedactedToken};
use demo_core::config::{AgentConfig, AppConfig};
use demo_core::credentials::MemoryCredentialStore;
use demo_core::log_policy::ConfiguredLevelPolicy;
use demo_core::supervisor::{ProcessSupervisor, run_worker_loop};
use demo_core::transport::{WsTransportLink, start_agent_server};
use demo_core::{Agent, Controller, SessionWorker};
use models::{Capability, MachineBuilder};

use std::env::current_exe;
use std::ffi::OsString;
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use tokio::io::{BufReader, stdin, stdout};
use tokio::signal::ctrl_c;
use uuid::Uuid;

/// The agent's credential store and the token its listener checks.
///
/// The handshake token only gates the listener. The store starts empty so
/// the first controller's `SourceToken` becomes the source credential.
pub(crate) fn agent_credentials(config: &AgentConfig) -> (Arc<MemoryCredentialStore>, RedactedToken) {
    let auth_token = config.auth_token().unwrap_or_else(|| {
        warn!("agent.auth_token is not configured; every controller will be refused");
        RedactedToken::new("")
    });
    (Arc::new(MemoryCredentialStore::new()), auth_token)
}

/// Serve controllers until Ctrl-C, then stop every worker this agent started.
///
/// Workers are started from the configured binary (or this executable) and
/// inherit `config_dir` so they log with the same settings.
pub async fn run_agent(config: &AppConfig, config_dir: &Path) -> Result<(), DemoError> {
    let binary = match &config.worker.binary_path {
        Some(path) => path.clone(),
        None => current_exe().map_err(|e| DemoError::Demo {
            message: format!("Cannot locate own executable for workers: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?,
    };
    let extra_args = vec![
        OsString::from("--config-dir"),
        config_dir.as_os_str().to_os_string(),
    ];
    let supervisor = Arc::new(ProcessSupervisor::new(binary, extra_args)?);

    let (credentials, auth_token) = agent_credentials(&config.agent);
    let log_policy = Arc::new(ConfiguredLevelPolicy::new(config.logging.level.into()));
    let agent = Arc::new(Agent::new(supervisor, credentials, log_policy));
    let handle = start_agent_server(&config.agent, auth_token, Arc::clone(&agent)).await?;

    ctrl_c().await.map_err(|e| DemoError::Demo {
        message: format!("Failed to wait for Ctrl-C: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!("Agent shutting down");
    handle.shutdown();
    agent.shutdown();
    Ok(())
}

/// Run the session worker for `capability_id` on this process's stdin.
pub async fn run_worker(capability_id: Uuid) -> Result<(), DemoError> {
    let capability = Capability::from_uid(capability_id).ok_or_else(|| DemoError::Demo {
        message: format!("Unknown capability {capability_id}"),
        location: ErrorLocation::from(Location::caller()),
    })?;
    info!("Worker for {capability} starting");

    let worker = SessionWorker::new(
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(LoggingEngines),
    );
    run_worker_loop(stdin(), &worker).await?;

    info!("Worker for {capability} exiting");
    Ok(())
}

/// Run the controller console on stdin/stdout.
pub async fn run_controller(config: &AppConfig, own_address: &str) -> Result<(), DemoError> {
    let own_machine = MachineBuilder::default().with_address(own_address).build()?;

    let auth_token = config.agent.auth_token().ok_or_else(|| DemoError::Config {
        message: String::from("agent.auth_token must be set to reach agents"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let link = Arc::new(WsTransportLink::new(config.agent.port, auth_token)?);
    let controller = Controller::new(link.clone());

    info!("Controller ready on {own_machine}");
    let result = run_console(BufReader::new(stdin()), stdout(), &controller, &own_machine).await;

    link.close().await;
    result
}
