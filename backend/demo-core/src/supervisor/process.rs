use crate::collaborators::WorkerProcessSupervisor;
use crate::error::supervisor::SupervisorError;
use crate::supervisor::{CAPABILITY_FLAG, WORKER_COMMAND};
use crate::transport::frame::write_frame;
use crate::wire::WireSessionMessage;

use common::ErrorLocation;
use models::SessionMessage;

use std::collections::HashMap;
use std::ffi::OsString;
use std::panic::Location;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Mutex, MutexGuard};

use log::{debug, error, info, warn};
use tokio::process::{Child as TokioChild, ChildStdin, Command as TokioCommand};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use uuid::Uuid;

struct WorkerProcess {
    child: TokioChild,
    queue: mpsc::UnboundedSender<WireSessionMessage>,
}

impl WorkerProcess {
    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

/// Runs one worker child process per capability.
///
/// Workers are started as `<binary> [extra args] worker --capability <uuid>`
/// with stdin piped; messages are written to that pipe as length-prefixed
/// frames by a writer task per process.
pub struct ProcessSupervisor {
    binary: PathBuf,
    extra_args: Vec<OsString>,
    runtime: Handle,
    workers: Mutex<HashMap<Uuid, WorkerProcess>>,
}

impl ProcessSupervisor {
    /// # Errors
    ///
    /// Returns [`SupervisorError::Spawn`] when called outside a tokio runtime.
    #[track_caller]
    pub fn new(binary: impl Into<PathBuf>, extra_args: Vec<OsString>) -> Result<Self, SupervisorError> {
        let runtime = Handle::try_current().map_err(|e| SupervisorError::Spawn {
            message: String::from("Process supervisor requires a tokio runtime"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })?;

        Ok(Self {
            binary: binary.into(),
            extra_args,
            runtime,
            workers: Mutex::new(HashMap::new()),
        })
    }

    fn workers(&self) -> MutexGuard<'_, HashMap<Uuid, WorkerProcess>> {
        self.workers.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn build_command(&self, capability_id: Uuid) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.binary);
        cmd.args(&self.extra_args)
            .arg(WORKER_COMMAND)
            .arg(CAPABILITY_FLAG)
            .arg(capability_id.to_string())
            .stdin(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl WorkerProcessSupervisor for ProcessSupervisor {
    fn is_running(&self, capability_id: Uuid) -> bool {
        let mut workers = self.workers();
        match workers.get_mut(&capability_id).map(WorkerProcess::is_alive) {
            Some(true) => true,
            Some(false) => {
                debug!("Worker for {capability_id} has exited");
                workers.remove(&capability_id);
                false
            }
            None => false,
        }
    }

    fn start(&self, capability_id: Uuid) -> Result<(), SupervisorError> {
        let mut workers = self.workers();
        if let Some(worker) = workers.get_mut(&capability_id)
            && worker.is_alive()
        {
            return Ok(());
        }

        // Child::spawn registers the pipe with the reactor of the current runtime
        let _enter = self.runtime.enter();
        let mut child = self
            .build_command(capability_id)
            .spawn()
            .map_err(|e| SupervisorError::Spawn {
                message: format!(
                    "Failed to spawn worker {} for {capability_id}: {e}",
                    self.binary.display()
                ),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| SupervisorError::Spawn {
            message: format!("Worker for {capability_id} has no stdin"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(std::io::Error::other("stdin not piped")),
        })?;

        let (queue, receiver) = mpsc::unbounded_channel();
        self.runtime
            .spawn(write_to_worker(capability_id, stdin, receiver));

        info!(
            "Started worker for {capability_id} (PID: {:?})",
            child.id()
        );
        workers.insert(capability_id, WorkerProcess { child, queue });
        Ok(())
    }

    fn stop(&self, capability_id: Uuid) -> Result<(), SupervisorError> {
        let Some(mut worker) = self.workers().remove(&capability_id) else {
            return Ok(());
        };

        // Closing the queue ends the writer, which closes stdin; kill in case
        // the worker ignores EOF
        drop(worker.queue);
        worker.child.start_kill().map_err(|e| SupervisorError::Stop {
            message: format!("Failed to stop worker for {capability_id}: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })?;

        info!("Stopped worker for {capability_id}");
        Ok(())
    }

    fn send_message(&self, message: &SessionMessage) -> Result<(), SupervisorError> {
        let capability_id = message.capability_id();
        let workers = self.workers();
        let worker = workers
            .get(&capability_id)
            .ok_or_else(|| SupervisorError::NotRunning {
                capability_id,
                location: ErrorLocation::from(Location::caller()),
            })?;

        worker
            .queue
            .send(WireSessionMessage::from(message))
            .map_err(|_| SupervisorError::Send {
                message: format!("Worker pipe for {capability_id} is closed"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        for (capability_id, mut worker) in self.workers().drain() {
            if let Err(e) = worker.child.start_kill() {
                warn!("Failed to kill worker for {capability_id} on shutdown: {e}");
            }
        }
    }
}

async fn write_to_worker(
    capability_id: Uuid,
    mut stdin: ChildStdin,
    mut queue: mpsc::UnboundedReceiver<WireSessionMessage>,
) {
    while let Some(message) = queue.recv().await {
        if let Err(e) = write_frame(&mut stdin, &message).await {
            error!("Failed to write to worker for {capability_id}: {e}");
            return;
        }
    }
    debug!("Writer for worker {capability_id} finished");
}
