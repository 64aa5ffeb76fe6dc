//! Recording fakes for the protocol collaborators.
//!
//! Each fake records what the role under test asked of it so the tests can
//! assert on outbound traffic and engine lifecycles without processes or
//! sockets.

use demo_core::error::supervisor::SupervisorError;
use demo_core::{
    Connection, EngineFactory, ScreenBroadcastEngine, ScreenViewerEngine, SessionWorker,
    TransportLink, WorkerProcessSupervisor,
};

use common::{ErrorLocation, RedactedToken};
use models::{Machine, MachineBuilder, SessionMessage};

use std::collections::HashSet;
use std::net::IpAddr;
use std::panic::Location;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use uuid::Uuid;

pub fn machine(address: &str) -> Machine {
    MachineBuilder::default()
        .with_address(address)
        .build()
        .expect("test address is valid")
}

pub fn machines(addresses: &[&str]) -> Vec<Machine> {
    addresses.iter().map(|address| machine(address)).collect()
}

// ============================================
// TRANSPORT
// ============================================

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(SessionMessage, String)>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<(SessionMessage, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, address: &str) -> Vec<SessionMessage> {
        self.sent()
            .into_iter()
            .filter(|(_, destination)| destination == address)
            .map(|(message, _)| message)
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl TransportLink for RecordingTransport {
    fn send(&self, message: &SessionMessage, destination: &Machine) {
        self.sent
            .lock()
            .unwrap()
            .push((message.clone(), destination.address.clone()));
    }
}

/// Connection whose peer address is fixed by the test.
pub struct FixedPeer(pub Option<IpAddr>);

impl Connection for FixedPeer {
    fn peer_address(&self) -> Option<IpAddr> {
        self.0
    }
}

// ============================================
// SUPERVISOR
// ============================================

/// In-process supervisor; optionally dispatches forwarded messages straight
/// into a [`SessionWorker`] instead of a child process.
#[derive(Default)]
pub struct FakeSupervisor {
    running: Mutex<HashSet<Uuid>>,
    starts: Mutex<Vec<Uuid>>,
    forwarded: Mutex<Vec<SessionMessage>>,
    fail_start: bool,
    worker: Option<Arc<SessionWorker>>,
}

impl FakeSupervisor {
    pub fn failing() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn with_worker(worker: Arc<SessionWorker>) -> Self {
        Self {
            worker: Some(worker),
            ..Self::default()
        }
    }

    pub fn mark_running(&self, capability_id: Uuid) {
        self.running.lock().unwrap().insert(capability_id);
    }

    pub fn starts(&self) -> Vec<Uuid> {
        self.starts.lock().unwrap().clone()
    }

    pub fn forwarded(&self) -> Vec<SessionMessage> {
        self.forwarded.lock().unwrap().clone()
    }
}

impl WorkerProcessSupervisor for FakeSupervisor {
    fn is_running(&self, capability_id: Uuid) -> bool {
        self.running.lock().unwrap().contains(&capability_id)
    }

    fn start(&self, capability_id: Uuid) -> Result<(), SupervisorError> {
        if self.fail_start {
            return Err(SupervisorError::Spawn {
                message: String::from("spawn disabled in test"),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(std::io::Error::other("spawn disabled")),
            });
        }
        self.starts.lock().unwrap().push(capability_id);
        self.running.lock().unwrap().insert(capability_id);
        Ok(())
    }

    fn stop(&self, capability_id: Uuid) -> Result<(), SupervisorError> {
        self.running.lock().unwrap().remove(&capability_id);
        Ok(())
    }

    fn send_message(&self, message: &SessionMessage) -> Result<(), SupervisorError> {
        self.forwarded.lock().unwrap().push(message.clone());
        if let Some(worker) = &self.worker {
            worker.on_message(message);
        }
        Ok(())
    }
}

// ============================================
// ENGINES
// ============================================

#[derive(Debug, Default)]
pub struct EngineCounters {
    pub broadcasts_started: AtomicUsize,
    pub broadcasts_stopped: AtomicUsize,
    pub viewers_started: AtomicUsize,
    pub viewers_stopped: AtomicUsize,
    pub last_viewer: Mutex<Option<(String, bool)>>,
}

impl EngineCounters {
    pub fn broadcasts_started(&self) -> usize {
        self.broadcasts_started.load(Ordering::SeqCst)
    }

    pub fn broadcasts_stopped(&self) -> usize {
        self.broadcasts_stopped.load(Ordering::SeqCst)
    }

    pub fn viewers_started(&self) -> usize {
        self.viewers_started.load(Ordering::SeqCst)
    }

    pub fn viewers_stopped(&self) -> usize {
        self.viewers_stopped.load(Ordering::SeqCst)
    }

    pub fn last_viewer(&self) -> Option<(String, bool)> {
        self.last_viewer.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct CountingEngines {
    pub counters: Arc<EngineCounters>,
}

struct CountingBroadcast(Arc<EngineCounters>);

impl ScreenBroadcastEngine for CountingBroadcast {
    fn shutdown(&mut self) {
        self.0.broadcasts_stopped.fetch_add(1, Ordering::SeqCst);
    }
}

struct CountingViewer(Arc<EngineCounters>);

impl ScreenViewerEngine for CountingViewer {
    fn shutdown(&mut self) {
        self.0.viewers_stopped.fetch_add(1, Ordering::SeqCst);
    }
}

impl EngineFactory for CountingEngines {
    fn broadcast_engine(
        &self,
        _source_token: &RedactedToken,
        _viewer_access_token: &RedactedToken,
    ) -> Box<dyn ScreenBroadcastEngine> {
        self.counters.broadcasts_started.fetch_add(1, Ordering::SeqCst);
        Box::new(CountingBroadcast(Arc::clone(&self.counters)))
    }

    fn viewer_engine(&self, source_host: &str, fullscreen: bool) -> Box<dyn ScreenViewerEngine> {
        self.counters.viewers_started.fetch_add(1, Ordering::SeqCst);
        *self.counters.last_viewer.lock().unwrap() = Some((source_host.to_string(), fullscreen));
        Box::new(CountingViewer(Arc::clone(&self.counters)))
    }
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    condition()
}
