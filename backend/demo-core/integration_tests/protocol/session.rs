//! Controller, agents and workers wired together in-process.

use crate::helpers::{CountingEngines, FakeSupervisor, FixedPeer, machine, machines};

use demo_core::credentials::MemoryCredentialStore;
use demo_core::log_policy::ConfiguredLevelPolicy;
use demo_core::{Agent, Controller, SessionState, SessionWorker, TransportLink};

use models::{FULLSCREEN_DEMO, Machine, SessionMessage};

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use log::LevelFilter;

const OWN: &str = "192.168.1.10";

struct Node {
    agent: Agent,
    worker: Arc<SessionWorker>,
    engines: Arc<CountingEngines>,
}

impl Node {
    fn new() -> Self {
        let engines = Arc::new(CountingEngines::default());
        let worker = Arc::new(SessionWorker::new(
            Arc::new(MemoryCredentialStore::new()),
            engines.clone(),
        ));
        let agent = Agent::new(
            Arc::new(FakeSupervisor::with_worker(Arc::clone(&worker))),
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(ConfiguredLevelPolicy::new(LevelFilter::Info)),
        );
        Self {
            agent,
            worker,
            engines,
        }
    }
}

/// Delivers each message synchronously to the destination node's agent, as
/// if it had arrived over a connection from the controller machine.
struct LoopbackNetwork {
    controller_ip: IpAddr,
    nodes: HashMap<String, Node>,
}

impl TransportLink for LoopbackNetwork {
    fn send(&self, message: &SessionMessage, destination: &Machine) {
        if let Some(node) = self.nodes.get(&destination.address) {
            node.agent
                .on_message(message, Some(&FixedPeer(Some(self.controller_ip))));
        }
    }
}

/// **VALUE**: Exercises a full demo session across three roles.
///
/// **WHY THIS MATTERS**: Each role is tested alone elsewhere; this checks that the
/// messages one role emits are exactly what the next role accepts, including the
/// source address the agent derives from the connection.
#[test]
fn given_three_machines_when_demo_started_and_stopped_then_engines_follow_session() {
    // GIVEN: The controller machine and two targets
    let mut nodes = HashMap::new();
    for address in [OWN, "10.0.0.1", "10.0.0.2"] {
        nodes.insert(address.to_string(), Node::new());
    }
    let network = Arc::new(LoopbackNetwork {
        controller_ip: OWN.parse().unwrap(),
        nodes,
    });
    let controller = Controller::new(network.clone());
    let targets = machines(&["10.0.0.1", "10.0.0.2"]);

    // WHEN: Starting a fullscreen demo
    assert!(controller.start_session(FULLSCREEN_DEMO.uid(), &targets, &machine(OWN)));

    // THEN: Source runs at home, viewers point at the controller machine
    let own = &network.nodes[OWN];
    assert_eq!(own.worker.source_state(), SessionState::Active);
    assert_eq!(own.worker.viewer_state(), SessionState::Idle);
    for target in ["10.0.0.1", "10.0.0.2"] {
        let node = &network.nodes[target];
        assert_eq!(node.worker.viewer_state(), SessionState::Active);
        assert_eq!(
            node.engines.counters.last_viewer(),
            Some((OWN.to_string(), true))
        );
    }

    // WHEN: Stopping both targets
    assert!(controller.stop_session(FULLSCREEN_DEMO.uid(), &targets, &machine(OWN)));

    // THEN: Everything is idle and every engine was shut down once
    assert_eq!(own.worker.source_state(), SessionState::Idle);
    assert_eq!(own.engines.counters.broadcasts_stopped(), 1);
    for target in ["10.0.0.1", "10.0.0.2"] {
        let node = &network.nodes[target];
        assert_eq!(node.worker.viewer_state(), SessionState::Idle);
        assert_eq!(node.engines.counters.viewers_stopped(), 1);
    }
}

#[test]
fn given_controller_machine_in_targets_when_demo_started_then_own_viewer_is_refused() {
    let mut nodes = HashMap::new();
    nodes.insert(OWN.to_string(), Node::new());
    let network = Arc::new(LoopbackNetwork {
        controller_ip: OWN.parse().unwrap(),
        nodes,
    });
    let controller = Controller::new(network.clone());

    controller.start_session(FULLSCREEN_DEMO.uid(), &machines(&[OWN]), &machine(OWN));

    let own = &network.nodes[OWN];
    assert_eq!(own.worker.source_state(), SessionState::Active);
    assert_eq!(own.worker.viewer_state(), SessionState::Idle);
}
