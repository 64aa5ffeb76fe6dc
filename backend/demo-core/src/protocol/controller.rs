//! Controller role: orchestrates a demo session across target machines.

use crate::collaborators::TransportLink;
use crate::membership::{MembershipTracker, Release};
use crate::token::{SessionTokens, TokenIssuer};

use models::{
    ArgumentKey, BROADCAST_SOURCE, BROADCAST_VIEWER, Capability, Command, FULLSCREEN_DEMO,
    Machine, SessionMessage,
};

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use uuid::Uuid;

pub struct Controller {
    transport: Arc<dyn TransportLink>,
    issuer: TokenIssuer,
    tokens: Mutex<Option<SessionTokens>>,
    membership: MembershipTracker,
}

impl Controller {
    pub fn new(transport: Arc<dyn TransportLink>) -> Self {
        Self {
            transport,
            issuer: TokenIssuer::new(),
            tokens: Mutex::new(None),
            membership: MembershipTracker::new(),
        }
    }

    /// Start broadcasting `own_machine`'s screen to `targets`.
    ///
    /// Returns false unless `capability_id` is one of the triggerable demo
    /// modes. Delivery to individual machines is best effort.
    pub fn start_session(&self, capability_id: Uuid, targets: &[Machine], own_machine: &Machine) -> bool {
        let Some(capability) = triggerable(capability_id) else {
            debug!("Controller cannot start capability {capability_id}");
            return false;
        };

        if targets.is_empty() {
            warn!("{capability} requested without target machines; nothing to broadcast to");
            return true;
        }

        let tokens = self.issuer.issue();

        let start_source = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StartSource)
            .with_argument(ArgumentKey::SourceToken, tokens.source_token.as_str())
            .with_argument(ArgumentKey::ViewerAccessToken, tokens.viewer_access_token.as_str());
        self.transport.send(&start_source, own_machine);

        let members = self
            .membership
            .join(targets.iter().map(|machine| machine.address.clone()));
        info!("Starting {capability} on {} machine(s), {members} viewing", targets.len());

        // The source address is stamped by each agent from its transport connection
        let start_viewer = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StartViewer)
            .with_argument(ArgumentKey::ViewerAccessToken, tokens.viewer_access_token.as_str())
            .with_argument(ArgumentKey::ViewerIsFullscreen, capability == FULLSCREEN_DEMO);
        for machine in targets {
            self.transport.send(&start_viewer, machine);
        }

        *self.tokens.lock().unwrap_or_else(|p| p.into_inner()) = Some(tokens);
        true
    }

    /// Stop viewing on `targets`; stops the source once no viewer remains.
    pub fn stop_session(&self, capability_id: Uuid, targets: &[Machine], own_machine: &Machine) -> bool {
        let Some(capability) = triggerable(capability_id) else {
            debug!("Controller cannot stop capability {capability_id}");
            return false;
        };

        let stop_viewer = SessionMessage::new(BROADCAST_VIEWER.uid(), Command::StopViewer);
        for machine in targets {
            self.transport.send(&stop_viewer, machine);
        }

        let release = self
            .membership
            .release(targets.iter().map(|machine| machine.address.as_str()));
        info!("Stopping {capability} on {} machine(s): {release:?}", targets.len());

        self.stop_source_if_unused(release, own_machine);
        true
    }

    /// Drop members that are no longer reachable.
    ///
    /// Stop messages can be lost, which would otherwise keep a member (and
    /// with it the source) alive forever. Returns the number of members removed.
    pub fn reconcile(&self, reachable: &[Machine], own_machine: &Machine) -> usize {
        let reachable: HashSet<&str> = reachable
            .iter()
            .map(|machine| machine.address.as_str())
            .collect();

        let (removed, release) = self.membership.retain(|address| reachable.contains(address));
        if removed.is_empty() {
            return 0;
        }

        warn!("Dropping unreachable viewer(s): {}", removed.join(", "));
        self.stop_source_if_unused(release, own_machine);
        removed.len()
    }

    /// The controller does not accept upward messages.
    pub fn on_message_from_worker_tier(&self, message: &SessionMessage) -> bool {
        debug!("Controller ignoring upward {message:?}");
        false
    }

    /// Addresses currently viewing, sorted.
    pub fn members(&self) -> Vec<String> {
        self.membership.snapshot()
    }

    /// Token pair of the most recently started session.
    pub fn current_tokens(&self) -> Option<SessionTokens> {
        self.tokens.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn stop_source_if_unused(&self, release: Release, own_machine: &Machine) {
        if !release.source_unused() {
            return;
        }

        info!("No viewers left, stopping broadcast source on {own_machine}");
        let stop_source = SessionMessage::new(BROADCAST_SOURCE.uid(), Command::StopSource);
        self.transport.send(&stop_source, own_machine);
        *self.tokens.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }
}

fn triggerable(capability_id: Uuid) -> Option<Capability> {
    Capability::from_uid(capability_id).filter(Capability::is_triggerable)
}
