//! Agent listener handle type.

use std::net::SocketAddr;

use log::info;
use tokio::task::JoinHandle;

/// Handle to a running agent listener.
///
/// Dropping the handle does **not** stop the listener; call
/// [`shutdown`](AgentServerHandle::shutdown) for that. Connections that are
/// already established keep being served until their peer disconnects.
pub struct AgentServerHandle {
    local_addr: SocketAddr,
    accept_task: JoinHandle<()>,
}

impl AgentServerHandle {
    pub(crate) fn new(local_addr: SocketAddr, accept_task: JoinHandle<()>) -> Self {
        Self {
            local_addr,
            accept_task,
        }
    }

    /// Address the listener is bound to (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting new connections.
    pub fn shutdown(self) {
        info!("Agent listener on {} shutting down", self.local_addr);
        self.accept_task.abort();
    }
}
