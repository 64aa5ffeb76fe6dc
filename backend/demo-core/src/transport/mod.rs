//! Message transport between roles.
//!
//! - Controller to agent: binary protobuf over WebSocket ([`server`], [`link`])
//! - Agent to worker: length-prefixed protobuf frames over the worker's
//!   stdin ([`frame`])

pub(crate) mod connection_state;
pub mod frame;
pub mod handle;
pub mod link;
pub mod server;

pub use handle::AgentServerHandle;
pub use link::WsTransportLink;
pub use server::{PeerConnection, start_agent_server};
