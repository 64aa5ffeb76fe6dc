//! The session control message.
//!
//! A message is addressed to a capability, carries one command and an
//! ordered list of typed arguments. Senders build it, receivers consume it
//! once; it is never persisted.

use std::fmt;

use uuid::Uuid;

/// Control commands understood by the session roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    StartSource,
    StopSource,
    StartViewer,
    StopViewer,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::StartSource => "StartSource",
            Command::StopSource => "StopSource",
            Command::StartViewer => "StartViewer",
            Command::StopViewer => "StopViewer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKey {
    /// Credential a viewer presents to the machine running the source.
    SourceToken,
    /// Credential a worker requires from incoming viewer connections.
    ViewerAccessToken,
    ViewerIsFullscreen,
    /// Filled in by the agent from the transport, never by the controller.
    SourceHostAddress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentValue {
    Text(String),
    Flag(bool),
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        ArgumentValue::Text(value)
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        ArgumentValue::Text(value.to_string())
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Flag(value)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SessionMessage {
    capability_id: Uuid,
    command: Command,
    arguments: Vec<(ArgumentKey, ArgumentValue)>,
}

impl SessionMessage {
    pub fn new(capability_id: Uuid, command: Command) -> Self {
        Self {
            capability_id,
            command,
            arguments: Vec::new(),
        }
    }

    /// Set an argument, replacing an existing value for the same key in place.
    pub fn with_argument(mut self, key: ArgumentKey, value: impl Into<ArgumentValue>) -> Self {
        let value = value.into();
        match self.arguments.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.arguments.push((key, value)),
        }
        self
    }

    pub fn capability_id(&self) -> Uuid {
        self.capability_id
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn arguments(&self) -> &[(ArgumentKey, ArgumentValue)] {
        &self.arguments
    }

    pub fn argument(&self, key: ArgumentKey) -> Option<&ArgumentValue> {
        self.arguments
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, value)| value)
    }

    /// Text argument; a flag stored under `key` reads as absent.
    pub fn text(&self, key: ArgumentKey) -> Option<&str> {
        match self.argument(key) {
            Some(ArgumentValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Flag argument; text stored under `key` reads as absent.
    pub fn flag(&self, key: ArgumentKey) -> Option<bool> {
        match self.argument(key) {
            Some(ArgumentValue::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }
}

// Argument values include tokens, so only keys are printed
impl fmt::Debug for SessionMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<ArgumentKey> = self.arguments.iter().map(|(key, _)| *key).collect();
        f.debug_struct("SessionMessage")
            .field("capability_id", &self.capability_id)
            .field("command", &self.command)
            .field("argument_keys", &keys)
            .finish()
    }
}
