//! Binary protobuf representation of session traffic.
//!
//! Messages are declared with prost derives instead of generated from a
//! `.proto` file; field tags are the compatibility contract and must not
//! be renumbered.

use crate::error::wire::WireError;

use common::ErrorLocation;
use models::{ArgumentKey, ArgumentValue, Command, SessionMessage};

use std::panic::Location;

use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum WireCommand {
    Unspecified = 0,
    StartSource = 1,
    StopSource = 2,
    StartViewer = 3,
    StopViewer = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum WireArgumentKey {
    Unspecified = 0,
    SourceToken = 1,
    ViewerAccessToken = 2,
    ViewerIsFullscreen = 3,
    SourceHostAddress = 4,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WireArgument {
    #[prost(enumeration = "WireArgumentKey", tag = "1")]
    pub key: i32,
    #[prost(oneof = "wire_argument::Value", tags = "2, 3")]
    pub value: Option<wire_argument::Value>,
}

pub mod wire_argument {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Value {
        #[prost(string, tag = "2")]
        Text(String),
        #[prost(bool, tag = "3")]
        Flag(bool),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WireSessionMessage {
    #[prost(string, tag = "1")]
    pub capability_id: String,
    #[prost(enumeration = "WireCommand", tag = "2")]
    pub command: i32,
    #[prost(message, repeated, tag = "3")]
    pub arguments: Vec<WireArgument>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WireAuthHandshake {
    #[prost(string, tag = "1")]
    pub token: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WireAuthHandshakeResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, optional, tag = "2")]
    pub error: Option<String>,
}

/// Everything exchanged between a controller and an agent.
#[derive(Clone, PartialEq, prost::Message)]
pub struct WireEnvelope {
    #[prost(oneof = "wire_envelope::Payload", tags = "1, 2, 3")]
    pub payload: Option<wire_envelope::Payload>,
}

pub mod wire_envelope {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "1")]
        AuthHandshake(super::WireAuthHandshake),
        #[prost(message, tag = "2")]
        AuthHandshakeResponse(super::WireAuthHandshakeResponse),
        #[prost(message, tag = "3")]
        SessionMessage(super::WireSessionMessage),
    }
}

impl WireEnvelope {
    pub fn session_message(message: &SessionMessage) -> Self {
        Self {
            payload: Some(wire_envelope::Payload::SessionMessage(message.into())),
        }
    }

    pub fn auth_handshake(token: &str) -> Self {
        Self {
            payload: Some(wire_envelope::Payload::AuthHandshake(WireAuthHandshake {
                token: token.to_string(),
            })),
        }
    }

    pub fn auth_response(success: bool, error: Option<&str>) -> Self {
        Self {
            payload: Some(wire_envelope::Payload::AuthHandshakeResponse(
                WireAuthHandshakeResponse {
                    success,
                    error: error.map(str::to_string),
                },
            )),
        }
    }
}

impl From<Command> for WireCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::StartSource => WireCommand::StartSource,
            Command::StopSource => WireCommand::StopSource,
            Command::StartViewer => WireCommand::StartViewer,
            Command::StopViewer => WireCommand::StopViewer,
        }
    }
}

impl From<ArgumentKey> for WireArgumentKey {
    fn from(key: ArgumentKey) -> Self {
        match key {
            ArgumentKey::SourceToken => WireArgumentKey::SourceToken,
            ArgumentKey::ViewerAccessToken => WireArgumentKey::ViewerAccessToken,
            ArgumentKey::ViewerIsFullscreen => WireArgumentKey::ViewerIsFullscreen,
            ArgumentKey::SourceHostAddress => WireArgumentKey::SourceHostAddress,
        }
    }
}

impl From<&SessionMessage> for WireSessionMessage {
    fn from(message: &SessionMessage) -> Self {
        let arguments = message
            .arguments()
            .iter()
            .map(|(key, value)| WireArgument {
                key: WireArgumentKey::from(*key) as i32,
                value: Some(match value {
                    ArgumentValue::Text(text) => wire_argument::Value::Text(text.clone()),
                    ArgumentValue::Flag(flag) => wire_argument::Value::Flag(*flag),
                }),
            })
            .collect();

        Self {
            capability_id: message.capability_id().to_string(),
            command: WireCommand::from(message.command()) as i32,
            arguments,
        }
    }
}

impl TryFrom<WireSessionMessage> for SessionMessage {
    type Error = WireError;

    #[track_caller]
    fn try_from(wire: WireSessionMessage) -> Result<Self, Self::Error> {
        let capability_id =
            Uuid::parse_str(&wire.capability_id).map_err(|e| WireError::InvalidCapabilityId {
                value: wire.capability_id.clone(),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            })?;

        let command = match WireCommand::try_from(wire.command) {
            Ok(WireCommand::StartSource) => Command::StartSource,
            Ok(WireCommand::StopSource) => Command::StopSource,
            Ok(WireCommand::StartViewer) => Command::StartViewer,
            Ok(WireCommand::StopViewer) => Command::StopViewer,
            Ok(WireCommand::Unspecified) | Err(_) => {
                return Err(WireError::UnknownCommand {
                    value: wire.command,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let mut message = SessionMessage::new(capability_id, command);
        for argument in wire.arguments {
            let key = match WireArgumentKey::try_from(argument.key) {
                Ok(WireArgumentKey::SourceToken) => ArgumentKey::SourceToken,
                Ok(WireArgumentKey::ViewerAccessToken) => ArgumentKey::ViewerAccessToken,
                Ok(WireArgumentKey::ViewerIsFullscreen) => ArgumentKey::ViewerIsFullscreen,
                Ok(WireArgumentKey::SourceHostAddress) => ArgumentKey::SourceHostAddress,
                Ok(WireArgumentKey::Unspecified) | Err(_) => {
                    return Err(WireError::UnknownArgumentKey {
                        value: argument.key,
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            };

            let value = match argument.value {
                Some(wire_argument::Value::Text(text)) => ArgumentValue::Text(text),
                Some(wire_argument::Value::Flag(flag)) => ArgumentValue::Flag(flag),
                None => {
                    return Err(WireError::MissingArgumentValue {
                        message: format!("Argument {key:?} has no value"),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            };

            message = message.with_argument(key, value);
        }

        Ok(message)
    }
}
