//! Version-aware command strategies: turning an operator intent (action +
//! parameters) into the OCPP call object for whichever dialect a charge
//! point is currently speaking.

pub mod v16;
pub mod v201;

use serde_json::Value;

use crate::session::SessionError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    #[error("no connection for this charge point")]
    NotConnected,
    #[error("request was rejected: {0}")]
    BadRequest(String),
    #[error("failed to send command: {0}")]
    SendFailed(String),
    #[error("command timed out")]
    Timeout,
    #[error("station disconnected mid-call")]
    Disconnected,
    #[error("unexpected response shape: {0}")]
    InvalidResponse(String),
    #[error("charge point rejected the call: {code}: {description}")]
    CallError { code: String, description: String },
    #[error("unsupported for this OCPP version")]
    UnsupportedVersion,
}

impl From<SessionError> for CommandError {
    fn from(err: SessionError) -> Self {
        match err {
            // A closed session is a zombie, not merely unreachable: the caller
            // must deregister it, same as a mid-call disconnect (§4.J step 3).
            SessionError::Closed => CommandError::Disconnected,
            SessionError::Disconnected => CommandError::Disconnected,
            SessionError::Timeout => CommandError::Timeout,
            SessionError::Transport(msg) => CommandError::SendFailed(msg),
            SessionError::CallError { code, description, .. } => {
                CommandError::CallError { code, description }
            }
        }
    }
}

/// The strategy interface each protocol version implements: build the call
/// object for `action` from loosely-typed operator parameters.
pub trait CommandStrategy: Send + Sync {
    fn build(&self, action: &str, parameters: &Value) -> Result<(String, Value), CommandError>;
}
