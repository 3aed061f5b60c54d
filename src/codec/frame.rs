use serde_json::Value;

const CALL: u8 = 2;
const CALL_RESULT: u8 = 3;
const CALL_ERROR: u8 = 4;

/// A single parsed OCPP-J frame.
#[derive(Debug, Clone, PartialEq)]
pub enum OcppFrame {
    Call {
        unique_id: String,
        action: String,
        payload: Value,
    },
    CallResult {
        unique_id: String,
        payload: Value,
    },
    CallError {
        unique_id: String,
        error_code: String,
        error_description: String,
        error_details: Value,
    },
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OcppFrameError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("frame is not a JSON array")]
    NotAnArray,
    #[error("frame array is empty")]
    EmptyArray,
    #[error("message type id must be a number")]
    InvalidMessageTypeId,
    #[error("unsupported message type id: {0}")]
    UnsupportedMessageTypeId(u8),
    #[error("frame has wrong arity for its message type id")]
    WrongArity,
    #[error("unique id must be a string")]
    InvalidUniqueId,
    #[error("action must be a string")]
    InvalidAction,
    #[error("error code must be a string")]
    InvalidErrorCode,
    #[error("error description must be a string")]
    InvalidErrorDescription,
}

impl OcppFrame {
    pub fn unique_id(&self) -> &str {
        match self {
            Self::Call { unique_id, .. } => unique_id,
            Self::CallResult { unique_id, .. } => unique_id,
            Self::CallError { unique_id, .. } => unique_id,
        }
    }

    /// Parse a raw OCPP-J text frame.
    pub fn parse(raw: &str) -> Result<Self, OcppFrameError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| OcppFrameError::InvalidJson(e.to_string()))?;
        let arr = value.as_array().ok_or(OcppFrameError::NotAnArray)?;
        let first = arr.first().ok_or(OcppFrameError::EmptyArray)?;
        let message_type_id = first
            .as_u64()
            .ok_or(OcppFrameError::InvalidMessageTypeId)? as u8;

        match message_type_id {
            CALL => {
                if arr.len() != 4 {
                    return Err(OcppFrameError::WrongArity);
                }
                let unique_id = arr[1].as_str().ok_or(OcppFrameError::InvalidUniqueId)?.to_string();
                let action = arr[2].as_str().ok_or(OcppFrameError::InvalidAction)?.to_string();
                let payload = arr[3].clone();
                Ok(Self::Call { unique_id, action, payload })
            }
            CALL_RESULT => {
                if arr.len() != 3 {
                    return Err(OcppFrameError::WrongArity);
                }
                let unique_id = arr[1].as_str().ok_or(OcppFrameError::InvalidUniqueId)?.to_string();
                let payload = arr[2].clone();
                Ok(Self::CallResult { unique_id, payload })
            }
            CALL_ERROR => {
                if arr.len() != 5 {
                    return Err(OcppFrameError::WrongArity);
                }
                let unique_id = arr[1].as_str().ok_or(OcppFrameError::InvalidUniqueId)?.to_string();
                let error_code = arr[2].as_str().ok_or(OcppFrameError::InvalidErrorCode)?.to_string();
                let error_description = arr[3]
                    .as_str()
                    .ok_or(OcppFrameError::InvalidErrorDescription)?
                    .to_string();
                let error_details = arr[4].clone();
                Ok(Self::CallError { unique_id, error_code, error_description, error_details })
            }
            other => Err(OcppFrameError::UnsupportedMessageTypeId(other)),
        }
    }

    /// Serialize back to the wire format.
    pub fn serialize(&self) -> String {
        let value = match self {
            Self::Call { unique_id, action, payload } => {
                Value::Array(vec![
                    Value::from(CALL),
                    Value::from(unique_id.clone()),
                    Value::from(action.clone()),
                    payload.clone(),
                ])
            }
            Self::CallResult { unique_id, payload } => {
                Value::Array(vec![
                    Value::from(CALL_RESULT),
                    Value::from(unique_id.clone()),
                    payload.clone(),
                ])
            }
            Self::CallError { unique_id, error_code, error_description, error_details } => {
                Value::Array(vec![
                    Value::from(CALL_ERROR),
                    Value::from(unique_id.clone()),
                    Value::from(error_code.clone()),
                    Value::from(error_description.clone()),
                    error_details.clone(),
                ])
            }
        };
        value.to_string()
    }
}
