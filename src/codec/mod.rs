//! OCPP-J message framing: `[2,id,action,payload]` / `[3,id,payload]` /
//! `[4,id,errorCode,errorDescription,errorDetails]`.

mod frame;

pub use frame::{OcppFrame, OcppFrameError};
