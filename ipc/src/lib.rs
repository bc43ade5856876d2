//! # Inter-Process Communication (IPC)
//!
//! This crate defines the local message channel between the host and the
//! surfaces it hosts.
//!
//! ## Philosophy
//!
//! - **Messages, not shared state**: surfaces talk to the host only through envelopes
//! - **Typed at the edge**: action names are decoded into a closed enum once,
//!   at the boundary, and never matched as strings again
//! - **Traceable**: every message has an ID; replies carry the request's ID
//! - **Versionable**: envelopes carry a schema version
//!
//! ## Architecture
//!
//! An envelope contains:
//! - The action name (the wire form of a control request)
//! - The sending surface, when it came from one
//! - Schema version for compatibility checks
//! - Correlation ID for request/reply matching
//! - A JSON payload

pub mod control;
pub mod message;

pub use control::{
    AppDetails, AppLookup, ControlRequest, DecodeError, APP_DETAILS_ACTION,
    CONTROL_SCHEMA_VERSION, GET_APP_DETAILS_ACTION, LOCAL_SOURCE, OPEN_APP_ACTION,
    OPEN_LAUNCHER_ACTION, SHOW_ABOUT_ACTION,
};
pub use message::{MessageEnvelope, MessageId, MessagePayload, SchemaVersion};
