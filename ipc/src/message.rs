//! Envelopes exchanged between the host and its surfaces

use core_types::SurfaceId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Identifies one message; replies point back at it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message:{}", self.0)
    }
}

/// Version of the payload layout behind an action name
///
/// Surfaces built against another major version are not understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Minor versions only add optional fields
    pub fn is_compatible_with(&self, other: &SchemaVersion) -> bool {
        self.major == other.major
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A control message on the local channel
///
/// The action name is kept as a string so that unknown actions can still be
/// logged before they are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub id: MessageId,
    pub action: String,
    pub schema_version: SchemaVersion,
    /// Surface that sent the message (`None` when it came from the host)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SurfaceId>,
    /// Request this message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<MessageId>,
    pub payload: MessagePayload,
}

impl MessageEnvelope {
    pub fn new(
        action: impl Into<String>,
        schema_version: SchemaVersion,
        payload: MessagePayload,
    ) -> Self {
        Self {
            id: MessageId::new(),
            action: action.into(),
            schema_version,
            source: None,
            correlation_id: None,
            payload,
        }
    }

    pub fn with_source(mut self, source: SurfaceId) -> Self {
        self.source = Some(source);
        self
    }

    /// Marks this message as the answer to `request`
    pub fn with_correlation(mut self, request: MessageId) -> Self {
        self.correlation_id = Some(request);
        self
    }

    pub fn is_reply(&self) -> bool {
        self.correlation_id.is_some()
    }
}

/// JSON body of an envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessagePayload(Value);

impl MessagePayload {
    pub fn new<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(data).map(Self)
    }

    /// A payload for actions that carry nothing (`null`)
    pub fn empty() -> Self {
        Self(Value::Null)
    }

    pub fn deserialize<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.0)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_major_decides_compatibility() {
        let current = SchemaVersion::new(1, 0);
        assert!(current.is_compatible_with(&SchemaVersion::new(1, 4)));
        assert!(!current.is_compatible_with(&SchemaVersion::new(2, 0)));
        assert_eq!(SchemaVersion::new(1, 4).to_string(), "1.4");
    }

    #[test]
    fn test_empty_payload_is_null() {
        let payload = MessagePayload::empty();
        assert_eq!(payload.as_json(), &Value::Null);
        assert!(payload.deserialize::<()>().is_ok());
    }

    #[test]
    fn test_payload_is_inlined_on_the_wire() {
        let envelope = MessageEnvelope::new(
            "open-app",
            SchemaVersion::new(1, 0),
            MessagePayload::new(&json!({ "name": "ble" })).unwrap(),
        );
        let wire = serde_json::to_value(&envelope).unwrap();

        assert_eq!(wire["payload"]["name"], "ble");
        assert!(wire.get("source").is_none());
        assert!(wire.get("correlation_id").is_none());
    }

    #[test]
    fn test_reply_points_at_request() {
        let surface = SurfaceId::new();
        let request = MessageEnvelope::new(
            "get-app-details",
            SchemaVersion::new(1, 0),
            MessagePayload::empty(),
        )
        .with_source(surface);
        assert_eq!(request.source, Some(surface));
        assert!(!request.is_reply());

        let reply = MessageEnvelope::new(
            "app-details",
            SchemaVersion::new(1, 0),
            MessagePayload::empty(),
        )
        .with_correlation(request.id);
        assert!(reply.is_reply());
        assert_eq!(reply.correlation_id, Some(request.id));
        assert_ne!(reply.id, request.id);
    }
}
