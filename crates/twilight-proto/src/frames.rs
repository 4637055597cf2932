//! Gateway frame definitions.
//!
//! Outbound frames are `{ "op": <opcode>, "d": <data> }`. Inbound frames are
//! `{ "t": <event tag>, "d": <payload> }`; the payload shape belongs to the
//! application and is carried as an opaque [`serde_json::Value`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::ProtoError;

/// Outbound opcodes understood by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Authenticate the connection.
    Identify,
}

impl Opcode {
    /// Numeric value on the wire.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Identify => 0,
        }
    }

    /// Look up an opcode by its wire value.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Identify),
            _ => None,
        }
    }
}

impl Serialize for Opcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Opcode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown opcode {code}")))
    }
}

/// Payload of the identify frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyData {
    /// Auth token. Omitted from the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// The handshake frame sent once after every transport open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyFrame {
    /// Always [`Opcode::Identify`].
    pub op: Opcode,
    /// Identify payload.
    pub d: IdentifyData,
}

impl IdentifyFrame {
    /// Build an identify frame for the given token.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            op: Opcode::Identify,
            d: IdentifyData { token },
        }
    }

    /// The token carried by this frame, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.d.token.as_deref()
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::Encoding(e.to_string()))
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(json).map_err(|e| ProtoError::Decoding(e.to_string()))
    }
}

/// One decoded inbound frame: an event tag and its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundFrame {
    /// Event tag used as the dispatch key.
    #[serde(rename = "t")]
    pub tag: String,
    /// Opaque payload. `null` when the peer omits it.
    #[serde(rename = "d", default)]
    pub data: Value,
}

impl InboundFrame {
    /// Create a frame.
    #[must_use]
    pub fn new(tag: impl Into<String>, data: Value) -> Self {
        Self {
            tag: tag.into(),
            data,
        }
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::Encoding(e.to_string()))
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or has no string `t` field.
    pub fn from_json(json: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(json).map_err(|e| ProtoError::Decoding(e.to_string()))
    }
}
