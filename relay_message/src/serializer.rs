use crate::{Envelope, SerializerError};

/// Symmetric codec between an [`Envelope`] and its on-wire byte
/// representation.
///
/// Implementations must be safe for concurrent use: the dispatcher invokes
/// them from multiple worker tasks (§4.2).
pub trait Serializer: Send + Sync {
    /// The stable identifier written into [`Header::serializer`](crate::Header::serializer),
    /// used by decoders to choose a codec when one is present on the wire.
    fn id(&self) -> &'static str;

    /// Encodes the given envelope into bytes.
    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, SerializerError>;

    /// Decodes bytes into an envelope.
    fn decode(&self, bytes: &[u8]) -> Result<Envelope, SerializerError>;
}

/// A passthrough codec for payloads that are already encoded: `encode` and
/// `decode` round-trip the header alone, treating the payload as already
/// opaque bytes stashed under a single `"bytes"` property.
///
/// Mirrors the teacher's `NoopDecoder`: a minimal reference implementation
/// that exists mostly so the crate has a usable default without pulling in a
/// real serialization format.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSerializer;

const NOOP_PAYLOAD_KEY: &str = "bytes";

impl Serializer for NoopSerializer {
    fn id(&self) -> &'static str {
        "noop"
    }

    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, SerializerError> {
        let bytes = match envelope.get(NOOP_PAYLOAD_KEY) {
            Some(serde_value::Value::Bytes(bytes)) => bytes.clone(),
            Some(serde_value::Value::String(string)) => string.clone().into_bytes(),
            _ => Vec::new(),
        };

        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Envelope, SerializerError> {
        Err(SerializerError::Decode {
            serializer: Box::from(self.id()),
            reason: Box::from(format!(
                "NoopSerializer cannot reconstruct a header from {} raw bytes; use a \
                 format-aware serializer for round-tripping",
                bytes.len(),
            )),
        })
    }
}

/// A `serde_json`-backed codec: encodes the (header, payload) pair as a JSON
/// object with `"header"` and `"payload"` keys.
///
/// Gated behind the `json` feature, the same way decoder implementations
/// elsewhere in this workspace are feature-gated per codec.
#[cfg(feature = "json")]
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

#[cfg(feature = "json")]
impl Serializer for JsonSerializer {
    fn id(&self) -> &'static str {
        "json"
    }

    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, SerializerError> {
        #[derive(serde::Serialize)]
        struct Wire<'a> {
            header: &'a crate::Header,
            payload: std::collections::BTreeMap<String, serde_json::Value>,
        }

        let payload = envelope
            .payload()
            .iter()
            .map(|(name, value)| {
                let json = serde_value_to_json(value.clone())?;
                Ok((name.to_string(), json))
            })
            .collect::<Result<_, SerializerError>>()?;

        let wire = Wire {
            header: envelope.header(),
            payload,
        };

        serde_json::to_vec(&wire).map_err(|error| SerializerError::Encode {
            serializer: Box::from(self.id()),
            reason: Box::from(error.to_string()),
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<Envelope, SerializerError> {
        #[derive(serde::Deserialize)]
        struct Wire {
            header: crate::Header,
            payload: std::collections::BTreeMap<String, serde_json::Value>,
        }

        let wire: Wire = serde_json::from_slice(bytes).map_err(|error| SerializerError::Decode {
            serializer: Box::from(self.id()),
            reason: Box::from(error.to_string()),
        })?;

        let payload = wire
            .payload
            .into_iter()
            .map(|(name, json)| {
                let value = json_to_serde_value(json)?;
                Ok((std::sync::Arc::from(name.as_str()), value))
            })
            .collect::<Result<_, SerializerError>>()?;

        Ok(Envelope::new(wire.header, payload))
    }
}

#[cfg(feature = "json")]
fn serde_value_to_json(value: serde_value::Value) -> Result<serde_json::Value, SerializerError> {
    serde_json::to_value(value).map_err(|error| SerializerError::Encode {
        serializer: Box::from("json"),
        reason: Box::from(error.to_string()),
    })
}

#[cfg(feature = "json")]
fn json_to_serde_value(value: serde_json::Value) -> Result<serde_value::Value, SerializerError> {
    serde_value::to_value(value).map_err(|error| SerializerError::Decode {
        serializer: Box::from("json"),
        reason: Box::from(error.to_string()),
    })
}
