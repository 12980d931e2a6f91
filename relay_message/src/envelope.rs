use crate::Header;
use serde_value::Value;
use std::sync::Arc;

/// An on-wire pair of ([`Header`], payload) for one message, exactly as a
/// [`Serializer`](crate::Serializer) encodes and decodes it.
///
/// The payload preserves declaration order so codecs that care about field
/// order (e.g. some binary formats) can encode deterministically.
#[derive(Debug, Clone)]
pub struct Envelope {
    header: Header,
    payload: Vec<(Arc<str>, Value)>,
}

impl Envelope {
    /// Builds an envelope from an already-stamped header and an ordered
    /// payload.
    pub fn new(header: Header, payload: Vec<(Arc<str>, Value)>) -> Self {
        Self { header, payload }
    }

    /// The envelope's header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// A mutable view of the envelope's header.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// The envelope's payload, as an ordered list of (property name, value)
    /// pairs.
    pub fn payload(&self) -> &[(Arc<str>, Value)] {
        &self.payload
    }

    /// Looks up a payload value by property name.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.payload
            .iter()
            .find(|(name, _)| name.as_ref() == property)
            .map(|(_, value)| value)
    }

    /// Decomposes this envelope into its header and payload.
    pub fn into_parts(self) -> (Header, Vec<(Arc<str>, Value)>) {
        (self.header, self.payload)
    }
}
