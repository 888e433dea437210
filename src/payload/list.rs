//! Ordered, repeatable-name payload collections and their builder.

use bytes::Bytes;
use std::sync::Arc;

use crate::payload::mime::MimeType;
use crate::payload::source::{Payload, PayloadError};

/// An immutable, ordered sequence of payloads. Names may repeat.
///
/// Cloning is cheap: the sequence is shared and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadList {
    payloads: Arc<Vec<Payload>>,
}

impl PayloadList {
    /// Start accumulating a new list.
    pub fn builder() -> PayloadListBuilder {
        PayloadListBuilder::default()
    }

    /// An empty list.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Literal concatenation of the given lists, in argument order.
    ///
    /// No deduplication and no reordering takes place.
    pub fn concat<'a, I>(lists: I) -> Self
    where
        I: IntoIterator<Item = &'a PayloadList>,
    {
        let payloads: Vec<Payload> = lists
            .into_iter()
            .flat_map(|list| list.payloads.iter().cloned())
            .collect();
        Self {
            payloads: Arc::new(payloads),
        }
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Payload> {
        self.payloads.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Payload> {
        self.payloads.get(index)
    }

    pub fn as_slice(&self) -> &[Payload] {
        self.payloads.as_slice()
    }

    /// First payload with the given name.
    pub fn first(&self, name: &str) -> Option<&Payload> {
        self.payloads.iter().find(|p| p.name() == name)
    }

    /// Every payload with the given name, in order.
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Payload> + 'a {
        self.payloads.iter().filter(move |p| p.name() == name)
    }

    /// Payload names in order, including repeats.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.payloads.iter().map(Payload::name)
    }
}

impl<'a> IntoIterator for &'a PayloadList {
    type Item = &'a Payload;
    type IntoIter = std::slice::Iter<'a, Payload>;

    fn into_iter(self) -> Self::IntoIter {
        self.payloads.iter()
    }
}

/// Accumulates payloads and produces independent [`PayloadList`] snapshots.
#[derive(Debug, Clone, Default)]
pub struct PayloadListBuilder {
    payloads: Vec<Payload>,
}

impl PayloadListBuilder {
    /// Append a text payload.
    pub fn add_text(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, PayloadError> {
        self.payloads.push(Payload::text(name, value)?);
        Ok(self)
    }

    /// Append a byte payload.
    pub fn add_bytes(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Bytes>,
        content_type: MimeType,
    ) -> Result<&mut Self, PayloadError> {
        self.payloads.push(Payload::bytes(name, value, content_type)?);
        Ok(self)
    }

    /// Append a byte payload carrying a filename.
    pub fn add_file(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Bytes>,
        content_type: MimeType,
        filename: impl Into<String>,
    ) -> Result<&mut Self, PayloadError> {
        self.payloads
            .push(Payload::file(name, value, content_type, filename)?);
        Ok(self)
    }

    /// Append an already constructed payload.
    pub fn add_payload(&mut self, payload: Payload) -> &mut Self {
        self.payloads.push(payload);
        self
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Snapshot of everything added so far. Later additions never affect it.
    pub fn build(&self) -> PayloadList {
        PayloadList {
            payloads: Arc::new(self.payloads.clone()),
        }
    }
}
