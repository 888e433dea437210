//! Query string → payload list.

use crate::decode::DecodeError;
use crate::payload::{PayloadList, PayloadListBuilder};

/// Query parameters grouped by name, names in order of first appearance.
///
/// This is the multi-valued map shape HTTP frameworks usually expose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    /// Parse a raw (still percent-encoded) query string.
    pub fn parse(raw: &str) -> Self {
        let mut params = Self::default();
        for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            params.push(name.into_owned(), value.into_owned());
        }
        params
    }

    /// Append a value, grouping it under an existing name if already seen.
    pub fn push(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One text payload per value: names in transport order, values in list order.
pub fn decode_query(params: &QueryParams) -> Result<PayloadList, DecodeError> {
    let mut builder = PayloadListBuilder::default();
    for (name, values) in params.iter() {
        for value in values {
            tracing::debug!(name = %name, "Found query parameter");
            builder.add_text(name, value.as_str())?;
        }
    }
    Ok(builder.build())
}

/// Convenience for an optional raw query string.
pub fn decode_raw_query(raw: Option<&str>) -> Result<PayloadList, DecodeError> {
    match raw {
        Some(raw) => decode_query(&QueryParams::parse(raw)),
        None => Ok(PayloadList::empty()),
    }
}
