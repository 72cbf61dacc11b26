// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The request/response container passed between graph nodes.
//!
//! An [`Envelope`] is an ordered list of `key -> payload` pairs (keys may repeat)
//! plus a string property map and a status line. Nodes never mutate the envelope
//! they receive; they build a new one.

mod tensor;

pub use tensor::{DataType, Tensor, TensorList};

use std::borrow::Cow;
use std::collections::HashMap;

use crate::config::consts::DATA_KEY;
use crate::errors::{EnsembleError, Result};

/// A single value inside an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Opaque bytes (text, encoded images, JSON documents...).
    Bytes(Vec<u8>),
    /// An already-structured tensor list.
    Tensors(TensorList),
}

impl Payload {
    /// The payload as bytes. Tensor lists are encoded to their wire form.
    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Payload::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            Payload::Tensors(list) => Ok(Cow::Owned(list.encode()?)),
        }
    }

    /// The payload as UTF-8 text, if it is valid UTF-8 bytes.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
            Payload::Tensors(_) => None,
        }
    }

    /// Interpret the payload as a tensor list.
    pub fn to_tensor_list(&self) -> Result<TensorList> {
        match self {
            Payload::Tensors(list) => Ok(list.clone()),
            Payload::Bytes(bytes) => TensorList::decode(bytes),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Bytes(text.into_bytes())
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Bytes(text.as_bytes().to_vec())
    }
}

impl From<TensorList> for Payload {
    fn from(list: TensorList) -> Self {
        Payload::Tensors(list)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    code: u16,
    message: String,
    properties: HashMap<String, String>,
    content: Vec<(String, Payload)>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

impl Envelope {
    /// Empty envelope with status `200 OK`.
    pub fn new() -> Self {
        Self::with_status(200, "OK")
    }

    pub fn with_status(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            properties: HashMap::new(),
            content: Vec::new(),
        }
    }

    /// Builder-style [`Envelope::add`].
    pub fn with_entry(mut self, key: impl Into<String>, payload: impl Into<Payload>) -> Self {
        self.add(key, payload);
        self
    }

    /// Builder-style [`Envelope::set_property`].
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_property(key, value);
        self
    }

    /// Append an entry. Existing entries with the same key are kept.
    pub fn add(&mut self, key: impl Into<String>, payload: impl Into<Payload>) {
        self.content.push((key.into(), payload.into()));
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn content(&self) -> &[(String, Payload)] {
        &self.content
    }

    pub fn into_content(self) -> Vec<(String, Payload)> {
        self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.content.iter().map(|(k, _)| k.as_str())
    }

    /// First payload stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.content.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The primary payload: the first `"data"` entry, else the first entry.
    pub fn data(&self) -> Option<&Payload> {
        self.get(DATA_KEY)
            .or_else(|| self.content.first().map(|(_, v)| v))
    }

    /// The primary payload read as a tensor list.
    pub fn data_as_tensor_list(&self) -> Result<TensorList> {
        self.data()
            .ok_or_else(|| EnsembleError::PayloadDecode {
                reason: "envelope has no data entry".to_string(),
            })?
            .to_tensor_list()
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn set_properties(&mut self, properties: HashMap<String, String>) {
        self.properties = properties;
    }

    /// One single-entry envelope per entry, each carrying this envelope's properties.
    pub fn split(&self) -> Vec<Envelope> {
        self.content
            .iter()
            .map(|(key, payload)| {
                let mut part = Envelope::new();
                part.set_properties(self.properties.clone());
                part.add(key.clone(), payload.clone());
                part
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_are_preserved() {
        let envelope = Envelope::new()
            .with_entry("data", "first")
            .with_entry("data", "second");
        assert_eq!(envelope.len(), 2);
        assert_eq!(envelope.get("data").and_then(Payload::as_text), Some("first"));
    }

    #[test]
    fn data_prefers_data_key_then_first_entry() {
        let envelope = Envelope::new()
            .with_entry("image", "pixels")
            .with_entry("data", "payload");
        assert_eq!(envelope.data().and_then(Payload::as_text), Some("payload"));

        let envelope = Envelope::new().with_entry("image", "pixels");
        assert_eq!(envelope.data().and_then(Payload::as_text), Some("pixels"));

        assert!(Envelope::new().data().is_none());
    }

    #[test]
    fn split_copies_properties_into_each_part() {
        let envelope = Envelope::new()
            .with_property("request_id", "42")
            .with_entry("a", "1")
            .with_entry("b", "2")
            .with_entry("a", "3");

        let parts = envelope.split();
        assert_eq!(parts.len(), 3);
        for part in &parts {
            assert_eq!(part.len(), 1);
            assert_eq!(part.property("request_id"), Some("42"));
        }
        let keys: Vec<&str> = parts.iter().flat_map(|p| p.keys()).collect();
        assert_eq!(keys, vec!["a", "b", "a"]);
    }

    #[test]
    fn bytes_payload_decodes_as_tensor_list() {
        let list = TensorList::from(vec![Tensor::from_f32(vec![1], &[4.0]).unwrap()]);
        let envelope = Envelope::new().with_entry("data", list.encode().unwrap());
        assert_eq!(envelope.data_as_tensor_list().unwrap(), list);

        let envelope = Envelope::new().with_entry("data", "not tensors");
        assert!(envelope.data_as_tensor_list().is_err());
    }
}
