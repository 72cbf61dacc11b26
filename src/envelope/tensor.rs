// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tensor lists carried inside envelope payloads.
//!
//! On the wire a tensor list is a JSON array of tensors whose raw data is base64
//! encoded, e.g. `[{"dtype":"float32","shape":[2],"data":"AACAPwAAAEA="}]`.

use serde::{Deserialize, Serialize};

use crate::errors::{EnsembleError, Result};

/// Element type of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float32,
    Float64,
    Int8,
    Int32,
    Int64,
    Uint8,
    Boolean,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            DataType::Float64 | DataType::Int64 => 8,
            DataType::Float32 | DataType::Int32 => 4,
            DataType::Int8 | DataType::Uint8 | DataType::Boolean => 1,
        }
    }
}

/// A single dense tensor: element type, shape and little-endian raw data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    dtype: DataType,
    shape: Vec<usize>,
    #[serde(with = "base64_bytes")]
    data: Vec<u8>,
}

impl Tensor {
    /// Build a tensor, checking that `data` holds exactly `shape` worth of elements.
    pub fn new(dtype: DataType, shape: Vec<usize>, data: Vec<u8>) -> Result<Self> {
        let tensor = Self {
            name: None,
            dtype,
            shape,
            data,
        };
        tensor.validate()?;
        Ok(tensor)
    }

    pub fn from_f32(shape: Vec<usize>, values: &[f32]) -> Result<Self> {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::new(DataType::Float32, shape, data)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of elements the shape describes; `None` if it does not fit in `usize`.
    pub fn element_count(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |count, &dim| count.checked_mul(dim))
    }

    /// Decode the data as `f32` values. `None` unless the dtype is float32.
    pub fn to_f32_vec(&self) -> Option<Vec<f32>> {
        if self.dtype != DataType::Float32 {
            return None;
        }
        Some(
            self.data
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    }

    fn validate(&self) -> Result<()> {
        let expected = self
            .element_count()
            .and_then(|count| count.checked_mul(self.dtype.size()))
            .ok_or_else(|| EnsembleError::PayloadDecode {
                reason: format!("tensor shape {:?} overflows the addressable size", self.shape),
            })?;
        if self.data.len() != expected {
            return Err(EnsembleError::PayloadDecode {
                reason: format!(
                    "tensor of shape {:?} ({:?}) needs {} bytes, got {}",
                    self.shape,
                    self.dtype,
                    expected,
                    self.data.len()
                ),
            });
        }
        Ok(())
    }
}

/// Ordered list of tensors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TensorList(Vec<Tensor>);

impl TensorList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, tensor: Tensor) {
        self.0.push(tensor);
    }

    /// Append every tensor of `other`, keeping its order.
    pub fn extend(&mut self, other: TensorList) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tensor> {
        self.0.iter()
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| EnsembleError::PayloadDecode {
            reason: format!("failed to encode tensor list: {}", e),
        })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let list: TensorList =
            serde_json::from_slice(bytes).map_err(|e| EnsembleError::PayloadDecode {
                reason: format!("not a tensor list: {}", e),
            })?;
        for tensor in &list.0 {
            tensor.validate()?;
        }
        Ok(list)
    }
}

impl From<Vec<Tensor>> for TensorList {
    fn from(tensors: Vec<Tensor>) -> Self {
        Self(tensors)
    }
}

impl IntoIterator for TensorList {
    type Item = Tensor;
    type IntoIter = std::vec::IntoIter<Tensor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, T: AsRef<[u8]>>(bytes: T, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes.as_ref()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
