// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod change_text_case;
pub mod echo;
pub mod reverse_text;
pub mod token_counter;

pub use change_text_case::*;
pub use echo::*;
pub use reverse_text::*;
pub use token_counter::*;

use crate::envelope::{Envelope, Payload};
use crate::errors::JobError;

/// Apply `f` to every entry of `input`, which must all be UTF-8 text.
/// Keys, order and properties are kept.
pub(crate) fn map_text_entries<F>(model: &str, input: Envelope, f: F) -> Result<Envelope, JobError>
where
    F: Fn(&str) -> Result<String, JobError>,
{
    let mut output = Envelope::new();
    output.set_properties(input.properties().clone());

    for (key, payload) in input.into_content() {
        let text = match &payload {
            Payload::Bytes(bytes) => std::str::from_utf8(bytes).map_err(|e| {
                JobError::InferenceFailed {
                    model: model.to_string(),
                    reason: format!("Invalid UTF-8 input in entry '{}': {}", key, e),
                }
            })?,
            Payload::Tensors(_) => {
                return Err(JobError::InferenceFailed {
                    model: model.to_string(),
                    reason: format!("entry '{}' is a tensor list, expected text", key),
                })
            }
        };
        output.add(key.clone(), f(text)?);
    }
    Ok(output)
}
