// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Instant;

use crate::engine::RequestContext;
use crate::envelope::{Envelope, Payload};
use crate::errors::{EnsembleError, Result};
use crate::observability::messages::processor::{
    ProcessorExecutionCompleted, ProcessorExecutionFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::InputProcessor;

/// Text case conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCase {
    Upper,
    Lower,
    /// First letter of each word capitalized
    Proper,
    /// Like `Proper`, but short articles and prepositions stay lowercase
    Title,
}

impl TextCase {
    pub fn apply(&self, input: &str) -> String {
        match self {
            TextCase::Upper => input.to_uppercase(),
            TextCase::Lower => input.to_lowercase(),
            TextCase::Proper => input
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            TextCase::Title => input
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| {
                    let lower_word = word.to_lowercase();
                    if i == 0 || !is_small_word(&lower_word) {
                        capitalize(word)
                    } else {
                        lower_word
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

fn is_small_word(word: &str) -> bool {
    matches!(
        word,
        "a" | "an" | "the" | "and" | "or" | "but" | "in" | "on" | "at" | "to" | "for" | "of"
            | "with" | "by"
    )
}

/// Input processor that rewrites every text entry of the envelope.
///
/// Tensor entries pass through untouched; byte entries that are not UTF-8 fail
/// the request.
pub struct ChangeTextCaseProcessor {
    case: TextCase,
}

impl ChangeTextCaseProcessor {
    pub fn new(case: TextCase) -> Self {
        Self { case }
    }

    fn convert(&self, input: Envelope) -> Result<Envelope> {
        let mut output = Envelope::new();
        output.set_properties(input.properties().clone());

        for (key, payload) in input.into_content() {
            let converted = match payload {
                Payload::Bytes(bytes) => {
                    let text = String::from_utf8(bytes).map_err(|e| EnsembleError::ProcessorFailed {
                        processor: self.name().to_string(),
                        reason: format!("entry '{}' is not valid UTF-8: {}", key, e),
                    })?;
                    Payload::from(self.case.apply(&text))
                }
                tensors @ Payload::Tensors(_) => tensors,
            };
            output.add(key, converted);
        }
        Ok(output)
    }
}

#[async_trait]
impl InputProcessor for ChangeTextCaseProcessor {
    async fn process_input(&self, _ctx: &RequestContext, input: Envelope) -> Result<Envelope> {
        let start_time = Instant::now();
        let input_entries = input.len();

        match self.convert(input) {
            Ok(output) => {
                ProcessorExecutionCompleted {
                    processor_id: self.name(),
                    input_entries,
                    output_entries: output.len(),
                    duration: start_time.elapsed(),
                }
                .log();
                Ok(output)
            }
            Err(error) => {
                ProcessorExecutionFailed {
                    processor_id: self.name(),
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }

    fn name(&self) -> &'static str {
        "change_text_case"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::StubJobSubmitter;
    use crate::envelope::{Tensor, TensorList};
    use crate::processors::ProcessorRegistry;
    use std::sync::Arc;

    fn context() -> RequestContext {
        RequestContext::new(
            Arc::new(StubJobSubmitter::new()),
            Arc::new(ProcessorRegistry::new()),
        )
    }

    #[test]
    fn case_conversions() {
        let cases = vec![
            (TextCase::Upper, "hello", "HELLO"),
            (TextCase::Lower, "HELLO", "hello"),
            (TextCase::Proper, "hello wORLD", "Hello World"),
            (TextCase::Title, "the lord of the rings", "The Lord of the Rings"),
        ];

        for (case, input, expected) in cases {
            assert_eq!(case.apply(input), expected, "failed for {:?}", case);
        }
    }

    #[tokio::test]
    async fn rewrites_text_entries_and_keeps_tensors() {
        let tensors = TensorList::from(vec![Tensor::from_f32(vec![1], &[1.0]).unwrap()]);
        let input = Envelope::new()
            .with_property("lang", "en")
            .with_entry("data", "hello")
            .with_entry("embedding", tensors.clone())
            .with_entry("data", "world");

        let processor = ChangeTextCaseProcessor::new(TextCase::Upper);
        let output = processor.process_input(&context(), input).await.unwrap();

        assert_eq!(output.property("lang"), Some("en"));
        assert_eq!(output.len(), 3);
        assert_eq!(output.content()[0].1.as_text(), Some("HELLO"));
        assert_eq!(output.content()[1].1, Payload::Tensors(tensors));
        assert_eq!(output.content()[2].1.as_text(), Some("WORLD"));
    }

    #[tokio::test]
    async fn invalid_utf8_fails() {
        let input = Envelope::new().with_entry("data", vec![0xff, 0xfe]);
        let processor = ChangeTextCaseProcessor::new(TextCase::Lower);
        let err = processor.process_input(&context(), input).await.unwrap_err();
        assert!(matches!(err, EnsembleError::ProcessorFailed { .. }));
    }
}
