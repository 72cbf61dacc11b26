// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pluggable pre-/post-processing stages for model references.

pub mod change_text_case;
pub mod registry;
pub mod sub_image;

pub use change_text_case::{ChangeTextCaseProcessor, TextCase};
pub use registry::ProcessorRegistry;
pub use sub_image::{BoundingBox, DetectedObject, SubImageExtractor};
