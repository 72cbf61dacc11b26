pub mod job;
pub mod processor;

pub use job::{JobSubmitter, ModelId};
pub use processor::{Capability, InputProcessor, OutputProcessor};
