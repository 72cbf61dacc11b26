/// File name of the graph description inside a model directory
pub const ENSEMBLE_FILE_NAME: &str = "ensemble.json";
/// Context attachment holding the input a model reference received
pub const INPUT_ATTACHMENT: &str = "input";
/// Context attachment holding the final result of an evaluation
pub const OUTPUT_ATTACHMENT: &str = "output";
/// Envelope key of the primary payload
pub const DATA_KEY: &str = "data";
/// Detection class the sub-image extractor keeps by default
pub const DEFAULT_SUB_IMAGE_CLASS: &str = "person";
/// Registry name of the sub-image output processor
pub const SUB_IMAGE_PROCESSOR: &str = "sub_image";
/// Class name graphs written for the Java model server use for the sub-image processor
pub const SUB_IMAGE_CLASS_NAME: &str = "ai.djl.serving.ensemble.SubImage";

pub const SEQUENCE_TYPE: &str = "sequence";
pub const PARALLEL_TYPE: &str = "parallel";
