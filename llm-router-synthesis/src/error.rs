use llm_router_core::OutputFormat;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("No results to combine")]
    NoResults,

    #[error("Invalid result at position {index}: {reason}")]
    InvalidResult { index: usize, reason: String },

    #[error("Failed to combine outputs: {0}")]
    Combination(String),

    #[error("Result has no output to format")]
    InvalidFormatInput,

    #[error("Failed to format output as {format}: {reason}")]
    Format { format: OutputFormat, reason: String },
}

pub type Result<T> = std::result::Result<T, SynthesisError>;
