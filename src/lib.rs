pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

// Use cases behind ports, and the adapters that implement them
pub mod app;
pub mod infra;

pub use error::{AdminError, DecodeError, Result, SubmissionError, ValidationError};
