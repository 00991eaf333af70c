pub mod broker;
pub mod execution;
pub mod parsing;
pub mod request;
pub mod runtime;
pub mod transcription;

pub use request::{ApiConfig, Body, HttpRequest};
