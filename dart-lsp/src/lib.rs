//! Dart analysis server bridge for the project graph pipeline.

pub mod client;
pub mod errors;
pub mod parse;
pub mod service;

pub use errors::{LspError, Result};
pub use service::{DartLanguageService, locate_dart};
