//! Architecture graph builder for Dart/Flutter projects.
//!
//! Takes the symbol forests a language service reports, enriches them with
//! types, parameters and inheritance, and builds a nested, layered graph of
//! classes, members and the packages they come from.
//!
//! Entry point: [`analyze_project`].

pub mod analysis;
pub mod config;
pub mod core;
pub mod errors;
pub mod graph;
pub mod lsp;
pub mod metrics;
pub mod model;
pub mod packages;
pub mod run;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use config::AnalysisConfig;
pub use errors::{GraphError, Result};
pub use lsp::{LanguageService, snapshot::SnapshotService};
pub use run::{AnalysisOutput, AnalysisRequest, SourceFile, analyze_project};
