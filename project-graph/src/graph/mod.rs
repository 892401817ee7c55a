//! Graph construction engine: node pass, edge pass, package integration.

pub mod builder;
pub mod edges;
pub mod layer;
pub mod packages;

pub use builder::GraphBuilder;
pub use layer::classify;
