//! External packages: discovery, classification and file origins.

pub mod analyzer;
pub mod discovery;
pub mod external;
pub mod files;
pub mod source;

pub use analyzer::{ProjectManifest, analyze_external_package, determine_package_type};
pub use discovery::{discover_packages, find_all_packages, find_project_root};
pub use external::collect_external_symbols;
pub use source::determine_file_source;
