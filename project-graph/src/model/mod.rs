pub mod graph;
pub mod kind;
pub mod package;
pub mod span;
pub mod symbol;
