pub mod names;
pub mod text;
