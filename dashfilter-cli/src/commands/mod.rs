//! CLI command implementations.

pub mod compile;
pub mod operators;
pub mod render;
pub mod to_form;
pub mod version;
