//! Passes over parsed documents: name resolution and presentation output.

pub mod render;
pub mod resolve;
