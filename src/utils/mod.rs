//! Shared helpers for rendering and writing flat files.

pub mod numbers;
pub mod output;
