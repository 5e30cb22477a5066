//! CLI command implementations.

pub mod archive;
pub mod common;
pub mod repository;
