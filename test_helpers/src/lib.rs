//! Test helpers shared across crates.
//!
//! This crate provides environment variable guards, declaration fixtures for
//! the extractor and synthesizer, and text helpers for comparing rendered
//! documents.

pub mod env;
pub mod fixtures;
pub mod text;
