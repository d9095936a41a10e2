//! Core pipeline orchestration for bock.
//!
//! This crate ties together classification, the content tree, history,
//! rendering, and the search index into the end-to-end `build` workflow.

mod entities;
mod pages;
pub mod pipeline;
pub mod writer;

pub use pipeline::{ProgressReporter, SilentProgress, generate, generate_with};
pub use writer::OutputWriter;
