//! # RepoLens Core
//!
//! Domain types, traits, and error definitions for the RepoLens repository
//! summarizer. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The external generative model is defined as a trait here; implementations
//! live in `repolens-providers`. This enables:
//! - Swapping model backends via configuration
//! - Easy testing with stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod candidate;
pub mod error;
pub mod model;

// Re-export key types at crate root for ergonomics
pub use candidate::{FileCandidate, PriorityFilter, PriorityTier, RankedFile};
pub use error::{Error, ModelError, PipelineError, Result};
pub use model::{ModelClient, ModelRequest};
