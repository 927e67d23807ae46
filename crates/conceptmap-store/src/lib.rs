//! The Concept Graph Store.
//!
//! Owns the session state machine: `create`, `expand`, `reset`,
//! `import`/`export`, plus explanation refresh and follow-up suggestions.
//! Every transition either returns a fully valid new [`conceptmap_core::Session`]
//! or leaves the caller's snapshot untouched and reports a typed failure.
//! The language-generation collaborator sits behind the narrow
//! [`TextGenerator`] seam and is called with a bounded, injectable retry
//! policy.

pub mod config;
pub mod generate;
pub mod parse;
pub mod prompt;
pub mod retry;
pub mod store;

pub use config::StoreConfig;
pub use generate::{GenerateError, TextGenerator};
pub use parse::{Candidate, ParseError};
pub use prompt::ExplanationLength;
pub use retry::RetryPolicy;
pub use store::{ConceptStore, StoreError};
