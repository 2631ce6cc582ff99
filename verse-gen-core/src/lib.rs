//! Poem generation from arbitrary text corpora.
//!
//! This crate turns any text into sonnets, limericks, haiku or free-form
//! rhyme schemes:
//! - Phonetic analysis of words, in or out of a pronunciation dictionary
//! - Scansion of words and lines against a target meter
//! - Bidirectional word transition models built per corpus
//! - Backtracking line generation and template-driven poem assembly
//!
//! [`PoemService`] is the entry point for applications.

/// Service configuration loaded from JSON.
pub mod config;

/// Error taxonomy and user-facing messages.
pub mod error;

/// Corpus models, line generation, templates, styles and the service facade.
pub mod model;

/// Pronunciation dictionary, syllable/stress/rhyme fingerprints.
pub mod phonetics;

/// Stress pattern matching used by the line search.
pub mod scansion;

/// Corpus file reading and path helpers.
///
/// Not exposed
pub(crate) mod io;

pub use config::ServiceConfig;
pub use error::{NO_POEM_FOUND, PoemError};
pub use model::{GenerationConfig, PoemService, PoemTemplate};
pub use phonetics::{PhoneticAnalyzer, PronouncingDictionary, StressPattern};
