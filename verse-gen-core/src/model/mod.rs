//! Corpus models and poem generation.
//!
//! From the bottom up:
//! - Word transition tables (`TransitionTable`)
//! - Per-source models with precomputed word profiles (`CorpusModel`)
//! - Backtracking line search under meter or syllable targets (`LineGenerator`)
//! - Rhyme scheme templates composing whole poems (`PoemTemplate`)
//! - Named poem styles (`PoemStyle`, `StyleRegistry`)
//! - The service facade used by the server and the CLI (`PoemService`)

/// Bounded LRU cache for models built from submitted text.
mod cache;

/// Forward/backward transition tables, rhyme seed index and word profiles
/// of one corpus.
///
/// Supports parallel construction and `postcard` caching on disk.
pub mod corpus_model;

/// Retry and search budgets.
pub mod generation_config;

/// Tail-first metered line search and head-first syllable line search.
pub mod line_generator;

/// High-level interface: named sources, named styles, custom texts.
pub mod service;

/// Poem styles and their registry.
pub mod style;

/// Rhyme scheme + meter templates and the built-in forms.
pub mod template;

/// Word → successors table.
pub mod transition_table;

pub use cache::ModelCache;
pub use corpus_model::{CorpusModel, RhymeSeedIndex};
pub use generation_config::GenerationConfig;
pub use line_generator::LineGenerator;
pub use service::PoemService;
pub use style::{HaikuStyle, PoemStyle, StyleRegistry, TemplateStyle};
pub use template::PoemTemplate;
pub use transition_table::TransitionTable;
