//! `ontoalign-engine` — ontology alignment orchestration engine.
//!
//! Pure engine crate: decides which externally implemented matching
//! strategies run, in what order and at what thresholds, merges their
//! outputs into one alignment, and narrows it through selection and
//! repair. Similarity computation, ontology parsing, translation and the
//! review UI stay outside, behind the [`matcher::MatcherSet`] and
//! [`matcher::FilterSet`] traits; the only IO here is lexicon-file
//! ingestion for auxiliary knowledge sources.

pub mod config;
pub mod context;
pub mod error;
pub mod matcher;
pub mod model;
pub mod pipeline;
pub mod planner;
pub mod selection;
pub mod sources;
pub mod thresholds;

pub use config::MatchConfig;
pub use context::{OntologyStats, RunContext};
pub use error::AlignError;
pub use matcher::{FilterSet, MatcherSet};
pub use model::{Alignment, Correspondence, EntityKind};
pub use pipeline::{run, RunReport};
pub use thresholds::Thresholds;
