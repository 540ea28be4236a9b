use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::model::{Alignment, EntityKind};
use crate::thresholds::Thresholds;

// ---------------------------------------------------------------------------
// Context dimensions
// ---------------------------------------------------------------------------

/// Coarse dataset scale, driving which strategies are affordable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    Small,
    Medium,
    Huge,
}

impl std::fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Huge => write!(f, "huge"),
        }
    }
}

/// Language configuration of the two schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageMode {
    /// Both schemas share one language.
    Single,
    /// Labels exist in several languages on both sides.
    Multi,
    /// Labels must be machine-translated before matching.
    Translate,
}

impl std::fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multi => write!(f, "multi"),
            Self::Translate => write!(f, "translate"),
        }
    }
}

/// Policy handed to the external selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Strict,
    Permissive,
    Hybrid,
}

impl Default for SelectionMode {
    fn default() -> Self {
        Self::Hybrid
    }
}

/// How the neighbor-structure matcher aggregates neighborhood similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborStrategy {
    Average,
    Maximum,
    Minimum,
}

impl Default for NeighborStrategy {
    fn default() -> Self {
        Self::Maximum
    }
}

// ---------------------------------------------------------------------------
// Ontology statistics
// ---------------------------------------------------------------------------

/// Entity and lexicon-name counts for one entity kind of one ontology.
#[derive(Debug, Clone, Copy, Default)]
pub struct KindStats {
    pub entities: usize,
    pub names: usize,
}

/// Per-ontology statistics consumed from the surrounding system's ontology
/// accessors.
#[derive(Debug, Clone, Default)]
pub struct OntologyStats {
    classes: KindStats,
    data_properties: KindStats,
    object_properties: KindStats,
    individuals: KindStats,
}

impl OntologyStats {
    pub fn with_kind(mut self, kind: EntityKind, entities: usize, names: usize) -> Self {
        *self.slot(kind) = KindStats { entities, names };
        self
    }

    pub fn kind(&self, kind: EntityKind) -> KindStats {
        match kind {
            EntityKind::Class => self.classes,
            EntityKind::DataProperty => self.data_properties,
            EntityKind::ObjectProperty => self.object_properties,
            EntityKind::Individual => self.individuals,
        }
    }

    /// Lexicon names per entity for the given kind. Above 1.0 means the
    /// ontology carries synonyms worth feeding to a thesaurus.
    pub fn name_ratio(&self, kind: EntityKind) -> f64 {
        let stats = self.kind(kind);
        if stats.entities == 0 {
            return 0.0;
        }
        stats.names as f64 / stats.entities as f64
    }

    fn slot(&mut self, kind: EntityKind) -> &mut KindStats {
        match kind {
            EntityKind::Class => &mut self.classes,
            EntityKind::DataProperty => &mut self.data_properties,
            EntityKind::ObjectProperty => &mut self.object_properties,
            EntityKind::Individual => &mut self.individuals,
        }
    }
}

// ---------------------------------------------------------------------------
// Run context
// ---------------------------------------------------------------------------

/// Explicit run state: constructed once at the start of a run, discarded at
/// the end, never shared across runs. The configuration and ontology
/// statistics are read-only; the thresholds see one raise on huge tasks,
/// and the review budget plus the published alignment are owned by the
/// pipeline stages.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: MatchConfig,
    pub source: OntologyStats,
    pub target: OntologyStats,
    pub thresholds: Thresholds,
    pub review_budget: usize,
    pub alignment: Alignment,
}

impl RunContext {
    pub fn new(config: MatchConfig, source: OntologyStats, target: OntologyStats) -> Self {
        let thresholds = Thresholds::compute(
            config.interactive,
            config.language == LanguageMode::Translate,
        );
        Self {
            config,
            source,
            target,
            thresholds,
            review_budget: 0,
            alignment: Alignment::new(),
        }
    }

    /// Largest names-per-entity ratio across the two ontologies.
    pub fn name_ratio(&self, kind: EntityKind) -> f64 {
        self.source.name_ratio(kind).max(self.target.name_ratio(kind))
    }

    /// Shared alignment sink; each mutating stage publishes here.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    /// Consumed by the interactive-review and repair collaborators.
    pub fn set_review_budget(&mut self, budget: usize) {
        self.review_budget = budget;
    }
}
