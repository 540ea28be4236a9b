use std::path::Path;

use crate::context::{NeighborStrategy, SelectionMode};
use crate::error::AlignError;
use crate::model::{Alignment, EntityKind};
use crate::sources::MediatorLexicon;

/// The external similarity matchers, implemented by the surrounding system.
/// The engine decides which of these run, in what order and at what
/// thresholds; it never computes similarity itself.
///
/// A matcher invoked for an entity kind it cannot handle must return
/// [`AlignError::UnsupportedEntityKind`]; that aborts the whole run.
/// `load_ontology_source` signals load failure with
/// [`AlignError::SourceUnavailable`], which the engine treats as a skip.
pub trait MatcherSet {
    /// Baseline lexical matcher over the ontologies' own name tables.
    fn lexical(&mut self, kind: EntityKind, thresh: f64) -> Result<Alignment, AlignError>;

    /// WordNet synonym-expansion matcher.
    fn wordnet(&mut self, kind: EntityKind, thresh: f64) -> Result<Alignment, AlignError>;

    /// Word-level matcher; `language` restricts it to one configured
    /// language, `None` uses the shared single language.
    fn word(
        &mut self,
        language: Option<&str>,
        kind: EntityKind,
        thresh: f64,
    ) -> Result<Alignment, AlignError>;

    /// Primary string-similarity matcher in generative mode.
    fn string_generative(&mut self, kind: EntityKind, thresh: f64)
        -> Result<Alignment, AlignError>;

    /// String-similarity matcher extending an existing alignment.
    fn string_extension(
        &mut self,
        seed: &Alignment,
        kind: EntityKind,
        thresh: f64,
    ) -> Result<Alignment, AlignError>;

    fn multi_word(&mut self, kind: EntityKind, thresh: f64) -> Result<Alignment, AlignError>;

    fn acronym(&mut self, kind: EntityKind, thresh: f64) -> Result<Alignment, AlignError>;

    fn thesaurus(&mut self, kind: EntityKind, thresh: f64) -> Result<Alignment, AlignError>;

    /// Structural neighbor-similarity extension of an existing alignment.
    fn neighbor_extension(
        &mut self,
        seed: &Alignment,
        strategy: NeighborStrategy,
        direct: bool,
        kind: EntityKind,
        thresh: f64,
    ) -> Result<Alignment, AlignError>;

    /// Hybrid matcher used for data- and object-typed properties.
    fn hybrid_property(&mut self, kind: EntityKind, thresh: f64)
        -> Result<Alignment, AlignError>;

    /// Matcher mediating through an auxiliary lexicon the engine loaded.
    fn mediating(
        &mut self,
        lexicon: &MediatorLexicon,
        kind: EntityKind,
        thresh: f64,
    ) -> Result<Alignment, AlignError>;

    /// Load an ontology-kind knowledge source from storage so that
    /// `cross_reference` and `extend_lexicons` can refer to it by id.
    fn load_ontology_source(&mut self, id: &str, path: &Path) -> Result<(), AlignError>;

    /// Cross-reference matcher against a previously loaded ontology source.
    fn cross_reference(
        &mut self,
        id: &str,
        kind: EntityKind,
        thresh: f64,
    ) -> Result<Alignment, AlignError>;

    /// Enrich both ontologies' name tables with names discovered through
    /// the cross-references of the given source.
    fn extend_lexicons(&mut self, id: &str) -> Result<(), AlignError>;

    /// Block-based re-scoring of an alignment (huge tasks only).
    fn block_rematch(&mut self, a: &Alignment, kind: EntityKind)
        -> Result<Alignment, AlignError>;

    /// Neighbor-structure re-scoring of an alignment (huge tasks only).
    fn neighbor_rematch(
        &mut self,
        a: &Alignment,
        strategy: NeighborStrategy,
        direct: bool,
        kind: EntityKind,
    ) -> Result<Alignment, AlignError>;

    /// Machine-translate the ontologies' labels; invoked once, before any
    /// matching, when the language mode requires translation.
    fn translate_ontologies(&mut self) -> Result<(), AlignError>;
}

/// The external selection and repair filters.
pub trait FilterSet {
    /// Remove property correspondences whose declared domain/range typing
    /// is incompatible between the two schemas.
    fn domain_range(&mut self, a: &mut Alignment) -> Result<(), AlignError>;

    /// Drop correspondences referencing deprecated entities.
    fn obsolete(&mut self, a: &mut Alignment) -> Result<(), AlignError>;

    /// Cardinality selection at `thresh` under the given policy. When
    /// `reference` is given, the selector may consult it as a prior for
    /// acceptance decisions.
    fn select(
        &mut self,
        a: &Alignment,
        thresh: f64,
        mode: SelectionMode,
        reference: Option<&Alignment>,
    ) -> Result<Alignment, AlignError>;

    /// Human review of candidates, bounded by `budget` decisions.
    fn interactive_review(&mut self, a: &mut Alignment, budget: usize)
        -> Result<(), AlignError>;

    /// Remove correspondences violating structural consistency; `budget`
    /// bounds interactive review of repair candidates, 0 means none.
    fn repair(&mut self, a: &mut Alignment, budget: usize) -> Result<(), AlignError>;
}
