use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::context::RunContext;
use crate::error::AlignError;
use crate::matcher::MatcherSet;
use crate::model::{Alignment, EntityKind};

/// Source ids with this suffix are lexicon sources; everything else is
/// treated as an ontology source.
pub const LEXICON_SUFFIX: &str = ".lexicon";
/// Minimum mapping gain for keeping a source's alignment at all.
pub const MIN_GAIN: f64 = 0.02;
/// Gain above which an ontology source is worth a lexicon extension and a
/// fresh lexical pass instead of keeping its raw cross-references.
pub const HIGH_GAIN: f64 = 0.25;

// ---------------------------------------------------------------------------
// Mediator lexicon
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexiconEntry {
    pub entity: String,
    pub weight: f64,
}

/// An auxiliary name table: external names mapped onto the entities of the
/// mediating vocabulary. Loaded from tab-separated files
/// (`name \t entity_id \t weight`, weight optional).
#[derive(Debug, Clone, Default)]
pub struct MediatorLexicon {
    entries: BTreeMap<String, Vec<LexiconEntry>>,
}

impl MediatorLexicon {
    pub fn from_path(path: &Path) -> Result<Self, AlignError> {
        let unavailable = |reason: String| AlignError::SourceUnavailable {
            source: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| unavailable(e.to_string()))?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(file);

        let mut lexicon = MediatorLexicon::default();
        for record in reader.records() {
            let record = record.map_err(|e| unavailable(e.to_string()))?;
            let name = record.get(0).unwrap_or("").trim();
            let entity = record.get(1).unwrap_or("").trim();
            if name.is_empty() || entity.is_empty() {
                continue;
            }
            let weight = match record.get(2) {
                Some(raw) if !raw.trim().is_empty() => raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| unavailable(format!("bad weight '{}' for name '{name}'", raw.trim())))?,
                _ => 1.0,
            };
            lexicon.add(name, entity, weight);
        }

        Ok(lexicon)
    }

    /// Record a name for an entity; repeated (name, entity) pairs keep the
    /// highest weight.
    pub fn add(&mut self, name: &str, entity: &str, weight: f64) {
        let entries = self.entries.entry(name.to_string()).or_default();
        match entries.iter_mut().find(|e| e.entity == entity) {
            Some(existing) => {
                if weight > existing.weight {
                    existing.weight = weight;
                }
            }
            None => entries.push(LexiconEntry {
                entity: entity.to_string(),
                weight,
            }),
        }
    }

    pub fn entries_for(&self, name: &str) -> &[LexiconEntry] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Gain evaluation
// ---------------------------------------------------------------------------

/// What became of one auxiliary knowledge source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SourceOutcome {
    /// Gain cleared the bar; the source's alignment was merged in.
    Accepted { gain: f64 },
    /// High-gain ontology source: lexicons were extended and the lexical
    /// baseline re-derived instead of keeping the raw cross-references.
    ExtendedLexicon { gain: f64 },
    /// Loaded and matched, but the gain was below the bar.
    Rejected { gain: f64 },
    /// Failed to load; the run continued without it.
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub outcome: SourceOutcome,
}

/// Evaluate every configured auxiliary knowledge source against the lexical
/// baseline, merging the keepers into `active`. A source that fails to load
/// is reported as skipped and never affects the others; any other matcher
/// error is fatal and propagates.
pub fn evaluate_sources(
    ctx: &RunContext,
    baseline: &Alignment,
    active: &mut Alignment,
    matchers: &mut dyn MatcherSet,
    thresh: f64,
) -> Result<Vec<SourceReport>, AlignError> {
    let mut reports = Vec::new();
    for id in &ctx.config.knowledge_sources {
        let path = Path::new(&ctx.config.knowledge_root).join(id);
        let outcome = if id.ends_with(LEXICON_SUFFIX) {
            evaluate_lexicon_source(&path, baseline, active, matchers, thresh)?
        } else {
            evaluate_ontology_source(id, &path, baseline, active, matchers, thresh)?
        };
        reports.push(SourceReport {
            source: id.clone(),
            outcome,
        });
    }
    Ok(reports)
}

fn evaluate_lexicon_source(
    path: &Path,
    baseline: &Alignment,
    active: &mut Alignment,
    matchers: &mut dyn MatcherSet,
    thresh: f64,
) -> Result<SourceOutcome, AlignError> {
    let lexicon = match MediatorLexicon::from_path(path) {
        Ok(lexicon) => lexicon,
        Err(AlignError::SourceUnavailable { reason, .. }) => {
            return Ok(SourceOutcome::Skipped { reason });
        }
        Err(e) => return Err(e),
    };

    let mediated = matchers.mediating(&lexicon, EntityKind::Class, thresh)?;
    let gain = mediated.gain(baseline);
    if gain >= MIN_GAIN {
        active.merge_all(&mediated);
        Ok(SourceOutcome::Accepted { gain })
    } else {
        Ok(SourceOutcome::Rejected { gain })
    }
}

fn evaluate_ontology_source(
    id: &str,
    path: &Path,
    baseline: &Alignment,
    active: &mut Alignment,
    matchers: &mut dyn MatcherSet,
    thresh: f64,
) -> Result<SourceOutcome, AlignError> {
    match matchers.load_ontology_source(id, path) {
        Ok(()) => {}
        Err(AlignError::SourceUnavailable { reason, .. }) => {
            return Ok(SourceOutcome::Skipped { reason });
        }
        Err(e) => return Err(e),
    }

    let xref = matchers.cross_reference(id, EntityKind::Class, thresh)?;
    let gain = xref.gain(baseline);
    if gain >= HIGH_GAIN {
        // Re-deriving lexical matches from the extended names generalizes
        // further than the raw cross-reference correspondences.
        matchers.extend_lexicons(id)?;
        let relexed = matchers.lexical(EntityKind::Class, thresh)?;
        active.merge_all(&relexed);
        Ok(SourceOutcome::ExtendedLexicon { gain })
    } else if gain >= MIN_GAIN {
        active.merge_all(&xref);
        Ok(SourceOutcome::Accepted { gain })
    } else {
        Ok(SourceOutcome::Rejected { gain })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::config::MatchConfig;
    use crate::context::{NeighborStrategy, OntologyStats, SelectionMode};
    use crate::model::Correspondence;

    fn align(items: &[(&str, &str, f64)]) -> Alignment {
        items
            .iter()
            .map(|(s, t, v)| Correspondence::new(*s, *t, *v))
            .collect()
    }

    /// Stub host: serves the lexical / mediating / cross-reference calls
    /// used by source evaluation, panics on anything else.
    struct StubMatchers {
        mediated: Alignment,
        xref: Alignment,
        relexed: Alignment,
        ontology_load_fails: bool,
        lexicons_extended: usize,
    }

    impl StubMatchers {
        fn new() -> Self {
            Self {
                mediated: Alignment::new(),
                xref: Alignment::new(),
                relexed: Alignment::new(),
                ontology_load_fails: false,
                lexicons_extended: 0,
            }
        }
    }

    impl MatcherSet for StubMatchers {
        fn lexical(&mut self, _: EntityKind, _: f64) -> Result<Alignment, AlignError> {
            Ok(self.relexed.clone())
        }
        fn wordnet(&mut self, _: EntityKind, _: f64) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn word(&mut self, _: Option<&str>, _: EntityKind, _: f64) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn string_generative(&mut self, _: EntityKind, _: f64) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn string_extension(
            &mut self,
            _: &Alignment,
            _: EntityKind,
            _: f64,
        ) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn multi_word(&mut self, _: EntityKind, _: f64) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn acronym(&mut self, _: EntityKind, _: f64) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn thesaurus(&mut self, _: EntityKind, _: f64) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn neighbor_extension(
            &mut self,
            _: &Alignment,
            _: NeighborStrategy,
            _: bool,
            _: EntityKind,
            _: f64,
        ) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn hybrid_property(&mut self, _: EntityKind, _: f64) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn mediating(
            &mut self,
            _: &MediatorLexicon,
            _: EntityKind,
            _: f64,
        ) -> Result<Alignment, AlignError> {
            Ok(self.mediated.clone())
        }
        fn load_ontology_source(&mut self, id: &str, _: &Path) -> Result<(), AlignError> {
            if self.ontology_load_fails {
                Err(AlignError::SourceUnavailable {
                    source: id.into(),
                    reason: "parse failure".into(),
                })
            } else {
                Ok(())
            }
        }
        fn cross_reference(&mut self, _: &str, _: EntityKind, _: f64) -> Result<Alignment, AlignError> {
            Ok(self.xref.clone())
        }
        fn extend_lexicons(&mut self, _: &str) -> Result<(), AlignError> {
            self.lexicons_extended += 1;
            Ok(())
        }
        fn block_rematch(&mut self, _: &Alignment, _: EntityKind) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn neighbor_rematch(
            &mut self,
            _: &Alignment,
            _: NeighborStrategy,
            _: bool,
            _: EntityKind,
        ) -> Result<Alignment, AlignError> {
            unreachable!()
        }
        fn translate_ontologies(&mut self) -> Result<(), AlignError> {
            unreachable!()
        }
    }

    fn ctx_with_sources(root: &str, sources: &[&str]) -> RunContext {
        let mut config = MatchConfig::minimal();
        config.knowledge_root = root.into();
        config.knowledge_sources = sources.iter().map(|s| s.to_string()).collect();
        config.selection = SelectionMode::Hybrid;
        RunContext::new(config, OntologyStats::default(), OntologyStats::default())
    }

    fn write_lexicon(dir: &Path, name: &str, lines: &[&str]) {
        let mut file = File::create(dir.join(name)).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
    }

    #[test]
    fn lexicon_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        write_lexicon(
            dir.path(),
            "human.lexicon",
            &["thorax\tFMA:9576\t0.9", "chest\tFMA:9576", "thorax\tFMA:9576\t0.7"],
        );
        let lexicon = MediatorLexicon::from_path(&dir.path().join("human.lexicon")).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.entries_for("thorax"), &[LexiconEntry { entity: "FMA:9576".into(), weight: 0.9 }]);
        assert_eq!(lexicon.entries_for("chest")[0].weight, 1.0);
        assert!(lexicon.entries_for("abdomen").is_empty());
    }

    #[test]
    fn lexicon_missing_file_is_source_unavailable() {
        let err = MediatorLexicon::from_path(Path::new("store/knowledge/nope.lexicon")).unwrap_err();
        assert!(matches!(err, AlignError::SourceUnavailable { .. }));
    }

    #[test]
    fn lexicon_bad_weight_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write_lexicon(dir.path(), "bad.lexicon", &["thorax\tFMA:9576\tmany"]);
        let err = MediatorLexicon::from_path(&dir.path().join("bad.lexicon")).unwrap_err();
        assert!(err.to_string().contains("bad weight"));
    }

    #[test]
    fn lexicon_source_accepted_above_min_gain() {
        let dir = tempfile::tempdir().unwrap();
        write_lexicon(dir.path(), "human.lexicon", &["thorax\tFMA:9576\t0.9"]);
        let root = dir.path().to_str().unwrap().to_string();
        let ctx = ctx_with_sources(&root, &["human.lexicon"]);

        let baseline = align(&[("a", "x", 0.8), ("b", "y", 0.8)]);
        let mut matchers = StubMatchers::new();
        matchers.mediated = align(&[("c", "z", 0.7)]); // gain 0.5
        let mut active = baseline.clone();

        let reports =
            evaluate_sources(&ctx, &baseline, &mut active, &mut matchers, 0.6).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, SourceOutcome::Accepted { gain: 0.5 });
        assert_eq!(active.len(), 3);
    }

    #[test]
    fn lexicon_source_rejected_below_min_gain() {
        let dir = tempfile::tempdir().unwrap();
        write_lexicon(dir.path(), "human.lexicon", &["thorax\tFMA:9576\t0.9"]);
        let root = dir.path().to_str().unwrap().to_string();
        let ctx = ctx_with_sources(&root, &["human.lexicon"]);

        let baseline = align(&[("a", "x", 0.8), ("b", "y", 0.8)]);
        let mut matchers = StubMatchers::new();
        matchers.mediated = align(&[("a", "x", 0.9)]); // no novel pairs
        let mut active = baseline.clone();

        let reports =
            evaluate_sources(&ctx, &baseline, &mut active, &mut matchers, 0.6).unwrap();
        assert_eq!(reports[0].outcome, SourceOutcome::Rejected { gain: 0.0 });
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn ontology_high_gain_extends_lexicons_and_rederives() {
        let ctx = ctx_with_sources("store/knowledge", &["uberon.owl"]);
        let baseline = align(&[("a", "x", 0.8), ("b", "y", 0.8)]);
        let mut matchers = StubMatchers::new();
        matchers.xref = align(&[("c", "z", 0.7)]); // gain 0.5 >= HIGH_GAIN
        matchers.relexed = align(&[("d", "w", 0.9)]);
        let mut active = baseline.clone();

        let reports =
            evaluate_sources(&ctx, &baseline, &mut active, &mut matchers, 0.6).unwrap();
        assert_eq!(reports[0].outcome, SourceOutcome::ExtendedLexicon { gain: 0.5 });
        assert_eq!(matchers.lexicons_extended, 1);
        // The re-derived lexical result was merged, not the raw xref.
        assert_eq!(active.len(), 3);
        assert!(active.iter().any(|c| c.source == "d"));
        assert!(!active.iter().any(|c| c.source == "c"));
    }

    #[test]
    fn ontology_mid_gain_merges_xref_directly() {
        let ctx = ctx_with_sources("store/knowledge", &["uberon.owl"]);
        let baseline: Alignment = (0..50)
            .map(|i| Correspondence::new(format!("s{i}"), format!("t{i}"), 0.8))
            .collect();
        let mut matchers = StubMatchers::new();
        matchers.xref = align(&[("c", "z", 0.7), ("d", "w", 0.7)]); // gain 0.04
        let mut active = baseline.clone();

        let reports =
            evaluate_sources(&ctx, &baseline, &mut active, &mut matchers, 0.6).unwrap();
        assert_eq!(reports[0].outcome, SourceOutcome::Accepted { gain: 0.04 });
        assert_eq!(matchers.lexicons_extended, 0);
        assert_eq!(active.len(), 52);
    }

    #[test]
    fn failed_source_never_changes_outcome_for_others() {
        let dir = tempfile::tempdir().unwrap();
        write_lexicon(dir.path(), "good.lexicon", &["thorax\tFMA:9576\t0.9"]);
        let root = dir.path().to_str().unwrap().to_string();

        let baseline = align(&[("a", "x", 0.8), ("b", "y", 0.8)]);

        // Run with [missing, good] ...
        let ctx = ctx_with_sources(&root, &["missing.lexicon", "good.lexicon"]);
        let mut matchers = StubMatchers::new();
        matchers.mediated = align(&[("c", "z", 0.7)]);
        let mut active_both = baseline.clone();
        let reports =
            evaluate_sources(&ctx, &baseline, &mut active_both, &mut matchers, 0.6).unwrap();
        assert!(matches!(reports[0].outcome, SourceOutcome::Skipped { .. }));
        assert_eq!(reports[1].outcome, SourceOutcome::Accepted { gain: 0.5 });

        // ... and with [good] alone: identical alignment.
        let ctx = ctx_with_sources(&root, &["good.lexicon"]);
        let mut matchers = StubMatchers::new();
        matchers.mediated = align(&[("c", "z", 0.7)]);
        let mut active_good = baseline.clone();
        evaluate_sources(&ctx, &baseline, &mut active_good, &mut matchers, 0.6).unwrap();

        assert_eq!(active_both, active_good);
    }

    #[test]
    fn failed_ontology_source_is_skipped() {
        let ctx = ctx_with_sources("store/knowledge", &["uberon.owl"]);
        let baseline = align(&[("a", "x", 0.8)]);
        let mut matchers = StubMatchers::new();
        matchers.ontology_load_fails = true;
        let mut active = baseline.clone();

        let reports =
            evaluate_sources(&ctx, &baseline, &mut active, &mut matchers, 0.6).unwrap();
        assert_eq!(
            reports[0].outcome,
            SourceOutcome::Skipped { reason: "parse failure".into() }
        );
        assert_eq!(active, baseline);
    }
}
