use crate::context::{LanguageMode, NeighborStrategy, RunContext, SizeCategory};
use crate::model::EntityKind;
use crate::thresholds::SIZE_MOD;

/// Names-per-entity ratio above which the thesaurus matcher is worth
/// running.
pub const NAME_RATIO_THRESH: f64 = 1.2;

/// How a step's result folds into the active alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// `merge_all`: union, no cardinality restriction.
    Union,
    /// `merge_one_to_one`: union under the one-to-one constraint.
    OneToOne,
}

/// One step of the class-matching plan. Each variant names the strategy
/// and carries the threshold it runs at; the merge mode is derived from
/// the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassStep {
    /// Baseline lexical pass; its result also becomes the gain baseline
    /// for auxiliary knowledge sources.
    Lexical { thresh: f64 },
    /// One-time threshold raise on huge tasks, after the baseline.
    RaiseThreshold,
    /// WordNet expansion, accepted only when the lesser of its two
    /// coverage fractions reaches `min_coverage`.
    WordNet { thresh: f64, min_coverage: f64 },
    /// Gain-thresholded evaluation of every configured knowledge source.
    BackgroundSources { thresh: f64 },
    /// Word-level matching; one scope per language, results unioned before
    /// a single one-to-one merge.
    Word { scopes: Vec<Option<String>>, thresh: f64 },
    StringGenerative { thresh: f64 },
    MultiWord { thresh: f64 },
    Acronym { thresh: f64 },
    StringExtension { thresh: f64 },
    Thesaurus { thresh: f64 },
    NeighborExtension { strategy: NeighborStrategy, direct: bool, thresh: f64 },
}

impl ClassStep {
    pub fn merge_mode(&self) -> Option<MergeMode> {
        match self {
            Self::Lexical { .. } => Some(MergeMode::Union),
            // BackgroundSources and RaiseThreshold fold nothing themselves;
            // source evaluation merges per-source inside the step.
            Self::RaiseThreshold | Self::BackgroundSources { .. } => None,
            _ => Some(MergeMode::OneToOne),
        }
    }
}

/// The class-matching decision tree as a pure function of the run context:
/// size class, language mode, interactivity (through the precomputed
/// thresholds), primary-matcher flag and name ratio in, ordered steps out.
pub fn plan_class_steps(ctx: &RunContext) -> Vec<ClassStep> {
    let size = ctx.config.size;
    let lang = ctx.config.language;
    let huge = size == SizeCategory::Huge;

    let base = ctx.thresholds.thresh;
    // Every step after the baseline sees the raised threshold on huge tasks.
    let thresh = if huge { base + SIZE_MOD } else { base };

    let mut steps = vec![ClassStep::Lexical { thresh: base }];
    if huge {
        steps.push(ClassStep::RaiseThreshold);
    }

    if lang == LanguageMode::Single {
        if size == SizeCategory::Small {
            steps.push(ClassStep::WordNet {
                thresh,
                min_coverage: ctx.thresholds.wordnet,
            });
        } else {
            steps.push(ClassStep::BackgroundSources { thresh });
        }
    }

    if !huge {
        match lang {
            LanguageMode::Single => steps.push(ClassStep::Word {
                scopes: vec![None],
                thresh,
            }),
            LanguageMode::Multi => steps.push(ClassStep::Word {
                scopes: ctx.config.languages.iter().cloned().map(Some).collect(),
                thresh,
            }),
            LanguageMode::Translate => {}
        }
    }

    if ctx.config.primary_string_matcher {
        steps.push(ClassStep::StringGenerative {
            thresh: ctx.thresholds.string_match,
        });
        if size == SizeCategory::Small && lang == LanguageMode::Single {
            steps.push(ClassStep::MultiWord { thresh });
            steps.push(ClassStep::Acronym { thresh });
        }
    } else {
        steps.push(ClassStep::StringExtension { thresh });
    }

    if !huge && ctx.name_ratio(EntityKind::Class) >= NAME_RATIO_THRESH {
        steps.push(ClassStep::Thesaurus { thresh });
    }

    if size == SizeCategory::Small || size == SizeCategory::Medium {
        steps.push(ClassStep::NeighborExtension {
            strategy: ctx.config.neighbor,
            direct: ctx.config.direct_neighbors,
            thresh,
        });
    }

    steps
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
