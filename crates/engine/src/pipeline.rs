use serde::Serialize;

use crate::context::{LanguageMode, RunContext, SizeCategory};
use crate::error::AlignError;
use crate::matcher::{FilterSet, MatcherSet};
use crate::model::{Alignment, Correspondence, EntityKind};
use crate::planner::{plan_class_steps, ClassStep, MergeMode};
use crate::selection;
use crate::sources::{evaluate_sources, SourceReport};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
    /// Final general threshold (after any size raise).
    pub thresh: f64,
    pub size: SizeCategory,
    pub language: LanguageMode,
}

/// The externally visible artifact of a run: the final alignment plus the
/// fate of every auxiliary knowledge source. Skip-warnings live in the
/// source reports; they never fail the run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub sources: Vec<SourceReport>,
    pub correspondences: Vec<Correspondence>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Run the full pipeline: translation when required, class matching,
/// property matching, the (vacuous) individual stage, then selection and
/// repair. Strictly sequential; the only mutable shared state is the
/// context's alignment sink and review budget.
pub fn run(
    ctx: &mut RunContext,
    matchers: &mut dyn MatcherSet,
    filters: &mut dyn FilterSet,
) -> Result<RunReport, AlignError> {
    if ctx.config.language == LanguageMode::Translate {
        matchers.translate_ontologies()?;
    }

    let mut sources = Vec::new();
    if ctx.config.match_classes {
        sources = match_classes(ctx, matchers)?;
    }
    if ctx.config.match_properties {
        match_properties(ctx, matchers, filters)?;
    }
    if ctx.config.match_individuals {
        match_individuals(ctx);
    }

    selection::select(ctx, matchers, filters)?;
    selection::repair(ctx, filters)?;

    Ok(RunReport {
        meta: RunMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            thresh: ctx.thresholds.thresh,
            size: ctx.config.size,
            language: ctx.config.language,
        },
        sources,
        correspondences: ctx.alignment.to_vec(),
    })
}

/// Execute the planned class steps against the matcher collaborators.
fn match_classes(
    ctx: &mut RunContext,
    matchers: &mut dyn MatcherSet,
) -> Result<Vec<SourceReport>, AlignError> {
    let steps = plan_class_steps(ctx);
    let mut active = ctx.alignment.clone();
    let mut baseline = Alignment::new();
    let mut reports = Vec::new();

    for step in &steps {
        let produced = match step {
            ClassStep::Lexical { thresh } => {
                baseline = matchers.lexical(EntityKind::Class, *thresh)?;
                Some(baseline.clone())
            }
            ClassStep::RaiseThreshold => {
                ctx.thresholds.raise_for_size();
                None
            }
            ClassStep::WordNet { thresh, min_coverage } => {
                let wordnet = matchers.wordnet(EntityKind::Class, *thresh)?;
                let coverage = wordnet
                    .source_coverage(ctx.source.kind(EntityKind::Class).entities)
                    .min(wordnet.target_coverage(ctx.target.kind(EntityKind::Class).entities));
                if coverage >= *min_coverage {
                    Some(wordnet)
                } else {
                    None
                }
            }
            ClassStep::BackgroundSources { thresh } => {
                reports = evaluate_sources(ctx, &baseline, &mut active, matchers, *thresh)?;
                None
            }
            ClassStep::Word { scopes, thresh } => {
                let mut word = Alignment::new();
                for scope in scopes {
                    word.merge_all(&matchers.word(scope.as_deref(), EntityKind::Class, *thresh)?);
                }
                Some(word)
            }
            ClassStep::StringGenerative { thresh } => {
                Some(matchers.string_generative(EntityKind::Class, *thresh)?)
            }
            ClassStep::MultiWord { thresh } => {
                Some(matchers.multi_word(EntityKind::Class, *thresh)?)
            }
            ClassStep::Acronym { thresh } => {
                Some(matchers.acronym(EntityKind::Class, *thresh)?)
            }
            ClassStep::StringExtension { thresh } => {
                Some(matchers.string_extension(&active, EntityKind::Class, *thresh)?)
            }
            ClassStep::Thesaurus { thresh } => {
                Some(matchers.thesaurus(EntityKind::Class, *thresh)?)
            }
            ClassStep::NeighborExtension { strategy, direct, thresh } => {
                Some(matchers.neighbor_extension(
                    &active,
                    *strategy,
                    *direct,
                    EntityKind::Class,
                    *thresh,
                )?)
            }
        };

        if let (Some(result), Some(mode)) = (produced, step.merge_mode()) {
            match mode {
                MergeMode::Union => active.merge_all(&result),
                MergeMode::OneToOne => active.merge_one_to_one(&result),
            }
        }
    }

    ctx.set_alignment(active);
    Ok(reports)
}

/// Properties may legitimately map many-to-many before filtering, so both
/// passes merge without cardinality restriction; the domain-and-range
/// filter then removes incompatible pairs.
fn match_properties(
    ctx: &mut RunContext,
    matchers: &mut dyn MatcherSet,
    filters: &mut dyn FilterSet,
) -> Result<(), AlignError> {
    let thresh = ctx.thresholds.thresh;
    let mut active = ctx.alignment.clone();
    active.merge_all(&matchers.hybrid_property(EntityKind::DataProperty, thresh)?);
    active.merge_all(&matchers.hybrid_property(EntityKind::ObjectProperty, thresh)?);
    ctx.set_alignment(active);
    filters.domain_range(&mut ctx.alignment)?;
    Ok(())
}

fn match_individuals(_ctx: &mut RunContext) {
    // No individual matchers exist upstream yet.
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
