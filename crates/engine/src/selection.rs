use crate::context::{NeighborStrategy, RunContext, SizeCategory};
use crate::error::AlignError;
use crate::matcher::{FilterSet, MatcherSet};
use crate::model::EntityKind;

/// The first selection pass on huge tasks runs this far below `thresh`.
pub const SELECTION_MARGIN: f64 = 0.05;
/// Weight of the block-rematch view against the neighbor-rematch view.
pub const REMATCH_WEIGHT: f64 = 0.75;
/// Weight of the original alignment against the combined rematch views.
pub const ORIGINAL_WEIGHT: f64 = 0.8;

/// Fraction of the alignment a human may review on small tasks.
pub const REVIEW_FRACTION_SMALL: f64 = 0.45;
/// Review fraction on medium and huge tasks.
pub const REVIEW_FRACTION_LARGE: f64 = 0.15;
/// Review fraction for repair candidates.
pub const REVIEW_FRACTION_REPAIR: f64 = 0.05;

/// Review budget for an alignment of `len` correspondences, rounding half
/// away from zero.
pub fn review_budget(len: usize, fraction: f64) -> usize {
    (len as f64 * fraction).round() as usize
}

/// Selection stage: prune the active alignment down to a consistent,
/// cardinality-respecting set.
pub fn select(
    ctx: &mut RunContext,
    matchers: &mut dyn MatcherSet,
    filters: &mut dyn FilterSet,
) -> Result<(), AlignError> {
    let mode = ctx.config.selection;
    let thresh = ctx.thresholds.thresh;

    if ctx.config.size == SizeCategory::Huge {
        filters.obsolete(&mut ctx.alignment)?;

        // Two independent re-scored views of the alignment, blended with
        // each other and then with the original scores.
        let block = matchers.block_rematch(&ctx.alignment, EntityKind::Class)?;
        let neighbor = matchers.neighbor_rematch(
            &ctx.alignment,
            NeighborStrategy::Maximum,
            true,
            EntityKind::Class,
        )?;
        let combined = block.combine(&neighbor, REMATCH_WEIGHT);
        let combined = ctx.alignment.combine(&combined, ORIGINAL_WEIGHT);

        let pruned = filters.select(&combined, thresh - SELECTION_MARGIN, mode, None)?;
        ctx.alignment = filters.select(&ctx.alignment, thresh, mode, Some(&pruned))?;
    } else if !ctx.config.interactive {
        ctx.alignment = filters.select(&ctx.alignment, thresh, mode, None)?;
    }

    if ctx.config.interactive {
        let fraction = if ctx.config.size == SizeCategory::Small {
            REVIEW_FRACTION_SMALL
        } else {
            REVIEW_FRACTION_LARGE
        };
        let budget = review_budget(ctx.alignment.len(), fraction);
        ctx.set_review_budget(budget);
        filters.interactive_review(&mut ctx.alignment, budget)?;
    }

    Ok(())
}

/// Repair stage: remove correspondences violating structural consistency.
pub fn repair(ctx: &mut RunContext, filters: &mut dyn FilterSet) -> Result<(), AlignError> {
    let budget = if ctx.config.interactive {
        review_budget(ctx.alignment.len(), REVIEW_FRACTION_REPAIR)
    } else {
        0
    };
    ctx.set_review_budget(budget);
    filters.repair(&mut ctx.alignment, budget)
}
