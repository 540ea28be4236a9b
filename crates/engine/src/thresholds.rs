/// Baseline similarity threshold before modifiers.
pub const BASE_THRESH: f64 = 0.6;
/// Applied when a human reviewer will vet candidates.
pub const INTERACTIVE_MOD: f64 = -0.3;
/// Applied when labels had to be machine-translated.
pub const TRANSLATE_MOD: f64 = -0.15;
/// One-time raise applied after the lexical baseline on huge tasks.
pub const SIZE_MOD: f64 = 0.1;

/// Adaptive thresholds derived from the run configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// General acceptance threshold for matchers and selection.
    pub thresh: f64,
    /// Minimum coverage for accepting the WordNet expansion result.
    pub wordnet: f64,
    /// Threshold for the primary string matcher in generative mode.
    pub string_match: f64,
    raised: bool,
}

impl Thresholds {
    /// Pure function of the two configuration booleans.
    pub fn compute(interactive: bool, translation_required: bool) -> Self {
        let mut thresh = BASE_THRESH;
        if interactive {
            thresh += INTERACTIVE_MOD;
        }
        if translation_required {
            thresh += TRANSLATE_MOD;
        }
        Thresholds {
            thresh,
            wordnet: if interactive { 0.04 } else { 0.1 },
            string_match: if translation_required { thresh } else { 0.7 },
            raised: false,
        }
    }

    /// The one-time raise for huge tasks. Idempotent: calling it again has
    /// no effect.
    pub fn raise_for_size(&mut self) {
        if !self.raised {
            self.thresh += SIZE_MOD;
            self.raised = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_modifier_table() {
        for interactive in [false, true] {
            for translate in [false, true] {
                let th = Thresholds::compute(interactive, translate);
                let mut expected = 0.6;
                if interactive {
                    expected -= 0.3;
                }
                if translate {
                    expected -= 0.15;
                }
                assert!((th.thresh - expected).abs() < 1e-12, "thresh for ({interactive}, {translate})");
                assert_eq!(th.wordnet, if interactive { 0.04 } else { 0.1 });
                if translate {
                    assert_eq!(th.string_match, th.thresh);
                } else {
                    assert_eq!(th.string_match, 0.7);
                }
            }
        }
    }

    #[test]
    fn size_raise_applies_once() {
        let mut th = Thresholds::compute(false, false);
        th.raise_for_size();
        assert!((th.thresh - 0.7).abs() < 1e-12);
        th.raise_for_size();
        assert!((th.thresh - 0.7).abs() < 1e-12);
    }
}
