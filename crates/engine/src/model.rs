use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// The kind of schema entity a correspondence refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Class,
    DataProperty,
    ObjectProperty,
    Individual,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class => write!(f, "class"),
            Self::DataProperty => write!(f, "data_property"),
            Self::ObjectProperty => write!(f, "object_property"),
            Self::Individual => write!(f, "individual"),
        }
    }
}

/// Semantic relation asserted by a correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Equivalence,
    Subsumes,
    SubsumedBy,
    Incompatible,
}

impl Default for RelationKind {
    fn default() -> Self {
        Self::Equivalence
    }
}

// ---------------------------------------------------------------------------
// Correspondence
// ---------------------------------------------------------------------------

/// Identity of a correspondence: the (source, target) entity pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PairKey {
    pub source: String,
    pub target: String,
}

/// A scored candidate mapping between one source entity and one target
/// entity. Immutable once created; confidence is clamped into [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correspondence {
    pub source: String,
    pub target: String,
    pub confidence: f64,
    pub relation: RelationKind,
}

impl Correspondence {
    pub fn new(source: impl Into<String>, target: impl Into<String>, confidence: f64) -> Self {
        Self::with_relation(source, target, confidence, RelationKind::Equivalence)
    }

    pub fn with_relation(
        source: impl Into<String>,
        target: impl Into<String>,
        confidence: f64,
        relation: RelationKind,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            confidence: confidence.clamp(0.0, 1.0),
            relation,
        }
    }

    pub fn key(&self) -> PairKey {
        PairKey {
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// The full set of correspondences discovered between two schemas at a
/// point in the pipeline. Keyed by (source, target) pair; a pair appears
/// at most once. `BTreeMap` keeps iteration deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    entries: BTreeMap<PairKey, Correspondence>,
}

impl Alignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &PairKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &PairKey) -> Option<&Correspondence> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Correspondence> {
        self.entries.values()
    }

    /// Correspondences in key order.
    pub fn to_vec(&self) -> Vec<Correspondence> {
        self.entries.values().cloned().collect()
    }

    /// Insert one correspondence. On key collision the higher-confidence
    /// entry survives; on an exact tie the existing entry is kept.
    pub fn insert(&mut self, c: Correspondence) {
        let key = c.key();
        match self.entries.get(&key) {
            Some(existing) if existing.confidence >= c.confidence => {}
            _ => {
                self.entries.insert(key, c);
            }
        }
    }

    /// Union by key, no cardinality restriction. Collisions resolve like
    /// [`Alignment::insert`].
    pub fn merge_all(&mut self, other: &Alignment) {
        for c in other.entries.values() {
            self.insert(c.clone());
        }
    }

    /// Union under a one-to-one cardinality constraint. Incoming
    /// correspondences are taken in descending confidence order (ties by
    /// key order); a candidate displaces the existing entries sharing its
    /// source or target only when its confidence is strictly greater than
    /// every one of them. On equal confidence the existing entry wins.
    pub fn merge_one_to_one(&mut self, other: &Alignment) {
        let mut incoming: Vec<&Correspondence> = other.entries.values().collect();
        incoming.sort_by(|x, y| {
            y.confidence
                .total_cmp(&x.confidence)
                .then_with(|| x.key().cmp(&y.key()))
        });

        for cand in incoming {
            let conflicts: Vec<PairKey> = self
                .entries
                .values()
                .filter(|e| e.source == cand.source || e.target == cand.target)
                .map(Correspondence::key)
                .collect();

            if conflicts.is_empty() {
                self.entries.insert(cand.key(), cand.clone());
                continue;
            }

            let beats_all = conflicts
                .iter()
                .filter_map(|k| self.entries.get(k))
                .all(|e| e.confidence < cand.confidence);
            if beats_all {
                for key in &conflicts {
                    self.entries.remove(key);
                }
                self.entries.insert(cand.key(), cand.clone());
            }
        }
    }

    /// Mapping gain over a baseline: the number of keys in `self` absent
    /// from `baseline`, normalized by the baseline size. A value of 0.02
    /// therefore reads as "2% novel pairs relative to the baseline".
    pub fn gain(&self, baseline: &Alignment) -> f64 {
        let novel = self
            .entries
            .keys()
            .filter(|k| !baseline.entries.contains_key(k))
            .count();
        novel as f64 / baseline.len().max(1) as f64
    }

    /// Fraction of `total` source entities that appear in at least one
    /// correspondence.
    pub fn source_coverage(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let distinct: BTreeSet<&str> =
            self.entries.values().map(|c| c.source.as_str()).collect();
        distinct.len() as f64 / total as f64
    }

    /// Fraction of `total` target entities that appear in at least one
    /// correspondence.
    pub fn target_coverage(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let distinct: BTreeSet<&str> =
            self.entries.values().map(|c| c.target.as_str()).collect();
        distinct.len() as f64 / total as f64
    }

    /// Linear weighted combination. Pairs present in both alignments blend
    /// as `weight * self + (1 - weight) * other`; pairs present in only one
    /// carry through at their original confidence.
    pub fn combine(&self, other: &Alignment, weight: f64) -> Alignment {
        let mut out = Alignment::new();
        for c in self.entries.values() {
            let blended = match other.entries.get(&c.key()) {
                Some(o) => Correspondence::with_relation(
                    c.source.clone(),
                    c.target.clone(),
                    weight * c.confidence + (1.0 - weight) * o.confidence,
                    c.relation,
                ),
                None => c.clone(),
            };
            out.entries.insert(blended.key(), blended);
        }
        for o in other.entries.values() {
            out.entries.entry(o.key()).or_insert_with(|| o.clone());
        }
        out
    }
}

impl FromIterator<Correspondence> for Alignment {
    fn from_iter<I: IntoIterator<Item = Correspondence>>(iter: I) -> Self {
        let mut a = Alignment::new();
        for c in iter {
            a.insert(c);
        }
        a
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
