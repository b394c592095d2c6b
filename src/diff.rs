//! GUID-level differences between two revisions of a model

use crate::diagnostics::Diagnostics;
use crate::index::ModelIndex;
use crate::model::Guid;
use std::collections::HashSet;

/// Parts added, removed and kept between a baseline and a revision
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelDiff {
    /// In the revision only, in revision document order
    pub new: Vec<Guid>,
    /// In the baseline only, in baseline document order
    pub deleted: Vec<Guid>,
    /// In both, in revision document order
    pub unchanged: Vec<Guid>,
}

/// Dry weight of a part that changed between revisions
#[derive(Debug, Clone, PartialEq)]
pub struct WeightChange {
    /// Part GUID
    pub guid: Guid,
    /// Baseline dry weight
    pub baseline: f64,
    /// Revised dry weight
    pub revised: f64,
}

impl WeightChange {
    /// Change relative to the baseline weight
    pub fn relative(&self) -> f64 {
        if self.baseline == 0.0 {
            if self.revised == 0.0 { 0.0 } else { f64::INFINITY }
        } else {
            ((self.revised - self.baseline) / self.baseline).abs()
        }
    }
}

/// Compare the GUID sets of two models
pub fn diff(baseline: &ModelIndex, revised: &ModelIndex) -> ModelDiff {
    let before: HashSet<&Guid> = baseline.guids().iter().collect();
    let after: HashSet<&Guid> = revised.guids().iter().collect();

    let (unchanged, new) = revised
        .guids()
        .iter()
        .cloned()
        .partition(|guid| before.contains(guid));
    let deleted = baseline
        .guids()
        .iter()
        .filter(|guid| !after.contains(guid))
        .cloned()
        .collect();

    let diff = ModelDiff {
        new,
        deleted,
        unchanged,
    };
    tracing::info!(
        new = diff.new.len(),
        deleted = diff.deleted.len(),
        unchanged = diff.unchanged.len(),
        "compared model revisions"
    );
    diff
}

impl ModelDiff {
    /// True when both models hold the same GUIDs
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.deleted.is_empty()
    }

    /// Kept parts whose dry weight changed by more than `tolerance`,
    /// relative to the baseline
    ///
    /// Parts without a dry weight in either revision are not compared.
    pub fn dry_weight_changes(
        &self,
        baseline: &ModelIndex,
        revised: &ModelIndex,
        tolerance: f64,
        diagnostics: &mut Diagnostics,
    ) -> Vec<WeightChange> {
        let mut changes = Vec::new();
        for guid in &self.unchanged {
            let before = baseline
                .structure_part(guid, diagnostics)
                .and_then(|p| p.dry_weight());
            let after = revised
                .structure_part(guid, diagnostics)
                .and_then(|p| p.dry_weight());
            let (Some(before), Some(after)) = (before, after) else {
                continue;
            };
            let change = WeightChange {
                guid: guid.clone(),
                baseline: before,
                revised: after,
            };
            if change.relative() > tolerance {
                changes.push(change);
            }
        }
        changes
    }
}
