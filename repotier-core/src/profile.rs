//! Profile vector construction.

use std::collections::BTreeMap;

use crate::domain::{Dimension, DimensionScores, ProfileVector, SignalResult, SignalSet};
use crate::error::{RepotierError, Result};

/// Project a dimension-keyed signal map onto a profile vector.
///
/// Fails with [`RepotierError::MissingDimension`] for the first absent
/// dimension instead of defaulting it, since a silent zero would skew both
/// similarity and gap math.
pub fn build_profile_vector(signals: &BTreeMap<Dimension, SignalResult>) -> Result<ProfileVector> {
    for dimension in Dimension::ALL {
        if !signals.contains_key(&dimension) {
            return Err(RepotierError::MissingDimension(dimension));
        }
    }
    Ok(DimensionScores::from_fn(|dimension| {
        signals.get(&dimension).map_or(0, |signal| signal.score)
    }))
}

impl SignalSet {
    /// Profile vector of this complete signal set.
    pub fn profile(&self) -> ProfileVector {
        DimensionScores::from_fn(|dimension| self.get(dimension).score)
    }
}
