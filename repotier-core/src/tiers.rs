//! Maturity tiers, nearest-tier matching and gap computation.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{DimensionScores, GapVector, ProfileVector};

/// Maturity tier, ordered from least to most mature.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Early-stage repository.
    Beginner,
    /// Repository with some established practices.
    Intermediate,
    /// Mature, well-maintained repository.
    Advanced,
}

const BEGINNER_REFERENCE: ProfileVector = DimensionScores::new(5, 3, 0, 4, 2);
const INTERMEDIATE_REFERENCE: ProfileVector = DimensionScores::new(14, 12, 10, 12, 12);
const ADVANCED_REFERENCE: ProfileVector = DimensionScores::new(18, 18, 18, 16, 18);

impl Tier {
    /// Tiers in evaluation order; earlier tiers win similarity ties.
    pub const ALL: [Tier; 3] = [Tier::Beginner, Tier::Intermediate, Tier::Advanced];

    /// Reference profile at the center of this tier.
    pub fn reference(self) -> &'static ProfileVector {
        match self {
            Self::Beginner => &BEGINNER_REFERENCE,
            Self::Intermediate => &INTERMEDIATE_REFERENCE,
            Self::Advanced => &ADVANCED_REFERENCE,
        }
    }

    /// The tier immediately above; advanced is its own successor.
    pub fn next(self) -> Tier {
        match self {
            Self::Beginner => Self::Intermediate,
            Self::Intermediate | Self::Advanced => Self::Advanced,
        }
    }

    /// Capitalized tier name for display.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Outcome of nearest-tier matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierMatch {
    /// Tier with the highest similarity.
    pub tier: Tier,
    /// Cosine similarity in `[0, 1]` against that tier's reference.
    pub similarity: f64,
}

impl TierMatch {
    /// Similarity as a percentage rounded to one decimal place.
    pub fn similarity_percent(&self) -> f64 {
        (self.similarity * 1000.0).round() / 10.0
    }
}

/// Cosine similarity of two score vectors.
///
/// Returns 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &DimensionScores, b: &DimensionScores) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|((_, x), (_, y))| f64::from(x) * f64::from(y))
        .sum();
    let magnitude = |v: &DimensionScores| {
        v.iter()
            .map(|(_, x)| f64::from(x).powi(2))
            .sum::<f64>()
            .sqrt()
    };
    let (mag_a, mag_b) = (magnitude(a), magnitude(b));
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

/// Match a profile to the tier whose reference it is most similar to.
///
/// Tiers are evaluated in [`Tier::ALL`] order and only a strictly higher
/// similarity replaces the current best, so ties resolve to the lower tier.
pub fn match_tier(profile: &ProfileVector) -> TierMatch {
    let mut best = TierMatch {
        tier: Tier::Beginner,
        similarity: cosine_similarity(profile, Tier::Beginner.reference()),
    };
    for tier in Tier::ALL.into_iter().skip(1) {
        let similarity = cosine_similarity(profile, tier.reference());
        if similarity > best.similarity {
            best = TierMatch { tier, similarity };
        }
    }
    best
}

/// Positive per-dimension shortfall against the tier above `current`.
pub fn compute_gaps(profile: &ProfileVector, current: Tier) -> GapVector {
    let target = current.next().reference();
    DimensionScores::from_fn(|dimension| {
        target.get(dimension).saturating_sub(profile.get(dimension))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn self_similarity_is_one() {
        for profile in [
            DimensionScores::new(1, 0, 0, 0, 0),
            DimensionScores::new(18, 12, 6, 20, 10),
            *Tier::Advanced.reference(),
        ] {
            assert!((cosine_similarity(&profile, &profile) - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn zero_vector_similarity_is_zero() {
        let zero = DimensionScores::default();
        for tier in Tier::ALL {
            assert_eq!(cosine_similarity(&zero, tier.reference()), 0.0);
            assert_eq!(cosine_similarity(tier.reference(), &zero), 0.0);
        }
    }

    #[test]
    fn zero_profile_matches_beginner() {
        let matched = match_tier(&DimensionScores::default());
        assert_eq!(matched.tier, Tier::Beginner);
        assert_eq!(matched.similarity, 0.0);
    }

    #[test]
    fn matching_is_scale_invariant() {
        let tens = match_tier(&DimensionScores::new(10, 10, 10, 10, 10));
        let twenties = match_tier(&DimensionScores::new(20, 20, 20, 20, 20));
        assert_eq!(tens.tier, twenties.tier);
        assert!((tens.similarity - twenties.similarity).abs() < EPSILON);
    }

    #[test]
    fn reference_profiles_match_their_own_tier() {
        for tier in Tier::ALL {
            assert_eq!(match_tier(tier.reference()).tier, tier);
        }
    }

    #[test]
    fn testless_profile_leans_beginner() {
        let matched = match_tier(&DimensionScores::new(5, 3, 0, 4, 2));
        assert_eq!(matched.tier, Tier::Beginner);
        assert_eq!(matched.similarity_percent(), 100.0);
    }

    #[test]
    fn next_tier_saturates_at_advanced() {
        assert_eq!(Tier::Beginner.next(), Tier::Intermediate);
        assert_eq!(Tier::Intermediate.next(), Tier::Advanced);
        assert_eq!(Tier::Advanced.next(), Tier::Advanced);
    }

    #[test]
    fn gaps_are_non_negative_shortfalls() {
        let profile = DimensionScores::new(18, 3, 6, 20, 0);
        let gaps = compute_gaps(&profile, Tier::Beginner);
        assert_eq!(gaps, DimensionScores::new(0, 9, 4, 0, 12));
    }

    #[test]
    fn advanced_reference_has_no_gaps() {
        let gaps = compute_gaps(Tier::Advanced.reference(), Tier::Advanced);
        assert!(gaps.is_zero());
    }

    #[test]
    fn similarity_percent_rounds_to_one_decimal() {
        let matched = TierMatch {
            tier: Tier::Intermediate,
            similarity: 0.98765,
        };
        assert_eq!(matched.similarity_percent(), 98.8);
    }
}
