//! Aggregation of signals into the final analysis result.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Dimension, GapVector, LanguageMap, ProfileVector, RepoInfo, RepoSnapshot, SignalRationales,
};
use crate::signals::detect_signals;
use crate::tiers::{compute_gaps, match_tier};

/// Maximum number of roadmap entries returned.
pub const ROADMAP_LIMIT: usize = 5;

const HIGH_GAP_THRESHOLD: u8 = 8;
const MEDIUM_GAP_THRESHOLD: u8 = 4;
const ADVANCED_SCORE_THRESHOLD: u32 = 80;

const HIGH_PRIORITY_MARKER: &str = "HIGH PRIORITY: ";
const MEDIUM_PRIORITY_MARKER: &str = "MEDIUM PRIORITY: ";

const ADVANCED_RECOMMENDATIONS: [&str; 3] = [
    "Add GitHub Actions for CI/CD: automated testing and deployment",
    "Set up issue templates and project boards for better collaboration",
    "Add code coverage badges and dependency update workflows",
];

const FALLBACK_RECOMMENDATION: &str =
    "Excellent repository! Consider open-sourcing or contributing to existing projects.";

/// Outcome status carried by analysis payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// The analysis completed.
    Success,
    /// The analysis failed before scoring.
    Error,
}

/// Complete maturity analysis of one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Total score, 0-100.
    pub score: u8,
    /// Matched tier, capitalized.
    pub tier: String,
    /// Similarity to the matched tier as a percentage with one decimal.
    pub tier_similarity: f64,
    /// Signal scores per dimension.
    #[schema(value_type = DimensionScores)]
    pub profile: ProfileVector,
    /// Shortfall against the next tier per dimension.
    #[schema(value_type = DimensionScores)]
    pub gaps: GapVector,
    /// Rationale per signal.
    pub signals: SignalRationales,
    /// The two highest scoring dimensions.
    pub strengths: Vec<Dimension>,
    /// The two lowest scoring dimensions.
    pub weaknesses: Vec<Dimension>,
    /// One-sentence summary.
    pub summary: String,
    /// Ordered improvement steps, at most five.
    pub roadmap: Vec<String>,
    /// Repository metadata.
    pub repo_info: RepoInfo,
    /// Number of commits fetched.
    pub commit_count: usize,
    /// Number of branches.
    pub branch_count: usize,
    /// Language distribution in bytes.
    pub languages: LanguageMap,
    /// Always [`AnalysisStatus::Success`].
    pub status: AnalysisStatus,
}

/// Score a fetched repository snapshot.
pub fn analyze_snapshot(snapshot: &RepoSnapshot) -> AnalysisResult {
    let signals = detect_signals(&snapshot.file_tree, &snapshot.readme, &snapshot.commits);
    let profile = signals.profile();
    let matched = match_tier(&profile);
    let gaps = compute_gaps(&profile, matched.tier);
    let score = total_score(&profile);
    let strengths = strengths(&profile);
    let weaknesses = weaknesses(&profile);

    log::debug!(
        "scored {} at {score} ({}, {:.1}%)",
        snapshot.repo_info.name,
        matched.tier,
        matched.similarity_percent()
    );

    AnalysisResult {
        score,
        tier: matched.tier.display_name().to_string(),
        tier_similarity: matched.similarity_percent(),
        profile,
        gaps,
        signals: signals.rationales(),
        summary: summarize(&strengths, &weaknesses),
        strengths,
        weaknesses,
        roadmap: build_roadmap(&gaps, &profile),
        repo_info: snapshot.repo_info.clone(),
        commit_count: snapshot.commits.len(),
        branch_count: snapshot.branches.len(),
        languages: snapshot.languages.clone(),
        status: AnalysisStatus::Success,
    }
}

/// Sum of the profile clamped to `[0, 100]`.
pub fn total_score(profile: &ProfileVector) -> u8 {
    profile.total().min(100) as u8
}

/// The two highest scoring dimensions; ties keep dimension order.
pub fn strengths(profile: &ProfileVector) -> Vec<Dimension> {
    let mut ranked: Vec<(Dimension, u8)> = profile.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(2).map(|(dim, _)| dim).collect()
}

/// The two lowest scoring dimensions; ties keep dimension order.
pub fn weaknesses(profile: &ProfileVector) -> Vec<Dimension> {
    let mut ranked: Vec<(Dimension, u8)> = profile.iter().collect();
    ranked.sort_by_key(|(_, score)| *score);
    ranked.into_iter().take(2).map(|(dim, _)| dim).collect()
}

/// Summary sentence naming strengths and weaknesses.
pub fn summarize(strengths: &[Dimension], weaknesses: &[Dimension]) -> String {
    let labels = |dims: &[Dimension]| {
        dims.iter()
            .map(|dim| dim.label())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Strong in {}. Needs improvement in {}.",
        labels(strengths),
        labels(weaknesses)
    )
}

fn improvement_step(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Structure => {
            "Reorganize into semantic folders (src/, tests/, docs/, config/) instead of utils/helpers"
        }
        Dimension::Documentation => {
            "Add comprehensive README: Overview, Setup, Usage, Architecture sections with code examples"
        }
        Dimension::Tests => {
            "Implement test strategy: unit tests for core logic, integration tests for APIs, coverage >70%"
        }
        Dimension::Commits => {
            "Use conventional commits (feat:, fix:, docs:) with descriptive messages, commit regularly"
        }
        Dimension::Dependencies => {
            "Add lock files (package-lock.json, poetry.lock) and pin dependency versions"
        }
    }
}

/// Build the prioritized improvement roadmap from gaps.
///
/// High priority steps (gap > 8) come first, then medium ones (gap 4-8), then
/// advanced recommendations when the total exceeds 80. An empty roadmap gets a
/// single congratulatory entry. At most [`ROADMAP_LIMIT`] entries are kept.
pub fn build_roadmap(gaps: &GapVector, profile: &ProfileVector) -> Vec<String> {
    let mut roadmap: Vec<String> = gaps
        .iter()
        .filter(|(_, gap)| *gap > HIGH_GAP_THRESHOLD)
        .map(|(dim, _)| format!("{HIGH_PRIORITY_MARKER}{}", improvement_step(dim)))
        .collect();

    roadmap.extend(
        gaps.iter()
            .filter(|(_, gap)| (MEDIUM_GAP_THRESHOLD..=HIGH_GAP_THRESHOLD).contains(gap))
            .map(|(dim, _)| format!("{MEDIUM_PRIORITY_MARKER}{}", improvement_step(dim))),
    );

    if profile.total() > ADVANCED_SCORE_THRESHOLD {
        roadmap.extend(ADVANCED_RECOMMENDATIONS.iter().map(|step| step.to_string()));
    }

    if roadmap.is_empty() {
        roadmap.push(FALLBACK_RECOMMENDATION.to_string());
    }

    roadmap.truncate(ROADMAP_LIMIT);
    roadmap
}
