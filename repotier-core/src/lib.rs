#![deny(missing_docs)]
//! Repotier core library.
//!
//! This crate contains the domain types, signal extractors and tier matching
//! that score a repository's maturity from its hosted metadata.

/// Aggregation of signals into analysis results.
pub mod analysis;
pub mod domain;
pub mod error;
pub mod profile;
pub mod readme;
pub mod report;
pub mod signals;
pub mod source;
pub mod tiers;

pub use analysis::{AnalysisResult, AnalysisStatus, ROADMAP_LIMIT, analyze_snapshot};
pub use domain::{
    Commit, Dimension, DimensionScores, FileTreeEntry, GapVector, LanguageMap, ProfileVector,
    RawReadme, RepoInfo, RepoSlug, RepoSnapshot, SignalRationales, SignalResult, SignalSet,
};
pub use error::{RepotierError, Result};
pub use profile::build_profile_vector;
pub use readme::{ReadmeDecodeError, decode_readme, readme_text};
pub use report::{
    AnalysisFailure, AnalysisReport, RepoAnalysis, language_shares, render_analysis_markdown,
    render_json,
};
pub use signals::detect_signals;
pub use source::{MetadataSource, RepositoryAnalyzer};
pub use tiers::{Tier, TierMatch, compute_gaps, cosine_similarity, match_tier};
