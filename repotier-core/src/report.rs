//! Report records and formatting utilities for Repotier outputs.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::analysis::{AnalysisResult, AnalysisStatus};
use crate::domain::{Dimension, LanguageMap};
use crate::error::Result;

/// Degraded record returned when an analysis cannot complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisFailure {
    /// Human-readable failure message.
    pub error: String,
    /// Always [`AnalysisStatus::Error`].
    pub status: AnalysisStatus,
}

impl AnalysisFailure {
    /// Create a failure record, prefixing the message like every analysis error.
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self {
            error: format!("Analysis failed: {message}"),
            status: AnalysisStatus::Error,
        }
    }
}

/// Either a complete analysis or a failure record; never a partial result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    /// Completed analysis.
    Success(Box<AnalysisResult>),
    /// Failed analysis.
    Failed(AnalysisFailure),
}

impl AnalysisReport {
    /// Convert a pipeline outcome into a report.
    pub fn from_outcome(outcome: Result<AnalysisResult>) -> Self {
        match outcome {
            Ok(result) => Self::Success(Box::new(result)),
            Err(err) => Self::Failed(AnalysisFailure::new(err)),
        }
    }

    /// Status of this report.
    pub fn status(&self) -> AnalysisStatus {
        match self {
            Self::Success(_) => AnalysisStatus::Success,
            Self::Failed(_) => AnalysisStatus::Error,
        }
    }
}

/// An analysis report tagged with the repository it was requested for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoAnalysis {
    /// Repository source (URL or snapshot path).
    pub source: String,
    /// Analysis outcome.
    pub report: AnalysisReport,
}

impl RepoAnalysis {
    /// Pair a report with its source.
    pub fn new(source: impl Into<String>, report: AnalysisReport) -> Self {
        Self {
            source: source.into(),
            report,
        }
    }

    /// A failed analysis for a source.
    pub fn failed(source: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::new(source, AnalysisReport::Failed(AnalysisFailure::new(error)))
    }
}

/// Render a list of analyses as Markdown.
pub fn render_analysis_markdown(analyses: &[RepoAnalysis]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Repotier Maturity Report\n");
    for analysis in analyses {
        let _ = writeln!(output, "## {}\n", analysis.source);
        match &analysis.report {
            AnalysisReport::Success(result) => append_result(&mut output, result),
            AnalysisReport::Failed(failure) => {
                let _ = writeln!(output, "- Status: error ({})\n", failure.error);
            }
        }
    }
    output
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(
    payload: &T,
) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Language shares as percentages of total bytes, largest first.
pub fn language_shares(languages: &LanguageMap) -> Vec<(String, f64)> {
    let total: u64 = languages.values().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut items: Vec<(String, f64)> = languages
        .iter()
        .map(|(name, bytes)| (name.clone(), *bytes as f64 / total as f64 * 100.0))
        .collect();
    items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    items
}

fn append_result(output: &mut String, result: &AnalysisResult) {
    let _ = writeln!(output, "- Score: {}/100", result.score);
    let _ = writeln!(
        output,
        "- Tier: {} ({:.1}% match)",
        result.tier, result.tier_similarity
    );
    let _ = writeln!(
        output,
        "- Commits: {}, branches: {}",
        result.commit_count, result.branch_count
    );
    let _ = writeln!(output, "\n{}\n", result.summary);

    let _ = writeln!(output, "### Signals");
    let _ = writeln!(output, "| Dimension | Score | Gap | Rationale |");
    let _ = writeln!(output, "|---|---|---|---|");
    for (dimension, score) in result.profile.iter() {
        let _ = writeln!(
            output,
            "| {} | {score}/20 | {} | {} |",
            dimension.label(),
            result.gaps.get(dimension),
            rationale(result, dimension)
        );
    }
    let _ = writeln!(output);

    append_languages(output, &result.languages);

    let _ = writeln!(output, "### Roadmap");
    for (index, step) in result.roadmap.iter().enumerate() {
        let _ = writeln!(output, "{}. {step}", index + 1);
    }
    let _ = writeln!(output);
}

fn append_languages(output: &mut String, languages: &LanguageMap) {
    let shares = language_shares(languages);
    if shares.is_empty() {
        let _ = writeln!(output, "### Languages\nNo languages detected.\n");
        return;
    }
    let _ = writeln!(output, "### Languages");
    for (language, percent) in shares {
        let _ = writeln!(output, "- {language}: {percent:.2}%");
    }
    let _ = writeln!(output);
}

/// Rationale text recorded for a dimension.
pub fn rationale(result: &AnalysisResult, dimension: Dimension) -> &str {
    match dimension {
        Dimension::Structure => &result.signals.structure,
        Dimension::Documentation => &result.signals.documentation,
        Dimension::Tests => &result.signals.tests,
        Dimension::Commits => &result.signals.commits,
        Dimension::Dependencies => &result.signals.dependencies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_snapshot;
    use crate::domain::{Commit, FileTreeEntry, RepoSnapshot};
    use crate::error::RepotierError;

    fn sample_result() -> AnalysisResult {
        analyze_snapshot(&RepoSnapshot {
            file_tree: vec![
                FileTreeEntry::new("src/main.go"),
                FileTreeEntry::new("go.mod"),
            ],
            readme: "# About\nA tool.".to_string(),
            commits: vec![Commit::with_message("chore: bump")],
            languages: LanguageMap::from([("Go".to_string(), 300), ("Shell".to_string(), 100)]),
            ..RepoSnapshot::default()
        })
    }

    #[test]
    fn renders_markdown_for_success_and_failure() {
        let analyses = vec![
            RepoAnalysis::new(
                "https://github.com/octo/tool",
                AnalysisReport::Success(Box::new(sample_result())),
            ),
            RepoAnalysis::failed("https://github.com/octo/gone", "fetch failed: 404"),
        ];

        let output = render_analysis_markdown(&analyses);

        assert!(output.contains("# Repotier Maturity Report"));
        assert!(output.contains("## https://github.com/octo/tool"));
        assert!(output.contains("| Project Structure | 12/20 |"));
        assert!(output.contains("Go: 75.00%"));
        assert!(output.contains("1. "));
        assert!(output.contains("Status: error (Analysis failed: fetch failed: 404)"));
    }

    #[test]
    fn failure_report_serializes_error_shape() {
        let report =
            AnalysisReport::from_outcome(Err(RepotierError::Fetch("timeout".to_string())));
        assert_eq!(report.status(), AnalysisStatus::Error);

        let json = render_json(&report).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["error"], "Analysis failed: fetch failed: timeout");
        assert_eq!(parsed.as_object().expect("object").len(), 2);
    }

    #[test]
    fn untagged_report_deserializes_both_shapes() {
        let success =
            render_json(&AnalysisReport::from_outcome(Ok(sample_result()))).expect("json");
        let parsed: AnalysisReport = serde_json::from_str(&success).expect("success");
        assert_eq!(parsed.status(), AnalysisStatus::Success);

        let parsed: AnalysisReport =
            serde_json::from_str(r#"{"error":"Analysis failed: boom","status":"error"}"#)
                .expect("failure");
        assert_eq!(
            parsed,
            AnalysisReport::Failed(AnalysisFailure {
                error: "Analysis failed: boom".to_string(),
                status: AnalysisStatus::Error,
            })
        );
    }

    #[test]
    fn language_shares_sorted_descending() {
        let shares = language_shares(&LanguageMap::from([
            ("Go".to_string(), 100),
            ("Rust".to_string(), 300),
        ]));
        assert_eq!(shares[0], ("Rust".to_string(), 75.0));
        assert_eq!(shares[1], ("Go".to_string(), 25.0));
        assert!(language_shares(&LanguageMap::new()).is_empty());
    }
}
