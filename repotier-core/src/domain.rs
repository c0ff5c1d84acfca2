//! Domain entities for Repotier.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{RepotierError, Result};

/// A mapping of language names to the number of bytes written in them.
pub type LanguageMap = BTreeMap<String, u64>;

/// One of the five scored maturity dimensions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Folder layout of the repository.
    Structure,
    /// README depth.
    Documentation,
    /// Test presence and tooling.
    Tests,
    /// Commit message quality.
    Commits,
    /// Dependency manifests and lock files.
    Dependencies,
}

impl Dimension {
    /// All dimensions in their fixed iteration order.
    pub const ALL: [Dimension; 5] = [
        Dimension::Structure,
        Dimension::Documentation,
        Dimension::Tests,
        Dimension::Commits,
        Dimension::Dependencies,
    ];

    /// Stable lowercase key used in serialized payloads.
    pub fn key(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Documentation => "documentation",
            Self::Tests => "tests",
            Self::Commits => "commits",
            Self::Dependencies => "dependencies",
        }
    }

    /// Human-readable label used in summaries.
    pub fn label(self) -> &'static str {
        match self {
            Self::Structure => "Project Structure",
            Self::Documentation => "Documentation",
            Self::Tests => "Testing",
            Self::Commits => "Commit Quality",
            Self::Dependencies => "Dependency Management",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Integer scores keyed by the five fixed dimensions.
///
/// Used both for profile vectors (each value in `[0, 20]`) and for gap vectors
/// (non-negative shortfalls against a tier reference).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
pub struct DimensionScores {
    /// Structure score.
    pub structure: u8,
    /// Documentation score.
    pub documentation: u8,
    /// Tests score.
    pub tests: u8,
    /// Commit quality score.
    pub commits: u8,
    /// Dependency hygiene score.
    pub dependencies: u8,
}

/// Profile vector of signal scores for one repository.
pub type ProfileVector = DimensionScores;

/// Per-dimension shortfall against the next tier.
pub type GapVector = DimensionScores;

impl DimensionScores {
    /// Build a score record from values in dimension order.
    pub const fn new(
        structure: u8,
        documentation: u8,
        tests: u8,
        commits: u8,
        dependencies: u8,
    ) -> Self {
        Self {
            structure,
            documentation,
            tests,
            commits,
            dependencies,
        }
    }

    /// Build a score record by evaluating `f` for every dimension.
    pub fn from_fn(mut f: impl FnMut(Dimension) -> u8) -> Self {
        Self {
            structure: f(Dimension::Structure),
            documentation: f(Dimension::Documentation),
            tests: f(Dimension::Tests),
            commits: f(Dimension::Commits),
            dependencies: f(Dimension::Dependencies),
        }
    }

    /// Score for a single dimension.
    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Structure => self.structure,
            Dimension::Documentation => self.documentation,
            Dimension::Tests => self.tests,
            Dimension::Commits => self.commits,
            Dimension::Dependencies => self.dependencies,
        }
    }

    /// Iterate `(dimension, score)` pairs in fixed dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, u8)> + '_ {
        Dimension::ALL
            .into_iter()
            .map(move |dimension| (dimension, self.get(dimension)))
    }

    /// Sum of all five values.
    pub fn total(&self) -> u32 {
        self.iter().map(|(_, value)| u32::from(value)).sum()
    }

    /// Whether every value is zero.
    pub fn is_zero(&self) -> bool {
        self.iter().all(|(_, value)| value == 0)
    }
}

/// Upper bound of a single signal score.
pub const MAX_SIGNAL_SCORE: u8 = 20;

/// Score and explanation produced by one signal extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SignalResult {
    /// Score clamped to `[0, 20]`.
    pub score: u8,
    /// Human-readable reason for the score.
    pub rationale: String,
}

impl SignalResult {
    /// Create a signal result, clamping the score into `[0, 20]`.
    pub fn new(score: i64, rationale: impl Into<String>) -> Self {
        let rationale = rationale.into();
        debug_assert!(!rationale.is_empty(), "signal rationale must not be empty");
        Self {
            score: score.clamp(0, i64::from(MAX_SIGNAL_SCORE)) as u8,
            rationale,
        }
    }
}

/// The complete set of five signal results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    /// Folder structure signal.
    pub structure: SignalResult,
    /// Documentation signal.
    pub documentation: SignalResult,
    /// Tests signal.
    pub tests: SignalResult,
    /// Commit quality signal.
    pub commits: SignalResult,
    /// Dependency hygiene signal.
    pub dependencies: SignalResult,
}

impl SignalSet {
    /// Signal result for a single dimension.
    pub fn get(&self, dimension: Dimension) -> &SignalResult {
        match dimension {
            Dimension::Structure => &self.structure,
            Dimension::Documentation => &self.documentation,
            Dimension::Tests => &self.tests,
            Dimension::Commits => &self.commits,
            Dimension::Dependencies => &self.dependencies,
        }
    }

    /// Rationale strings keyed by dimension.
    pub fn rationales(&self) -> SignalRationales {
        SignalRationales {
            structure: self.structure.rationale.clone(),
            documentation: self.documentation.rationale.clone(),
            tests: self.tests.rationale.clone(),
            commits: self.commits.rationale.clone(),
            dependencies: self.dependencies.rationale.clone(),
        }
    }

    /// Convert into an open dimension-keyed map.
    pub fn into_map(self) -> BTreeMap<Dimension, SignalResult> {
        BTreeMap::from([
            (Dimension::Structure, self.structure),
            (Dimension::Documentation, self.documentation),
            (Dimension::Tests, self.tests),
            (Dimension::Commits, self.commits),
            (Dimension::Dependencies, self.dependencies),
        ])
    }
}

/// Rationale text for each signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SignalRationales {
    /// Structure rationale.
    pub structure: String,
    /// Documentation rationale.
    pub documentation: String,
    /// Tests rationale.
    pub tests: String,
    /// Commits rationale.
    pub commits: String,
    /// Dependencies rationale.
    pub dependencies: String,
}

/// One file or folder entry in a repository tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileTreeEntry {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,
}

impl FileTreeEntry {
    /// Create a tree entry for a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A commit as reported by the hosting API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Commit {
    /// Full commit message.
    pub message: String,
    /// Author display name.
    #[serde(default)]
    pub author: String,
    /// Author date as reported by the API.
    #[serde(default)]
    pub date: String,
    /// Commit SHA.
    #[serde(default)]
    pub sha: String,
}

impl Commit {
    /// Create a commit carrying only a message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Basic repository metadata passed through to the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepoInfo {
    /// Repository name.
    #[serde(default)]
    pub name: String,
    /// Repository description.
    #[serde(default)]
    pub description: Option<String>,
    /// Star count.
    #[serde(default)]
    pub stars: u64,
    /// Fork count.
    #[serde(default)]
    pub forks: u64,
    /// Primary language reported by the host.
    #[serde(default)]
    pub language: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// README payload as returned by the hosting API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RawReadme {
    /// File content, possibly encoded.
    pub content: String,
    /// Content encoding, e.g. `base64`.
    #[serde(default)]
    pub encoding: Option<String>,
}

impl RawReadme {
    /// README content that is already plain text.
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            encoding: None,
        }
    }

    /// README content encoded as base64.
    pub fn base64(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            encoding: Some("base64".to_string()),
        }
    }
}

/// Everything the scoring pipeline consumes for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSnapshot {
    /// Repository metadata.
    #[serde(default)]
    pub repo_info: RepoInfo,
    /// Full recursive file tree.
    #[serde(default)]
    pub file_tree: Vec<FileTreeEntry>,
    /// Decoded README text; empty when unavailable.
    #[serde(default)]
    pub readme: String,
    /// Commits, newest first.
    #[serde(default)]
    pub commits: Vec<Commit>,
    /// Branch names.
    #[serde(default)]
    pub branches: Vec<String>,
    /// Language distribution in bytes.
    #[serde(default)]
    pub languages: LanguageMap,
}

/// Owner and name of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    /// Account or organisation owning the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoSlug {
    /// Parse a repository URL such as `https://github.com/owner/name`,
    /// `www.github.com/owner/name`, `git@github.com:owner/name.git` or a bare
    /// `owner/name`. Query strings and fragments are ignored.
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = || RepotierError::InvalidRepoUrl(url.trim().to_string());
        let trimmed = url.trim();
        let trimmed = trimmed.split(['?', '#']).next().unwrap_or(trimmed);
        let trimmed = trimmed.trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        let hostless = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let hostless = hostless.strip_prefix("www.").unwrap_or(hostless);
        let hosted = hostless
            .strip_prefix("github.com/")
            .or_else(|| trimmed.strip_prefix("git@github.com:"));

        let path = match hosted {
            Some(path) => path,
            None if trimmed.contains("://") || trimmed.contains('@') => return Err(invalid()),
            None if trimmed.matches('/').count() == 1 => trimmed,
            None => return Err(invalid()),
        };

        let mut parts = path.split('/');
        let owner = parts.next().filter(|part| !part.is_empty()).ok_or_else(invalid)?;
        let name = parts.next().filter(|part| !part.is_empty()).ok_or_else(invalid)?;
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
