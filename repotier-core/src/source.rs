//! Repository metadata sources and the analysis pipeline built on them.

use std::sync::Arc;

use crate::analysis::{AnalysisResult, analyze_snapshot};
use crate::domain::{
    Commit, FileTreeEntry, LanguageMap, RawReadme, RepoInfo, RepoSlug, RepoSnapshot,
};
use crate::error::Result;
use crate::readme::readme_text;

/// Abstraction over the remote hosting API for testability.
///
/// Every method is one remote call; any error is treated as fatal to the
/// analysis that issued it.
#[cfg_attr(test, mockall::automock)]
pub trait MetadataSource {
    /// Basic repository metadata.
    fn repo_info(&self, repo: &RepoSlug) -> Result<RepoInfo>;
    /// Recursive file tree of the default branch.
    fn file_tree(&self, repo: &RepoSlug) -> Result<Vec<FileTreeEntry>>;
    /// README payload, or `None` when the repository has none.
    fn readme(&self, repo: &RepoSlug) -> Result<Option<RawReadme>>;
    /// Recent commits, newest first.
    fn commits(&self, repo: &RepoSlug) -> Result<Vec<Commit>>;
    /// Branch names.
    fn branches(&self, repo: &RepoSlug) -> Result<Vec<String>>;
    /// Language distribution in bytes.
    fn languages(&self, repo: &RepoSlug) -> Result<LanguageMap>;
}

impl<T: MetadataSource + ?Sized> MetadataSource for Arc<T> {
    fn repo_info(&self, repo: &RepoSlug) -> Result<RepoInfo> {
        (**self).repo_info(repo)
    }

    fn file_tree(&self, repo: &RepoSlug) -> Result<Vec<FileTreeEntry>> {
        (**self).file_tree(repo)
    }

    fn readme(&self, repo: &RepoSlug) -> Result<Option<RawReadme>> {
        (**self).readme(repo)
    }

    fn commits(&self, repo: &RepoSlug) -> Result<Vec<Commit>> {
        (**self).commits(repo)
    }

    fn branches(&self, repo: &RepoSlug) -> Result<Vec<String>> {
        (**self).branches(repo)
    }

    fn languages(&self, repo: &RepoSlug) -> Result<LanguageMap> {
        (**self).languages(repo)
    }
}

/// Fetches repository metadata and scores it.
pub struct RepositoryAnalyzer<S: MetadataSource> {
    source: S,
}

impl<S: MetadataSource> RepositoryAnalyzer<S> {
    /// Create an analyzer over a metadata source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch everything needed for scoring, stopping at the first failure.
    pub fn fetch_snapshot(&self, repo: &RepoSlug) -> Result<RepoSnapshot> {
        log::debug!("fetching repository data for {repo}");
        let repo_info = self.source.repo_info(repo)?;
        let file_tree = self.source.file_tree(repo)?;
        let raw_readme = self.source.readme(repo)?;
        let commits = self.source.commits(repo)?;
        let branches = self.source.branches(repo)?;
        let languages = self.source.languages(repo)?;

        Ok(RepoSnapshot {
            repo_info,
            file_tree,
            readme: readme_text(raw_readme.as_ref()),
            commits,
            branches,
            languages,
        })
    }

    /// Fetch and score a repository.
    pub fn analyze(&self, repo: &RepoSlug) -> Result<AnalysisResult> {
        let snapshot = self.fetch_snapshot(repo)?;
        log::debug!("analyzing signals for {repo}");
        Ok(analyze_snapshot(&snapshot))
    }

    /// Parse a repository URL, then fetch and score it.
    pub fn analyze_url(&self, url: &str) -> Result<AnalysisResult> {
        let repo = RepoSlug::parse(url)?;
        self.analyze(&repo)
    }
}
