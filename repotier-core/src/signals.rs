//! Heuristic signal extractors.
//!
//! Every extractor is a pure function of already-fetched repository data and
//! returns a [`SignalResult`] scored in `[0, 20]`.

use std::collections::BTreeSet;

use crate::domain::{Commit, FileTreeEntry, SignalResult, SignalSet};

const GOOD_FOLDERS: &[&str] = &[
    "src",
    "tests",
    "test",
    "docs",
    "config",
    "models",
    "controllers",
    "services",
    "api",
    "database",
    "auth",
    "ui",
    "components",
    "views",
];

const BAD_FOLDERS: &[&str] = &[
    "utils",
    "helpers",
    "misc",
    "constants",
    "functions",
    "lib",
    "tools",
];

const README_SECTIONS: &[&[&str]] = &[
    &["overview", "about", "description", "what is"],
    &["setup", "installation", "install", "getting started"],
    &["usage", "how to use", "tutorial", "examples"],
    &["architecture", "design", "structure"],
    &["contributing", "contribution", "contribute"],
];

const SUBSTANTIVE_README_CHARS: usize = 500;

const CONVENTIONAL_PREFIXES: &[&str] = &[
    "feat:",
    "fix:",
    "docs:",
    "style:",
    "test:",
    "refactor:",
    "chore:",
];

const QUALITY_KEYWORDS: &[&str] = &[
    "add",
    "fix",
    "refactor",
    "improve",
    "update",
    "implement",
    "feature",
];

const INSPECTED_COMMITS: usize = 50;

const DEPENDENCY_FILES: &[&str] = &[
    "requirements.txt",
    "package.json",
    "Gemfile",
    "pom.xml",
    "go.mod",
];

const LOCK_FILES: &[&str] = &["package-lock.json", "yarn.lock", "Pipfile.lock", "poetry.lock"];

/// Distinct top-level folder names of a file tree.
///
/// Only paths containing a `/` contribute; files at the repository root do not.
pub fn top_level_folders(tree: &[FileTreeEntry]) -> BTreeSet<String> {
    tree.iter()
        .filter_map(|entry| entry.path.split_once('/'))
        .map(|(folder, _)| folder.to_string())
        .collect()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FolderKind {
    Semantic,
    CargoCult,
    Neutral,
}

fn classify_folder(name: &str) -> FolderKind {
    let name = name.to_lowercase();
    if GOOD_FOLDERS.contains(&name.as_str()) {
        FolderKind::Semantic
    } else if BAD_FOLDERS.contains(&name.as_str()) {
        FolderKind::CargoCult
    } else {
        FolderKind::Neutral
    }
}

/// Score how semantically the top-level folders are named.
pub fn structure<S: AsRef<str>>(folders: &[S]) -> SignalResult {
    let mut good = 0usize;
    let mut bad = 0usize;
    for folder in folders {
        match classify_folder(folder.as_ref()) {
            FolderKind::Semantic => good += 1,
            FolderKind::CargoCult => bad += 1,
            FolderKind::Neutral => {}
        }
    }

    let score = if folders.is_empty() {
        5
    } else if bad > good {
        8
    } else if good >= 3 {
        18
    } else if good >= 1 {
        12
    } else {
        5
    };

    let rationale = if folders.is_empty() {
        "Flat structure".to_string()
    } else {
        let shown: Vec<&str> = folders.iter().take(5).map(AsRef::as_ref).collect();
        format!("Folders: {}", shown.join(", "))
    };
    SignalResult::new(score, rationale)
}

/// Score README depth by section coverage, examples and length.
pub fn documentation(readme: &str) -> SignalResult {
    if readme.is_empty() {
        return SignalResult::new(0, "No README found");
    }

    let lower = readme.to_lowercase();
    let found_sections = README_SECTIONS
        .iter()
        .filter(|keywords| keywords.iter().any(|keyword| lower.contains(keyword)))
        .count();
    let has_code_block = readme.contains("```");
    let substantive = readme.chars().count() > SUBSTANTIVE_README_CHARS;

    let example_bonus = if has_code_block { 3 } else { 0 };
    let length_bonus = if substantive { 2 } else { 0 };
    let score = found_sections as i64 * 3 + example_bonus + length_bonus;
    let examples = if has_code_block {
        "has examples"
    } else {
        "no examples"
    };
    SignalResult::new(
        score.min(20),
        format!(
            "Found {found_sections}/{} key sections, {examples}",
            README_SECTIONS.len()
        ),
    )
}

/// Score test presence and sophistication from file paths.
pub fn tests(tree: &[FileTreeEntry]) -> SignalResult {
    let test_files: Vec<&str> = tree
        .iter()
        .map(|entry| entry.path.as_str())
        .filter(|path| path.to_lowercase().contains("test"))
        .collect();
    let test_count = test_files.len();

    let has_unit = test_files
        .iter()
        .any(|path| path.to_lowercase().contains("unit") || path.contains("_test"));
    let has_integration = test_files.iter().any(|path| {
        let lower = path.to_lowercase();
        lower.contains("integration") || lower.contains("e2e")
    });
    let has_coverage = tree.iter().any(|entry| {
        entry.path.to_lowercase().contains("coverage") || entry.path.contains(".coveragerc")
    });
    let has_config = tree.iter().any(|entry| {
        ["pytest.ini", "jest.config", "vitest"]
            .iter()
            .any(|marker| entry.path.contains(marker))
    });

    if test_count == 0 {
        SignalResult::new(0, "No tests found")
    } else if has_coverage || has_config {
        SignalResult::new(18, format!("{test_count} test files with coverage config"))
    } else if has_unit && has_integration {
        SignalResult::new(15, format!("Unit + Integration tests ({test_count} files)"))
    } else if test_count > 5 {
        SignalResult::new(12, format!("{test_count} test files"))
    } else {
        SignalResult::new(6, format!("Basic tests ({test_count} files)"))
    }
}

/// Score commit message quality over the most recent commits.
///
/// The quality ratio divides by the full commit count, not only the inspected
/// window, so long histories with few recent good messages score low.
pub fn commits(commits: &[Commit]) -> SignalResult {
    if commits.is_empty() {
        return SignalResult::new(0, "No commits");
    }

    let inspected = &commits[..commits.len().min(INSPECTED_COMMITS)];
    let mut conventional = 0usize;
    let mut descriptive = 0usize;
    for commit in inspected {
        let message = commit.message.to_lowercase();
        if CONVENTIONAL_PREFIXES
            .iter()
            .any(|prefix| message.starts_with(prefix))
        {
            conventional += 1;
        }
        if message.split_whitespace().count() > 3
            && QUALITY_KEYWORDS
                .iter()
                .any(|keyword| message.contains(keyword))
        {
            descriptive += 1;
        }
    }

    let score = ((conventional + descriptive) * 20 / commits.len()).min(20);
    SignalResult::new(
        score as i64,
        format!(
            "Conventional: {conventional}, Descriptive: {descriptive}/{}",
            inspected.len()
        ),
    )
}

/// Score dependency management from manifest and lock file presence.
pub fn dependencies(tree: &[FileTreeEntry]) -> SignalResult {
    let matching = |names: &[&str]| {
        tree.iter()
            .filter(|entry| names.iter().any(|name| entry.path.contains(name)))
            .count()
    };
    let dep_files = matching(DEPENDENCY_FILES);
    let lock_files = matching(LOCK_FILES);

    if dep_files == 0 {
        SignalResult::new(0, "No dependency files")
    } else if lock_files > 0 {
        SignalResult::new(18, "Dependency files + lock files present")
    } else if dep_files > 1 {
        SignalResult::new(14, format!("{dep_files} dependency files"))
    } else {
        SignalResult::new(10, "Basic dependency management")
    }
}

/// Run all five extractors over fetched repository data.
pub fn detect_signals(tree: &[FileTreeEntry], readme: &str, history: &[Commit]) -> SignalSet {
    let folders: Vec<String> = top_level_folders(tree).into_iter().collect();
    SignalSet {
        structure: structure(&folders),
        documentation: documentation(readme),
        tests: tests(tree),
        commits: commits(history),
        dependencies: dependencies(tree),
    }
}
