//! GitHub REST API metadata source.

use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use repotier_core::{
    Commit, FileTreeEntry, LanguageMap, MetadataSource, RawReadme, RepoInfo, RepoSlug,
    RepotierError, Result,
};

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_USER_AGENT: &str = "repotier-server";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_COMMIT_PAGE_SIZE: u32 = 100;
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// Connection settings for the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    /// API base URL.
    pub api_url: String,
    /// Optional bearer token.
    pub token: Option<String>,
    /// User-Agent header value.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Number of commits requested per analysis.
    pub commit_page_size: u32,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            commit_page_size: DEFAULT_COMMIT_PAGE_SIZE,
        }
    }
}

impl GitHubSettings {
    /// Load settings from environment variables.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through a variable lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let token = lookup("GITHUB_TOKEN")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self {
            api_url: lookup("GITHUB_API_URL").unwrap_or(defaults.api_url),
            token,
            user_agent: lookup("GITHUB_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "REPOTIER_FETCH_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            commit_page_size: parse_or(
                &lookup,
                "REPOTIER_COMMIT_PAGE_SIZE",
                DEFAULT_COMMIT_PAGE_SIZE,
            ),
        }
    }
}

fn parse_or<T: FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid {key}={raw}");
            default
        }),
        None => default,
    }
}

/// Blocking GitHub API client used as the server's metadata source.
#[derive(Debug, Clone)]
pub struct GitHubApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
    user_agent: String,
    commit_page_size: u32,
}

#[derive(Deserialize)]
struct RepoResponse {
    #[serde(default)]
    name: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    language: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeItem {
    path: String,
}

#[derive(Deserialize)]
struct ReadmeResponse {
    #[serde(default)]
    content: String,
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct CommitResponse {
    #[serde(default)]
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    #[serde(default)]
    message: String,
    author: Option<CommitAuthor>,
}

#[derive(Deserialize)]
struct CommitAuthor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    date: String,
}

#[derive(Deserialize)]
struct BranchResponse {
    name: String,
}

impl GitHubApiClient {
    /// Build a client from settings.
    pub fn new(settings: GitHubSettings) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            token: settings.token,
            client,
            user_agent: settings.user_agent,
            commit_page_size: settings.commit_page_size,
        })
    }

    /// Build a client from environment variables.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_env() -> std::result::Result<Self, reqwest::Error> {
        Self::new(GitHubSettings::from_env())
    }

    fn repo_url(&self, repo: &RepoSlug, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}{suffix}",
            self.base_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.name)
        )
    }

    fn send(&self, url: &str) -> Result<Response> {
        let mut request = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", ACCEPT_HEADER);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        log::debug!("GET {url}");
        request
            .send()
            .map_err(|err| RepotierError::Fetch(format!("github request failed: {err}")))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(url)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(RepotierError::Fetch(format!(
                "github api error ({status}) for {url}: {body}"
            )));
        }
        response
            .json()
            .map_err(|err| RepotierError::Fetch(format!("github response decode failed: {err}")))
    }
}

impl MetadataSource for GitHubApiClient {
    fn repo_info(&self, repo: &RepoSlug) -> Result<RepoInfo> {
        let data: RepoResponse = self.get_json(&self.repo_url(repo, ""))?;
        Ok(RepoInfo {
            name: data.name,
            description: data.description,
            stars: data.stargazers_count,
            forks: data.forks_count,
            language: data.language,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }

    fn file_tree(&self, repo: &RepoSlug) -> Result<Vec<FileTreeEntry>> {
        let data: TreeResponse =
            self.get_json(&self.repo_url(repo, "/git/trees/HEAD?recursive=1"))?;
        if data.truncated {
            log::warn!("file tree for {repo} was truncated by the api");
        }
        Ok(data
            .tree
            .into_iter()
            .map(|item| FileTreeEntry::new(item.path))
            .collect())
    }

    fn readme(&self, repo: &RepoSlug) -> Result<Option<RawReadme>> {
        let response = self.send(&self.repo_url(repo, "/readme"))?;
        if !response.status().is_success() {
            log::info!("no readme for {repo} ({})", response.status());
            return Ok(None);
        }
        let data: ReadmeResponse = response
            .json()
            .map_err(|err| RepotierError::Fetch(format!("github response decode failed: {err}")))?;
        Ok(Some(RawReadme {
            content: data.content,
            encoding: data.encoding,
        }))
    }

    fn commits(&self, repo: &RepoSlug) -> Result<Vec<Commit>> {
        let suffix = format!("/commits?per_page={}", self.commit_page_size);
        let data: Vec<CommitResponse> = self.get_json(&self.repo_url(repo, &suffix))?;
        Ok(data
            .into_iter()
            .map(|item| {
                let (author, date) = item
                    .commit
                    .author
                    .map(|author| (author.name, author.date))
                    .unwrap_or_default();
                Commit {
                    message: item.commit.message,
                    author,
                    date,
                    sha: item.sha,
                }
            })
            .collect())
    }

    fn branches(&self, repo: &RepoSlug) -> Result<Vec<String>> {
        let data: Vec<BranchResponse> = self.get_json(&self.repo_url(repo, "/branches"))?;
        Ok(data.into_iter().map(|branch| branch.name).collect())
    }

    fn languages(&self, repo: &RepoSlug) -> Result<LanguageMap> {
        self.get_json(&self.repo_url(repo, "/languages"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use repotier_core::RepositoryAnalyzer;
    use std::collections::HashMap;

    fn client_for(server: &MockServer, token: Option<&str>) -> GitHubApiClient {
        GitHubApiClient::new(GitHubSettings {
            api_url: server.url(""),
            token: token.map(String::from),
            user_agent: "repotier-tests".to_string(),
            commit_page_size: 30,
            ..GitHubSettings::default()
        })
        .expect("client")
    }

    fn slug() -> RepoSlug {
        RepoSlug::parse("octo/widgets").expect("slug")
    }

    #[test]
    fn settings_fall_back_to_defaults() {
        let vars = HashMap::from([
            ("GITHUB_TOKEN", "  "),
            ("REPOTIER_FETCH_TIMEOUT_SECS", "soon"),
            ("REPOTIER_COMMIT_PAGE_SIZE", "50"),
        ]);
        let settings = GitHubSettings::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.token, None);
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.commit_page_size, 50);
    }

    #[test]
    fn repo_info_maps_fields_and_sends_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octo/widgets")
                .header("authorization", "Bearer gh-token")
                .header("user-agent", "repotier-tests")
                .header("accept", ACCEPT_HEADER);
            then.status(200).json_body(serde_json::json!({
                "name": "widgets",
                "description": null,
                "stargazers_count": 7,
                "forks_count": 2,
                "language": "Rust",
                "created_at": "2023-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }));
        });

        let info = client_for(&server, Some("gh-token"))
            .repo_info(&slug())
            .expect("repo info");

        mock.assert();
        assert_eq!(info.name, "widgets");
        assert_eq!(info.stars, 7);
        assert_eq!(info.forks, 2);
        assert_eq!(info.language.as_deref(), Some("Rust"));
        assert_eq!(info.description, None);
    }

    #[test]
    fn commits_request_page_size_and_flatten_author() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octo/widgets/commits")
                .query_param("per_page", "30");
            then.status(200).json_body(serde_json::json!([
                {
                    "sha": "abc123",
                    "commit": {
                        "message": "feat: add widgets",
                        "author": {"name": "Octo", "date": "2024-02-02T00:00:00Z"}
                    }
                },
                {"sha": "def456", "commit": {"message": "wip", "author": null}}
            ]));
        });

        let commits = client_for(&server, None).commits(&slug()).expect("commits");

        mock.assert();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].author, "Octo");
        assert_eq!(commits[0].sha, "abc123");
        assert_eq!(commits[1].author, "");
    }

    #[test]
    fn missing_readme_is_not_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/widgets/readme");
            then.status(404).body(r#"{"message":"Not Found"}"#);
        });

        let readme = client_for(&server, None).readme(&slug()).expect("readme");

        assert_eq!(readme, None);
    }

    #[test]
    fn error_status_becomes_fetch_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/widgets/branches");
            then.status(403).body("rate limited");
        });

        let err = client_for(&server, None)
            .branches(&slug())
            .expect_err("forbidden");

        match err {
            RepotierError::Fetch(message) => {
                assert!(message.contains("403"));
                assert!(message.contains("/branches"));
                assert!(message.contains("rate limited"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn analyzer_scores_a_mocked_repository() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/widgets");
            then.status(200)
                .json_body(serde_json::json!({"name": "widgets", "stargazers_count": 3}));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/repos/octo/widgets/git/trees/HEAD")
                .query_param("recursive", "1");
            then.status(200).json_body(serde_json::json!({
                "tree": [
                    {"path": "src", "type": "tree"},
                    {"path": "src/main.go", "type": "blob"},
                    {"path": "go.mod", "type": "blob"}
                ],
                "truncated": false
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/widgets/readme");
            then.status(200).json_body(serde_json::json!({
                "content": "IyBBYm91dAo=\n",
                "encoding": "base64"
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/widgets/commits");
            then.status(200).json_body(serde_json::json!([
                {"sha": "1", "commit": {"message": "fix: add retry to the fetch loop"}}
            ]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/widgets/branches");
            then.status(200)
                .json_body(serde_json::json!([{"name": "main"}, {"name": "dev"}]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/octo/widgets/languages");
            then.status(200).json_body(serde_json::json!({"Go": 1200}));
        });

        let analyzer = RepositoryAnalyzer::new(client_for(&server, None));
        let result = analyzer
            .analyze_url("https://github.com/octo/widgets")
            .expect("analysis");

        assert_eq!(result.repo_info.stars, 3);
        assert_eq!(result.branch_count, 2);
        assert_eq!(result.profile.structure, 12);
        assert_eq!(result.profile.documentation, 3);
        assert_eq!(result.profile.commits, 20);
        assert_eq!(result.profile.dependencies, 10);
        assert_eq!(result.languages.get("Go"), Some(&1200));
    }
}
