//! HTTP client for the Repotier server.

use crate::CliResult;
use repotier_core::{AnalysisFailure, AnalysisReport};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Default Repotier server URL.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    repo_url: &'a str,
}

/// Error body returned by the server for rejected requests.
#[derive(Deserialize)]
struct ServerError {
    message: String,
}

/// Requests repository analyses; abstracted for testability.
pub trait AnalyzeClient: Send + Sync {
    /// Analyze one repository URL.
    fn analyze<'a>(
        &'a self,
        repo_url: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<AnalysisReport>> + Send + 'a>>;
}

/// Normalize the server URL for consistent API requests.
pub fn normalize_server_url(server_url: &str) -> CliResult<String> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err("server url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Reqwest-backed analysis client.
pub struct ReqwestAnalyzeClient {
    client: Client,
    server_url: String,
}

impl ReqwestAnalyzeClient {
    /// Build a client for a server base URL.
    pub fn new(server_url: &str) -> CliResult<Self> {
        let client = Client::builder().user_agent("repotier-cli").build()?;
        Ok(Self {
            client,
            server_url: normalize_server_url(server_url)?,
        })
    }
}

impl AnalyzeClient for ReqwestAnalyzeClient {
    fn analyze<'a>(
        &'a self,
        repo_url: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<AnalysisReport>> + Send + 'a>> {
        Box::pin(post_analysis(&self.client, &self.server_url, repo_url))
    }
}

/// Post an analysis request; failure bodies become failure reports.
async fn post_analysis(
    client: &Client,
    server_url: &str,
    repo_url: &str,
) -> CliResult<AnalysisReport> {
    let url = format!("{server_url}/api/analyze");
    log::debug!("requesting analysis of {repo_url} from {url}");
    let response = client
        .post(url)
        .json(&AnalyzeRequest { repo_url })
        .send()
        .await?;
    let status = response.status();
    let body = response.text().await?;

    if let Ok(report) = serde_json::from_str::<AnalysisReport>(&body) {
        return Ok(report);
    }
    if let Ok(error) = serde_json::from_str::<ServerError>(&body) {
        return Ok(AnalysisReport::Failed(AnalysisFailure::new(error.message)));
    }
    Err(format!("unexpected server response ({status}): {body}").into())
}
