//! HTTP handlers for the Repotier server.

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use repotier_core::{
    AnalysisFailure, AnalysisResult, MetadataSource, RepositoryAnalyzer, RepotierError,
};

use crate::openapi::ApiDoc;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository metadata source used for every analysis.
    pub source: Arc<dyn MetadataSource + Send + Sync>,
}

/// Request payload for a repository analysis.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Repository URL, e.g. `https://github.com/owner/name`.
    #[serde(default)]
    pub repo_url: String,
}

/// Error response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
}

/// Liveness payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
}

fn failure_response(err: &RepotierError) -> HttpResponse {
    let body = AnalysisFailure::new(err);
    match err {
        RepotierError::InvalidRepoUrl(_) => HttpResponse::BadRequest().json(body),
        RepotierError::Fetch(_) => HttpResponse::BadGateway().json(body),
        RepotierError::Decode(_) | RepotierError::MissingDimension(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}

#[utoipa::path(
    post,
    path = "/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis completed", body = AnalysisResult),
        (status = 400, description = "Missing or invalid repository URL", body = AnalysisFailure),
        (status = 502, description = "Repository metadata could not be fetched", body = AnalysisFailure)
    ),
    tag = "analysis"
)]
#[post("/api/analyze")]
/// Fetch and score a repository.
pub async fn analyze(
    state: web::Data<AppState>,
    payload: web::Json<AnalyzeRequest>,
) -> impl Responder {
    let repo_url = payload.into_inner().repo_url.trim().to_string();
    if repo_url.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            message: "Please provide a repository URL".to_string(),
        });
    }

    let source = Arc::clone(&state.source);
    let target = repo_url.clone();
    let result =
        web::block(move || RepositoryAnalyzer::new(source).analyze_url(&target)).await;

    match result {
        Ok(Ok(analysis)) => {
            log::info!(
                "analyzed {repo_url}: {} ({})",
                analysis.score,
                analysis.tier
            );
            HttpResponse::Ok().json(analysis)
        }
        Ok(Err(err)) => {
            log::warn!("analysis of {repo_url} failed: {err}");
            failure_response(&err)
        }
        Err(err) => HttpResponse::InternalServerError().json(AnalysisFailure::new(format!(
            "analysis task failed: {err}"
        ))),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is running", body = HealthResponse)
    ),
    tag = "system"
)]
#[get("/api/health")]
/// Report liveness.
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/api/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};
    use repotier_core::{
        Commit, FileTreeEntry, LanguageMap, RawReadme, RepoInfo, RepoSlug, Result,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct StubSource {
        fail_tree: bool,
        calls: AtomicUsize,
    }

    impl MetadataSource for StubSource {
        fn repo_info(&self, repo: &RepoSlug) -> Result<RepoInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RepoInfo {
                name: repo.name.clone(),
                ..RepoInfo::default()
            })
        }

        fn file_tree(&self, _repo: &RepoSlug) -> Result<Vec<FileTreeEntry>> {
            if self.fail_tree {
                return Err(RepotierError::Fetch(
                    "github api error (404 Not Found)".to_string(),
                ));
            }
            Ok(vec![
                FileTreeEntry::new("src/index.js"),
                FileTreeEntry::new("package.json"),
            ])
        }

        fn readme(&self, _repo: &RepoSlug) -> Result<Option<RawReadme>> {
            Ok(Some(RawReadme::plain("# Overview\n## Usage\n")))
        }

        fn commits(&self, _repo: &RepoSlug) -> Result<Vec<Commit>> {
            Ok(vec![Commit::with_message("initial commit")])
        }

        fn branches(&self, _repo: &RepoSlug) -> Result<Vec<String>> {
            Ok(vec!["main".to_string()])
        }

        fn languages(&self, _repo: &RepoSlug) -> Result<LanguageMap> {
            Ok(LanguageMap::from([("JavaScript".to_string(), 900)]))
        }
    }

    fn state_with(source: Arc<StubSource>) -> web::Data<AppState> {
        web::Data::new(AppState { source })
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state)
                    .service(analyze)
                    .service(health)
                    .service(openapi_json),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn analyze_returns_result() {
        let app = test_app!(state_with(Arc::new(StubSource::default())));
        let req = test::TestRequest::post()
            .uri("/api/analyze")
            .set_json(serde_json::json!({"repoUrl": "https://github.com/octo/site"}))
            .to_request();
        let resp: AnalysisResult = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.repo_info.name, "site");
        assert_eq!(resp.profile.structure, 12);
        assert_eq!(resp.profile.documentation, 6);
        assert_eq!(resp.profile.dependencies, 10);
        assert_eq!(resp.commit_count, 1);
        assert!(resp.roadmap.len() <= 5);
    }

    #[actix_web::test]
    async fn analyze_rejects_blank_url() {
        let source = Arc::new(StubSource::default());
        let app = test_app!(state_with(Arc::clone(&source)));
        let req = test::TestRequest::post()
            .uri("/api/analyze")
            .set_json(serde_json::json!({"repoUrl": "   "}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Please provide a repository URL");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn analyze_rejects_unparsable_url() {
        let app = test_app!(state_with(Arc::new(StubSource::default())));
        let req = test::TestRequest::post()
            .uri("/api/analyze")
            .set_json(serde_json::json!({"repoUrl": "https://gitlab.com/octo/site"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: AnalysisFailure = test::read_body_json(resp).await;
        assert!(body.error.starts_with("Analysis failed: invalid repository url"));
    }

    #[actix_web::test]
    async fn analyze_reports_fetch_failure() {
        let source = Arc::new(StubSource {
            fail_tree: true,
            ..StubSource::default()
        });
        let app = test_app!(state_with(source));
        let req = test::TestRequest::post()
            .uri("/api/analyze")
            .set_json(serde_json::json!({"repoUrl": "octo/site"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "error");
        assert_eq!(
            body["error"],
            "Analysis failed: fetch failed: github api error (404 Not Found)"
        );
    }

    #[actix_web::test]
    async fn health_returns_ok() {
        let app = test_app!(state_with(Arc::new(StubSource::default())));
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.status, "ok");
    }

    #[actix_web::test]
    async fn openapi_json_returns_document() {
        let app = test_app!(state_with(Arc::new(StubSource::default())));
        let req = test::TestRequest::get()
            .uri("/api/openapi.json")
            .to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert!(resp.get("openapi").is_some());
        assert!(resp["paths"].get("/analyze").is_some());
    }
}
