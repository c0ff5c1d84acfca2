//! OpenAPI specification for the Repotier server.

use utoipa::OpenApi;

use repotier_core::{
    AnalysisFailure, AnalysisResult, AnalysisStatus, Dimension, DimensionScores, RepoInfo,
    SignalRationales,
};

use crate::routes::{AnalyzeRequest, ErrorResponse, HealthResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::analyze,
        crate::routes::health,
        crate::routes::openapi_json
    ),
    components(
        schemas(
            AnalyzeRequest,
            AnalysisResult,
            AnalysisFailure,
            AnalysisStatus,
            Dimension,
            DimensionScores,
            SignalRationales,
            RepoInfo,
            ErrorResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "analysis", description = "Repository maturity analysis"),
        (name = "system", description = "System endpoints")
    )
)]
/// OpenAPI specification for the Repotier server.
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn openapi_includes_expected_paths() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths;

        assert!(paths.contains_key("/analyze"));
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/openapi.json"));
    }

    #[test]
    fn openapi_registers_result_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;

        assert!(schemas.contains_key("AnalysisResult"));
        assert!(schemas.contains_key("AnalysisFailure"));
        assert!(schemas.contains_key("DimensionScores"));
    }
}
