/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/health
/// ```
///
/// # Response
///
/// ```json
/// { "status": "ok" }
/// ```

use axum::Json;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
}

/// Health check handler
///
/// Answers as long as the process is up; no collaborator is probed.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_body() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "ok");
    }
}
