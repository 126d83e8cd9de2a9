use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::metrics;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(handlers::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/languages", get(handlers::list_languages))
        .route("/problems/:slug", get(handlers::get_catalog_problem))
        .route("/problem", post(handlers::upsert_problem))
        .route("/problem/:slug", get(handlers::get_stored_problem))
        .route("/run", post(handlers::submit_run).get(handlers::run_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use kata_common::catalog::{CatalogQuestion, ProblemCatalog};
    use kata_common::coordinator::ExecutionService;
    use kata_common::error::{CatalogError, ExecutionError};
    use kata_common::store::{InMemoryProblemStore, ProblemStore};
    use kata_common::types::SubmissionRequest;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tower::ServiceExt; // for `oneshot`

    struct FakeCatalog {
        questions: HashMap<String, CatalogQuestion>,
    }

    #[async_trait]
    impl ProblemCatalog for FakeCatalog {
        async fn question(&self, slug: &str) -> Result<Option<CatalogQuestion>, CatalogError> {
            if slug == "rate-limited" {
                return Err(CatalogError::Upstream {
                    status: 429,
                    body: "slow down".to_string(),
                });
            }
            Ok(self.questions.get(slug).cloned())
        }
    }

    struct FakeExecutor {
        token: Option<String>,
        submitted: Mutex<Vec<SubmissionRequest>>,
    }

    fn snapshot(token: &str) -> Value {
        json!({
            "token": token,
            "stdout": "{\"index\": 0, \"arguments\": {}, \"result\": 1}\n",
            "stderr": null,
            "compile_output": null,
            "time": "0.01",
            "memory": 2048,
            "status": {"id": 2, "description": "Processing"}
        })
    }

    #[async_trait]
    impl ExecutionService for FakeExecutor {
        async fn submit(&self, request: &SubmissionRequest) -> Result<String, ExecutionError> {
            self.submitted.lock().unwrap().push(request.clone());
            self.token.clone().ok_or(ExecutionError::Submit {
                status: 201,
                body: r#"{"error":"token missing"}"#.to_string(),
            })
        }

        async fn status(&self, token: &str) -> Result<Value, ExecutionError> {
            if token == "missing" {
                return Err(ExecutionError::Poll {
                    status: 404,
                    body: r#"{"error":"Not found"}"#.to_string(),
                });
            }
            Ok(snapshot(token))
        }
    }

    fn two_sum_question() -> CatalogQuestion {
        serde_json::from_value(json!({
            "title": "Two Sum",
            "titleSlug": "two-sum",
            "content": "<p>Given an array</p>",
            "difficulty": "Easy",
            "codeSnippets": [],
            "metaData": "{\"name\":\"twoSum\",\"params\":[{\"name\":\"nums\",\"type\":\"integer[]\"},{\"name\":\"target\",\"type\":\"integer\"}],\"return\":{\"type\":\"integer[]\"}}",
            "exampleTestcases": "[2,7,11,15]\n9\n[3,2,4]\n6"
        }))
        .unwrap()
    }

    fn app_with(token: Option<&str>) -> (Router, Arc<AppState>, Arc<FakeExecutor>) {
        let executor = Arc::new(FakeExecutor {
            token: token.map(str::to_string),
            submitted: Mutex::new(Vec::new()),
        });
        let mut questions = HashMap::new();
        questions.insert("two-sum".to_string(), two_sum_question());
        let state = Arc::new(AppState {
            catalog: Arc::new(FakeCatalog { questions }),
            store: Arc::new(InMemoryProblemStore::new()),
            executor: executor.clone(),
        });
        (routes().with_state(state.clone()), state, executor)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _, _) = app_with(Some("tok"));
        let (status, body) = send(app, "GET", "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!("OK"));
    }

    #[tokio::test]
    async fn test_submit_run_with_harness() {
        let (app, _, executor) = app_with(Some("tok-1"));
        let (status, body) = send(
            app,
            "POST",
            "/run",
            Some(json!({
                "source_code": "class Solution:\n    def twoSum(self, nums, target):\n        return [0, 1]\n",
                "language_id": 71,
                "metadata": "{\"name\": \"twoSum\", \"params\": [{\"name\": \"nums\"}, {\"name\": \"target\"}]}",
                "test_cases": "[2,7,11,15]\n9\n[3,2,4]\n6"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["token"], json!("tok-1"));
        assert_eq!(body["harness"], json!(true));
        assert_eq!(body["cases"], json!(2));

        let submitted = executor.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert!(submitted[0].source_code.contains("_kata_run()"));
    }

    #[tokio::test]
    async fn test_submit_run_without_token_surfaces_upstream_body() {
        let (app, _, _) = app_with(None);
        let (status, body) = send(
            app,
            "POST",
            "/run",
            Some(json!({"source_code": "print(1)", "language_id": 71})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, json!({"error": "token missing"}));
    }

    #[tokio::test]
    async fn test_submit_run_missing_fields() {
        let (app, _, executor) = app_with(Some("tok"));
        let (status, body) = send(app, "POST", "/run", Some(json!({"language_id": 71}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Missing source_code"));
        assert!(executor.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_status_forwards_snapshot() {
        let (app, _, _) = app_with(Some("tok"));
        let (status, body) = send(app, "GET", "/run?token=abc-123", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, snapshot("abc-123"));
    }

    #[tokio::test]
    async fn test_run_status_errors() {
        let (app, _, _) = app_with(Some("tok"));
        let (status, _) = send(app.clone(), "GET", "/run", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(app, "GET", "/run?token=missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let (app, _, _) = app_with(Some("tok"));
        let (status, body) = send(app.clone(), "GET", "/problems/two-sum", None).await;
        assert_eq!(status, StatusCode::OK);
        let question = &body["question"];
        assert_eq!(question["signature"]["functionName"], json!("twoSum"));
        assert_eq!(question["signature"]["params"][0]["type"], json!("int[]"));
        assert_eq!(question["examples"], json!([[[2, 7, 11, 15], 9], [[3, 2, 4], 6]]));
        assert!(question["starterCode"]["python"]
            .as_str()
            .unwrap()
            .contains("def twoSum(self, nums: List[int], target: int) -> List[int]:"));

        let (status, _) = send(app.clone(), "GET", "/problems/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(app, "GET", "/problems/rate-limited", None).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, json!("slow down"));
    }

    #[tokio::test]
    async fn test_problem_upsert_and_read() {
        let (app, state, _) = app_with(Some("tok"));

        let (status, body) = send(app.clone(), "POST", "/problem", Some(json!({"title": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Missing titleSlug"));

        let (status, body) = send(
            app.clone(),
            "POST",
            "/problem",
            Some(json!({"titleSlug": "three-sum", "title": "3Sum"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Missing problem content"));

        let (status, body) = send(
            app.clone(),
            "POST",
            "/problem",
            Some(json!({"titleSlug": "three-sum", "title": "3Sum", "content": "<p>..</p>"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true}));

        let (status, body) = send(app.clone(), "GET", "/problem/three-sum", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["problem"]["title"], json!("3Sum"));
        assert_eq!(body["problem"]["difficulty"], json!("Unknown"));
        assert!(state.store.get("three-sum").await.unwrap().is_some());

        let (status, body) = send(app, "GET", "/problem/four-sum", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("Problem not found"));
    }

    #[tokio::test]
    async fn test_languages_and_metrics() {
        let (app, _, _) = app_with(Some("tok"));
        let (status, body) = send(app.clone(), "GET", "/languages", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[1], json!({"slug": "python", "judge0LanguageId": 71}));

        let (status, _) = send(app, "GET", "/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
