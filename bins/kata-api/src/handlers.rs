// HTTP route handlers for the kata API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use kata_common::catalog::SupportedLanguage;
use kata_common::harness;
use kata_common::metadata;
use kata_common::types::{Language, ProblemPatch, SubmissionRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics::{CATALOG_LOOKUPS_TOTAL, POLLS_TOTAL, SUBMISSIONS_TOTAL};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    pub source_code: Option<String>,
    pub language_id: Option<u32>,
    #[serde(default)]
    pub stdin: Option<String>,
    /// Catalog signature metadata, still encoded
    #[serde(default)]
    pub metadata: Option<String>,
    /// Newline-delimited example cases
    #[serde(default)]
    pub test_cases: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub token: String,
    pub harness: bool,
    pub cases: usize,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub token: Option<String>,
}

/// Prepared submission plus how it was built
#[derive(Debug)]
pub struct PreparedRun {
    pub submission: SubmissionRequest,
    pub harness: bool,
    pub cases: usize,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

/// Decode the request at the boundary and, when metadata and cases are
/// supplied for a language with a harness target, wrap the source in a harness.
/// Metadata without parameters is enough on its own.
pub fn prepare_run(request: RunRequest) -> Result<PreparedRun, ApiError> {
    let source_code = request
        .source_code
        .clone()
        .ok_or_else(|| ApiError::Validation("Missing source_code".to_string()))?;
    let language_id = request
        .language_id
        .ok_or_else(|| ApiError::Validation("Missing language_id".to_string()))?;
    let stdin = Some(request.stdin.clone().unwrap_or_default());

    let language = Language::from_judge0_id(language_id);
    let wants_harness = matches!(language, Some(Language::Python | Language::TypeScript));

    let harness_input = match (non_empty(&request.metadata), language) {
        (Some(raw_metadata), Some(language)) if wants_harness => {
            let metadata = metadata::decode(raw_metadata)?;
            // A signature without parameters needs no example text
            match non_empty(&request.test_cases) {
                Some(raw_cases) => Some((metadata, raw_cases, language)),
                None if metadata.params.is_empty() => Some((metadata, "", language)),
                None => None,
            }
        }
        _ => None,
    };

    match harness_input {
        Some((metadata, raw_cases, language)) => {
            let cases = harness::example_cases(&metadata, raw_cases)?;
            let program = harness::synthesize(&source_code, &metadata, &cases, language)?;

            Ok(PreparedRun {
                submission: SubmissionRequest {
                    source_code: program.source,
                    language_id,
                    stdin,
                },
                harness: true,
                cases: program.case_count,
            })
        }
        None => Ok(PreparedRun {
            submission: SubmissionRequest {
                source_code,
                language_id,
                stdin,
            },
            harness: false,
            cases: 0,
        }),
    }
}

/// POST /run - Submit source (or a synthesized harness) for execution
pub async fn submit_run(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RunRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let run_id = Uuid::new_v4();
    let prepared = prepare_run(payload).map_err(|e| {
        SUBMISSIONS_TOTAL.with_label_values(&["rejected"]).inc();
        e
    })?;

    debug!(
        run_id = %run_id,
        language_id = prepared.submission.language_id,
        harness = prepared.harness,
        cases = prepared.cases,
        source_size = prepared.submission.source_code.len(),
        "Submitting run"
    );

    match state.executor.submit(&prepared.submission).await {
        Ok(token) => {
            SUBMISSIONS_TOTAL.with_label_values(&["accepted"]).inc();
            info!(
                run_id = %run_id,
                token = %token,
                language_id = prepared.submission.language_id,
                harness = prepared.harness,
                "Run submitted"
            );
            Ok((
                StatusCode::CREATED,
                Json(RunResponse {
                    token,
                    harness: prepared.harness,
                    cases: prepared.cases,
                }),
            ))
        }
        Err(e) => {
            SUBMISSIONS_TOTAL.with_label_values(&["failed"]).inc();
            error!(run_id = %run_id, error = %e, "Failed to submit run");
            Err(e.into())
        }
    }
}

/// GET /run?token= - Job snapshot, forwarded unmodified
pub async fn run_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Value>, ApiError> {
    let token = non_empty(&query.token)
        .ok_or_else(|| ApiError::Validation("Missing token".to_string()))?
        .to_string();

    match state.executor.status(&token).await {
        Ok(snapshot) => {
            POLLS_TOTAL.with_label_values(&["ok"]).inc();
            debug!(token = %token, status = %snapshot["status"], "Job snapshot retrieved");
            Ok(Json(snapshot))
        }
        Err(e) => {
            POLLS_TOTAL.with_label_values(&["failed"]).inc();
            warn!(token = %token, error = %e, "Failed to fetch job status");
            Err(e.into())
        }
    }
}

/// GET /problems/:slug - Catalog lookup with derived signature and starter code
pub async fn get_catalog_problem(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let question = match state.catalog.question(&slug).await {
        Ok(Some(question)) => question,
        Ok(None) => {
            CATALOG_LOOKUPS_TOTAL.with_label_values(&["not_found"]).inc();
            info!(slug = %slug, "Catalog has no such problem");
            return Err(ApiError::NotFound("Problem not found".to_string()));
        }
        Err(e) => {
            CATALOG_LOOKUPS_TOTAL.with_label_values(&["failed"]).inc();
            error!(slug = %slug, error = %e, "Catalog lookup failed");
            return Err(e.into());
        }
    };
    CATALOG_LOOKUPS_TOTAL.with_label_values(&["found"]).inc();

    let problem = question.into_problem();

    // Ingest in the background; the response does not wait on the store
    let store = state.store.clone();
    let patch = problem.to_patch();
    tokio::spawn(async move {
        let slug = patch.title_slug.clone().unwrap_or_default();
        match store.upsert(patch).await {
            Ok(_) => debug!(slug = %slug, "Problem ingested"),
            Err(e) => warn!(slug = %slug, error = %e, "Problem ingest failed"),
        }
    });

    Ok(Json(json!({ "question": problem })))
}

/// POST /problem - Create or merge a stored problem
pub async fn upsert_problem(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ProblemPatch>,
) -> Result<Json<Value>, ApiError> {
    let problem = state.store.upsert(patch).await?;
    info!(slug = %problem.title_slug, "Ingest problem");
    Ok(Json(json!({ "ok": true })))
}

/// GET /problem/:slug - Read a stored problem
pub async fn get_stored_problem(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if slug.trim().is_empty() {
        return Err(ApiError::Validation("Missing slug".to_string()));
    }
    match state.store.get(&slug).await? {
        Some(problem) => Ok(Json(json!({ "problem": problem }))),
        None => Err(ApiError::NotFound("Problem not found".to_string())),
    }
}

/// GET /languages - Languages accepted by POST /run with a harness or starter code
pub async fn list_languages() -> Json<Vec<SupportedLanguage>> {
    Json(Language::ALL.into_iter().map(SupportedLanguage::from).collect())
}

/// GET /status - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
