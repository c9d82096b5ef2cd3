//! Axum route handlers for the analysis workflows.
//!
//! Each workflow is exposed twice. The buffered handlers run it to completion and
//! return the full sequence of view-state snapshots; the `/stream` handlers spawn
//! it and forward each snapshot as a server-sent event the moment it is emitted.
//! Workflow failures are part of that sequence (HTTP 200); only a malformed
//! request body produces an `AppError`.

use std::future::Future;

use axum::{
    extract::{Multipart, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::view::{drain, ViewSink, ViewState};
use crate::errors::AppError;
use crate::models::analysis::{AnalysisRequest, UploadedDocument};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LearningPathRequest {
    pub missing_skills: String,
}

#[derive(Debug, Deserialize)]
pub struct InterviewQuestionsRequest {
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct WorkflowRun {
    pub run_id: Uuid,
    pub states: Vec<ViewState>,
}

async fn collect<F, Fut>(run: F) -> WorkflowRun
where
    F: FnOnce(ViewSink) -> Fut,
    Fut: Future<Output = Uuid>,
{
    let (sink, mut rx) = ViewSink::channel();
    let run_id = run(sink).await;
    WorkflowRun {
        run_id,
        states: drain(&mut rx),
    }
}

/// Spawns the workflow and yields one `state` event per snapshot. The stream
/// ends when the workflow finishes and drops its sink.
fn stream_states<F, Fut>(run: F) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
    F: FnOnce(ViewSink) -> Fut,
    Fut: Future<Output = Uuid> + Send + 'static,
{
    let (sink, rx) = ViewSink::channel();
    tokio::spawn(run(sink));

    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|state| (state, rx))
    })
    .map(|state| Event::default().event("state").json_data(state));

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Multipart fields: `cv` (the PDF file) and `job_description` (text).
/// The `cv` field may be omitted; the workflow renders that as an invalid document.
async fn read_benchmark_request(mut multipart: Multipart) -> Result<AnalysisRequest, AppError> {
    let mut document = None;
    let mut job_description = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("cv") => {
                let file_name = field.file_name().map(String::from);
                let bytes = field.bytes().await?;
                document = Some(UploadedDocument { file_name, bytes });
            }
            Some("job_description") => job_description = Some(field.text().await?),
            _ => {}
        }
    }

    let job_description = job_description.ok_or_else(|| {
        AppError::Validation("multipart field 'job_description' is required".to_string())
    })?;
    Ok(AnalysisRequest {
        document,
        job_description,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/benchmark
pub async fn handle_benchmark(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<WorkflowRun>, AppError> {
    let request = read_benchmark_request(multipart).await?;
    let workflow = state.workflow;
    let run = collect(|sink| async move { workflow.benchmark(request, &sink).await }).await;
    Ok(Json(run))
}

/// POST /api/v1/learning-path
pub async fn handle_learning_path(
    State(state): State<AppState>,
    Json(request): Json<LearningPathRequest>,
) -> Json<WorkflowRun> {
    let workflow = state.workflow;
    let run = collect(|sink| async move {
        workflow.learning_path(&request.missing_skills, &sink).await
    })
    .await;
    Json(run)
}

/// POST /api/v1/interview-questions
pub async fn handle_interview_questions(
    State(state): State<AppState>,
    Json(request): Json<InterviewQuestionsRequest>,
) -> Json<WorkflowRun> {
    let workflow = state.workflow;
    let run = collect(|sink| async move {
        workflow
            .interview_questions(&request.job_description, &sink)
            .await
    })
    .await;
    Json(run)
}

/// POST /api/v1/benchmark/stream
pub async fn handle_benchmark_stream(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let request = read_benchmark_request(multipart).await?;
    let workflow = state.workflow;
    Ok(stream_states(|sink| async move {
        workflow.benchmark(request, &sink).await
    }))
}

/// POST /api/v1/learning-path/stream
pub async fn handle_learning_path_stream(
    State(state): State<AppState>,
    Json(request): Json<LearningPathRequest>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let workflow = state.workflow;
    stream_states(|sink| async move {
        workflow.learning_path(&request.missing_skills, &sink).await
    })
}

/// POST /api/v1/interview-questions/stream
pub async fn handle_interview_questions_stream(
    State(state): State<AppState>,
    Json(request): Json<InterviewQuestionsRequest>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let workflow = state.workflow;
    stream_states(|sink| async move {
        workflow
            .interview_questions(&request.job_description, &sink)
            .await
    })
}
