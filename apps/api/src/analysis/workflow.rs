//! Workflow Orchestrator — sequences extraction, prompting, parsing and matching
//! for the three user-facing actions.
//!
//! Benchmark:  validate → extract CV → oracle(required skills) → oracle(matched skills)
//!             → match_skills → report
//! Learning:   validate → split skills → oracle(recommendations) → list
//! Interview:  validate → oracle(questions) → numbered list
//!
//! Every operation emits an `InProgress` snapshot before each blocking call and
//! ends with exactly one final snapshot. Errors never escape an operation; they
//! are logged and rendered. Each call returns the run id recorded on its span.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::prompts::{Prompt, INTERVIEW_QUESTION_COUNT};
use crate::analysis::skill_matcher::match_skills;
use crate::analysis::validation::{split_skills, validate_input, InputError, InputLimits};
use crate::analysis::view::{
    benchmark_failed, benchmark_loading, benchmark_rejected, benchmark_report,
    interview_questions_report, learning_path_report, single_region, Phase, Region, ViewSink,
};
use crate::document::{validate_document, DocumentError, DocumentExtractor};
use crate::llm_client::{response, CompletionClient, LlmError};
use crate::models::analysis::{AnalysisRequest, AnalysisResult, Recommendation, UploadedDocument};

const JOB_DESCRIPTION_FIELD: &str = "Job Description";
const MISSING_SKILLS_FIELD: &str = "Missing Skills";

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("{0}")]
    InvalidDocument(String),

    #[error("{0}")]
    ExtractionFailed(String),

    #[error(transparent)]
    Oracle(#[from] LlmError),
}

impl From<DocumentError> for WorkflowError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Invalid(msg) => WorkflowError::InvalidDocument(msg),
            DocumentError::Extraction(_) => WorkflowError::ExtractionFailed(err.to_string()),
        }
    }
}

impl WorkflowError {
    /// Errors caused by what the user submitted, as opposed to pipeline failures.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            WorkflowError::InvalidInput(_) | WorkflowError::InvalidDocument(_)
        )
    }

    fn log(&self, operation: &str) {
        if self.is_rejection() {
            warn!("{operation} rejected: {self}");
        } else {
            error!("Error in {operation}: {self}");
        }
    }
}

/// Stateless orchestrator built once at startup and shared by every request.
#[derive(Clone)]
pub struct Workflow {
    completion: CompletionClient,
    extractor: Arc<dyn DocumentExtractor>,
    limits: InputLimits,
}

impl Workflow {
    pub fn new(
        completion: CompletionClient,
        extractor: Arc<dyn DocumentExtractor>,
        limits: InputLimits,
    ) -> Self {
        Self {
            completion,
            extractor,
            limits,
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Benchmark
    // ────────────────────────────────────────────────────────────────────────

    pub async fn benchmark(&self, request: AnalysisRequest, sink: &ViewSink) -> Uuid {
        let run_id = Uuid::new_v4();
        async {
            let (document, job_description) = match self.validate_benchmark(&request) {
                Ok(valid) => valid,
                Err(e) => {
                    e.log("benchmark");
                    sink.emit(benchmark_rejected(&e.to_string()));
                    return;
                }
            };

            match self.run_benchmark(document, job_description, sink).await {
                Ok(result) => {
                    info!("Benchmark complete: score={:.2}", result.match_score);
                    sink.emit(benchmark_report(&result));
                }
                Err(e) => {
                    e.log("benchmark");
                    sink.emit(benchmark_failed(&e.to_string()));
                }
            }
        }
        .instrument(info_span!("benchmark", %run_id))
        .await;
        run_id
    }

    fn validate_benchmark<'a>(
        &self,
        request: &'a AnalysisRequest,
    ) -> Result<(&'a UploadedDocument, &'a str), WorkflowError> {
        let document = validate_document(request.document.as_ref())?;
        let job_description =
            validate_input(&request.job_description, JOB_DESCRIPTION_FIELD, self.limits)?;
        Ok((document, job_description))
    }

    async fn run_benchmark(
        &self,
        document: &UploadedDocument,
        job_description: &str,
        sink: &ViewSink,
    ) -> Result<AnalysisResult, WorkflowError> {
        sink.emit(benchmark_loading(0.2, "Extracting text from CV..."));
        let cv_text = self.extractor.extract(document).await?;

        sink.emit(benchmark_loading(0.4, "Identifying required skills..."));
        let prompt = Prompt::JobSkills { job_description }.render();
        let job_reply = response::parse(&self.completion.submit(&prompt).await?);
        let required_technical = response::skill_set(&job_reply, "required_technical_skills");
        let required_soft = response::skill_set(&job_reply, "required_soft_skills");
        info!(
            "Required skills: technical={}, soft={}",
            required_technical.len(),
            required_soft.len()
        );

        sink.emit(benchmark_loading(0.6, "Matching skills in CV..."));
        let technical_skills = required_technical.joined(", ");
        let soft_skills = required_soft.joined(", ");
        let prompt = Prompt::CvMatch {
            technical_skills: &technical_skills,
            soft_skills: &soft_skills,
            cv_text: &cv_text,
        }
        .render();
        let cv_reply = response::parse(&self.completion.submit(&prompt).await?);
        let matched_technical = response::skill_set(&cv_reply, "matched_technical_skills");
        let matched_soft = response::skill_set(&cv_reply, "matched_soft_skills");

        Ok(match_skills(
            &required_technical,
            &required_soft,
            &matched_technical,
            &matched_soft,
        ))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Learning path
    // ────────────────────────────────────────────────────────────────────────

    pub async fn learning_path(&self, missing_skills: &str, sink: &ViewSink) -> Uuid {
        let run_id = Uuid::new_v4();
        async {
            match self.run_learning_path(missing_skills, sink).await {
                Ok(recommendations) => {
                    info!("Learning path: {} recommendations", recommendations.len());
                    sink.emit(learning_path_report(&recommendations));
                }
                Err(e) => {
                    e.log("learning path");
                    sink.emit(single_region(
                        Region::LearningPathOutput,
                        Phase::Failed,
                        format!("Error generating learning path: {e}"),
                    ));
                }
            }
        }
        .instrument(info_span!("learning_path", %run_id))
        .await;
        run_id
    }

    async fn run_learning_path(
        &self,
        missing_skills: &str,
        sink: &ViewSink,
    ) -> Result<Vec<Recommendation>, WorkflowError> {
        let missing_skills = validate_input(missing_skills, MISSING_SKILLS_FIELD, self.limits)?;
        let skills = split_skills(missing_skills);
        if skills.is_empty() {
            return Err(InputError::Empty {
                field: MISSING_SKILLS_FIELD,
            }
            .into());
        }

        sink.emit(
            single_region(
                Region::LearningPathOutput,
                Phase::InProgress,
                "### Generating Learning Path...",
            )
            .with_progress(0.5, "Querying recommendations..."),
        );
        let prompt = Prompt::LearningPath { skills: &skills }.render();
        let reply = response::parse(&self.completion.submit(&prompt).await?);
        Ok(response::recommendations(&reply))
    }

    // ────────────────────────────────────────────────────────────────────────
    // Interview questions
    // ────────────────────────────────────────────────────────────────────────

    pub async fn interview_questions(&self, job_description: &str, sink: &ViewSink) -> Uuid {
        let run_id = Uuid::new_v4();
        async {
            match self.run_interview_questions(job_description, sink).await {
                Ok(questions) => {
                    info!("Interview questions: {} generated", questions.len());
                    sink.emit(interview_questions_report(&questions));
                }
                Err(e) => {
                    e.log("interview questions");
                    sink.emit(single_region(
                        Region::InterviewQuestionsOutput,
                        Phase::Failed,
                        format!("Error generating interview questions: {e}"),
                    ));
                }
            }
        }
        .instrument(info_span!("interview_questions", %run_id))
        .await;
        run_id
    }

    async fn run_interview_questions(
        &self,
        job_description: &str,
        sink: &ViewSink,
    ) -> Result<Vec<String>, WorkflowError> {
        let job_description = validate_input(job_description, JOB_DESCRIPTION_FIELD, self.limits)?;

        sink.emit(
            single_region(
                Region::InterviewQuestionsOutput,
                Phase::InProgress,
                "### Generating Interview Questions...",
            )
            .with_progress(0.5, "Querying questions..."),
        );
        let prompt = Prompt::InterviewQuestions {
            job_description,
            count: INTERVIEW_QUESTION_COUNT,
        }
        .render();
        let reply = response::parse(&self.completion.submit(&prompt).await?);
        Ok(response::string_list(&reply, "questions"))
    }
}
