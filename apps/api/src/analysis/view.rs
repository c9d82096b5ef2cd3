//! View state — the presentation-agnostic snapshots emitted by every workflow.
//!
//! A workflow emits a finite sequence of `ViewState` values: zero or more
//! `InProgress` snapshots followed by exactly one `Completed` or `Failed` one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::models::analysis::{AnalysisResult, Recommendation, SkillSet};

/// Named output areas the rendering layer knows how to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    ReportHeader,
    MatchedTechHeader,
    MatchedTechOutput,
    MatchedSoftHeader,
    MatchedSoftOutput,
    MissingTechHeader,
    MissingTechOutput,
    MissingSoftHeader,
    MissingSoftOutput,
    RecommendationOutput,
    LearningPathOutput,
    InterviewQuestionsOutput,
}

/// Every region the benchmark report owns, in display order.
pub const BENCHMARK_REGIONS: [Region; 10] = [
    Region::ReportHeader,
    Region::MatchedTechHeader,
    Region::MatchedTechOutput,
    Region::MatchedSoftHeader,
    Region::MatchedSoftOutput,
    Region::MissingTechHeader,
    Region::MissingTechOutput,
    Region::MissingSoftHeader,
    Region::MissingSoftOutput,
    Region::RecommendationOutput,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionState {
    pub visible: bool,
    pub content: String,
}

impl RegionState {
    pub fn shown(content: impl Into<String>) -> Self {
        Self {
            visible: true,
            content: content.into(),
        }
    }

    pub fn hidden(content: impl Into<String>) -> Self {
        Self {
            visible: false,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// 0.0 – 1.0
    pub fraction: f32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub phase: Phase,
    pub progress: Option<Progress>,
    pub regions: BTreeMap<Region, RegionState>,
}

impl ViewState {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            progress: None,
            regions: BTreeMap::new(),
        }
    }

    pub fn with_progress(mut self, fraction: f32, description: &str) -> Self {
        self.progress = Some(Progress {
            fraction,
            description: description.to_string(),
        });
        self
    }

    pub fn with_region(mut self, region: Region, state: RegionState) -> Self {
        self.regions.insert(region, state);
        self
    }

    pub fn region(&self, region: Region) -> Option<&RegionState> {
        self.regions.get(&region)
    }
}

/// Receives snapshots as a workflow produces them.
///
/// Sends never fail the workflow: if the receiver is gone the snapshot is dropped
/// and the workflow still runs to completion.
#[derive(Debug, Clone)]
pub struct ViewSink {
    tx: mpsc::UnboundedSender<ViewState>,
}

impl ViewSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ViewState>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, state: ViewState) {
        let _ = self.tx.send(state);
    }
}

/// Drains every snapshot already queued on `rx`.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ViewState>) -> Vec<ViewState> {
    let mut states = Vec::new();
    while let Ok(state) = rx.try_recv() {
        states.push(state);
    }
    states
}

// ────────────────────────────────────────────────────────────────────────────
// Benchmark rendering
// ────────────────────────────────────────────────────────────────────────────

const MATCHED_TECH_HEADER: &str = "### Matched Technical Skills";
const MATCHED_SOFT_HEADER: &str = "### Matched Soft Skills";
const MISSING_TECH_HEADER: &str = "### Missing Technical Skills";
const MISSING_SOFT_HEADER: &str = "### Missing Soft Skills";

fn default_header(region: Region) -> &'static str {
    match region {
        Region::MatchedTechHeader => MATCHED_TECH_HEADER,
        Region::MatchedSoftHeader => MATCHED_SOFT_HEADER,
        Region::MissingTechHeader => MISSING_TECH_HEADER,
        Region::MissingSoftHeader => MISSING_SOFT_HEADER,
        _ => "",
    }
}

/// All benchmark regions hidden, with `report_header` replaced.
fn benchmark_base(phase: Phase, header: RegionState) -> ViewState {
    let mut state = ViewState::new(phase);
    for region in BENCHMARK_REGIONS {
        state
            .regions
            .insert(region, RegionState::hidden(default_header(region)));
    }
    state.with_region(Region::ReportHeader, header)
}

pub fn benchmark_loading(fraction: f32, description: &str) -> ViewState {
    benchmark_base(
        Phase::InProgress,
        RegionState::shown("### Aurora is thinking... Analyzing your profile."),
    )
    .with_progress(fraction, description)
}

/// Validation failures: the user can fix the input and resubmit.
pub fn benchmark_rejected(message: &str) -> ViewState {
    benchmark_base(
        Phase::Failed,
        RegionState::shown(format!("## Error\n---\n{message}")),
    )
}

/// Failures after the pipeline started (oracle, extraction).
pub fn benchmark_failed(message: &str) -> ViewState {
    benchmark_base(
        Phase::Failed,
        RegionState::shown(format!("## An Error Occurred\n---\n {message}")),
    )
}

pub fn benchmark_report(result: &AnalysisResult) -> ViewState {
    let header = format!(
        "## Aurora Analysis Report\n---\n**Overall Match Score:** {:.2}%",
        result.match_score
    );
    let missing_tech = !result.missing_technical.is_empty();
    let missing_soft = !result.missing_soft.is_empty();

    ViewState::new(Phase::Completed)
        .with_progress(1.0, "Analysis complete!")
        .with_region(Region::ReportHeader, RegionState::shown(header))
        .with_region(Region::MatchedTechHeader, RegionState::shown(MATCHED_TECH_HEADER))
        .with_region(
            Region::MatchedTechOutput,
            RegionState::shown(skill_tags_or(
                &result.matched_technical,
                "<p>No technical skills found</p>",
            )),
        )
        .with_region(Region::MatchedSoftHeader, RegionState::shown(MATCHED_SOFT_HEADER))
        .with_region(
            Region::MatchedSoftOutput,
            RegionState::shown(skill_tags_or(
                &result.matched_soft,
                "<p>No soft skills found</p>",
            )),
        )
        .with_region(
            Region::MissingTechHeader,
            RegionState {
                visible: missing_tech,
                content: MISSING_TECH_HEADER.to_string(),
            },
        )
        .with_region(
            Region::MissingTechOutput,
            RegionState {
                visible: missing_tech,
                content: skill_tags_or(
                    &result.missing_technical,
                    "<p>No missing technical skills</p>",
                ),
            },
        )
        .with_region(
            Region::MissingSoftHeader,
            RegionState {
                visible: missing_soft,
                content: MISSING_SOFT_HEADER.to_string(),
            },
        )
        .with_region(
            Region::MissingSoftOutput,
            RegionState {
                visible: missing_soft,
                content: skill_tags_or(&result.missing_soft, "<p>No missing soft skills</p>"),
            },
        )
        .with_region(
            Region::RecommendationOutput,
            RegionState::shown(learning_summary(result)),
        )
}

fn skill_tags_or(skills: &SkillSet, empty: &str) -> String {
    if skills.is_empty() {
        return empty.to_string();
    }
    skills
        .iter()
        .map(|skill| format!("<span class='skill-tag'>{}</span>", escape_html(skill)))
        .collect()
}

fn learning_summary(result: &AnalysisResult) -> String {
    if result.missing_technical.is_empty() && result.missing_soft.is_empty() {
        return "\n\n**Congratulations! You are a strong candidate for this role!**".to_string();
    }

    let mut text = String::from("### Your Recommended Learning Path\n");
    if !result.missing_technical.is_empty() {
        text.push_str(&format!(
            "- Focus on these technical skills: **{}**.\n",
            result.missing_technical.joined(", ")
        ));
    }
    if !result.missing_soft.is_empty() {
        text.push_str(&format!(
            "- Focus on these soft skills: **{}**.\n",
            result.missing_soft.joined(", ")
        ));
    }
    text.push_str(
        "- We suggest exploring platforms like **Coursera, freeCodeCamp, and Google Skillshop** to master these areas.",
    );
    text
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Single-region workflows (learning path, interview questions)
// ────────────────────────────────────────────────────────────────────────────

pub fn single_region(region: Region, phase: Phase, content: impl Into<String>) -> ViewState {
    ViewState::new(phase).with_region(region, RegionState::shown(content))
}

pub fn learning_path_report(recommendations: &[Recommendation]) -> ViewState {
    let content = if recommendations.is_empty() {
        "No specific recommendations found.".to_string()
    } else {
        let mut output = String::from("### Personalized Learning Path\n");
        for rec in recommendations {
            output.push_str(&format!(
                "- **{}**: {} on {}\n",
                rec.skill, rec.course_name, rec.platform
            ));
        }
        output
    };
    single_region(Region::LearningPathOutput, Phase::Completed, content)
        .with_progress(1.0, "Generation complete!")
}

pub fn interview_questions_report(questions: &[String]) -> ViewState {
    let content = if questions.is_empty() {
        "No questions generated.".to_string()
    } else {
        let mut output = String::from("### Interview Questions\n");
        for (i, question) in questions.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, question));
        }
        output
    };
    single_region(Region::InterviewQuestionsOutput, Phase::Completed, content)
        .with_progress(1.0, "Generation complete!")
}
