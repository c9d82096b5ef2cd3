//! Skill Matcher — set difference and match score between required and matched skills.
//!
//! Pure and deterministic; no oracle calls.
//!
//! missing_* = required_* − matched_* (exact string equality)
//! match_score = 100 × (|matched_technical| + |matched_soft|) / (|required_technical| + |required_soft|)

use crate::models::analysis::{AnalysisResult, SkillSet};

pub fn match_skills(
    required_technical: &SkillSet,
    required_soft: &SkillSet,
    matched_technical: &SkillSet,
    matched_soft: &SkillSet,
) -> AnalysisResult {
    AnalysisResult {
        matched_technical: matched_technical.clone(),
        matched_soft: matched_soft.clone(),
        missing_technical: required_technical.difference(matched_technical),
        missing_soft: required_soft.difference(matched_soft),
        match_score: match_score(
            required_technical.len() + required_soft.len(),
            matched_technical.len() + matched_soft.len(),
        ),
    }
}

/// 0 when nothing is required. Clamped to 100 because the oracle can report
/// matches that were never asked for.
fn match_score(total_required: usize, total_matched: usize) -> f64 {
    if total_required == 0 {
        return 0.0;
    }
    let score = total_matched as f64 / total_required as f64 * 100.0;
    score.clamp(0.0, 100.0)
}
