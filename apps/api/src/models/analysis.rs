use std::collections::BTreeSet;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Free-text skill names exactly as the oracle produced them.
///
/// Deduplication is case-sensitive with no normalization; "SQL" and "sql" are
/// distinct skills. Iteration is in sorted order so rendered output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Skills in `self` that are not in `other`, by exact string equality.
    pub fn difference(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.difference(&other.0).cloned().collect())
    }

    /// Comma-separated rendering used inside prompts and summaries.
    pub fn joined(&self, separator: &str) -> String {
        self.iter().collect::<Vec<_>>().join(separator)
    }
}

impl<S: Into<String>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SkillSet(iter.into_iter().map(Into::into).collect())
    }
}

/// A file uploaded by the user, asserted (but not yet verified) to be a PDF.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

/// Input to the benchmark workflow. Lives for exactly one request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub document: Option<UploadedDocument>,
    pub job_description: String,
}

/// Outcome of matching a CV against a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub matched_technical: SkillSet,
    pub matched_soft: SkillSet,
    pub missing_technical: SkillSet,
    pub missing_soft: SkillSet,
    /// Percentage in [0, 100].
    pub match_score: f64,
}

/// One suggested learning resource for a missing skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub skill: String,
    pub platform: String,
    pub course_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_set_dedup_is_case_sensitive() {
        let set: SkillSet = ["SQL", "sql", "SQL"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("SQL"));
        assert!(set.contains("sql"));
    }

    #[test]
    fn test_skill_set_iterates_sorted() {
        let set: SkillSet = ["Python", "Docker", "SQL"].into_iter().collect();
        assert_eq!(set.joined(", "), "Docker, Python, SQL");
    }

    #[test]
    fn test_skill_set_serializes_as_array() {
        let set: SkillSet = ["b", "a"].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a","b"]"#);
    }
}
