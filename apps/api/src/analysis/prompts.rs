// All oracle prompt templates for the analysis workflows.
// Placeholders are `{name}`; fill them with `fill_template`, never `str::replace`,
// so text pasted by the user cannot inject further placeholders.

/// Number of interview questions requested per job description.
pub const INTERVIEW_QUESTION_COUNT: usize = 3;

/// Job-skill extraction. Replace: {job_description}
pub const JOB_SKILLS_PROMPT: &str = r#"Analyze the following job description and identify the required technical and soft skills.
Return a JSON object with two lists: `required_technical_skills` and `required_soft_skills`.
Respond with the JSON object only.
Job Description: {job_description}"#;

/// CV skill matching. Replace: {technical_skills}, {soft_skills}, {cv_text}
pub const CV_MATCH_PROMPT: &str = r#"Analyze the following CV text and identify which of these technical skills ({technical_skills})
and soft skills ({soft_skills}) are present. Return a JSON object with two lists:
`matched_technical_skills` and `matched_soft_skills`.
Only use skill names exactly as they appear in the lists above.
CV Text: {cv_text}"#;

/// Learning-path recommendations. Replace: {skills}
pub const LEARNING_PATH_PROMPT: &str = r#"For the following missing skills: {skills}, suggest specific online courses or resources
from platforms like Coursera, freeCodeCamp, or Google Skillshop. Return a JSON object with a list
`recommendations`, each containing `skill`, `platform`, and `course_name`."#;

/// Interview questions. Replace: {count}, {job_description}
pub const INTERVIEW_QUESTIONS_PROMPT: &str = r#"Based on the following job description, generate {count} relevant interview questions for the role.
Return a JSON object with a list `questions` of strings.
Job Description: {job_description}"#;

/// A template together with the values it needs.
#[derive(Debug, Clone, Copy)]
pub enum Prompt<'a> {
    JobSkills {
        job_description: &'a str,
    },
    CvMatch {
        technical_skills: &'a str,
        soft_skills: &'a str,
        cv_text: &'a str,
    },
    LearningPath {
        skills: &'a [String],
    },
    InterviewQuestions {
        job_description: &'a str,
        count: usize,
    },
}

impl Prompt<'_> {
    pub fn render(&self) -> String {
        match *self {
            Prompt::JobSkills { job_description } => {
                fill_template(JOB_SKILLS_PROMPT, &[("job_description", job_description)])
            }
            Prompt::CvMatch {
                technical_skills,
                soft_skills,
                cv_text,
            } => fill_template(
                CV_MATCH_PROMPT,
                &[
                    ("technical_skills", technical_skills),
                    ("soft_skills", soft_skills),
                    ("cv_text", cv_text),
                ],
            ),
            Prompt::LearningPath { skills } => {
                let skills = skills.join(", ");
                fill_template(LEARNING_PATH_PROMPT, &[("skills", skills.as_str())])
            }
            Prompt::InterviewQuestions {
                job_description,
                count,
            } => {
                let count = count.to_string();
                fill_template(
                    INTERVIEW_QUESTIONS_PROMPT,
                    &[
                        ("count", count.as_str()),
                        ("job_description", job_description),
                    ],
                )
            }
        }
    }
}

/// Single-pass `{name}` substitution. Unknown placeholders are left verbatim and
/// substituted values are never re-scanned.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replacement = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match replacement {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
