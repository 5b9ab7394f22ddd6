//! Prompt templates and assembly for the three analysis tasks.

pub const EVALUATOR_SYSTEM: &str = "You are an expert ATS resume evaluator.";
pub const KEYWORD_SYSTEM: &str = "You are an ATS keyword extraction engine.";

pub const FREE_TEXT_TEMPERATURE: f32 = 0.2;
pub const KEYWORD_TEMPERATURE: f32 = 0.1;

pub const REVIEW_TEMPLATE: &str = "You are a Technical Human Resource Manager.
Review the resume against the job description.
Highlight strengths and weaknesses.";

pub const KEYWORDS_TEMPLATE: &str = r#"You are an ATS scanner.
Extract required skills strictly from the job description.
Respond ONLY in JSON format:
{
  "Technical Skills": [],
  "Analytical Skills": [],
  "Soft Skills": []
}"#;

pub const PERCENTAGE_TEMPLATE: &str = "You are an ATS system.
Evaluate resume vs job description.
Return:
1. Match percentage
2. Missing keywords
3. Final thoughts";

/// Assemble the user prompt. Pure and deterministic: equal inputs yield a
/// byte-identical string.
pub fn compose(template: &str, resume_text: &str, job_description: &str) -> String {
    format!("{template}\n\nRESUME:\n{resume_text}\n\nJOB DESCRIPTION:\n{job_description}")
}

/// Keyword-task variant. The trailing instruction keeps the model from
/// wrapping its JSON in prose.
pub fn compose_json(template: &str, resume_text: &str, job_description: &str) -> String {
    format!(
        "{}\n\nReturn ONLY valid JSON.",
        compose(template, resume_text, job_description)
    )
}
