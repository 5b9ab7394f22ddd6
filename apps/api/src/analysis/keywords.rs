use serde::{Deserialize, Serialize};

use crate::llm_client::strip_json_fences;

/// Structured keyword report with the three fixed ATS categories.
///
/// Every category is always present. Serde defaults fill in categories the
/// model left out, so consumers never have to handle a missing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordReport {
    #[serde(rename = "Technical Skills", default)]
    pub technical_skills: Vec<String>,
    #[serde(rename = "Analytical Skills", default)]
    pub analytical_skills: Vec<String>,
    #[serde(rename = "Soft Skills", default)]
    pub soft_skills: Vec<String>,
}

impl KeywordReport {
    pub fn empty() -> Self {
        Self {
            technical_skills: Vec::new(),
            analytical_skills: Vec::new(),
            soft_skills: Vec::new(),
        }
    }

    /// Three labeled lines with comma-joined values, the shape shown to
    /// the client.
    pub fn render(&self) -> String {
        format!(
            "Technical Skills: {}\nAnalytical Skills: {}\nSoft Skills: {}",
            self.technical_skills.join(", "),
            self.analytical_skills.join(", "),
            self.soft_skills.join(", "),
        )
    }
}

/// Parse the model's keyword response. Markdown fences are stripped first.
/// A JSON parse failure degrades to the empty report; transport and
/// provider errors never reach this function and are not masked by it.
pub fn parse_report(raw: &str) -> KeywordReport {
    match serde_json::from_str::<KeywordReport>(strip_json_fences(raw)) {
        Ok(report) => report,
        Err(err) => {
            tracing::warn!("Keyword response was not valid JSON, returning empty report: {err}");
            KeywordReport::empty()
        }
    }
}
