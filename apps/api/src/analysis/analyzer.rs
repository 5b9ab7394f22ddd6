use serde::Deserialize;
use std::sync::Arc;

use crate::analysis::keywords::{self, KeywordReport};
use crate::analysis::prompts;
use crate::cache::ResponseCache;
use crate::errors::AppError;
use crate::llm_client::{ChatBackend, CompletionRequest, LlmError};

/// The three analyses a client can trigger. Wire names are snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisAction {
    Review,
    Keywords,
    PercentageMatch,
}

impl AnalysisAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisAction::Review => "review",
            AnalysisAction::Keywords => "keywords",
            AnalysisAction::PercentageMatch => "percentage_match",
        }
    }

    /// Section heading shown above the rendered result.
    pub fn heading(self) -> &'static str {
        match self {
            AnalysisAction::Review => "Resume Evaluation",
            AnalysisAction::Keywords => "Extracted Skills",
            AnalysisAction::PercentageMatch => "ATS Match Result",
        }
    }

    fn template(self) -> &'static str {
        match self {
            AnalysisAction::Review => prompts::REVIEW_TEMPLATE,
            AnalysisAction::Keywords => prompts::KEYWORDS_TEMPLATE,
            AnalysisAction::PercentageMatch => prompts::PERCENTAGE_TEMPLATE,
        }
    }
}

/// Result of one analysis run, ready for the response layer.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub rendered: String,
    pub keywords: Option<KeywordReport>,
}

/// Run one analysis action against the resume and job description.
///
/// Every call goes through the response cache keyed on the exact
/// (template, resume, job description) tuple, so repeating a trigger with
/// unchanged inputs never reaches the backend a second time. Keyword
/// reports are cached after the fail-soft parse; backend failures are
/// returned and never cached.
pub async fn run(
    backend: &dyn ChatBackend,
    cache: &ResponseCache,
    action: AnalysisAction,
    resume_text: &str,
    job_description: &str,
) -> Result<AnalysisOutcome, AppError> {
    let template = action.template();
    let parts = [template, resume_text, job_description];

    match action {
        AnalysisAction::Keywords => {
            let prompt = prompts::compose_json(template, resume_text, job_description);
            let key = ResponseCache::keywords_key(&parts);
            let report = cache
                .keyword_report(key, async {
                    let raw = backend
                        .complete(CompletionRequest {
                            system: prompts::KEYWORD_SYSTEM,
                            prompt: &prompt,
                            temperature: prompts::KEYWORD_TEMPERATURE,
                        })
                        .await?;
                    Ok(Arc::new(keywords::parse_report(&raw)))
                })
                .await
                .map_err(backend_error)?;

            Ok(AnalysisOutcome {
                rendered: report.render(),
                keywords: Some((*report).clone()),
            })
        }
        AnalysisAction::Review | AnalysisAction::PercentageMatch => {
            let prompt = prompts::compose(template, resume_text, job_description);
            let key = ResponseCache::completion_key(&parts);
            let text = cache
                .completion(key, async {
                    let raw = backend
                        .complete(CompletionRequest {
                            system: prompts::EVALUATOR_SYSTEM,
                            prompt: &prompt,
                            temperature: prompts::FREE_TEXT_TEMPERATURE,
                        })
                        .await?;
                    Ok(Arc::new(raw))
                })
                .await
                .map_err(backend_error)?;

            Ok(AnalysisOutcome {
                rendered: (*text).clone(),
                keywords: None,
            })
        }
    }
}

fn backend_error(err: Arc<LlmError>) -> AppError {
    AppError::Llm(err.to_string())
}
