use axum::extract::{Multipart, Path, State};
use axum::Json;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::analysis::analyzer::{self, AnalysisAction};
use crate::analysis::keywords::KeywordReport;
use crate::cache::{self, ResponseCache};
use crate::errors::AppError;
use crate::extract;
use crate::session::{ResumeDoc, Session};
use crate::state::AppState;

// ── request / response shapes ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub state: &'static str,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<ResumeView>,
}

#[derive(Serialize)]
pub struct ResumeView {
    pub filename: String,
    pub fingerprint: String,
    pub page_count: usize,
    pub characters: usize,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub filename: String,
    pub page_count: usize,
    pub characters: usize,
    pub message: &'static str,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub action: AnalysisAction,
    pub job_description: String,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub action: &'static str,
    pub heading: &'static str,
    pub rendered: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<KeywordReport>,
}

// ── handlers ─────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(State(state): State<AppState>) -> Json<SessionCreated> {
    let session = state.sessions.create();
    info!("Created session {}", session.id);
    Json(SessionCreated {
        session_id: session.id,
        created_at: session.created_at,
    })
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).ok_or_else(|| not_found(id))?;
    Ok(Json(session_view(session)))
}

/// POST /api/v1/sessions/:id/resume
///
/// Multipart upload, field `resume`. Extracts the PDF text (cached by
/// content fingerprint) and stores it in the session's resume slot.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    if state.sessions.get(id).is_none() {
        return Err(not_found(id));
    }

    let (filename, bytes) = read_resume_field(&mut multipart).await?;
    let fingerprint = cache::fingerprint(&bytes);

    let key = ResponseCache::extraction_key(&fingerprint);
    let extraction = state
        .responses
        .extraction(key, async move {
            extract::extract_pdf(bytes).await.map(Arc::new)
        })
        .await
        .map_err(|err| AppError::DocumentDecode(err.to_string()))?;

    let doc = ResumeDoc {
        filename: filename.clone(),
        fingerprint,
        uploaded_at: Utc::now(),
        extraction: extraction.clone(),
    };
    // The session can expire between the check above and here; treat that
    // the same as an unknown id.
    state
        .sessions
        .attach_resume(id, doc)
        .ok_or_else(|| not_found(id))?;

    info!(
        "Resume '{}' uploaded to session {} ({} pages)",
        filename,
        id,
        extraction.page_count()
    );
    Ok(Json(UploadResponse {
        session_id: id,
        filename,
        page_count: extraction.page_count(),
        characters: extraction.text().chars().count(),
        message: "PDF Uploaded Successfully",
    }))
}

/// POST /api/v1/sessions/:id/analyze
///
/// Runs one analysis action against the stored resume and the given
/// job description. Fails with 409 when no resume has been uploaded.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let job_description = req.job_description.trim();
    if job_description.is_empty() {
        return Err(AppError::Validation(
            "job_description must not be empty".into(),
        ));
    }

    let session = state.sessions.get(id).ok_or_else(|| not_found(id))?;
    let Some(resume) = session.resume else {
        return Err(AppError::MissingResume);
    };

    let resume_text = resume.extraction.text();
    let outcome = analyzer::run(
        state.backend.as_ref(),
        &state.responses,
        req.action,
        &resume_text,
        job_description,
    )
    .await?;

    info!("Served {} analysis for session {}", req.action.as_str(), id);
    Ok(Json(AnalyzeResponse {
        action: req.action.as_str(),
        heading: req.action.heading(),
        rendered: outcome.rendered,
        keywords: outcome.keywords,
    }))
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("session {id} not found or expired"))
}

fn session_view(session: Session) -> SessionView {
    let resume = session.resume.as_ref().map(|doc| ResumeView {
        filename: doc.filename.clone(),
        fingerprint: doc.fingerprint.clone(),
        page_count: doc.extraction.page_count(),
        characters: doc.extraction.text().chars().count(),
        uploaded_at: doc.uploaded_at,
    });
    SessionView {
        session_id: session.id,
        state: if resume.is_some() {
            "resume_loaded"
        } else {
            "no_resume"
        },
        created_at: session.created_at,
        resume,
    }
}

async fn read_resume_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("malformed multipart body: {err}")))?
    {
        if field.name() != Some("resume") {
            continue;
        }
        let filename = field.file_name().unwrap_or("resume.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::Validation(format!("could not read upload: {err}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".into()));
        }
        return Ok((filename, bytes));
    }
    Err(AppError::Validation(
        "multipart field 'resume' is required".into(),
    ))
}
