//! Shared helpers for unit and router tests: stub chat backends, a tiny
//! in-memory PDF generator and multipart body assembly.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::llm_client::{ChatBackend, CompletionRequest, LlmError};
use crate::session::SessionStore;
use crate::state::AppState;

pub const MULTIPART_BOUNDARY: &str = "ats-test-boundary";

pub fn test_config() -> Config {
    Config {
        groq_api_key: "test-key".to_string(),
        port: 0,
        rust_log: "info".to_string(),
        cache_capacity: 64,
        cache_ttl_secs: None,
        session_idle_secs: 60,
        max_upload_bytes: 1024 * 1024,
    }
}

pub fn test_state(backend: Arc<dyn ChatBackend>) -> AppState {
    let config = test_config();
    AppState {
        backend,
        responses: Arc::new(ResponseCache::new(config.cache_capacity, None)),
        sessions: Arc::new(SessionStore::new(Duration::from_secs(
            config.session_idle_secs,
        ))),
        config,
    }
}

// ── stub backends ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Chat backend that always answers with a fixed reply and records every
/// request it receives.
pub struct ScriptedBackend {
    reply: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedBackend {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, req: CompletionRequest<'_>) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: req.system.to_string(),
            prompt: req.prompt.to_string(),
            temperature: req.temperature,
        });
        Ok(self.reply.clone())
    }
}

/// Chat backend that fails every call.
pub struct FailingBackend {
    calls: AtomicUsize,
}

impl FailingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for FailingBackend {
    async fn complete(&self, _req: CompletionRequest<'_>) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::Api {
            status: 500,
            message: "backend exploded".to_string(),
        })
    }
}

// ── PDF and multipart fixtures ───────────────────────────────────────────────

pub fn minimal_pdf(text: &str) -> Vec<u8> {
    minimal_pdf_with_pages(&[text])
}

/// Build a small but structurally valid PDF with one Helvetica text line
/// per page. Offsets in the xref table are computed, not hardcoded, so the
/// output survives strict parsers.
pub fn minimal_pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    assert!(!pages.is_empty(), "a PDF needs at least one page");

    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    for (i, text) in pages.iter().enumerate() {
        let content_num = 5 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {content_num} 0 R >>"
        ));
        let stream = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", escape_pdf_string(text));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in &offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    out.into_bytes()
}

fn escape_pdf_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn multipart_pdf_body(filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"resume\"; filename=\"{filename}\"\r\n\
             Content-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
