use chrono::{DateTime, Utc};
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::extract::Extraction;

const MAX_SESSIONS: u64 = 10_000;

/// One scanning session. Holds at most one uploaded resume; a later upload
/// replaces the earlier one.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub resume: Option<ResumeDoc>,
}

#[derive(Debug, Clone)]
pub struct ResumeDoc {
    pub filename: String,
    /// SHA-256 of the uploaded bytes, hex encoded.
    pub fingerprint: String,
    pub uploaded_at: DateTime<Utc>,
    pub extraction: Arc<Extraction>,
}

/// In-memory session store. Sessions expire after sitting idle; any read
/// or write refreshes the idle clock.
pub struct SessionStore {
    sessions: Cache<Uuid, Session>,
}

impl SessionStore {
    pub fn new(idle: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_idle(idle)
                .build(),
        }
    }

    pub fn create(&self) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            resume: None,
        };
        self.sessions.insert(session.id, session.clone());
        session
    }

    pub fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.get(&id)
    }

    /// Attach (or replace) the resume on an existing session. Concurrent
    /// uploads to the same session resolve last-write-wins.
    pub fn attach_resume(&self, id: Uuid, resume: ResumeDoc) -> Option<Session> {
        let mut session = self.sessions.get(&id)?;
        session.resume = Some(resume);
        self.sessions.insert(id, session.clone());
        Some(session)
    }
}
