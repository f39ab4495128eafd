//! Persistence gateway for problem sessions and submissions.
//!
//! `SessionStore` is the seam the service layer talks to. `MemoryStore` keeps
//! everything in memory and, when given a path, mirrors it to a JSON snapshot
//! after every insert so history survives restarts.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::domain::{GradedAttempt, ProblemSession, SessionRecord, Submission};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session '{0}' not found")]
    NotFound(String),
    #[error("snapshot io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: SessionRecord) -> Result<(), StoreError>;

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Fails with `NotFound` when the referenced session does not exist.
    /// Does not reject a second submission for the same session.
    async fn insert_submission(&self, submission: Submission) -> Result<(), StoreError>;

    /// Newest first, each with its first submission if any.
    async fn recent_sessions(&self, limit: usize) -> Result<Vec<ProblemSession>, StoreError>;

    /// Every submission with its session's difficulty, oldest first.
    async fn graded_attempts(&self) -> Result<Vec<GradedAttempt>, StoreError>;
}

#[derive(Default, Serialize, Deserialize)]
struct Snapshot {
    sessions: Vec<SessionRecord>,
    submissions: Vec<Submission>,
}

#[derive(Default)]
struct Inner {
    data: Snapshot,
    by_id: HashMap<String, usize>,
}

impl Inner {
    fn from_snapshot(data: Snapshot) -> Self {
        let by_id = data
            .sessions
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self { data, by_id }
    }

    fn session(&self, id: &str) -> Option<&SessionRecord> {
        self.by_id.get(id).map(|&i| &self.data.sessions[i])
    }
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Purely in-memory store.
    pub fn new() -> Self {
        Self { inner: RwLock::new(Inner::default()), snapshot_path: None }
    }

    /// Store mirrored to `path`. A missing file starts empty.
    #[instrument(level = "info", skip(path), fields(path = %path.display()))]
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let data = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice::<Snapshot>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::default(),
            Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
        };
        info!(target: "p5math_backend", sessions = data.sessions.len(), submissions = data.submissions.len(), "Loaded store snapshot");
        Ok(Self {
            inner: RwLock::new(Inner::from_snapshot(data)),
            snapshot_path: Some(path.to_path_buf()),
        })
    }

    async fn persist(&self, inner: &Inner) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else { return Ok(()) };
        let bytes = serde_json::to_vec(&inner.data)?;
        let tmp = path.with_extension("tmp");
        let io_err = |source| StoreError::Io { path: path.clone(), source };
        tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        debug!(target: "p5math_backend", bytes = bytes.len(), "Snapshot written");
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    #[instrument(level = "debug", skip(self, session), fields(id = %session.id))]
    async fn insert_session(&self, session: SessionRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let id = session.id.clone();
        inner.data.sessions.push(session);
        let idx = inner.data.sessions.len() - 1;
        inner.by_id.insert(id.clone(), idx);

        // Keep memory and snapshot in agreement.
        let persisted = self.persist(&inner).await;
        if let Err(e) = persisted {
            inner.data.sessions.pop();
            inner.by_id.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.inner.read().await.session(id).cloned())
    }

    #[instrument(level = "debug", skip(self, submission), fields(session_id = %submission.session_id))]
    async fn insert_submission(&self, submission: Submission) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.session(&submission.session_id).is_none() {
            return Err(StoreError::NotFound(submission.session_id));
        }
        inner.data.submissions.push(submission);

        let persisted = self.persist(&inner).await;
        if let Err(e) = persisted {
            inner.data.submissions.pop();
            return Err(e);
        }
        Ok(())
    }

    async fn recent_sessions(&self, limit: usize) -> Result<Vec<ProblemSession>, StoreError> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<&SessionRecord> = inner.data.sessions.iter().rev().collect();
        // Stable: equal timestamps keep newest-inserted first.
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(sessions
            .into_iter()
            .take(limit)
            .map(|s| {
                let sub = inner.data.submissions.iter().find(|x| x.session_id == s.id);
                ProblemSession::from_parts(s, sub)
            })
            .collect())
    }

    async fn graded_attempts(&self) -> Result<Vec<GradedAttempt>, StoreError> {
        let inner = self.inner.read().await;
        let mut attempts: Vec<GradedAttempt> = inner
            .data
            .submissions
            .iter()
            .filter_map(|sub| {
                inner.session(&sub.session_id).map(|s| GradedAttempt {
                    created_at: sub.created_at,
                    is_correct: sub.is_correct,
                    difficulty: s.problem.difficulty,
                })
            })
            .collect();
        attempts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(attempts)
    }
}
