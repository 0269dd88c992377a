//! File upload pipeline
//!
//! Admission is synchronous: the batch is checked against the file ceiling,
//! then each file against size and type. Admitted files upload concurrently,
//! one request each. Every state change goes through [`FileUploadPipeline::apply`],
//! so two uploads finishing together cannot lose an update. Files are listed
//! in admission order regardless of which request finishes first.

pub mod transport;

pub use transport::{HttpUploadTransport, TransportError, UploadResponse, UploadTransport};

use crate::config::UploadConfig;
use crate::ids::IdGenerator;
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Core Types
// =============================================================================

/// A file picked by the user, not yet uploaded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileCandidate {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl FileCandidate {
    /// MIME type is guessed from the extension
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self::with_mime(name, mime_type, bytes)
    }

    pub fn with_mime(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn mime_type(&self) -> &str { &self.mime_type }
    pub fn bytes(&self) -> &[u8] { &self.bytes }
    pub fn size(&self) -> u64 { self.bytes.len() as u64 }

    /// Lower-cased extension including the dot
    fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
    }
}

/// A file stored by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Why one file was refused before upload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    TooLarge { size: u64, max: u64 },
    UnsupportedType { mime_type: String },
}

/// Per-file admission rejection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRejection {
    pub name: String,
    pub reason: RejectReason,
}

impl fmt::Display for FileRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            RejectReason::TooLarge { size, max } => write!(
                f,
                "{} is too large ({}); the maximum size is {}",
                self.name,
                format_size(*size),
                format_size(*max)
            ),
            RejectReason::UnsupportedType { mime_type } => {
                write!(f, "{} has an unsupported file type ({})", self.name, mime_type)
            }
        }
    }
}

/// Batch-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Whole batch refused; nothing was added
    #[error("You can attach at most {max} files ({current} attached, {incoming} selected)")]
    TooManyFiles {
        max: usize,
        current: usize,
        incoming: usize,
    },
}

/// Upload that reached the server but failed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileFailure {
    pub seq: u64,
    pub name: String,
    /// User-facing message
    pub message: String,
    /// Transport detail for logs and tooltips
    pub detail: String,
}

/// Lifecycle of one admitted file
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Uploading,
    Uploaded(UploadedFile),
    Failed { message: String, detail: String },
}

#[derive(Clone, Debug)]
struct UploadEntry {
    seq: u64,
    candidate: FileCandidate,
    status: EntryStatus,
}

/// State transition applied by the reducer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadEvent {
    Started { seq: u64 },
    Completed { seq: u64, file: UploadedFile },
    Failed { seq: u64, message: String, detail: String },
}

impl UploadEvent {
    pub fn seq(&self) -> u64 {
        match self {
            UploadEvent::Started { seq }
            | UploadEvent::Completed { seq, .. }
            | UploadEvent::Failed { seq, .. } => *seq,
        }
    }
}

/// Outcome of admission
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchAdmission {
    /// Sequence numbers of admitted files
    pub accepted: Vec<u64>,
    pub rejected: Vec<FileRejection>,
}

/// Outcome of admission plus upload
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub rejected: Vec<FileRejection>,
    /// In admission order
    pub uploaded: Vec<UploadedFile>,
    pub failed: Vec<FileFailure>,
}

/// Aggregate counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub pending: usize,
    pub uploading: usize,
    pub uploaded: usize,
    pub failed: usize,
    /// Settled share of tracked files; 100 when nothing is tracked
    pub percent: u8,
}

impl UploadProgress {
    pub fn total(&self) -> usize {
        self.pending + self.uploading + self.uploaded + self.failed
    }

    pub fn is_idle(&self) -> bool {
        self.pending == 0 && self.uploading == 0
    }
}

// =============================================================================
// Pipeline
// =============================================================================

#[derive(Default)]
struct PipelineState {
    entries: Vec<UploadEntry>,
    next_seq: u64,
}

impl PipelineState {
    /// Files counting against the ceiling: everything except failures
    fn active_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !matches!(e.status, EntryStatus::Failed { .. }))
            .count()
    }

    fn entry_mut(&mut self, seq: u64) -> Option<&mut UploadEntry> {
        self.entries.iter_mut().find(|e| e.seq == seq)
    }
}

/// Bounded, ordered collection of attachments
pub struct FileUploadPipeline {
    config: UploadConfig,
    transport: Arc<dyn UploadTransport>,
    ids: Arc<dyn IdGenerator>,
    state: Mutex<PipelineState>,
}

impl FileUploadPipeline {
    pub fn new(
        config: UploadConfig,
        transport: Arc<dyn UploadTransport>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            config,
            transport,
            ids,
            state: Mutex::new(PipelineState::default()),
        }
    }

    /// Pipeline posting to `config.endpoint` over HTTP
    pub fn http(config: UploadConfig, ids: Arc<dyn IdGenerator>) -> Result<Self, TransportError> {
        let transport = HttpUploadTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport), ids))
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Start with files that already exist on the server (edit forms)
    pub fn seed(&self, files: Vec<UploadedFile>) {
        let mut state = self.state.lock();
        for file in files {
            let seq = state.next_seq;
            state.next_seq += 1;
            let candidate = FileCandidate::with_mime(file.name.clone(), file.mime_type.clone(), Vec::new());
            state.entries.push(UploadEntry {
                seq,
                candidate,
                status: EntryStatus::Uploaded(file),
            });
        }
    }

    /// Uploaded files in admission order
    pub fn files(&self) -> Vec<UploadedFile> {
        self.state
            .lock()
            .entries
            .iter()
            .filter_map(|e| match &e.status {
                EntryStatus::Uploaded(file) => Some(file.clone()),
                _ => None,
            })
            .collect()
    }

    /// Failed uploads still held for retry
    pub fn failures(&self) -> Vec<FileFailure> {
        self.state
            .lock()
            .entries
            .iter()
            .filter_map(|e| match &e.status {
                EntryStatus::Failed { message, detail } => Some(FileFailure {
                    seq: e.seq,
                    name: e.candidate.name.clone(),
                    message: message.clone(),
                    detail: detail.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn status(&self, seq: u64) -> Option<EntryStatus> {
        self.state
            .lock()
            .entries
            .iter()
            .find(|e| e.seq == seq)
            .map(|e| e.status.clone())
    }

    pub fn progress(&self) -> UploadProgress {
        let state = self.state.lock();
        let mut progress = UploadProgress::default();
        for entry in &state.entries {
            match entry.status {
                EntryStatus::Pending => progress.pending += 1,
                EntryStatus::Uploading => progress.uploading += 1,
                EntryStatus::Uploaded(_) => progress.uploaded += 1,
                EntryStatus::Failed { .. } => progress.failed += 1,
            }
        }
        let total = progress.total();
        progress.percent = if total == 0 {
            100
        } else {
            ((progress.uploaded + progress.failed) * 100 / total) as u8
        };
        progress
    }

    /// Admit a batch. Over the ceiling, the whole batch is refused; otherwise
    /// each file is checked on its own and valid ones are queued.
    pub fn enqueue(&self, files: Vec<FileCandidate>) -> Result<BatchAdmission, UploadError> {
        let mut state = self.state.lock();
        let current = state.active_count();
        if current + files.len() > self.config.max_files {
            warn!(
                "Rejecting batch of {} files: {} attached, max {}",
                files.len(),
                current,
                self.config.max_files
            );
            return Err(UploadError::TooManyFiles {
                max: self.config.max_files,
                current,
                incoming: files.len(),
            });
        }

        let mut admission = BatchAdmission::default();
        for candidate in files {
            if let Some(reason) = self.check(&candidate) {
                let rejection = FileRejection {
                    name: candidate.name.clone(),
                    reason,
                };
                debug!("{}", rejection);
                admission.rejected.push(rejection);
                continue;
            }
            let seq = state.next_seq;
            state.next_seq += 1;
            state.entries.push(UploadEntry {
                seq,
                candidate,
                status: EntryStatus::Pending,
            });
            admission.accepted.push(seq);
        }

        info!(
            "Admitted {} files, rejected {}",
            admission.accepted.len(),
            admission.rejected.len()
        );
        Ok(admission)
    }

    fn check(&self, file: &FileCandidate) -> Option<RejectReason> {
        if file.size() > self.config.max_size {
            return Some(RejectReason::TooLarge {
                size: file.size(),
                max: self.config.max_size,
            });
        }
        if !self.is_accepted_type(file) {
            return Some(RejectReason::UnsupportedType {
                mime_type: file.mime_type.clone(),
            });
        }
        None
    }

    fn is_accepted_type(&self, file: &FileCandidate) -> bool {
        if self.config.accept.is_empty() {
            return true;
        }
        let mime = file.mime_type.to_ascii_lowercase();
        let extension = file.extension();
        self.config.accept.iter().any(|pattern| {
            let pattern = pattern.trim().to_ascii_lowercase();
            if pattern.starts_with('.') {
                extension.as_deref() == Some(pattern.as_str())
            } else if let Some(prefix) = pattern.strip_suffix("/*") {
                mime.split_once('/').map(|(top, _)| top) == Some(prefix)
            } else {
                mime == pattern
            }
        })
    }

    /// Reducer; the only place entry state changes after admission
    pub fn apply(&self, event: UploadEvent) {
        let mut state = self.state.lock();
        match event {
            UploadEvent::Started { seq } => {
                if let Some(entry) = state.entry_mut(seq) {
                    entry.status = EntryStatus::Uploading;
                }
            }
            UploadEvent::Completed { seq, file } => {
                if let Some(entry) = state.entry_mut(seq) {
                    entry.status = EntryStatus::Uploaded(file);
                }
            }
            UploadEvent::Failed {
                seq,
                message,
                detail,
            } => {
                if let Some(entry) = state.entry_mut(seq) {
                    entry.status = EntryStatus::Failed { message, detail };
                }
            }
        }
    }

    /// Upload every pending file concurrently; returns the settling events
    /// in admission order
    ///
    /// Entries are claimed (moved to uploading) under the same lock that
    /// collects them, so overlapping calls never send a file twice.
    pub async fn upload_pending(&self) -> Vec<UploadEvent> {
        let batch: Vec<(u64, FileCandidate)> = {
            let mut state = self.state.lock();
            state
                .entries
                .iter_mut()
                .filter(|e| e.status == EntryStatus::Pending)
                .map(|e| {
                    e.status = EntryStatus::Uploading;
                    (e.seq, e.candidate.clone())
                })
                .collect()
        };

        let mut in_flight: FuturesUnordered<_> = batch
            .into_iter()
            .map(|(seq, candidate)| {
                let transport = Arc::clone(&self.transport);
                async move {
                    let result = transport.upload(&candidate).await;
                    (seq, candidate, result)
                }
            })
            .collect();

        let mut settled = Vec::new();
        while let Some((seq, candidate, result)) = in_flight.next().await {
            let event = self.settle(seq, &candidate, result);
            self.apply(event.clone());
            settled.push(event);
        }
        settled.sort_by_key(UploadEvent::seq);
        settled
    }

    fn settle(
        &self,
        seq: u64,
        candidate: &FileCandidate,
        result: Result<UploadResponse, TransportError>,
    ) -> UploadEvent {
        let failed = |detail: String| {
            warn!("Failed to upload {}: {}", candidate.name, detail);
            UploadEvent::Failed {
                seq,
                message: format!("Failed to upload {}", candidate.name),
                detail,
            }
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => return failed(e.to_string()),
        };
        let Some(url) = response.url().map(str::to_owned) else {
            return failed("response carried no url".into());
        };
        let id = response.id().unwrap_or_else(|| self.ids.next_id());

        info!("Uploaded {} as {}", candidate.name, id);
        UploadEvent::Completed {
            seq,
            file: UploadedFile {
                id,
                name: candidate.name.clone(),
                size: candidate.size(),
                mime_type: candidate.mime_type.clone(),
                url,
                uploaded_at: Utc::now(),
            },
        }
    }

    /// Admit and upload in one step
    pub async fn accept(&self, files: Vec<FileCandidate>) -> Result<BatchReport, UploadError> {
        let admission = self.enqueue(files)?;
        let events: Vec<UploadEvent> = self
            .upload_pending()
            .await
            .into_iter()
            .filter(|event| admission.accepted.contains(&event.seq()))
            .collect();

        let mut report = BatchReport {
            rejected: admission.rejected,
            ..Default::default()
        };
        let state_names: Vec<(u64, String)> = {
            let state = self.state.lock();
            state
                .entries
                .iter()
                .map(|e| (e.seq, e.candidate.name.clone()))
                .collect()
        };
        for event in events {
            match event {
                UploadEvent::Completed { file, .. } => report.uploaded.push(file),
                UploadEvent::Failed {
                    seq,
                    message,
                    detail,
                } => {
                    let name = state_names
                        .iter()
                        .find(|(s, _)| *s == seq)
                        .map(|(_, n)| n.clone())
                        .unwrap_or_default();
                    report.failed.push(FileFailure {
                        seq,
                        name,
                        message,
                        detail,
                    });
                }
                UploadEvent::Started { .. } => {}
            }
        }
        Ok(report)
    }

    /// Re-queue failed files and upload them again
    pub async fn retry_failed(&self) -> Result<Vec<UploadEvent>, UploadError> {
        {
            let mut state = self.state.lock();
            let active = state.active_count();
            let failed = state.entries.len() - active;
            if active + failed > self.config.max_files {
                return Err(UploadError::TooManyFiles {
                    max: self.config.max_files,
                    current: active,
                    incoming: failed,
                });
            }
            for entry in state.entries.iter_mut() {
                if matches!(entry.status, EntryStatus::Failed { .. }) {
                    entry.status = EntryStatus::Pending;
                }
            }
        }
        Ok(self.upload_pending().await)
    }

    /// Drop failed entries
    pub fn dismiss_failed(&self) -> usize {
        let mut state = self.state.lock();
        let before = state.entries.len();
        state
            .entries
            .retain(|e| !matches!(e.status, EntryStatus::Failed { .. }));
        before - state.entries.len()
    }

    /// Remove an uploaded file from the list. Local only; the server copy stays.
    pub fn remove(&self, id: &str) -> Option<UploadedFile> {
        let mut state = self.state.lock();
        let index = state
            .entries
            .iter()
            .position(|e| matches!(&e.status, EntryStatus::Uploaded(f) if f.id == id))?;
        match state.entries.remove(index).status {
            EntryStatus::Uploaded(file) => Some(file),
            _ => None,
        }
    }
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// In-memory backend: per-file delay and failure switches
    #[derive(Default)]
    struct FakeBackend {
        delays_ms: HashMap<String, u64>,
        failing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn delay(mut self, name: &str, ms: u64) -> Self {
            self.delays_ms.insert(name.into(), ms);
            self
        }

        fn fail(mut self, name: &str) -> Self {
            self.failing.push(name.into());
            self
        }
    }

    #[async_trait]
    impl UploadTransport for FakeBackend {
        async fn upload(&self, file: &FileCandidate) -> Result<UploadResponse, TransportError> {
            self.calls.lock().push(file.name().to_string());
            if let Some(ms) = self.delays_ms.get(file.name()) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.failing.iter().any(|n| n == file.name()) {
                return Err(TransportError::Status(502));
            }
            Ok(UploadResponse {
                id: None,
                url: None,
                file_url: Some(format!("https://files.example.com/{}", file.name())),
            })
        }
    }

    fn pipeline(max_files: usize, backend: FakeBackend) -> (FileUploadPipeline, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        let config = UploadConfig {
            max_files,
            max_size: 1024,
            accept: vec!["image/*".into(), ".pdf".into()],
            ..Default::default()
        };
        let pipeline = FileUploadPipeline::new(
            config,
            backend.clone(),
            Arc::new(SequentialIds::new("file")),
        );
        (pipeline, backend)
    }

    fn png(name: &str) -> FileCandidate {
        FileCandidate::new(name, vec![0u8; 100])
    }

    #[tokio::test]
    async fn test_batch_over_ceiling_rejected_entirely() {
        let (pipeline, backend) = pipeline(3, FakeBackend::default());
        pipeline.accept(vec![png("a.png"), png("b.png")]).await.unwrap();
        assert_eq!(pipeline.files().len(), 2);

        let err = pipeline
            .accept(vec![png("c.png"), png("d.png")])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            UploadError::TooManyFiles {
                max: 3,
                current: 2,
                incoming: 2
            }
        );
        assert_eq!(pipeline.files().len(), 2);
        assert_eq!(backend.calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_batch_within_ceiling_uploads_each() {
        let (pipeline, backend) = pipeline(3, FakeBackend::default());
        pipeline.accept(vec![png("a.png")]).await.unwrap();

        let report = pipeline
            .accept(vec![png("b.png"), png("c.png")])
            .await
            .unwrap();
        assert_eq!(report.uploaded.len(), 2);
        assert_eq!(pipeline.files().len(), 3);
        assert_eq!(backend.calls.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_sibling_uploads() {
        let (pipeline, _) = pipeline(5, FakeBackend::default());
        let big = FileCandidate::new("scan.pdf", vec![0u8; 4096]);
        let report = pipeline.accept(vec![big, png("ok.png")]).await.unwrap();

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::TooLarge {
                size: 4096,
                max: 1024
            }
        );
        assert_eq!(
            report.rejected[0].to_string(),
            "scan.pdf is too large (4.0 KB); the maximum size is 1.0 KB"
        );
        assert_eq!(pipeline.files().len(), 1);
        assert_eq!(pipeline.files()[0].name, "ok.png");
    }

    #[tokio::test]
    async fn test_unsupported_type_rejected() {
        let (pipeline, _) = pipeline(5, FakeBackend::default());
        let report = pipeline
            .accept(vec![FileCandidate::new("notes.txt", b"hi".to_vec()), png("ok.png")])
            .await
            .unwrap();
        assert_eq!(
            report.rejected[0].reason,
            RejectReason::UnsupportedType {
                mime_type: "text/plain".into()
            }
        );
        assert_eq!(report.uploaded.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_isolated() {
        let (pipeline, _) = pipeline(5, FakeBackend::default().fail("bad.png"));
        let report = pipeline
            .accept(vec![png("good.png"), png("bad.png")])
            .await
            .unwrap();
        assert_eq!(report.uploaded.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].message, "Failed to upload bad.png");
        assert_eq!(pipeline.files()[0].name, "good.png");
        assert_eq!(pipeline.failures().len(), 1);
    }

    #[tokio::test]
    async fn test_submission_order_not_completion_order() {
        let backend = FakeBackend::default().delay("first.png", 40).delay("second.png", 5);
        let (pipeline, _) = pipeline(5, backend);
        pipeline
            .accept(vec![png("first.png"), png("second.png"), png("third.png")])
            .await
            .unwrap();
        let names: Vec<_> = pipeline.files().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["first.png", "second.png", "third.png"]);
    }

    #[tokio::test]
    async fn test_uploads_run_concurrently() {
        let backend = FakeBackend::default()
            .delay("a.png", 60)
            .delay("b.png", 60)
            .delay("c.png", 60);
        let (pipeline, _) = pipeline(5, backend);
        let started = std::time::Instant::now();
        pipeline
            .accept(vec![png("a.png"), png("b.png"), png("c.png")])
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_millis(170));
    }

    #[tokio::test]
    async fn test_overlapping_upload_calls_send_each_file_once() {
        let backend = FakeBackend::default()
            .delay("a.png", 40)
            .delay("b.png", 40);
        let (pipeline, backend) = pipeline(5, backend);
        pipeline.enqueue(vec![png("a.png"), png("b.png")]).unwrap();

        let (first, second) = tokio::join!(pipeline.upload_pending(), pipeline.upload_pending());
        assert_eq!(first.len() + second.len(), 2);

        let mut calls = backend.calls.lock().clone();
        calls.sort();
        assert_eq!(calls, vec!["a.png", "b.png"]);
        assert_eq!(pipeline.progress().uploaded, 2);
    }

    #[tokio::test]
    async fn test_accept_reports_only_its_own_batch() {
        let (pipeline, backend) = pipeline(5, FakeBackend::default().fail("queued.png"));
        pipeline.enqueue(vec![png("queued.png")]).unwrap();

        let report = pipeline.accept(vec![png("new.png")]).await.unwrap();
        let names: Vec<_> = report.uploaded.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["new.png"]);
        assert!(report.failed.is_empty());

        // The earlier queued file still went out and settled
        assert_eq!(backend.calls.lock().len(), 2);
        assert_eq!(pipeline.progress().failed, 1);
    }

    #[tokio::test]
    async fn test_fallback_ids_are_generated() {
        let (pipeline, _) = pipeline(5, FakeBackend::default());
        pipeline.accept(vec![png("a.png"), png("b.png")]).await.unwrap();
        let ids: Vec<_> = pipeline.files().into_iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|id| id.starts_with("file-")));
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn test_remove_is_local() {
        let (pipeline, backend) = pipeline(5, FakeBackend::default());
        pipeline.accept(vec![png("a.png"), png("b.png")]).await.unwrap();
        let first = pipeline.files()[0].clone();

        assert_eq!(pipeline.remove(&first.id), Some(first));
        assert_eq!(pipeline.files().len(), 1);
        assert_eq!(pipeline.remove("missing"), None);
        assert_eq!(backend.calls.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_progress_and_retry() {
        let (pipeline, _) = pipeline(5, FakeBackend::default().fail("bad.png"));
        let admission = pipeline.enqueue(vec![png("a.png"), png("bad.png")]).unwrap();
        assert_eq!(admission.accepted.len(), 2);

        let progress = pipeline.progress();
        assert_eq!(progress.pending, 2);
        assert_eq!(progress.percent, 0);
        assert!(!progress.is_idle());

        pipeline.upload_pending().await;
        let progress = pipeline.progress();
        assert_eq!((progress.uploaded, progress.failed), (1, 1));
        assert_eq!(progress.percent, 100);

        let events = pipeline.retry_failed().await.unwrap();
        assert!(matches!(events[0], UploadEvent::Failed { .. }));
        assert_eq!(pipeline.dismiss_failed(), 1);
        assert_eq!(pipeline.progress().total(), 1);
    }

    #[test]
    fn test_reducer_ignores_unknown_seq() {
        let (pipeline, _) = pipeline(5, FakeBackend::default());
        pipeline.apply(UploadEvent::Started { seq: 99 });
        assert_eq!(pipeline.progress().total(), 0);
        assert_eq!(pipeline.progress().percent, 100);
    }

    #[test]
    fn test_seeded_files_count_against_ceiling() {
        let (pipeline, _) = pipeline(1, FakeBackend::default());
        pipeline.seed(vec![UploadedFile {
            id: "existing".into(),
            name: "licence.pdf".into(),
            size: 10,
            mime_type: "application/pdf".into(),
            url: "https://files.example.com/licence.pdf".into(),
            uploaded_at: Utc::now(),
        }]);
        assert!(pipeline.enqueue(vec![png("a.png")]).is_err());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(10 * 1024 * 1024), "10.0 MB");
    }

    #[tokio::test]
    async fn test_http_pipeline_end_to_end() {
        use serde_json::json;
        use wiremock::matchers::{body_string_contains, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        crate::test_support::init_test_tracing();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("broken.pdf"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "srv-1",
                "url": "https://files.example.com/ok.pdf"
            })))
            .mount(&server)
            .await;

        let config = UploadConfig {
            endpoint: format!("{}/api/uploads", server.uri()),
            ..Default::default()
        };
        let pipeline =
            FileUploadPipeline::http(config, Arc::new(SequentialIds::new("local"))).unwrap();
        let report = pipeline
            .accept(vec![
                FileCandidate::new("ok.pdf", b"%PDF-1.4 ok".to_vec()),
                FileCandidate::new("broken.pdf", b"%PDF-1.4 broken".to_vec()),
            ])
            .await
            .unwrap();

        assert_eq!(report.uploaded.len(), 1);
        assert_eq!(report.uploaded[0].id, "srv-1");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].name, "broken.pdf");
        assert!(report.failed[0].detail.contains("500"));
    }
}
