//! Session state machine.
//!
//! A [`Session`] drives one document through
//! `Idle → Uploading → Analyzing → Ready | Error` and owns the single
//! content model that exists while it is `Ready`. [`Session::reset`] returns
//! to `Idle` from any state.
//!
//! At most one extraction and one transformation are in flight; a second
//! trigger while busy is rejected with [`Error::Busy`]. Service calls run on
//! spawned tasks and finish even if the caller stops waiting. The state lock
//! is never held across an `.await`. Each reset bumps an epoch so that results
//! of calls issued before the reset are discarded when they arrive.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use smartpdf::gateway::{Action, GeminiClient};
//! use smartpdf::session::{Session, UploadedFile};
//!
//! # async fn run() -> smartpdf::Result<()> {
//! let session = Session::new(Arc::new(GeminiClient::from_env()?));
//! session.select_file(UploadedFile::from_path("report.pdf")).await?;
//! session.transform(&Action::Summarize).await?;
//! println!("{}", session.plain_text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

mod progress;

pub use progress::{
    estimate as estimate_progress, ANALYZE_CAP, ANALYZE_STEP, ANALYZE_TICK, UPLOAD_CAP,
    UPLOAD_STEP, UPLOAD_TICK,
};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::detect::{self, INVALID_TYPE_MESSAGE};
use crate::error::{Error, Result, GENERIC_FAILURE_MESSAGE, READ_FAILURE_MESSAGE};
use crate::export::{ExportArtifact, ExportFormat, ExportInput, ExportOptions, ExporterRegistry};
use crate::gateway::{Action, AiService, TransformGateway};
use crate::model::{AnalysisResult, ContentModel, ContentStats};

/// Where the bytes of an upload come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Already in memory
    Bytes(Vec<u8>),
    /// Read from disk when the upload starts
    Path(PathBuf),
}

/// A file handed to the session, with its declared MIME type.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Display name
    pub name: String,

    /// Declared MIME type; only `application/pdf` is accepted
    pub mime_type: String,

    /// Contents
    pub source: FileSource,
}

impl UploadedFile {
    /// An in-memory upload.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    /// A file on disk. The declared type comes from the extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime_type: detect::mime_type_from_path(path)
                .unwrap_or("application/octet-stream")
                .to_string(),
            source: FileSource::Path(path.to_path_buf()),
        }
    }

    /// Override the declared type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    async fn read(self) -> std::io::Result<Vec<u8>> {
        match self.source {
            FileSource::Bytes(bytes) => Ok(bytes),
            FileSource::Path(path) => tokio::fs::read(path).await,
        }
    }
}

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for a file
    Idle,
    /// Reading the upload
    Uploading,
    /// Waiting for the extraction call
    Analyzing,
    /// Analysis and content are available
    Ready,
    /// Extraction failed; the message is meant for the user
    Error(String),
}

impl SessionStatus {
    /// Lowercase state name.
    pub fn name(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Uploading => "uploading",
            SessionStatus::Analyzing => "analyzing",
            SessionStatus::Ready => "ready",
            SessionStatus::Error(_) => "error",
        }
    }

    /// Check if an extraction is in progress.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionStatus::Uploading | SessionStatus::Analyzing)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Error(msg) => write!(f, "error: {}", msg),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug)]
struct Inner {
    status: SessionStatus,
    epoch: u64,
    file_name: Option<String>,
    validation_message: Option<String>,
    analysis: Option<Arc<AnalysisResult>>,
    content: Option<ContentModel>,
    transforming: bool,
    phase_started: Instant,
}

impl Inner {
    fn new() -> Self {
        Self {
            status: SessionStatus::Idle,
            epoch: 0,
            file_name: None,
            validation_message: None,
            analysis: None,
            content: None,
            transforming: false,
            phase_started: Instant::now(),
        }
    }

    fn enter(&mut self, status: SessionStatus) {
        log::info!("session: {} -> {}", self.status.name(), status.name());
        self.status = status;
        self.phase_started = Instant::now();
    }

    fn require_ready(&self) -> Result<()> {
        if self.status == SessionStatus::Ready {
            Ok(())
        } else {
            Err(Error::InvalidState {
                expected: "ready",
                actual: self.status.name(),
            })
        }
    }
}

/// One document's journey from upload to export.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<Inner>>,
    service: Arc<dyn AiService>,
    gateway: TransformGateway,
    exporters: Arc<ExporterRegistry>,
}

impl Session {
    /// Create an idle session backed by an AI service.
    pub fn new(service: Arc<dyn AiService>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::new())),
            gateway: TransformGateway::new(service.clone()),
            service,
            exporters: Arc::new(ExporterRegistry::with_defaults()),
        }
    }

    /// Use a custom exporter registry.
    pub fn with_exporters(mut self, exporters: ExporterRegistry) -> Self {
        self.exporters = Arc::new(exporters);
        self
    }

    /// Use a custom transformation gateway.
    pub fn with_gateway(mut self, gateway: TransformGateway) -> Self {
        self.gateway = gateway;
        self
    }

    fn state(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.state().status.clone()
    }

    /// Inline message for the last rejected file selection.
    pub fn validation_message(&self) -> Option<String> {
        self.state().validation_message.clone()
    }

    /// Name of the file being processed.
    pub fn file_name(&self) -> Option<String> {
        self.state().file_name.clone()
    }

    /// Reset counter.
    pub fn epoch(&self) -> u64 {
        self.state().epoch
    }

    /// Heuristic progress percentage for the current phase.
    pub fn progress(&self) -> u8 {
        let state = self.state();
        progress::estimate(&state.status, state.phase_started.elapsed())
    }

    /// Upload a file and run the extraction.
    ///
    /// Returns `Idle` when the declared type is rejected (see
    /// [`validation_message`](Self::validation_message)) and `Ready` on
    /// success. Read and service failures move the session to `Error` and
    /// are also returned. If the session is reset while the call is in
    /// flight, the late result is dropped and the current status returned.
    ///
    /// The upload and the service call run on a spawned task, so dropping
    /// this future does not cancel them; the session still reaches `Ready`
    /// or `Error` when the call completes.
    pub async fn select_file(&self, file: UploadedFile) -> Result<SessionStatus> {
        let epoch = {
            let mut state = self.state();
            match &state.status {
                SessionStatus::Idle => {}
                status if status.is_busy() => return Err(Error::Busy("extraction")),
                status => {
                    return Err(Error::InvalidState {
                        expected: "idle",
                        actual: status.name(),
                    })
                }
            }

            if !detect::is_accepted_type(&file.mime_type) {
                log::warn!(
                    "rejected '{}': declared type '{}'",
                    file.name,
                    file.mime_type
                );
                state.validation_message = Some(INVALID_TYPE_MESSAGE.to_string());
                return Ok(SessionStatus::Idle);
            }

            state.validation_message = None;
            state.file_name = Some(file.name.clone());
            state.enter(SessionStatus::Uploading);
            state.epoch
        };

        let guard = InFlight::new(self.inner.clone(), epoch, Work::Extraction);
        let service = self.service.clone();
        let task = tokio::spawn(async move {
            let inner = guard.inner.clone();
            let result = run_extraction(&inner, service.as_ref(), file, epoch).await;
            drop(guard);
            result
        });
        join(task).await
    }

    /// Enter `Ready` with an analysis obtained earlier, without a service
    /// call.
    pub fn open_analysis(&self, analysis: AnalysisResult) -> Result<()> {
        let mut state = self.state();
        if state.status != SessionStatus::Idle {
            return Err(Error::InvalidState {
                expected: "idle",
                actual: state.status.name(),
            });
        }
        state.content = Some(ContentModel::from_text(analysis.full_text()));
        state.analysis = Some(Arc::new(analysis));
        state.validation_message = None;
        state.enter(SessionStatus::Ready);
        Ok(())
    }

    /// Return to `Idle`, discarding the analysis and content.
    pub fn reset(&self) {
        let mut state = self.state();
        state.epoch += 1;
        state.analysis = None;
        state.content = None;
        state.file_name = None;
        state.validation_message = None;
        state.transforming = false;
        state.enter(SessionStatus::Idle);
    }

    /// The analysis result, while `Ready`.
    pub fn analysis(&self) -> Option<Arc<AnalysisResult>> {
        self.state().analysis.clone()
    }

    /// A copy of the content model, while `Ready`.
    pub fn content(&self) -> Option<ContentModel> {
        self.state().content.clone()
    }

    /// Plain-text projection of the content, while `Ready`.
    pub fn plain_text(&self) -> Option<String> {
        self.state().content.as_ref().map(|c| c.plain_text())
    }

    /// Content statistics, while `Ready`.
    pub fn stats(&self) -> Option<ContentStats> {
        self.state().content.as_ref().map(|c| c.stats())
    }

    /// Edit the content model in place.
    pub fn with_content<R>(&self, edit: impl FnOnce(&mut ContentModel) -> R) -> Result<R> {
        let mut state = self.state();
        state.require_ready()?;
        let content = state
            .content
            .as_mut()
            .ok_or_else(|| Error::Other("ready session has no content".to_string()))?;
        Ok(edit(content))
    }

    /// Check if a transformation is in flight.
    pub fn is_transforming(&self) -> bool {
        self.state().transforming
    }

    /// Run an action over the current content and replace it with the
    /// result.
    ///
    /// Returns `true` if the result was applied, `false` if the session was
    /// reset before it arrived. On failure the content is left unchanged.
    ///
    /// The service call runs on a spawned task. If this future is dropped
    /// the call keeps going and its result is still applied, unless the
    /// session was reset in the meantime.
    pub async fn transform(&self, action: &Action) -> Result<bool> {
        let (epoch, text) = {
            let mut state = self.state();
            state.require_ready()?;
            if state.transforming {
                return Err(Error::Busy("transformation"));
            }
            let text = state
                .content
                .as_ref()
                .map(|c| c.plain_text())
                .unwrap_or_default();
            state.transforming = true;
            (state.epoch, text)
        };

        let guard = InFlight::new(self.inner.clone(), epoch, Work::Transformation);
        let gateway = self.gateway.clone();
        let action = action.clone();
        let task = tokio::spawn(async move {
            let result = gateway.transform_text(&text, &action).await;

            let mut state = lock(&guard.inner);
            if state.epoch != epoch {
                log::info!("session was reset during '{}', dropping the result", action);
                return Ok(false);
            }
            state.transforming = false;
            let outcome = result?;
            state.content = Some(outcome.into_content());
            Ok(true)
        });
        join(task).await
    }

    /// Export the current content.
    pub fn export(&self, format: ExportFormat, options: &ExportOptions) -> Result<ExportArtifact> {
        let (content, analysis) = {
            let state = self.state();
            state.require_ready()?;
            (state.content.clone().unwrap_or_default(), state.analysis.clone())
        };

        let mut input = ExportInput::new(&content);
        if let Some(analysis) = analysis.as_deref() {
            input = input.with_analysis(analysis);
        }
        self.exporters.export(format, &input, options)
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

async fn join<T>(task: JoinHandle<Result<T>>) -> Result<T> {
    task.await
        .map_err(|e| Error::Other(format!("session task failed: {}", e)))?
}

/// Reads the upload and runs the extraction call for one epoch.
async fn run_extraction(
    inner: &Mutex<Inner>,
    service: &dyn AiService,
    file: UploadedFile,
    epoch: u64,
) -> Result<SessionStatus> {
    let bytes = match file.read().await {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("failed to read upload: {}", e);
            let mut state = lock(inner);
            if state.epoch == epoch {
                state.enter(SessionStatus::Error(READ_FAILURE_MESSAGE.to_string()));
            }
            return Err(Error::Io(e));
        }
    };

    if detect::exceeds_advisory_size(bytes.len() as u64) {
        log::warn!(
            "upload is {} bytes, above the advisory limit of {}",
            bytes.len(),
            detect::MAX_UPLOAD_BYTES
        );
    }

    {
        let mut state = lock(inner);
        if state.epoch != epoch {
            log::info!("session was reset during upload, dropping it");
            return Ok(state.status.clone());
        }
        state.enter(SessionStatus::Analyzing);
    }

    let result = service.analyze(&bytes).await;

    let mut state = lock(inner);
    if state.epoch != epoch {
        log::info!("session was reset during analysis, dropping the result");
        return Ok(state.status.clone());
    }
    match result {
        Ok(analysis) => {
            state.content = Some(ContentModel::from_text(analysis.full_text()));
            state.analysis = Some(Arc::new(analysis));
            state.enter(SessionStatus::Ready);
            Ok(SessionStatus::Ready)
        }
        Err(e) => {
            log::warn!("extraction failed: {}", e);
            state.enter(SessionStatus::Error(e.user_message()));
            Err(e)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Work {
    Extraction,
    Transformation,
}

/// Releases a busy marker when the task owning it ends, however it ends.
struct InFlight {
    inner: Arc<Mutex<Inner>>,
    epoch: u64,
    work: Work,
}

impl InFlight {
    fn new(inner: Arc<Mutex<Inner>>, epoch: u64, work: Work) -> Self {
        Self { inner, epoch, work }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut state = lock(&self.inner);
        if state.epoch != self.epoch {
            return;
        }
        match self.work {
            Work::Transformation => state.transforming = false,
            Work::Extraction if state.status.is_busy() => {
                log::warn!("extraction task ended without a result");
                state.enter(SessionStatus::Error(GENERIC_FAILURE_MESSAGE.to_string()));
            }
            Work::Extraction => {}
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Session")
            .field("status", &state.status)
            .field("epoch", &state.epoch)
            .field("service", &self.service.name())
            .field("transforming", &state.transforming)
            .finish()
    }
}
