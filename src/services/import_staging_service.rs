//! Staged import transactions
//!
//! An import is uploaded, previewed by the server under a staging token,
//! and then either confirmed or cancelled:
//!
//! ```text
//! Draft --preview ok--> Previewed --confirm ok--> Draft (last outcome Confirmed)
//!   ^                       |
//!   +------ cancel ---------+
//! ```
//!
//! Any preview failure lands back in Draft without a token. A failed
//! confirm stays in Previewed so it can be retried or cancelled.

use crate::api::{ImportCounts, SearchBackend, StagedPreview};
use crate::data_source::DataSourceId;
use crate::error::{ApiError, ConsoleError, ConsoleResult, ValidationError};
use crate::logging::targets;
use crate::result_set::ResultRow;
use crate::trace_staging;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// MIME types of the accepted spreadsheet formats
pub const ACCEPTED_MIME_TYPES: [&str; 2] = [
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

/// A spreadsheet chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            bytes,
        }
    }

    /// Accepted when either the MIME type or the extension names a spreadsheet
    pub fn is_spreadsheet(&self) -> bool {
        let mime_ok = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ACCEPTED_MIME_TYPES.contains(&ct.trim()));
        let ext_ok = Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        mime_ok || ext_ok
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// One manually entered row, column name to cell text
pub type ManualRow = BTreeMap<String, String>;

fn is_blank_row(row: &ManualRow) -> bool {
    row.values().all(|v| v.trim().is_empty())
}

/// What will be sent on the next preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportInput {
    File(ImportFile),
    Rows(Vec<ManualRow>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingState {
    Draft,
    Previewed,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStagingSession {
    data_source: DataSourceId,
    state: StagingState,
    staging_token: Option<String>,
    counts: ImportCounts,
    preview_rows: Vec<ResultRow>,
    preview_columns: Vec<String>,
    pending: Option<ImportInput>,
    /// How the previous session ended, if it was confirmed or cancelled
    last_outcome: Option<StagingState>,
}

impl ImportStagingSession {
    pub fn new(data_source: DataSourceId) -> Self {
        Self {
            data_source,
            state: StagingState::Draft,
            staging_token: None,
            counts: ImportCounts::default(),
            preview_rows: Vec::new(),
            preview_columns: Vec::new(),
            pending: None,
            last_outcome: None,
        }
    }

    fn ended(data_source: DataSourceId, outcome: StagingState) -> Self {
        Self {
            last_outcome: Some(outcome),
            ..Self::new(data_source)
        }
    }

    pub fn data_source(&self) -> DataSourceId {
        self.data_source
    }

    pub fn state(&self) -> StagingState {
        self.state
    }

    pub fn staging_token(&self) -> Option<&str> {
        self.staging_token.as_deref()
    }

    pub fn counts(&self) -> ImportCounts {
        self.counts
    }

    pub fn preview_rows(&self) -> &[ResultRow] {
        &self.preview_rows
    }

    pub fn preview_columns(&self) -> &[String] {
        &self.preview_columns
    }

    pub fn pending(&self) -> Option<&ImportInput> {
        self.pending.as_ref()
    }

    pub fn last_outcome(&self) -> Option<StagingState> {
        self.last_outcome
    }

    fn clear_preview(&mut self) {
        self.staging_token = None;
        self.counts = ImportCounts::default();
        self.preview_rows.clear();
        self.preview_columns.clear();
    }
}

/// Drives one import session against the server.
///
/// Every change of session (new submission, cancel, source change) bumps an
/// epoch; a preview reply for an older epoch is dropped. A successful confirm
/// is always reported, since the server has already committed the rows.
pub struct ImportStagingService {
    backend: Rc<dyn SearchBackend>,
    max_upload_bytes: u64,
    session: RefCell<ImportStagingSession>,
    epoch: Cell<u64>,
}

impl ImportStagingService {
    pub fn new(backend: Rc<dyn SearchBackend>, data_source: DataSourceId, max_upload_bytes: u64) -> Self {
        Self {
            backend,
            max_upload_bytes,
            session: RefCell::new(ImportStagingSession::new(data_source)),
            epoch: Cell::new(0),
        }
    }

    /// Snapshot of the current session
    pub fn session(&self) -> ImportStagingSession {
        self.session.borrow().clone()
    }

    pub fn state(&self) -> StagingState {
        self.session.borrow().state
    }

    fn bump_epoch(&self) -> u64 {
        let next = self.epoch.get() + 1;
        self.epoch.set(next);
        next
    }

    fn transition(&self, session: ImportStagingSession) {
        let mut current = self.session.borrow_mut();
        if current.state != session.state {
            trace_staging!(current.state, session.state);
        }
        *current = session;
    }

    /// Start a fresh draft for `data_source` holding `input`
    fn start_draft(&self, data_source: DataSourceId, input: ImportInput) {
        self.bump_epoch();
        if let Some(token) = self.session.borrow().staging_token() {
            debug!(target: targets::IMPORT, "Dropping staged import {} for a new submission", token);
        }
        let mut session = ImportStagingSession::new(data_source);
        session.pending = Some(input);
        self.transition(session);
    }

    pub fn submit_file(&self, file: ImportFile, data_source: DataSourceId) -> Result<(), ValidationError> {
        if !file.is_spreadsheet() {
            return Err(ValidationError::UnsupportedFileType {
                file_name: file.file_name,
            });
        }
        if file.size() > self.max_upload_bytes {
            return Err(ValidationError::FileTooLarge {
                size: file.size(),
                limit: self.max_upload_bytes,
                file_name: file.file_name,
            });
        }

        info!(
            target: targets::IMPORT,
            "Submitted {} ({} bytes) for {}",
            file.file_name,
            file.size(),
            data_source
        );
        self.start_draft(data_source, ImportInput::File(file));
        Ok(())
    }

    /// Keep the rows that have at least one non-blank cell
    pub fn submit_manual_rows(
        &self,
        rows: Vec<ManualRow>,
        data_source: DataSourceId,
    ) -> Result<(), ValidationError> {
        let rows: Vec<ManualRow> = rows.into_iter().filter(|r| !is_blank_row(r)).collect();
        if rows.is_empty() {
            return Err(ValidationError::EmptyManualRows);
        }

        info!(target: targets::IMPORT, "Submitted {} manual rows for {}", rows.len(), data_source);
        self.start_draft(data_source, ImportInput::Rows(rows));
        Ok(())
    }

    /// Send the pending input for staging
    pub async fn preview(&self) -> ConsoleResult<ImportCounts> {
        let (data_source, input) = {
            let session = self.session.borrow();
            let input = session
                .pending
                .clone()
                .ok_or(ValidationError::NoStagedImport)?;
            (session.data_source, input)
        };
        let epoch = self.bump_epoch();

        let reply = match &input {
            ImportInput::File(file) => self.backend.preview_file(data_source, file).await,
            ImportInput::Rows(rows) => self.backend.preview_rows(data_source, rows).await,
        };

        if self.epoch.get() != epoch {
            debug!(target: targets::IMPORT, "Dropping preview reply for superseded session");
            return Err(ConsoleError::StaleResponseIgnored { data_source });
        }

        match reply {
            Ok(staged) => Ok(self.apply_preview(staged)),
            Err(error) => {
                warn!(target: targets::IMPORT, "Preview for {} failed: {}", data_source, error);
                let mut session = self.session.borrow().clone();
                session.clear_preview();
                session.state = StagingState::Draft;
                self.transition(session);
                Err(ConsoleError::Staging(error))
            }
        }
    }

    fn apply_preview(&self, staged: StagedPreview) -> ImportCounts {
        let mut session = self.session.borrow().clone();
        info!(
            target: targets::IMPORT,
            "Staged {} for {}: {} new of {} uploaded",
            staged.token,
            session.data_source,
            staged.counts.new_count,
            staged.counts.uploaded_count
        );
        session.staging_token = Some(staged.token);
        session.counts = staged.counts;
        session.preview_rows = staged.preview_rows;
        session.preview_columns = staged.columns;
        session.state = StagingState::Previewed;
        self.transition(session);
        staged.counts
    }

    /// Commit the staged import, returning how many rows were added
    pub async fn confirm(&self) -> ConsoleResult<u64> {
        let (data_source, token) = {
            let session = self.session.borrow();
            match (&session.state, &session.staging_token) {
                (StagingState::Previewed, Some(token)) => (session.data_source, token.clone()),
                _ => return Err(ValidationError::NoStagedImport.into()),
            }
        };
        let epoch = self.epoch.get();

        let reply = self.backend.confirm_import(data_source, &token).await;
        let superseded = self.epoch.get() != epoch;

        match reply {
            // The rows are committed server-side whatever happened locally;
            // only the session bookkeeping depends on the epoch.
            Ok(new_count) if superseded => {
                info!(
                    target: targets::IMPORT,
                    "Confirmed {}: {} rows added to {} (session already replaced)",
                    token,
                    new_count,
                    data_source
                );
                Ok(new_count)
            }
            Ok(new_count) => {
                info!(target: targets::IMPORT, "Confirmed {}: {} rows added to {}", token, new_count, data_source);
                self.bump_epoch();
                self.transition(ImportStagingSession::ended(data_source, StagingState::Confirmed));
                Ok(new_count)
            }
            Err(_) if superseded => Err(ConsoleError::StaleResponseIgnored { data_source }),
            Err(error) => {
                warn!(target: targets::IMPORT, "Confirm of {} failed: {}", token, error);
                Err(ConsoleError::Staging(error))
            }
        }
    }

    /// Abandon the session. The server is told to drop a staged import on a
    /// best-effort basis; the session is reset either way.
    pub async fn cancel(&self) {
        let data_source = self.session.borrow().data_source;
        let token = self.discard(data_source, StagingState::Cancelled);
        if let Some(token) = token {
            self.notify_discard(data_source, &token).await;
        }
    }

    /// Reset to an empty draft for `data_source`, returning any live token
    /// so the caller can tell the server.
    pub fn reset_for_source(&self, data_source: DataSourceId) -> Option<(DataSourceId, String)> {
        let previous = self.session.borrow().data_source;
        let token = self.discard(data_source, StagingState::Cancelled);
        token.map(|t| (previous, t))
    }

    fn discard(&self, data_source: DataSourceId, outcome: StagingState) -> Option<String> {
        self.bump_epoch();
        let token = self.session.borrow_mut().staging_token.take();
        let had_input = {
            let session = self.session.borrow();
            session.pending.is_some() || session.state != StagingState::Draft
        };
        let session = if had_input || token.is_some() {
            ImportStagingSession::ended(data_source, outcome)
        } else {
            ImportStagingSession::new(data_source)
        };
        self.transition(session);
        token
    }

    /// Best-effort server notification that `token` is abandoned
    pub async fn notify_discard(&self, data_source: DataSourceId, token: &str) {
        match self.backend.cancel_import(data_source, token).await {
            Ok(()) => debug!(target: targets::IMPORT, "Server dropped staged import {}", token),
            Err(error) => warn!(
                target: targets::IMPORT,
                "Could not notify server to drop staged import {}: {}",
                token,
                error
            ),
        }
    }
}

/// Message for a failed preview, listing missing columns when the server
/// names them
pub fn describe_staging_error(error: &ApiError) -> String {
    match error {
        ApiError::Rejected {
            message,
            missing_columns,
            ..
        } if !missing_columns.is_empty() => {
            format!("{}: {}", message, missing_columns.join(", "))
        }
        other => other.to_string(),
    }
}
