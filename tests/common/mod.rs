//! In-memory record server for controller tests

#![allow(dead_code)]

use async_trait::async_trait;
use record_search::analysis_handoff::AnalysisHandoff;
use record_search::api::models::{AnonymizeRequest, SimilarityRequest};
use record_search::api::{
    ImportCounts, SearchBackend, SearchReply, SensitiveWords, StagedPreview, WordCategory,
};
use record_search::config::Config;
use record_search::data_exporter::AnalysisPayload;
use record_search::query_model::DispatchPayload;
use record_search::result_set::ResultRow;
use record_search::schema_config::source_config;
use record_search::services::{ImportFile, ManualRow};
use record_search::state::NoticeLevel;
use record_search::{ApiError, AppStateContainer, DataSourceId};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tokio::sync::Notify;

/// A request the fake received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Columns(DataSourceId),
    SubTypes(DataSourceId),
    Keyword(DispatchPayload),
    Similarity(SimilarityRequest),
    PreviewFile(DataSourceId, String),
    PreviewRows(DataSourceId, Vec<ManualRow>),
    Confirm(DataSourceId, String),
    Cancel(DataSourceId, String),
    Anonymize(AnonymizeRequest),
    ListWords,
    AddWord(String, WordCategory),
    RemoveWord(String, WordCategory),
}

/// Scripted backend. Unscripted calls succeed with neutral replies: the
/// static column list, no record types, empty results.
#[derive(Default)]
pub struct FakeBackend {
    calls: RefCell<Vec<Call>>,
    columns: RefCell<HashMap<DataSourceId, Result<Vec<String>, ApiError>>>,
    column_gates: RefCell<HashMap<DataSourceId, Rc<Notify>>>,
    sub_types: RefCell<HashMap<DataSourceId, Result<Vec<String>, ApiError>>>,
    searches: RefCell<VecDeque<Result<SearchReply, ApiError>>>,
    search_gate: RefCell<Option<Rc<Notify>>>,
    similarities: RefCell<VecDeque<Result<SearchReply, ApiError>>>,
    previews: RefCell<VecDeque<Result<StagedPreview, ApiError>>>,
    confirms: RefCell<VecDeque<Result<u64, ApiError>>>,
    confirm_gate: RefCell<Option<Rc<Notify>>>,
    cancel_error: RefCell<Option<ApiError>>,
    anonymized: RefCell<Option<Result<Vec<ResultRow>, ApiError>>>,
    word_error: RefCell<Option<ApiError>>,
}

impl FakeBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn keyword_calls(&self) -> Vec<DispatchPayload> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Keyword(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    pub fn script_columns(&self, source: DataSourceId, reply: Result<Vec<String>, ApiError>) {
        self.columns.borrow_mut().insert(source, reply);
    }

    /// Hold column fetches for `source` until the returned gate is notified
    pub fn gate_columns(&self, source: DataSourceId) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        self.column_gates.borrow_mut().insert(source, Rc::clone(&gate));
        gate
    }

    pub fn script_sub_types(&self, source: DataSourceId, reply: Result<Vec<String>, ApiError>) {
        self.sub_types.borrow_mut().insert(source, reply);
    }

    pub fn push_search(&self, reply: Result<SearchReply, ApiError>) {
        self.searches.borrow_mut().push_back(reply);
    }

    /// Hold the next keyword searches until the returned gate is notified
    pub fn gate_search(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.search_gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn push_similarity(&self, reply: Result<SearchReply, ApiError>) {
        self.similarities.borrow_mut().push_back(reply);
    }

    pub fn push_preview(&self, reply: Result<StagedPreview, ApiError>) {
        self.previews.borrow_mut().push_back(reply);
    }

    pub fn push_confirm(&self, reply: Result<u64, ApiError>) {
        self.confirms.borrow_mut().push_back(reply);
    }

    /// Hold the next confirm until the returned gate is notified
    pub fn gate_confirm(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.confirm_gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn fail_cancel(&self, error: ApiError) {
        *self.cancel_error.borrow_mut() = Some(error);
    }

    pub fn script_anonymize(&self, reply: Result<Vec<ResultRow>, ApiError>) {
        *self.anonymized.borrow_mut() = Some(reply);
    }

    pub fn fail_words(&self, error: ApiError) {
        *self.word_error.borrow_mut() = Some(error);
    }
}

#[async_trait(?Send)]
impl SearchBackend for FakeBackend {
    async fn fetch_columns(&self, source: DataSourceId) -> Result<Vec<String>, ApiError> {
        self.record(Call::Columns(source));
        let gate = self.column_gates.borrow_mut().remove(&source);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.columns.borrow().get(&source).cloned().unwrap_or_else(|| {
            Ok(source_config(source)
                .all_columns
                .iter()
                .map(|c| c.to_string())
                .collect())
        })
    }

    async fn fetch_record_sub_types(&self, source: DataSourceId) -> Result<Vec<String>, ApiError> {
        self.record(Call::SubTypes(source));
        self.sub_types
            .borrow()
            .get(&source)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn keyword_search(&self, payload: &DispatchPayload) -> Result<SearchReply, ApiError> {
        self.record(Call::Keyword(payload.clone()));
        let gate = self.search_gate.borrow_mut().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.searches
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(reply(Vec::new(), 0)))
    }

    async fn similarity_search(
        &self,
        request: &SimilarityRequest,
    ) -> Result<SearchReply, ApiError> {
        self.record(Call::Similarity(request.clone()));
        self.similarities
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(reply(Vec::new(), 0)))
    }

    async fn preview_file(
        &self,
        source: DataSourceId,
        file: &ImportFile,
    ) -> Result<StagedPreview, ApiError> {
        self.record(Call::PreviewFile(source, file.file_name.clone()));
        self.next_preview()
    }

    async fn preview_rows(
        &self,
        source: DataSourceId,
        rows: &[ManualRow],
    ) -> Result<StagedPreview, ApiError> {
        self.record(Call::PreviewRows(source, rows.to_vec()));
        self.next_preview()
    }

    async fn confirm_import(&self, source: DataSourceId, token: &str) -> Result<u64, ApiError> {
        self.record(Call::Confirm(source, token.to_string()));
        let gate = self.confirm_gate.borrow_mut().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.confirms
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(0))
    }

    async fn cancel_import(&self, source: DataSourceId, token: &str) -> Result<(), ApiError> {
        self.record(Call::Cancel(source, token.to_string()));
        match self.cancel_error.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn anonymize(&self, request: &AnonymizeRequest) -> Result<Vec<ResultRow>, ApiError> {
        self.record(Call::Anonymize(request.clone()));
        self.anonymized
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Ok(request.results.clone()))
    }

    async fn list_sensitive_words(&self) -> Result<SensitiveWords, ApiError> {
        self.record(Call::ListWords);
        match self.word_error.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(SensitiveWords::new()),
        }
    }

    async fn add_sensitive_word(
        &self,
        word: &str,
        category: WordCategory,
    ) -> Result<(), ApiError> {
        self.record(Call::AddWord(word.to_string(), category));
        match self.word_error.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn remove_sensitive_word(
        &self,
        word: &str,
        category: WordCategory,
    ) -> Result<(), ApiError> {
        self.record(Call::RemoveWord(word.to_string(), category));
        match self.word_error.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl FakeBackend {
    fn next_preview(&self) -> Result<StagedPreview, ApiError> {
        self.previews
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(staged("t-default", ImportCounts::default())))
    }
}

/// Records hand-offs in memory, or fails every one
#[derive(Default, Clone)]
pub struct MemoryHandoff {
    pub payloads: Rc<RefCell<Vec<AnalysisPayload>>>,
    pub fail: bool,
}

impl AnalysisHandoff for MemoryHandoff {
    fn persist(&self, payload: &AnalysisPayload) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("disk full");
        }
        self.payloads.borrow_mut().push(payload.clone());
        Ok(())
    }
}

pub fn config_on(source: DataSourceId) -> Config {
    let mut config = Config::default();
    config.search.default_data_source = source;
    config
}

pub fn console(backend: &Rc<FakeBackend>, source: DataSourceId) -> AppStateContainer {
    console_with_handoff(backend, source, MemoryHandoff::default())
}

pub fn console_with_handoff(
    backend: &Rc<FakeBackend>,
    source: DataSourceId,
    handoff: MemoryHandoff,
) -> AppStateContainer {
    console_with(backend, config_on(source), handoff)
}

pub fn console_with(
    backend: &Rc<FakeBackend>,
    config: Config,
    handoff: MemoryHandoff,
) -> AppStateContainer {
    let backend: Rc<dyn SearchBackend> = backend.clone();
    AppStateContainer::new(backend, config, Box::new(handoff))
}

pub fn has_notice(app: &AppStateContainer, level: NoticeLevel, fragment: &str) -> bool {
    app.drain_notices()
        .iter()
        .any(|n| n.level == level && n.message.contains(fragment))
}

pub fn row(value: Value) -> ResultRow {
    value
        .as_object()
        .cloned()
        .expect("test rows are JSON objects")
}

pub fn reply(rows: Vec<ResultRow>, total: u64) -> SearchReply {
    SearchReply { rows, total }
}

pub fn staged(token: &str, counts: ImportCounts) -> StagedPreview {
    StagedPreview {
        token: token.to_string(),
        counts,
        preview_rows: Vec::new(),
        columns: Vec::new(),
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
