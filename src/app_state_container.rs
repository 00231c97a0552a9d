//! The search/import controller
//!
//! `AppStateContainer` owns every piece of per-session state (active source,
//! schema, column visibility, query, results, selection, import session) and
//! exposes the operations a host view drives.
//!
//! It runs on one cooperative thread. State sits in `RefCell`s and is never
//! borrowed across an `.await`, so several operations may be in flight at
//! once. Two rules keep them from trampling each other:
//!
//! - **Transition gate.** Source switches and import confirmations hold the
//!   `transition` lock exclusively. Searches take it shared while they
//!   snapshot the query, so a search issued during a switch is built against
//!   the settled new source.
//! - **Stale-response rejection.** Every dispatch is tagged with the source
//!   and generation it was built from. A switch or reset bumps the
//!   generation; replies carrying an old tag are dropped with
//!   [`ConsoleError::StaleResponseIgnored`].

use crate::analysis_handoff::{AnalysisHandoff, FileHandoff};
use crate::api::models::AnonymizeRequest;
use crate::api::{ImportCounts, SearchBackend, SensitiveWords, WordCategory};
use crate::api_client::ApiClient;
use crate::column_manager::ColumnVisibility;
use crate::config::Config;
use crate::data_exporter::DataExporter;
use crate::data_source::DataSourceId;
use crate::dynamic_schema::{SchemaInfo, SchemaRegistry};
use crate::error::{ApiError, ConsoleError, ConsoleResult, ValidationError};
use crate::logging::{self, targets};
use crate::query_model::{LogicOp, QueryModel, SearchFilters, SimilarityQuery};
use crate::result_set::{ResultSet, Selection};
use crate::schema_config::{anonymize_fields, EQUIPMENT_TYPE_OPTIONS};
use crate::services::import_staging_service::describe_staging_error;
use crate::services::{
    ImportFile, ImportStagingService, ImportStagingSession, ManualRow, QueryExecutionService,
    SearchExecutionResult, SearchStats, SensitiveWordService,
};
use crate::state::{Notice, NoticeLog};
use crate::{trace_dispatch, trace_source_switch};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// What a dispatched request was built against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DispatchTag {
    data_source: DataSourceId,
    generation: u64,
}

/// Everything scoped to the active data source
#[derive(Debug, Clone)]
struct SourceState {
    data_source: DataSourceId,
    /// Target of the most recent switch request, settled or not
    requested: DataSourceId,
    /// Bumped by each switch request
    switch_seq: u64,
    /// Bumped by each switch request and each reset
    generation: u64,
    schema: SchemaInfo,
    columns: ColumnVisibility,
    query: QueryModel,
    similarity: SimilarityQuery,
    filters: SearchFilters,
    available_sub_types: Vec<String>,
}

impl SourceState {
    fn new(schema: SchemaInfo, equipment_types: Vec<String>) -> Self {
        let data_source = schema.data_source();
        Self {
            data_source,
            requested: data_source,
            switch_seq: 0,
            generation: 0,
            columns: ColumnVisibility::for_schema(&schema),
            query: QueryModel::new(&schema),
            similarity: SimilarityQuery::for_schema(&schema),
            filters: SearchFilters {
                record_sub_types: Vec::new(),
                equipment_types,
            },
            available_sub_types: Vec::new(),
            schema,
        }
    }

    fn tag(&self) -> DispatchTag {
        DispatchTag {
            data_source: self.data_source,
            generation: self.generation,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ResultState {
    result_set: ResultSet,
    selection: Selection,
    /// Bumped whenever `result_set` is replaced
    version: u64,
}

impl ResultState {
    fn replace(&mut self, result_set: ResultSet) {
        self.result_set = result_set;
        self.selection.clear();
        self.version += 1;
    }

    fn clear(&mut self) {
        self.replace(ResultSet::default());
    }
}

pub struct AppStateContainer {
    // Collaborators
    backend: Rc<dyn SearchBackend>,
    registry: SchemaRegistry,
    executor: QueryExecutionService,
    imports: ImportStagingService,
    words: SensitiveWordService,
    handoff: Box<dyn AnalysisHandoff>,
    config: Config,

    // Serializes source switches against searches and import confirmation
    transition: RwLock<()>,

    source: RefCell<SourceState>,
    results: RefCell<ResultState>,
    notices: RefCell<NoticeLog>,
}

impl AppStateContainer {
    /// Controller on the configured default source, using the static schema
    /// until [`initialize`](Self::initialize) fetches the real one.
    pub fn new(
        backend: Rc<dyn SearchBackend>,
        config: Config,
        handoff: Box<dyn AnalysisHandoff>,
    ) -> Self {
        let data_source = config.search.default_data_source;
        let schema = SchemaInfo::fallback(data_source);
        let source = SourceState::new(schema, config.search.default_equipment_types.clone());

        Self {
            registry: SchemaRegistry::new(Rc::clone(&backend)),
            executor: QueryExecutionService::new(Rc::clone(&backend), config.search.similarity_limit),
            imports: ImportStagingService::new(
                Rc::clone(&backend),
                data_source,
                config.import.max_upload_bytes,
            ),
            words: SensitiveWordService::new(Rc::clone(&backend)),
            backend,
            handoff,
            config,
            transition: RwLock::new(()),
            source: RefCell::new(source),
            results: RefCell::new(ResultState::default()),
            notices: RefCell::new(NoticeLog::default()),
        }
    }

    /// Controller talking HTTP to `config.server`, handing analysis rows off
    /// through a file. Installs console logging per `config.logging` unless
    /// the host already has a subscriber.
    pub fn connect(config: Config) -> anyhow::Result<Self> {
        logging::init_tracing(&config.logging);
        let client = ApiClient::from_config(&config.server)?;
        let handoff = FileHandoff::from_config(&config.export)?;
        Ok(Self::new(Rc::new(client), config, Box::new(handoff)))
    }

    /// Fetch the active source's schema and record types from the server
    pub async fn initialize(&self) -> ConsoleResult<()> {
        let data_source = self.source.borrow().data_source;
        self.transition_to(data_source).await
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data_source(&self) -> DataSourceId {
        self.source.borrow().data_source
    }

    pub fn schema(&self) -> SchemaInfo {
        self.source.borrow().schema.clone()
    }

    pub fn columns(&self) -> ColumnVisibility {
        self.source.borrow().columns.clone()
    }

    pub fn visible_columns(&self) -> Vec<String> {
        self.source.borrow().columns.visible_columns()
    }

    pub fn query(&self) -> QueryModel {
        self.source.borrow().query.clone()
    }

    pub fn similarity_query(&self) -> SimilarityQuery {
        self.source.borrow().similarity.clone()
    }

    pub fn filters(&self) -> SearchFilters {
        self.source.borrow().filters.clone()
    }

    /// Record types the server offers for the active source
    pub fn available_record_sub_types(&self) -> Vec<String> {
        self.source.borrow().available_sub_types.clone()
    }

    pub fn results(&self) -> ResultSet {
        self.results.borrow().result_set.clone()
    }

    pub fn per_type_counts(&self) -> BTreeMap<String, u64> {
        self.results.borrow().result_set.per_type_counts().clone()
    }

    pub fn selection(&self) -> Selection {
        self.results.borrow().selection.clone()
    }

    pub fn import_session(&self) -> ImportStagingSession {
        self.imports.session()
    }

    /// Take every notice produced since the last drain
    pub fn drain_notices(&self) -> Vec<Notice> {
        self.notices.borrow_mut().drain()
    }

    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }

    /// Surface `error` to the operator when it is user-visible
    fn report(&self, error: ConsoleError) -> ConsoleError {
        if error.is_user_visible() {
            let notice = match &error {
                ConsoleError::Validation(_) | ConsoleError::SchemaLoad { .. } => {
                    Notice::warning(error.to_string())
                }
                ConsoleError::Staging(api) => {
                    Notice::error(format!("import failed: {}", describe_staging_error(api)))
                }
                _ => Notice::error(error.to_string()),
            };
            self.notify(notice);
        }
        error
    }

    fn is_current(&self, tag: DispatchTag) -> bool {
        self.source.borrow().tag() == tag
    }

    fn stale(&self, data_source: DataSourceId) -> ConsoleError {
        debug!(target: targets::SEARCH, "Dropping reply for {}: superseded", data_source);
        ConsoleError::StaleResponseIgnored { data_source }
    }

    // ---------------------------------------------------------------------
    // Query editing
    // ---------------------------------------------------------------------

    pub fn add_level(&self) {
        self.source.borrow_mut().query.add_level();
    }

    pub fn remove_level(&self, index: usize) -> ConsoleResult<()> {
        self.source
            .borrow_mut()
            .query
            .remove_level(index)
            .map(|_| ())
            .map_err(|e| self.report(e.into()))
    }

    pub fn set_level_keywords(&self, index: usize, keywords: &str) -> ConsoleResult<()> {
        let outcome = self
            .source
            .borrow_mut()
            .query
            .level_mut(index)
            .map(|level| level.keywords = keywords.to_string());
        outcome.map_err(|e| self.report(e.into()))
    }

    /// Set a level's target columns; may contain the select-all sentinel
    pub fn set_level_columns(&self, index: usize, columns: Vec<String>) -> ConsoleResult<()> {
        let mut source = self.source.borrow_mut();
        let searchable = source.schema.searchable_columns().to_vec();
        let outcome = source.query.set_level_columns(index, columns, &searchable);
        drop(source);
        outcome.map_err(|e| self.report(e.into()))
    }

    pub fn set_level_logic(&self, index: usize, logic: LogicOp) -> ConsoleResult<()> {
        let mut source = self.source.borrow_mut();
        let outcome = source.query.level_mut(index).map(|level| level.logic = logic);
        drop(source);
        outcome.map_err(|e| self.report(e.into()))
    }

    pub fn set_level_negate(&self, index: usize, negate: bool) -> ConsoleResult<()> {
        let mut source = self.source.borrow_mut();
        let outcome = source.query.level_mut(index).map(|level| level.negate = negate);
        drop(source);
        outcome.map_err(|e| self.report(e.into()))
    }

    pub fn set_similarity_text(&self, text: &str) {
        self.source.borrow_mut().similarity.text = text.to_string();
    }

    pub fn set_similarity_columns(&self, columns: Vec<String>) {
        self.source.borrow_mut().similarity.target_columns = columns;
    }

    pub fn set_record_sub_types(&self, types: Vec<String>) {
        self.source.borrow_mut().filters.record_sub_types = types;
    }

    /// Choices offered by the equipment type filter
    pub fn equipment_type_options(&self) -> &'static [&'static str] {
        &EQUIPMENT_TYPE_OPTIONS
    }

    pub fn set_equipment_types(&self, types: Vec<String>) {
        self.source.borrow_mut().filters.equipment_types = types;
    }

    /// Show exactly the chosen columns (the similarity column always stays)
    pub fn apply_column_selection(&self, columns: &[String]) {
        self.source.borrow_mut().columns.apply_user_selection(columns);
    }

    // ---------------------------------------------------------------------
    // Source switching
    // ---------------------------------------------------------------------

    /// Make `data_source` active.
    ///
    /// Schema, columns, query and results change together once the new
    /// schema is known. If the server cannot provide it, the static layout is
    /// used and a warning notice is raised. A switch overtaken by a later one
    /// returns `StaleResponseIgnored` and changes nothing.
    ///
    /// Requesting the source a pending switch is already heading for waits
    /// for that switch instead of starting another; if it did not settle
    /// (superseded, or its caller gave up) the switch is run again.
    pub async fn switch_data_source(&self, data_source: DataSourceId) -> ConsoleResult<()> {
        if self.is_settled_on(data_source) {
            return Ok(());
        }
        if self.source.borrow().requested == data_source {
            drop(self.transition.read().await);
            if self.is_settled_on(data_source) {
                return Ok(());
            }
            debug!(
                target: targets::SCHEMA,
                "Earlier switch to {} did not settle; retrying",
                data_source
            );
        }
        self.transition_to(data_source).await
    }

    /// Active and not about to change
    fn is_settled_on(&self, data_source: DataSourceId) -> bool {
        let source = self.source.borrow();
        source.data_source == data_source && source.requested == data_source
    }

    async fn transition_to(&self, data_source: DataSourceId) -> ConsoleResult<()> {
        let (from, seq) = {
            let mut source = self.source.borrow_mut();
            source.switch_seq += 1;
            source.generation += 1;
            source.requested = data_source;
            (source.data_source, source.switch_seq)
        };
        trace_source_switch!(from, data_source);

        let _guard = self.transition.write().await;
        if self.source.borrow().switch_seq != seq {
            return Err(self.stale(data_source));
        }

        let load = self.registry.load(data_source).await;
        if self.source.borrow().switch_seq != seq {
            return Err(self.stale(data_source));
        }

        {
            let mut source = self.source.borrow_mut();
            let mut next = SourceState::new(load.schema, source.filters.equipment_types.clone());
            next.switch_seq = source.switch_seq;
            next.generation = source.generation;
            *source = next;
        }
        self.results.borrow_mut().clear();
        let abandoned = self.imports.reset_for_source(data_source);

        info!(
            target: targets::SCHEMA,
            "Active source is now {} ({:?} schema)",
            data_source,
            load.origin
        );
        if let Some(error) = load.warning {
            self.report(ConsoleError::SchemaLoad { data_source, error });
        }

        self.refresh_sub_types(data_source, seq).await;
        if let Some((previous, token)) = abandoned {
            self.imports.notify_discard(previous, &token).await;
        }
        Ok(())
    }

    async fn refresh_sub_types(&self, data_source: DataSourceId, seq: u64) {
        let types = match self.registry.load_record_sub_types(data_source).await {
            Ok(types) => types,
            Err(error) => {
                warn!(target: targets::SCHEMA, "Record types for {} unavailable: {}", data_source, error);
                Vec::new()
            }
        };

        let mut source = self.source.borrow_mut();
        if source.switch_seq == seq && source.data_source == data_source {
            source.available_sub_types = types;
        }
    }

    /// Reload the active source's schema and record types, keeping the query
    /// and results. Target columns that no longer exist are dropped; a level
    /// left without targets gets the default search column.
    pub async fn refresh(&self) -> ConsoleResult<()> {
        let _guard = self.transition.write().await;
        self.reload_active_schema().await
    }

    async fn reload_active_schema(&self) -> ConsoleResult<()> {
        let (data_source, seq) = {
            let source = self.source.borrow();
            (source.data_source, source.switch_seq)
        };

        let load = self.registry.load(data_source).await;
        if self.source.borrow().switch_seq != seq {
            return Err(self.stale(data_source));
        }

        {
            let results = self.results.borrow();
            let mut source = self.source.borrow_mut();
            let source = &mut *source;
            source
                .columns
                .rebuild_for_source(&load.schema, Some(&results.result_set));
            for level in source.query.levels_mut() {
                level
                    .target_columns
                    .retain(|c| load.schema.all_columns().contains(c));
            }
            self.registry
                .ensure_default_search_target(source.query.levels_mut(), data_source);
            source
                .similarity
                .target_columns
                .retain(|c| load.schema.all_columns().contains(c));
            source.schema = load.schema;
        }

        if let Some(error) = load.warning {
            self.report(ConsoleError::SchemaLoad { data_source, error });
        }
        self.refresh_sub_types(data_source, seq).await;
        Ok(())
    }

    /// Back to one default level, default filters and no results
    pub fn reset(&self) {
        let mut source = self.source.borrow_mut();
        source.generation += 1;
        let schema = source.schema.clone();
        source.query.reset(&schema);
        source.similarity = SimilarityQuery::for_schema(&schema);
        source.filters = SearchFilters {
            record_sub_types: Vec::new(),
            equipment_types: self.config.search.default_equipment_types.clone(),
        };
        source.columns.remove_similarity_column();
        drop(source);

        self.results.borrow_mut().clear();
        debug!(target: targets::SEARCH, "Query reset");
    }

    // ---------------------------------------------------------------------
    // Searching
    // ---------------------------------------------------------------------

    /// Run the keyword query against the active source.
    ///
    /// On success the results are replaced; on failure they are cleared and
    /// the server's message is raised as a notice.
    pub async fn execute_keyword_search(&self) -> ConsoleResult<SearchStats> {
        let (tag, payload) = {
            let _gate = self.transition.read().await;
            let mut source = self.source.borrow_mut();
            source.query.ensure_non_empty();
            let payload = source.query.to_dispatch_payload(&source.filters);
            (source.tag(), payload)
        };
        let payload = payload.map_err(|e| self.report(e.into()))?;

        trace_dispatch!("keyword", tag.data_source, tag.generation);
        let outcome = self.executor.execute_keyword(&payload).await;
        self.land_search(tag, outcome)
    }

    /// Rank records by similarity to free text. Current results, if any, are
    /// re-ranked; otherwise the whole source is searched.
    pub async fn execute_similarity_search(&self) -> ConsoleResult<SearchStats> {
        let (tag, request) = {
            let _gate = self.transition.read().await;
            let source = self.source.borrow();
            let request = source.similarity.validate().map(|()| {
                self.executor.similarity_request(
                    &source.similarity,
                    source.data_source,
                    &self.results.borrow().result_set,
                )
            });
            (source.tag(), request)
        };
        let request = request.map_err(|e| self.report(e.into()))?;

        trace_dispatch!("similarity", tag.data_source, tag.generation);
        let outcome = self.executor.execute_similarity(&request).await;
        self.land_search(tag, outcome)
    }

    fn land_search(
        &self,
        tag: DispatchTag,
        outcome: Result<SearchExecutionResult, ApiError>,
    ) -> ConsoleResult<SearchStats> {
        if !self.is_current(tag) {
            return Err(self.stale(tag.data_source));
        }

        match outcome {
            Ok(result) => {
                {
                    let mut source = self.source.borrow_mut();
                    if result.result_set.has_similarity_column() {
                        source.columns.ensure_similarity_column();
                    } else {
                        source.columns.remove_similarity_column();
                    }
                }
                self.notify(Notice::info(result.status_message()));
                let stats = result.stats;
                self.results.borrow_mut().replace(result.result_set);
                Ok(stats)
            }
            Err(error) => {
                warn!(target: targets::SEARCH, "Search on {} failed: {}", tag.data_source, error);
                self.results.borrow_mut().clear();
                Err(self.report(ConsoleError::Dispatch(error)))
            }
        }
    }

    // ---------------------------------------------------------------------
    // Results
    // ---------------------------------------------------------------------

    /// Click on result row `index`, extending from the last click when
    /// `shift_held`
    pub fn select_row(&self, index: usize, shift_held: bool) -> ConsoleResult<()> {
        let clicked = {
            let mut results = self.results.borrow_mut();
            let results = &mut *results;
            results
                .selection
                .click(index, shift_held, results.result_set.len())
        };
        if clicked {
            Ok(())
        } else {
            Err(self.report(ValidationError::InvalidRow(index).into()))
        }
    }

    pub fn clear_selection(&self) {
        self.results.borrow_mut().selection.clear();
    }

    /// Selected rows as CSV over the visible columns
    pub fn export_csv(&self) -> ConsoleResult<String> {
        let columns = self.visible_columns();
        let results = self.results.borrow();
        let exported = DataExporter::export_csv(&results.result_set, &results.selection, &columns);
        drop(results);
        let csv = exported.map_err(|e| self.report(e.into()))?;
        info!(target: targets::EXPORT, "Exported {} rows as CSV", self.results.borrow().selection.len());
        Ok(csv)
    }

    /// Download name for the active source's CSV export
    pub fn export_file_name(&self) -> String {
        DataExporter::suggested_file_name(self.data_source())
    }

    /// Replace the current rows with a redacted copy
    pub async fn request_anonymize(&self) -> ConsoleResult<()> {
        let (tag, version, request) = {
            let _gate = self.transition.read().await;
            let source = self.source.borrow();
            let results = self.results.borrow();
            if results.result_set.is_empty() {
                drop(results);
                drop(source);
                return Err(self.report(ValidationError::EmptyResults.into()));
            }
            let request = AnonymizeRequest {
                results: results.result_set.rows().to_vec(),
                fields: anonymize_fields(source.data_source)
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
                data_source: source.data_source,
            };
            (source.tag(), results.version, request)
        };

        info!(
            target: targets::ANONYMIZE,
            "Redacting {} rows of {}",
            request.results.len(),
            tag.data_source
        );
        let outcome = self.backend.anonymize(&request).await;

        if !self.is_current(tag) || self.results.borrow().version != version {
            return Err(self.stale(tag.data_source));
        }

        let rows = outcome
            .and_then(|rows| {
                if rows.len() == request.results.len() {
                    Ok(rows)
                } else {
                    Err(ApiError::Malformed(format!(
                        "anonymize returned {} rows for {}",
                        rows.len(),
                        request.results.len()
                    )))
                }
            })
            .map_err(|e| self.report(ConsoleError::Dispatch(e)))?;

        let mut results = self.results.borrow_mut();
        results.result_set.replace_rows(rows);
        results.version += 1;
        drop(results);
        self.notify(Notice::success("results anonymized"));
        Ok(())
    }

    /// Hand the selected rows to the analysis view, returning how many
    pub fn export_for_analysis(&self) -> ConsoleResult<usize> {
        let columns = self.visible_columns();
        let data_source = self.data_source();
        let results = self.results.borrow();
        let payload = DataExporter::analysis_payload(
            &results.result_set,
            &results.selection,
            &columns,
            data_source,
            self.config.export.analysis_row_limit,
        );
        drop(results);
        let payload = payload.map_err(|e| self.report(e.into()))?;

        self.handoff
            .persist(&payload)
            .map_err(|e| self.report(ConsoleError::Handoff(format!("{:#}", e))))?;

        let count = payload.data.len();
        self.notify(Notice::success(format!("{} rows sent to analysis", count)));
        Ok(count)
    }

    // ---------------------------------------------------------------------
    // Import staging
    // ---------------------------------------------------------------------

    // Submissions and previews share the transition gate with the other
    // import steps, so they queue behind a confirm or cancel in flight.

    pub async fn submit_import_file(
        &self,
        file: ImportFile,
        data_source: DataSourceId,
    ) -> ConsoleResult<()> {
        let _gate = self.transition.read().await;
        self.imports
            .submit_file(file, data_source)
            .map_err(|e| self.report(e.into()))
    }

    pub async fn submit_manual_rows(
        &self,
        rows: Vec<ManualRow>,
        data_source: DataSourceId,
    ) -> ConsoleResult<()> {
        let _gate = self.transition.read().await;
        self.imports
            .submit_manual_rows(rows, data_source)
            .map_err(|e| self.report(e.into()))
    }

    pub async fn preview_import(&self) -> ConsoleResult<ImportCounts> {
        let gate = self.transition.read().await;
        let counts = self.imports.preview().await.map_err(|e| self.report(e))?;
        drop(gate);
        self.notify(Notice::info(format!(
            "{} uploaded, {} duplicates, {} new",
            counts.uploaded_count, counts.duplicate_count, counts.new_count
        )));
        Ok(counts)
    }

    /// Commit the previewed import, then reload the active source's schema
    /// and rerun the current query if it has one
    pub async fn confirm_import(&self) -> ConsoleResult<u64> {
        let guard = self.transition.write().await;
        let session = self.imports.session();
        let new_count = self.imports.confirm().await.map_err(|e| self.report(e))?;
        self.notify(Notice::success(format!(
            "imported {} rows into {}",
            new_count,
            session.data_source().label()
        )));

        if session.data_source() == self.data_source() {
            if let Err(error) = self.reload_active_schema().await {
                debug!(target: targets::IMPORT, "Post-import refresh skipped: {}", error);
            }
            drop(guard);
            if self.source.borrow().query.is_dispatchable() {
                if let Err(error) = self.execute_keyword_search().await {
                    debug!(target: targets::IMPORT, "Post-import search failed: {}", error);
                }
            }
        }
        Ok(new_count)
    }

    pub async fn cancel_import(&self) {
        let _guard = self.transition.write().await;
        let had_token = self.imports.session().staging_token().is_some();
        self.imports.cancel().await;
        if had_token {
            self.notify(Notice::info("import cancelled"));
        }
    }

    // ---------------------------------------------------------------------
    // Sensitive words
    // ---------------------------------------------------------------------

    pub async fn list_sensitive_words(&self) -> ConsoleResult<SensitiveWords> {
        self.words.list().await.map_err(|e| self.report(e))
    }

    pub async fn add_sensitive_word(&self, word: &str, category: WordCategory) -> ConsoleResult<()> {
        self.words
            .add(word, category)
            .await
            .map_err(|e| self.report(e))?;
        self.notify(Notice::success(format!("added {} to {}", word.trim(), category.label())));
        Ok(())
    }

    pub async fn remove_sensitive_word(
        &self,
        word: &str,
        category: WordCategory,
    ) -> ConsoleResult<()> {
        self.words
            .remove(word, category)
            .await
            .map_err(|e| self.report(e))?;
        self.notify(Notice::success(format!(
            "removed {} from {}",
            word.trim(),
            category.label()
        )));
        Ok(())
    }
}
