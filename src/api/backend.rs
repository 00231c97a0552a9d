use crate::api::models::{
    AnonymizeRequest, SearchReply, SensitiveWords, SimilarityRequest, StagedPreview, WordCategory,
};
use crate::data_source::DataSourceId;
use crate::error::ApiError;
use crate::query_model::DispatchPayload;
use crate::result_set::ResultRow;
use crate::services::import_staging_service::{ImportFile, ManualRow};
use async_trait::async_trait;

/// Everything the controller needs from the record server.
///
/// Futures are `?Send`: the controller runs on a single cooperative thread
/// and shares state through `RefCell`s.
#[async_trait(?Send)]
pub trait SearchBackend {
    async fn fetch_columns(&self, source: DataSourceId) -> Result<Vec<String>, ApiError>;

    async fn fetch_record_sub_types(&self, source: DataSourceId) -> Result<Vec<String>, ApiError>;

    async fn keyword_search(&self, payload: &DispatchPayload) -> Result<SearchReply, ApiError>;

    async fn similarity_search(&self, request: &SimilarityRequest)
        -> Result<SearchReply, ApiError>;

    /// Upload a spreadsheet for staging
    async fn preview_file(
        &self,
        source: DataSourceId,
        file: &ImportFile,
    ) -> Result<StagedPreview, ApiError>;

    /// Stage manually entered rows
    async fn preview_rows(
        &self,
        source: DataSourceId,
        rows: &[ManualRow],
    ) -> Result<StagedPreview, ApiError>;

    /// Commit a staged import, returning the number of rows added
    async fn confirm_import(&self, source: DataSourceId, token: &str) -> Result<u64, ApiError>;

    async fn cancel_import(&self, source: DataSourceId, token: &str) -> Result<(), ApiError>;

    /// Redacted copy of `request.results`
    async fn anonymize(&self, request: &AnonymizeRequest) -> Result<Vec<ResultRow>, ApiError>;

    async fn list_sensitive_words(&self) -> Result<SensitiveWords, ApiError>;

    async fn add_sensitive_word(&self, word: &str, category: WordCategory)
        -> Result<(), ApiError>;

    async fn remove_sensitive_word(
        &self,
        word: &str,
        category: WordCategory,
    ) -> Result<(), ApiError>;
}
