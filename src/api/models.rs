use crate::data_source::DataSourceId;
use crate::error::ApiError;
use crate::result_set::ResultRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The server flags success either with `"status": "success"` or
/// `"success": true`, depending on the endpoint.
fn is_success(status: Option<&str>, success: Option<bool>) -> bool {
    success == Some(true) || status == Some("success")
}

fn rejected(message: Option<String>, fallback: &str) -> ApiError {
    ApiError::rejected(message.unwrap_or_else(|| fallback.to_string()))
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ColumnsResponse {
    pub success: Option<bool>,
    pub status: Option<String>,
    pub columns: Option<Vec<String>>,
    pub message: Option<String>,
}

impl ColumnsResponse {
    pub fn into_columns(self) -> Result<Vec<String>, ApiError> {
        if !is_success(self.status.as_deref(), self.success) {
            return Err(rejected(self.message, "failed to fetch columns"));
        }
        let columns = self
            .columns
            .ok_or_else(|| ApiError::Malformed("response has no columns field".to_string()))?;
        if columns.is_empty() {
            return Err(ApiError::Malformed("column list is empty".to_string()));
        }
        Ok(columns)
    }
}

#[derive(Debug, Deserialize)]
pub struct SubTypesResponse {
    pub status: String,
    pub types: Option<Vec<String>>,
    pub message: Option<String>,
}

impl SubTypesResponse {
    pub fn into_types(self) -> Result<Vec<String>, ApiError> {
        if !is_success(Some(&self.status), None) {
            return Err(rejected(self.message, "failed to fetch record types"));
        }
        Ok(self.types.unwrap_or_default())
    }
}

/// Rows returned by a keyword or similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReply {
    pub rows: Vec<ResultRow>,
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    pub data: Option<Vec<ResultRow>>,
    pub total: Option<u64>,
    pub message: Option<String>,
}

impl SearchResponse {
    pub fn into_reply(self) -> Result<SearchReply, ApiError> {
        if !is_success(Some(&self.status), None) {
            return Err(rejected(self.message, "search failed"));
        }
        let rows = self.data.unwrap_or_default();
        let total = self.total.unwrap_or(rows.len() as u64);
        Ok(SearchReply { rows, total })
    }

    pub fn into_rows(self) -> Result<Vec<ResultRow>, ApiError> {
        if !is_success(Some(&self.status), None) {
            return Err(rejected(self.message, "request failed"));
        }
        self.data
            .ok_or_else(|| ApiError::Malformed("response has no data field".to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCounts {
    pub original_count: u64,
    pub uploaded_count: u64,
    pub duplicate_count: u64,
    pub new_count: u64,
    pub final_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct PreviewPayload {
    #[serde(default)]
    pub original_count: u64,
    #[serde(default)]
    pub uploaded_count: u64,
    #[serde(default)]
    pub duplicate_count: u64,
    #[serde(default)]
    pub new_count: u64,
    #[serde(default)]
    pub final_count: u64,
    #[serde(default)]
    pub preview_rows: Vec<ResultRow>,
    #[serde(default)]
    pub columns: Vec<String>,
}

/// A successful import preview: the staging token plus what would change
#[derive(Debug, Clone, PartialEq)]
pub struct StagedPreview {
    pub token: String,
    pub counts: ImportCounts,
    pub preview_rows: Vec<ResultRow>,
    pub columns: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewResponse {
    pub status: String,
    pub temp_id: Option<String>,
    #[serde(alias = "data")]
    pub preview: Option<PreviewPayload>,
    pub error_type: Option<String>,
    pub missing_columns: Option<Vec<String>>,
    pub message: Option<String>,
}

impl PreviewResponse {
    pub fn into_staged(self) -> Result<StagedPreview, ApiError> {
        if !is_success(Some(&self.status), None) {
            return Err(ApiError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "import preview failed".to_string()),
                error_type: self.error_type,
                missing_columns: self.missing_columns.unwrap_or_default(),
            });
        }
        let token = self
            .temp_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ApiError::Malformed("preview has no temp_id".to_string()))?;

        let (counts, preview_rows, columns) = match self.preview {
            Some(p) => (
                ImportCounts {
                    original_count: p.original_count,
                    uploaded_count: p.uploaded_count,
                    duplicate_count: p.duplicate_count,
                    new_count: p.new_count,
                    final_count: p.final_count,
                },
                p.preview_rows,
                p.columns,
            ),
            None => (ImportCounts::default(), Vec::new(), Vec::new()),
        };

        Ok(StagedPreview {
            token,
            counts,
            preview_rows,
            columns,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmData {
    pub new_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmResponse {
    pub status: String,
    pub data: Option<ConfirmData>,
    pub message: Option<String>,
}

impl ConfirmResponse {
    pub fn into_new_count(self) -> Result<u64, ApiError> {
        if !is_success(Some(&self.status), None) {
            return Err(rejected(self.message, "import confirmation failed"));
        }
        self.data
            .map(|d| d.new_count)
            .ok_or_else(|| ApiError::Malformed("confirmation has no data.new_count".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn into_ack(self) -> Result<(), ApiError> {
        if is_success(Some(&self.status), None) {
            Ok(())
        } else {
            Err(rejected(self.message, "request failed"))
        }
    }
}

/// Categories of the server-side sensitive word dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordCategory {
    RegistrationNumbers,
    Organizations,
    Aircraft,
    Locations,
    Other,
}

impl WordCategory {
    pub fn label(&self) -> &'static str {
        match self {
            WordCategory::RegistrationNumbers => "机号/MSN",
            WordCategory::Organizations => "组织机构",
            WordCategory::Aircraft => "设备型号",
            WordCategory::Locations => "地点",
            WordCategory::Other => "其他",
        }
    }
}

pub type SensitiveWords = BTreeMap<WordCategory, Vec<String>>;

#[derive(Debug, Deserialize)]
pub struct SensitiveWordsResponse {
    pub status: String,
    pub words: Option<SensitiveWords>,
    pub message: Option<String>,
}

impl SensitiveWordsResponse {
    pub fn into_words(self) -> Result<SensitiveWords, ApiError> {
        if !is_success(Some(&self.status), None) {
            return Err(rejected(self.message, "failed to fetch sensitive words"));
        }
        self.words
            .ok_or_else(|| ApiError::Malformed("response has no words field".to_string()))
    }
}

/// Body of a non-2xx reply. Every field is optional because proxies and the
/// framework's own error pages do not follow the envelope.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error_type: Option<String>,
    pub missing_columns: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityRequest {
    pub text: String,
    pub columns: Vec<String>,
    #[serde(rename = "dataSource")]
    pub data_source: DataSourceId,
    /// Rows to re-rank; absent means search the whole source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ResultRow>>,
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct ManualPreviewRequest<'a, R: Serialize> {
    pub data: &'a [R],
    #[serde(rename = "dataSource")]
    pub data_source: DataSourceId,
}

#[derive(Debug, Serialize)]
pub struct ConfirmRequest<'a> {
    pub temp_id: &'a str,
    #[serde(rename = "dataSource")]
    pub data_source: DataSourceId,
}

#[derive(Debug, Serialize)]
pub struct CancelRequest<'a> {
    pub temp_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnonymizeRequest {
    pub results: Vec<ResultRow>,
    pub fields: Vec<String>,
    #[serde(rename = "dataSource")]
    pub data_source: DataSourceId,
}

#[derive(Debug, Serialize)]
pub struct SensitiveWordRequest<'a> {
    pub word: &'a str,
    pub category: WordCategory,
}
