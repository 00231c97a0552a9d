use crate::data_source::DataSourceId;

/// Failure talking to the record server.
///
/// Responses are decoded strictly: a payload that does not match the expected
/// shape is `Malformed`, never scraped for partial data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    /// The server answered with a non-success status and (optionally) a
    /// structured reason.
    #[error("{message}")]
    Rejected {
        message: String,
        error_type: Option<String>,
        missing_columns: Vec<String>,
    },
}

impl ApiError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ApiError::Rejected {
            message: message.into(),
            error_type: None,
            missing_columns: Vec::new(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Malformed(err.to_string())
    }
}

/// Local input problems. These are reported immediately and never reach the
/// network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("enter a keyword and choose at least one search column")]
    EmptyQuery,

    #[error("enter text for the similarity search")]
    BlankSimilarityText,

    #[error("choose at least one column for the similarity search")]
    NoSimilarityColumns,

    #[error("no search level at index {0}")]
    InvalidLevel(usize),

    #[error("no result row at index {0}")]
    InvalidRow(usize),

    #[error("select rows to export first")]
    EmptyExport,

    #[error("there are no results to process")]
    EmptyResults,

    #[error("{count} rows selected; select at most {limit} rows for analysis")]
    SelectionTooLarge { count: usize, limit: usize },

    #[error("unsupported file {file_name}: upload an Excel file (.xlsx or .xls)")]
    UnsupportedFileType { file_name: String },

    #[error("file {file_name} is {size} bytes; the limit is {limit} bytes")]
    FileTooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },

    #[error("fill in at least one cell before importing")]
    EmptyManualRows,

    #[error("no import has been submitted or previewed")]
    NoStagedImport,

    #[error("sensitive word must not be blank")]
    BlankSensitiveWord,
}

/// Error taxonomy for controller operations.
///
/// Every variant leaves the controller in a well-defined prior state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Schema metadata could not be fetched; a fallback schema is in use.
    #[error("column metadata for {data_source} unavailable: {error}")]
    SchemaLoad {
        data_source: DataSourceId,
        error: ApiError,
    },

    #[error("search failed: {0}")]
    Dispatch(ApiError),

    #[error("import failed: {0}")]
    Staging(ApiError),

    /// A response arrived for a request whose target is no longer current.
    #[error("response for {data_source} ignored: superseded by a newer request")]
    StaleResponseIgnored { data_source: DataSourceId },

    #[error("sensitive word dictionary request failed: {0}")]
    Dictionary(ApiError),

    #[error("analysis hand-off failed: {0}")]
    Handoff(String),
}

impl ConsoleError {
    /// Whether the operator should see this failure
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ConsoleError::StaleResponseIgnored { .. })
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
