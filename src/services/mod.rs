pub mod import_staging_service;
pub mod query_execution_service;
pub mod sensitive_word_service;

pub use import_staging_service::{
    ImportFile, ImportInput, ImportStagingService, ImportStagingSession, ManualRow, StagingState,
};
pub use query_execution_service::{
    QueryExecutionService, SearchExecutionResult, SearchKind, SearchStats,
};
pub use sensitive_word_service::SensitiveWordService;
