use crate::api::models::SimilarityRequest;
use crate::api::{SearchBackend, SearchReply};
use crate::data_source::DataSourceId;
use crate::error::ApiError;
use crate::logging::targets;
use crate::query_model::{DispatchPayload, SimilarityQuery};
use crate::result_set::ResultSet;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Keyword,
    Similarity,
}

/// Result of executing a search
#[derive(Debug, Clone)]
pub struct SearchExecutionResult {
    /// Rows to display, with per-type counts already derived
    pub result_set: ResultSet,

    pub stats: SearchStats,

    pub kind: SearchKind,
}

/// Statistics about search execution
#[derive(Debug, Clone, Copy)]
pub struct SearchStats {
    pub row_count: usize,
    pub total: u64,
    pub execution_time: Duration,
}

/// Service responsible for sending searches and shaping their replies
pub struct QueryExecutionService {
    backend: Rc<dyn SearchBackend>,
    similarity_limit: usize,
}

impl QueryExecutionService {
    pub fn new(backend: Rc<dyn SearchBackend>, similarity_limit: usize) -> Self {
        Self {
            backend,
            similarity_limit,
        }
    }

    pub async fn execute_keyword(
        &self,
        payload: &DispatchPayload,
    ) -> Result<SearchExecutionResult, ApiError> {
        let start = Instant::now();
        let reply = self.backend.keyword_search(payload).await?;
        Ok(Self::build_result(reply, SearchKind::Keyword, start))
    }

    /// Request for `query`. Non-empty `current` results are sent along to be
    /// re-ranked instead of searching the whole source.
    pub fn similarity_request(
        &self,
        query: &SimilarityQuery,
        data_source: DataSourceId,
        current: &ResultSet,
    ) -> SimilarityRequest {
        let results = if current.is_empty() {
            None
        } else {
            Some(current.rows().to_vec())
        };
        SimilarityRequest {
            text: query.text.trim().to_string(),
            columns: query.target_columns.clone(),
            data_source,
            results,
            limit: self.similarity_limit,
        }
    }

    pub async fn execute_similarity(
        &self,
        request: &SimilarityRequest,
    ) -> Result<SearchExecutionResult, ApiError> {
        debug!(
            target: targets::SEARCH,
            "Similarity over {} ({} rows supplied)",
            request.columns.join(","),
            request.results.as_ref().map_or(0, Vec::len)
        );
        let start = Instant::now();
        let mut reply = self.backend.similarity_search(request).await?;
        // the ranked list is the whole answer
        reply.total = reply.rows.len() as u64;
        Ok(Self::build_result(reply, SearchKind::Similarity, start))
    }

    fn build_result(reply: SearchReply, kind: SearchKind, start: Instant) -> SearchExecutionResult {
        let result_set = ResultSet::from_rows(reply.rows, reply.total);
        let stats = SearchStats {
            row_count: result_set.len(),
            total: result_set.total(),
            execution_time: start.elapsed(),
        };
        info!(
            target: targets::SEARCH,
            "{:?} search returned {} rows (total {}) in {} ms",
            kind,
            stats.row_count,
            stats.total,
            stats.execution_time.as_millis()
        );
        SearchExecutionResult {
            result_set,
            stats,
            kind,
        }
    }
}

impl SearchExecutionResult {
    /// Generate a user-friendly status message
    pub fn status_message(&self) -> String {
        let label = match self.kind {
            SearchKind::Keyword => "Search",
            SearchKind::Similarity => "Similarity search",
        };
        if self.stats.row_count == 0 {
            return format!("{}: no matching records", label);
        }
        format!(
            "{}: {} records{} ({} ms)",
            label,
            self.stats.row_count,
            if self.stats.total > self.stats.row_count as u64 {
                format!(" of {}", self.stats.total)
            } else {
                String::new()
            },
            self.stats.execution_time.as_millis()
        )
    }
}
