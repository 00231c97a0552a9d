//! Query model - the editable, per-source multi-level keyword query
//!
//! A query is an ordered list of [`SearchLevel`]s plus the auxiliary
//! filters. The server decides how levels combine; this module only keeps
//! the list well-formed and decides whether it is worth sending.

use crate::data_source::DataSourceId;
use crate::dynamic_schema::SchemaInfo;
use crate::error::ValidationError;
use crate::schema_config::SELECT_ALL_COLUMNS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicOp {
    #[default]
    And,
    Or,
}

/// One keyword clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLevel {
    pub keywords: String,
    #[serde(rename = "column_name")]
    pub target_columns: Vec<String>,
    pub logic: LogicOp,
    #[serde(rename = "negative_filtering")]
    pub negate: bool,
    /// Selection that "select all" replaced, restored when it is toggled off
    #[serde(skip)]
    columns_before_select_all: Option<Vec<String>>,
}

impl SearchLevel {
    pub fn new(default_column: &str) -> Self {
        Self {
            keywords: String::new(),
            target_columns: vec![default_column.to_string()],
            logic: LogicOp::And,
            negate: false,
            columns_before_select_all: None,
        }
    }

    /// Has both a keyword and a column to search
    pub fn is_dispatchable(&self) -> bool {
        !self.keywords.trim().is_empty() && !self.target_columns.is_empty()
    }

    /// Apply a column picker result. A [`SELECT_ALL_COLUMNS`] entry toggles
    /// between the full searchable set and the selection it replaced.
    pub fn set_columns(&mut self, columns: Vec<String>, searchable: &[String]) {
        let select_all = columns.iter().any(|c| c == SELECT_ALL_COLUMNS);
        if !select_all {
            self.target_columns = dedup(columns);
            self.columns_before_select_all = None;
            return;
        }

        if same_set(&self.target_columns, searchable) {
            self.target_columns = self.columns_before_select_all.take().unwrap_or_default();
        } else {
            self.columns_before_select_all = Some(std::mem::take(&mut self.target_columns));
            self.target_columns = searchable.to_vec();
        }
    }
}

fn dedup(columns: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    columns
        .into_iter()
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

fn same_set(a: &[String], b: &[String]) -> bool {
    let a: HashSet<&String> = a.iter().collect();
    let b: HashSet<&String> = b.iter().collect();
    a == b
}

/// Filters sent alongside the keyword levels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// Scoped to the active source; cleared on source change
    pub record_sub_types: Vec<String>,
    pub equipment_types: Vec<String>,
}

/// Body of a keyword search request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchPayload {
    pub data_source: DataSourceId,
    #[serde(rename = "search_levels")]
    pub levels: Vec<SearchLevel>,
    #[serde(rename = "data_types")]
    pub record_sub_types: Vec<String>,
    #[serde(rename = "aircraft_types")]
    pub equipment_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryModel {
    data_source: DataSourceId,
    default_column: String,
    levels: Vec<SearchLevel>,
}

impl QueryModel {
    /// One default level for `schema`'s source
    pub fn new(schema: &SchemaInfo) -> Self {
        let mut model = Self {
            data_source: schema.data_source(),
            default_column: schema.default_search_column().to_string(),
            levels: Vec::new(),
        };
        model.add_level();
        model
    }

    pub fn data_source(&self) -> DataSourceId {
        self.data_source
    }

    pub fn levels(&self) -> &[SearchLevel] {
        &self.levels
    }

    pub fn levels_mut(&mut self) -> &mut [SearchLevel] {
        &mut self.levels
    }

    pub fn add_level(&mut self) {
        self.levels.push(SearchLevel::new(&self.default_column));
    }

    /// Remove one level. The list may become empty; it is re-seeded before
    /// the next dispatch.
    pub fn remove_level(&mut self, index: usize) -> Result<SearchLevel, ValidationError> {
        if index >= self.levels.len() {
            return Err(ValidationError::InvalidLevel(index));
        }
        Ok(self.levels.remove(index))
    }

    pub fn level_mut(&mut self, index: usize) -> Result<&mut SearchLevel, ValidationError> {
        self.levels
            .get_mut(index)
            .ok_or(ValidationError::InvalidLevel(index))
    }

    pub fn set_level_columns(
        &mut self,
        index: usize,
        columns: Vec<String>,
        searchable: &[String],
    ) -> Result<(), ValidationError> {
        self.level_mut(index)?.set_columns(columns, searchable);
        Ok(())
    }

    /// Guarantee at least one level exists
    pub fn ensure_non_empty(&mut self) {
        if self.levels.is_empty() {
            self.add_level();
        }
    }

    pub fn is_dispatchable(&self) -> bool {
        self.levels.iter().any(SearchLevel::is_dispatchable)
    }

    pub fn to_dispatch_payload(
        &self,
        filters: &SearchFilters,
    ) -> Result<DispatchPayload, ValidationError> {
        if !self.is_dispatchable() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(DispatchPayload {
            data_source: self.data_source,
            levels: self.levels.clone(),
            record_sub_types: filters.record_sub_types.clone(),
            equipment_types: filters.equipment_types.clone(),
        })
    }

    /// Collapse to one default level for `schema`'s source
    pub fn reset(&mut self, schema: &SchemaInfo) {
        *self = Self::new(schema);
    }
}

/// Free-text similarity query, independent of the keyword levels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarityQuery {
    pub text: String,
    pub target_columns: Vec<String>,
}

impl SimilarityQuery {
    pub fn for_schema(schema: &SchemaInfo) -> Self {
        Self {
            text: String::new(),
            target_columns: vec![schema.default_search_column().to_string()],
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::BlankSimilarityText);
        }
        if self.target_columns.is_empty() {
            return Err(ValidationError::NoSimilarityColumns);
        }
        Ok(())
    }
}
