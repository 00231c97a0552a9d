use crate::api::SearchBackend;
use crate::data_source::DataSourceId;
use crate::error::ApiError;
use crate::logging::targets;
use crate::query_model::SearchLevel;
use crate::schema_config::source_config;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Column metadata of one data source.
///
/// Invariants: `all_columns` is unique and non-empty,
/// `default_search_column ∈ searchable_columns ⊆ all_columns` and
/// `default_visible_columns ⊆ all_columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    data_source: DataSourceId,
    all_columns: Vec<String>,
    default_visible_columns: Vec<String>,
    searchable_columns: Vec<String>,
    default_search_column: String,
}

impl SchemaInfo {
    /// Static layout for `source`
    pub fn fallback(source: DataSourceId) -> Self {
        let config = source_config(source);
        let all = config.all_columns.iter().map(|c| c.to_string()).collect();
        Self::build(source, all)
    }

    /// Build from a server-reported column list, keeping the static
    /// defaults for visibility and search targets where those columns exist.
    pub fn from_columns(source: DataSourceId, columns: Vec<String>) -> Result<Self, ApiError> {
        let mut seen = HashSet::new();
        let all_columns: Vec<String> = columns
            .into_iter()
            .filter(|c| !c.trim().is_empty() && seen.insert(c.clone()))
            .collect();
        if all_columns.is_empty() {
            return Err(ApiError::Malformed(format!("no columns for {}", source)));
        }

        let default_search_column = source_config(source).default_search_column;
        if !all_columns.iter().any(|c| c == default_search_column) {
            return Err(ApiError::Malformed(format!(
                "column list for {} lacks search column {}",
                source, default_search_column
            )));
        }

        Ok(Self::build(source, all_columns))
    }

    fn build(source: DataSourceId, all_columns: Vec<String>) -> Self {
        let config = source_config(source);
        let present = |c: &&&str| all_columns.iter().any(|a| a == **c);

        let default_visible_columns = config
            .default_visible
            .iter()
            .filter(present)
            .map(|c| c.to_string())
            .collect();
        let searchable_columns = config
            .searchable
            .iter()
            .filter(present)
            .map(|c| c.to_string())
            .collect();

        Self {
            data_source: source,
            default_search_column: config.default_search_column.to_string(),
            all_columns,
            default_visible_columns,
            searchable_columns,
        }
    }

    pub fn data_source(&self) -> DataSourceId {
        self.data_source
    }

    pub fn all_columns(&self) -> &[String] {
        &self.all_columns
    }

    pub fn default_visible_columns(&self) -> &[String] {
        &self.default_visible_columns
    }

    pub fn searchable_columns(&self) -> &[String] {
        &self.searchable_columns
    }

    pub fn default_search_column(&self) -> &str {
        &self.default_search_column
    }

    pub fn is_default_visible(&self, column: &str) -> bool {
        self.default_visible_columns.iter().any(|c| c == column)
    }
}

/// Where a loaded schema came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOrigin {
    Server,
    /// An earlier successful fetch, reused because the server failed
    Cached,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaLoad {
    pub schema: SchemaInfo,
    pub origin: SchemaOrigin,
    /// Set when the server fetch failed
    pub warning: Option<ApiError>,
}

/// Per-source schema store.
///
/// Starts from the static table; every successful fetch overwrites the entry
/// for the rest of the process. A failed fetch never throws: the caller gets
/// the last good schema (or the static one) plus a warning.
pub struct SchemaRegistry {
    backend: Rc<dyn SearchBackend>,
    fetched: RefCell<HashMap<DataSourceId, SchemaInfo>>,
}

impl SchemaRegistry {
    pub fn new(backend: Rc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            fetched: RefCell::new(HashMap::new()),
        }
    }

    /// Best schema known without a network call
    fn current(&self, source: DataSourceId) -> SchemaInfo {
        self.fetched
            .borrow()
            .get(&source)
            .cloned()
            .unwrap_or_else(|| SchemaInfo::fallback(source))
    }

    pub async fn load(&self, source: DataSourceId) -> SchemaLoad {
        debug!(target: targets::SCHEMA, "Fetching columns for {}", source);

        let fetched = self
            .backend
            .fetch_columns(source)
            .await
            .and_then(|columns| SchemaInfo::from_columns(source, columns));

        match fetched {
            Ok(schema) => {
                info!(
                    target: targets::SCHEMA,
                    "Loaded {} columns for {}",
                    schema.all_columns().len(),
                    source
                );
                self.fetched.borrow_mut().insert(source, schema.clone());
                SchemaLoad {
                    schema,
                    origin: SchemaOrigin::Server,
                    warning: None,
                }
            }
            Err(error) => {
                let cached = self.fetched.borrow().get(&source).cloned();
                let (schema, origin) = match cached {
                    Some(schema) => (schema, SchemaOrigin::Cached),
                    None => (SchemaInfo::fallback(source), SchemaOrigin::Fallback),
                };
                warn!(
                    target: targets::SCHEMA,
                    "Column fetch for {} failed ({}); using {:?} schema",
                    source, error, origin
                );
                SchemaLoad {
                    schema,
                    origin,
                    warning: Some(error),
                }
            }
        }
    }

    pub async fn load_record_sub_types(&self, source: DataSourceId) -> Result<Vec<String>, ApiError> {
        let types = self.backend.fetch_record_sub_types(source).await?;
        debug!(target: targets::SCHEMA, "{} record types for {}", types.len(), source);
        Ok(types)
    }

    /// Give every level without target columns the source's default column
    pub fn ensure_default_search_target(&self, levels: &mut [SearchLevel], source: DataSourceId) {
        let schema = self.current(source);
        for level in levels.iter_mut().filter(|l| l.target_columns.is_empty()) {
            level.target_columns = vec![schema.default_search_column().to_string()];
        }
    }
}
