use crate::dynamic_schema::SchemaInfo;
use crate::logging::targets;
use crate::result_set::ResultSet;
use crate::schema_config::SIMILARITY_COLUMN;
use std::collections::HashMap;
use tracing::debug;

/// Which columns of the active source are shown.
///
/// The map is keyed by exactly `all_columns`. It is replaced wholesale on a
/// source change, never patched key by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnVisibility {
    all_columns: Vec<String>,
    visible: HashMap<String, bool>,
}

impl ColumnVisibility {
    pub fn for_schema(schema: &SchemaInfo) -> Self {
        let mut columns = Self::default();
        columns.rebuild_for_source(schema, None);
        columns
    }

    /// Reseed from `schema`'s defaults. A similarity column present in
    /// `results` survives, first and visible.
    pub fn rebuild_for_source(&mut self, schema: &SchemaInfo, results: Option<&ResultSet>) {
        let mut all_columns = schema.all_columns().to_vec();
        let mut visible: HashMap<String, bool> = all_columns
            .iter()
            .map(|c| (c.clone(), schema.is_default_visible(c)))
            .collect();

        if results.is_some_and(ResultSet::has_similarity_column) {
            all_columns.retain(|c| c != SIMILARITY_COLUMN);
            all_columns.insert(0, SIMILARITY_COLUMN.to_string());
            visible.insert(SIMILARITY_COLUMN.to_string(), true);
        }

        debug!(
            target: targets::COLUMNS,
            "Rebuilt columns for {}: {} total",
            schema.data_source(),
            all_columns.len()
        );
        self.all_columns = all_columns;
        self.visible = visible;
    }

    /// Show exactly `selected ∩ all_columns`, plus the similarity column
    pub fn apply_user_selection(&mut self, selected: &[String]) {
        for (column, shown) in self.visible.iter_mut() {
            *shown = column == SIMILARITY_COLUMN || selected.iter().any(|s| s == column);
        }
    }

    /// Visible columns in `all_columns` order, similarity column first
    pub fn visible_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .all_columns
            .iter()
            .filter(|c| self.is_visible(c))
            .cloned()
            .collect();
        if let Some(pos) = columns.iter().position(|c| c == SIMILARITY_COLUMN) {
            let similarity = columns.remove(pos);
            columns.insert(0, similarity);
        }
        columns
    }

    /// Prepend the similarity column if missing and make it visible
    pub fn ensure_similarity_column(&mut self) {
        if !self.all_columns.iter().any(|c| c == SIMILARITY_COLUMN) {
            self.all_columns.insert(0, SIMILARITY_COLUMN.to_string());
        }
        self.visible.insert(SIMILARITY_COLUMN.to_string(), true);
    }

    pub fn remove_similarity_column(&mut self) {
        self.all_columns.retain(|c| c != SIMILARITY_COLUMN);
        self.visible.remove(SIMILARITY_COLUMN);
    }

    pub fn all_columns(&self) -> &[String] {
        &self.all_columns
    }

    pub fn is_visible(&self, column: &str) -> bool {
        self.visible.get(column).copied().unwrap_or(false)
    }

    pub fn visibility(&self) -> &HashMap<String, bool> {
        &self.visible
    }
}
