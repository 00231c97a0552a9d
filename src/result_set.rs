use crate::schema_config::{RECORD_TYPE_COLUMN, SIMILARITY_COLUMN, UNKNOWN_RECORD_TYPE};
use serde_json::Value;
use std::collections::BTreeMap;

/// One record as returned by the server. Only columns declared in the source
/// schema are assumed; similarity search may add `相似度`.
pub type ResultRow = serde_json::Map<String, Value>;

/// Current search results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: Vec<ResultRow>,
    total: u64,
    per_type_counts: BTreeMap<String, u64>,
}

impl ResultSet {
    pub fn from_rows(rows: Vec<ResultRow>, total: u64) -> Self {
        let per_type_counts = count_by_record_type(&rows);
        Self {
            rows,
            total,
            per_type_counts,
        }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&ResultRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn per_type_counts(&self) -> &BTreeMap<String, u64> {
        &self.per_type_counts
    }

    /// Whether any row carries a similarity score
    pub fn has_similarity_column(&self) -> bool {
        self.rows.iter().any(|row| row.contains_key(SIMILARITY_COLUMN))
    }

    /// Replace the rows in place, keeping `total`. Used after redaction,
    /// which must not change row order or count.
    pub fn replace_rows(&mut self, rows: Vec<ResultRow>) {
        self.per_type_counts = count_by_record_type(&rows);
        self.rows = rows;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.total = 0;
        self.per_type_counts.clear();
    }
}

fn count_by_record_type(rows: &[ResultRow]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for row in rows {
        let record_type = match row.get(RECORD_TYPE_COLUMN) {
            Some(Value::Null) | None => UNKNOWN_RECORD_TYPE.to_string(),
            Some(value) => {
                let text = cell_text(value);
                if text.is_empty() {
                    UNKNOWN_RECORD_TYPE.to_string()
                } else {
                    text
                }
            }
        };
        *counts.entry(record_type).or_insert(0) += 1;
    }
    counts
}

/// Render a cell for display or export
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Selected rows, by position in the current result set.
///
/// Positions are the row identity, so two rows with identical values are
/// still distinct selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// In the order rows were selected
    rows: Vec<usize>,
    last_clicked: Option<usize>,
}

impl Selection {
    /// Click on row `index` of a result set holding `row_count` rows.
    ///
    /// A shift-click with a previous anchor selects every row between the
    /// anchor and `index` inclusive; a plain click toggles `index` only.
    /// Either way `index` becomes the new anchor.
    pub fn click(&mut self, index: usize, shift_held: bool, row_count: usize) -> bool {
        if index >= row_count {
            return false;
        }

        match (shift_held, self.last_clicked) {
            (true, Some(anchor)) if anchor < row_count => {
                let (start, end) = if anchor <= index {
                    (anchor, index)
                } else {
                    (index, anchor)
                };
                for i in start..=end {
                    if !self.rows.contains(&i) {
                        self.rows.push(i);
                    }
                }
            }
            _ => {
                if let Some(pos) = self.rows.iter().position(|&i| i == index) {
                    self.rows.remove(pos);
                } else {
                    self.rows.push(index);
                }
            }
        }

        self.last_clicked = Some(index);
        true
    }

    pub fn indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn last_clicked(&self) -> Option<usize> {
        self.last_clicked
    }

    pub fn contains(&self, index: usize) -> bool {
        self.rows.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.last_clicked = None;
    }

    /// Selected rows of `results`, in selection order
    pub fn rows<'a>(&self, results: &'a ResultSet) -> Vec<&'a ResultRow> {
        self.rows.iter().filter_map(|&i| results.row(i)).collect()
    }
}
