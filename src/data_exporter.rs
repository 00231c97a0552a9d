use crate::data_source::DataSourceId;
use crate::error::ValidationError;
use crate::result_set::{cell_text, ResultRow, ResultSet, Selection};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Byte-order mark so spreadsheet tools detect UTF-8
const UTF8_BOM: char = '\u{FEFF}';

/// Rows handed to the external analysis view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub data: Vec<ResultRow>,
    pub columns: Vec<String>,
    #[serde(rename = "dataSource")]
    pub data_source: DataSourceId,
}

/// Handles exporting selected result rows
pub struct DataExporter;

impl DataExporter {
    /// Selected rows as CSV text, in selection order, limited to `columns`
    pub fn export_csv(
        results: &ResultSet,
        selection: &Selection,
        columns: &[String],
    ) -> Result<String, ValidationError> {
        let rows = selection.rows(results);
        if rows.is_empty() {
            return Err(ValidationError::EmptyExport);
        }

        let mut out = String::new();
        out.push(UTF8_BOM);

        let header: Vec<String> = columns.iter().map(|c| Self::escape_csv_field(c)).collect();
        out.push_str(&header.join(","));
        out.push('\n');

        for row in rows {
            let line: Vec<String> = columns
                .iter()
                .map(|column| {
                    let text = row.get(column).map(cell_text).unwrap_or_default();
                    Self::escape_csv_field(&text)
                })
                .collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }

        Ok(out)
    }

    /// Selected rows packaged for analysis, rejecting selections over `limit`
    pub fn analysis_payload(
        results: &ResultSet,
        selection: &Selection,
        columns: &[String],
        data_source: DataSourceId,
        limit: usize,
    ) -> Result<AnalysisPayload, ValidationError> {
        let rows = selection.rows(results);
        if rows.is_empty() {
            return Err(ValidationError::EmptyExport);
        }
        if rows.len() > limit {
            return Err(ValidationError::SelectionTooLarge {
                count: rows.len(),
                limit,
            });
        }

        Ok(AnalysisPayload {
            data: rows.into_iter().cloned().collect(),
            columns: columns.to_vec(),
            data_source,
        })
    }

    /// File name for a download of `source`'s selection
    pub fn suggested_file_name(data_source: DataSourceId) -> String {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        format!("{}_results_{}.csv", data_source.as_str(), timestamp)
    }

    /// Helper to escape CSV fields that contain special characters
    fn escape_csv_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
        {
            // Escape quotes by doubling them and wrap field in quotes
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}
