// Static column layout per data source.
// Used until the server reports the real column list, and whenever it cannot.

use crate::data_source::DataSourceId;

/// Synthetic column injected by similarity search
pub const SIMILARITY_COLUMN: &str = "相似度";

/// Column used to group results into per-type counts
pub const RECORD_TYPE_COLUMN: &str = "数据类型";

/// Bucket for rows without a record type
pub const UNKNOWN_RECORD_TYPE: &str = "未知";

/// Sentinel entry in a column picker meaning "toggle all searchable columns"
pub const SELECT_ALL_COLUMNS: &str = "__select_all__";

/// Equipment (aircraft) types the filter offers
pub const EQUIPMENT_TYPE_OPTIONS: [&str; 3] = ["ARJ21", "C919", "无"];

pub struct SourceSchemaConfig {
    pub all_columns: &'static [&'static str],
    pub default_visible: &'static [&'static str],
    /// Preferred search targets; only those present in the column list are used
    pub searchable: &'static [&'static str],
    pub default_search_column: &'static str,
}

const CASE: SourceSchemaConfig = SourceSchemaConfig {
    all_columns: &[
        "故障发生日期",
        "申请时间",
        "标题",
        "版本号",
        "问题描述",
        "答复详情",
        "客户期望",
        "ATA",
        "机号/MSN",
        "运营人",
        "服务请求单编号",
        "机型",
        "数据类型",
    ],
    default_visible: &["申请时间", "问题描述", "答复详情", "机号/MSN", "运营人"],
    searchable: &["标题", "问题描述", "答复详情", "客户期望"],
    default_search_column: "问题描述",
};

const ENGINEERING: SourceSchemaConfig = SourceSchemaConfig {
    all_columns: &[
        "发布时间",
        "文件名称",
        "原因和说明",
        "文件类型",
        "MSN有效性",
        "原文文本",
        "机型",
        "数据类型",
    ],
    default_visible: &["发布时间", "文件名称", "原因和说明", "文件类型", "MSN有效性"],
    searchable: &["文件名称", "原因和说明", "原文文本"],
    default_search_column: "原因和说明",
};

const MANUAL: SourceSchemaConfig = SourceSchemaConfig {
    all_columns: &[
        "申请时间",
        "问题描述",
        "答复详情",
        "飞机序列号/注册号/运营人",
        "机型",
        "数据类型",
    ],
    default_visible: &["申请时间", "问题描述", "答复详情", "飞机序列号/注册号/运营人"],
    searchable: &["标题", "问题描述", "答复详情", "客户期望"],
    default_search_column: "问题描述",
};

const FAULTS: SourceSchemaConfig = SourceSchemaConfig {
    all_columns: &[
        "日期",
        "问题描述",
        "排故措施",
        "运营人",
        "飞机序列号",
        "机号",
        "机型",
        "数据类型",
    ],
    default_visible: &["日期", "问题描述", "排故措施", "运营人", "飞机序列号", "机号"],
    searchable: &["问题描述", "排故措施"],
    default_search_column: "问题描述",
};

const R_AND_I_RECORD: SourceSchemaConfig = SourceSchemaConfig {
    all_columns: &[
        "日期",
        "维修ATA",
        "问题描述",
        "排故措施",
        "运营人",
        "机型",
        "飞机序列号",
        "机号",
        "数据类型",
        "拆卸部件件号",
        "拆卸部件序列号",
        "装上部件件号",
        "装上部件序列号",
    ],
    default_visible: &[
        "日期",
        "问题描述",
        "排故措施",
        "运营人",
        "飞机序列号",
        "机号",
        "拆卸部件件号",
        "装上部件件号",
    ],
    searchable: &["问题描述", "排故措施"],
    default_search_column: "问题描述",
};

pub fn source_config(source: DataSourceId) -> &'static SourceSchemaConfig {
    match source {
        DataSourceId::Case => &CASE,
        DataSourceId::Engineering => &ENGINEERING,
        DataSourceId::Manual => &MANUAL,
        DataSourceId::Faults => &FAULTS,
        DataSourceId::RAndIRecord => &R_AND_I_RECORD,
    }
}

/// Fields sent for redaction when anonymizing results of a source
pub fn anonymize_fields(source: DataSourceId) -> &'static [&'static str] {
    match source {
        DataSourceId::Engineering => &["原因和说明", "原文文本", "文件名称"],
        DataSourceId::Faults | DataSourceId::RAndIRecord => &["问题描述", "排故措施"],
        DataSourceId::Case | DataSourceId::Manual => {
            &["标题", "问题描述", "答复详情", "客户期望", "机号/MSN", "运营人"]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_search_column_is_a_listed_column() {
        for source in DataSourceId::ALL {
            let config = source_config(source);
            assert!(
                config.all_columns.contains(&config.default_search_column),
                "{source}"
            );
            assert!(config.searchable.contains(&config.default_search_column));
            for col in config.default_visible {
                assert!(config.all_columns.contains(col), "{source}: {col}");
            }
        }
    }

    #[test]
    fn test_fault_reports_redact_free_text_only() {
        assert_eq!(
            anonymize_fields(DataSourceId::Faults),
            &["问题描述", "排故措施"]
        );
        assert!(anonymize_fields(DataSourceId::Case).contains(&"机号/MSN"));
    }
}
