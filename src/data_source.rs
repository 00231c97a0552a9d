use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one record collection the console can search or import into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceId {
    /// Service-request cases
    Case,
    /// Engineering documents
    Engineering,
    /// Manual answers
    Manual,
    /// Fault reports
    Faults,
    /// Part removal and installation records
    RAndIRecord,
}

impl DataSourceId {
    pub const ALL: [DataSourceId; 5] = [
        DataSourceId::Case,
        DataSourceId::Engineering,
        DataSourceId::Manual,
        DataSourceId::Faults,
        DataSourceId::RAndIRecord,
    ];

    /// Wire name used in URLs and request bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceId::Case => "case",
            DataSourceId::Engineering => "engineering",
            DataSourceId::Manual => "manual",
            DataSourceId::Faults => "faults",
            DataSourceId::RAndIRecord => "r_and_i_record",
        }
    }

    /// Operator-facing label
    pub fn label(&self) -> &'static str {
        match self {
            DataSourceId::Case => "快响信息",
            DataSourceId::Engineering => "工程文件",
            DataSourceId::Manual => "手册",
            DataSourceId::Faults => "故障报告",
            DataSourceId::RAndIRecord => "部件拆换记录",
        }
    }
}

impl Default for DataSourceId {
    fn default() -> Self {
        DataSourceId::Case
    }
}

impl fmt::Display for DataSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data source: {0}")]
pub struct UnknownDataSource(pub String);

impl FromStr for DataSourceId {
    type Err = UnknownDataSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataSourceId::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == s.trim())
            .ok_or_else(|| UnknownDataSource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip_through_from_str() {
        for source in DataSourceId::ALL {
            assert_eq!(source.as_str().parse::<DataSourceId>(), Ok(source));
        }
        assert!("cases".parse::<DataSourceId>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&DataSourceId::RAndIRecord).unwrap();
        assert_eq!(json, "\"r_and_i_record\"");
        let parsed: DataSourceId = serde_json::from_str("\"faults\"").unwrap();
        assert_eq!(parsed, DataSourceId::Faults);
    }
}
