use crate::data_source::DataSourceId;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub import: ImportConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the record server, without a trailing slash
    pub base_url: String,

    /// Per-request timeout. Uploads of large spreadsheets are the slowest calls.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Source selected when the console starts
    pub default_data_source: DataSourceId,

    /// Equipment filter applied at start-up and after a reset
    pub default_equipment_types: Vec<String>,

    /// Maximum rows a similarity search returns
    pub similarity_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Largest spreadsheet accepted for upload
    pub max_upload_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Most rows that may be handed to the analysis view at once
    pub analysis_row_limit: usize,

    /// Where the analysis hand-off file is written (defaults to the data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. "info" or "info,api=debug". `RUST_LOG`
    /// overrides it.
    pub filter: String,

    /// Log lines kept in memory for the activity pane
    pub buffer_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchConfig::default(),
            import: ImportConfig::default(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_data_source: DataSourceId::Case,
            default_equipment_types: vec!["ARJ21".to_string(), "无".to_string()],
            similarity_limit: 50,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            analysis_row_limit: 300,
            handoff_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            buffer_capacity: 500,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load config from `path`, writing the defaults there if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("record-search").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Record Search Configuration File
# Location: ~/.config/record-search/config.toml (Linux)
#           %APPDATA%\record-search\config.toml (Windows)

[server]
# Record server address
base_url = "http://127.0.0.1:5000"

# Seconds before a request is abandoned (uploads are the slowest calls)
request_timeout_secs = 60

[search]
# One of: case, engineering, manual, faults, r_and_i_record
default_data_source = "case"

# Equipment filter applied at start-up and after a reset
default_equipment_types = ["ARJ21", "无"]

# Maximum rows returned by a similarity search
similarity_limit = 50

[import]
# Largest spreadsheet accepted for upload (bytes)
max_upload_bytes = 16777216

[export]
# Most rows that may be sent to the analysis view at once
analysis_row_limit = 300

# Directory for the analysis hand-off file (leave commented to use the data dir)
# handoff_dir = "/path/to/dir"

[logging]
# Tracing filter; targets are schema, search, import, columns, export,
# anonymize, api and system. RUST_LOG takes precedence when set.
filter = "info"

# Log lines kept in memory for the activity pane
buffer_capacity = 500
"#
        .to_string()
    }
}
