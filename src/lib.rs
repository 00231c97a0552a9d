// Core modules
pub mod data_source;
pub mod error;
pub mod logging;
pub mod result_set;

// Schema and query model
pub mod dynamic_schema;
pub mod query_model;
pub mod schema_config;

// Remote contract
pub mod api;
pub mod api_client;

// Result presentation
pub mod analysis_handoff;
pub mod column_manager;
pub mod data_exporter;

// Controller and its parts
pub mod app_state_container;
pub mod config;
pub mod services;
pub mod state;
pub mod utils;

pub use app_state_container::AppStateContainer;
pub use data_source::DataSourceId;
pub use error::{ApiError, ConsoleError, ConsoleResult, ValidationError};
