//! Remote record-server contract
//!
//! `models` holds the request/response shapes and their strict decoding,
//! `backend` the transport trait the controller is written against.
//! The reqwest implementation lives in `crate::api_client`.

pub mod backend;
pub mod models;

pub use backend::SearchBackend;
pub use models::{ImportCounts, SearchReply, SensitiveWords, StagedPreview, WordCategory};
