//! State management components
//!
//! Pieces of controller state that are orchestrated by the
//! `AppStateContainer`.

pub mod events;

pub use events::{Notice, NoticeLevel, NoticeLog};
