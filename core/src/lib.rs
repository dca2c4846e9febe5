//! Coverage dashboard core: one bulk load from SQLite, then a pure
//! filter-and-aggregate pass per interaction feeding a render-ready view.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod store;
pub mod theme;
pub mod types;
pub mod view;
