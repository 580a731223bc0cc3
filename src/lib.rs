pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod pipeline;
pub mod reconcile;
pub mod segment;
pub mod series;
pub mod taxonomy;
// reports is a binary module (src/reports); it only reads the state built here.
