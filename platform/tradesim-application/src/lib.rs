pub mod config;
pub mod ingestion;
pub mod inspection;
