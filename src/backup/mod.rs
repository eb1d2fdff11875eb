pub mod backup_config;
pub mod checksum;
pub mod cleaner;
pub mod copier;
pub mod engine;
pub mod exclude;
pub mod report;
pub mod result_error;
pub mod retry;
pub mod validate;
pub mod walker;
