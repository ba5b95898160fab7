pub mod catalog;
pub mod config;
pub mod error;
pub mod monitoring;
pub mod target;
pub mod translator;
pub mod types;
