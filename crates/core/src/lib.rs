#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use config::{GeneralConfig, IngestSettings, LogminerConfig};
pub use error::{ConfigError, IngestStageError, LogminerError, ParseError, StorageError};
pub use pipeline::{LogParser, StorageSink};
pub use types::{LogFamily, LogRecord};
