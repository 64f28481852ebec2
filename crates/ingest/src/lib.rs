#![doc = include_str!("../README.md")]

pub mod chunker;
pub mod config;
pub mod discovery;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod pattern;
pub mod stats;

pub use chunker::ChunkedReader;
pub use config::{IngestConfig, IngestConfigBuilder, SourceSpec};
pub use discovery::{DiscoveredFile, DiscoveryEngine, DiscoveryStream};
pub use error::IngestError;
pub use orchestrator::{IngestOrchestrator, IngestOrchestratorBuilder};
pub use parser::{NginxParser, NexusParser};
pub use pattern::PatternMatcher;
pub use stats::{FamilyStats, ProcessingStatistics};
