pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod labels;
pub mod pipeline;
pub mod types;

pub use api::MetadataExtractor;
pub use cli::report::TextReport;
pub use config::PipelineConfig;
pub use error::{Result, SegError};
pub use labels::{Enrichment, LabelEnricher, LabelPolicy, LabelStrategy};
pub use types::*;
