//! Post-inference label discovery and document enrichment

pub mod discovery;
pub mod enrich;
pub mod strategy;

pub use discovery::{discover_labels, DiscoveredLabels};
pub use enrich::{Enrichment, LabelEnricher};
pub use strategy::{ContiguousLabels, DistinctValueLabels, LabelPolicy, LabelStrategy};
