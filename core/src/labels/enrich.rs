use crate::error::Result;
use crate::types::{LabelEntry, MetadataDocument};
use log::{info, warn};
use rand::Rng;
use std::path::Path;

use super::discovery::{discover_labels, DiscoveredLabels};
use super::strategy::LabelStrategy;

/// Outcome of enriching a metadata document with labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enrichment {
    /// Labels were appended to the group
    Labeled(usize),
    /// The mask had no nonzero voxels; the document was left untouched
    NoLabels,
}

impl Enrichment {
    pub fn is_labeled(&self) -> bool {
        matches!(self, Enrichment::Labeled(_))
    }
}

/// Appends label entries to documents once their masks exist
pub struct LabelEnricher<'a, R: Rng> {
    strategy: &'a dyn LabelStrategy,
    rng: R,
}

impl<'a, R: Rng> LabelEnricher<'a, R> {
    pub fn new(strategy: &'a dyn LabelStrategy, rng: R) -> Self {
        Self { strategy, rng }
    }

    /// Adds labels for a known set of discovered mask values
    ///
    /// When no label values result, the document is not modified and
    /// [`Enrichment::NoLabels`] is returned.
    pub fn enrich(
        &mut self,
        document: &mut MetadataDocument,
        discovered: &DiscoveredLabels,
    ) -> Result<Enrichment> {
        if discovered.is_empty() {
            return Ok(Enrichment::NoLabels);
        }
        let values = self.strategy.label_values(discovered);
        if values.is_empty() {
            return Ok(Enrichment::NoLabels);
        }

        let labels: Vec<LabelEntry> = values
            .into_iter()
            .map(|value| LabelEntry::automatic(value, self.random_color()))
            .collect();
        let count = labels.len();

        document.group_mut()?.labels = Some(labels);
        Ok(Enrichment::Labeled(count))
    }

    /// Loads the mask named by the document's group and adds its labels
    pub fn enrich_from_volume(&mut self, document: &mut MetadataDocument) -> Result<Enrichment> {
        let volume = document.group()?.file.clone();
        let discovered = discover_labels(Path::new(&volume))?;
        self.enrich(document, &discovered)
    }

    /// Reads a persisted document, enriches it, and writes it back
    ///
    /// The file is only rewritten when labels were found.
    pub fn enrich_file(&mut self, path: &Path) -> Result<Enrichment> {
        let mut document = MetadataDocument::from_file(path)?;
        let outcome = self.enrich_from_volume(&mut document)?;

        match outcome {
            Enrichment::Labeled(count) => {
                document.write_to_file(path)?;
                info!("Added {} labels to {}", count, path.display());
            }
            Enrichment::NoLabels => {
                warn!("No segmentations were produced for {}", path.display());
            }
        }

        Ok(outcome)
    }

    fn random_color(&mut self) -> [f64; 3] {
        [self.rng.random(), self.rng.random(), self.rng.random()]
    }
}
