use crate::pipeline::{FinalizeSummary, PrepareSummary, RunSummary};
use std::fmt;

/// Text report of a pipeline run
pub struct TextReport<'a> {
    prepare: Option<&'a PrepareSummary>,
    finalize: Option<&'a FinalizeSummary>,
}

impl<'a> TextReport<'a> {
    /// Creates a report covering both pipelines
    pub fn new(summary: &'a RunSummary) -> Self {
        Self {
            prepare: Some(&summary.prepare),
            finalize: Some(&summary.finalize),
        }
    }

    /// Creates a report of the forward pipeline only
    pub fn prepared(summary: &'a PrepareSummary) -> Self {
        Self {
            prepare: Some(summary),
            finalize: None,
        }
    }

    /// Creates a report of the backward pipeline only
    pub fn finalized(summary: &'a FinalizeSummary) -> Self {
        Self {
            prepare: None,
            finalize: Some(summary),
        }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Segmentation Pipeline")?;
        writeln!(f, "=====================")?;

        if let Some(prepare) = self.prepare {
            writeln!(f)?;
            writeln!(f, "Prepared series: {}", prepare.prepared.len())?;
            for series in &prepare.prepared {
                let state = if series.converted { "converted" } else { "existing" };
                writeln!(f, "  {} ({})", series.id, state)?;
            }
            if !prepare.skipped.is_empty() {
                writeln!(f, "Skipped series:  {}", prepare.skipped.len())?;
                for skipped in &prepare.skipped {
                    writeln!(f, "  {}: {}", skipped.path.display(), skipped.reason)?;
                }
            }
        }

        if let Some(finalize) = self.finalize {
            writeln!(f)?;
            writeln!(f, "Segmentations:   {}", finalize.finalized.len())?;
            for subject in &finalize.finalized {
                writeln!(
                    f,
                    "  {}: {} labels -> {}",
                    subject.id,
                    subject.labels,
                    subject.segmentation.display()
                )?;
            }
            if !finalize.unlabeled.is_empty() {
                writeln!(f, "No labels:       {}", finalize.unlabeled.len())?;
                for document in &finalize.unlabeled {
                    writeln!(f, "  {}", document.display())?;
                }
            }
            if !finalize.fallback.is_empty() {
                writeln!(f, "Fallback masks:  {}", finalize.fallback.len())?;
                for mask in &finalize.fallback {
                    writeln!(f, "  {}", mask.display())?;
                }
            }
        }

        Ok(())
    }
}
