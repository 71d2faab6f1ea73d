//! Orchestration of the forward and backward pipelines around the
//! external converter and inference executables

pub mod backward;
pub mod forward;
pub mod inference;
pub mod tool;

pub use backward::{finalize, finalize_document, FinalizeSummary, FinalizedSubject};
pub use forward::{prepare, prepare_series, PrepareSummary, PreparedSeries, SkippedSeries};
pub use inference::{predict, rename_single_modality, run_inference};
pub use tool::{ExternalTool, ToolOutput};

use crate::config::PipelineConfig;
use crate::error::Result;
use log::info;

/// Summary of a complete prepare, predict, finalize run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub prepare: PrepareSummary,
    pub finalize: FinalizeSummary,
}

/// Runs all three stages in order
///
/// Inference is skipped when no series could be prepared.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    config.validate()?;

    let prepare = prepare(config)?;
    if prepare.prepared.is_empty() {
        info!("No series prepared, skipping inference");
        return Ok(RunSummary {
            prepare,
            finalize: FinalizeSummary::default(),
        });
    }

    predict(config)?;
    let finalize = finalize(config)?;
    info!("Pipeline completed successfully");

    Ok(RunSummary { prepare, finalize })
}
