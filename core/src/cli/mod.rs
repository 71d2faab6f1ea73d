pub mod report;

use crate::config::PipelineConfig;
use crate::labels::LabelPolicy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for mitkseg
#[derive(Parser, Debug)]
#[command(name = "mitkseg")]
#[command(about = "DICOM/NIfTI segmentation metadata pipeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Pipeline stages and standalone document operations
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write metadata documents and convert every input series to NIfTI
    Prepare,
    /// Stage the converted volumes and run inference
    Predict,
    /// Add labels to every metadata document and convert masks to DICOM-SEG
    Finalize,
    /// Run prepare, predict and finalize in order
    Run,
    /// Build the metadata document of a single series
    Metadata {
        /// Directory containing the DICOM series
        #[arg(value_name = "SERIES_DIR")]
        series_dir: PathBuf,

        /// NIfTI volume the document describes
        #[arg(value_name = "VOLUME")]
        volume: String,

        /// Output document path
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// Add labels to a single metadata document from its mask
    Label {
        /// Metadata document to enrich in place
        #[arg(value_name = "DOCUMENT")]
        document: PathBuf,
    },
}

/// Overrides applied on top of the environment configuration
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Input directory [env: nnUNet_input]
    #[arg(long, global = true)]
    pub input_dir: Option<PathBuf>,

    /// Output directory [env: nnUNet_output]
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Converter executable
    #[arg(long, global = true)]
    pub converter: Option<PathBuf>,

    /// Inference executable
    #[arg(long, global = true)]
    pub inference: Option<PathBuf>,

    /// Inference task name
    #[arg(long, global = true)]
    pub task: Option<String>,

    /// Timeout in seconds for each external tool
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Inputs already carry per-modality suffixes
    #[arg(long, global = true)]
    pub multi_modal: bool,

    /// Label value generation policy
    #[arg(long, global = true, value_enum)]
    pub label_policy: Option<LabelPolicy>,
}

impl ConfigArgs {
    /// Applies the given overrides to `config`
    pub fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(dir) = &self.input_dir {
            config = config.with_input_dir(dir);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(converter) = &self.converter {
            config = config.with_converter(converter);
        }
        if let Some(inference) = &self.inference {
            config = config.with_inference(inference);
        }
        if let Some(task) = &self.task {
            config = config.with_task_name(task.clone());
        }
        if let Some(seconds) = self.timeout {
            config = config.with_execution_timeout(Duration::from_secs(seconds));
        }
        if self.multi_modal {
            config = config.multi_modal(true);
        }
        if let Some(policy) = self.label_policy {
            config = config.with_label_policy(policy);
        }
        config
    }
}
