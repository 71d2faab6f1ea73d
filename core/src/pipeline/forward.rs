use crate::api::MetadataExtractor;
use crate::config::PipelineConfig;
use crate::error::{Result, SegError};
use crate::extraction::SeriesIdentity;
use crate::types::{DOCUMENT_SUFFIX, VOLUME_SUFFIX};
use log::{error, info};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use super::tool::ExternalTool;

/// One series after its metadata document was written
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    /// Series identifier naming every derived file
    pub id: String,

    /// Pre-inference metadata document
    pub document: PathBuf,

    /// Inference input volume produced by the converter
    pub volume: PathBuf,

    /// False when the volume already existed and conversion was skipped
    pub converted: bool,
}

/// Series directory left out of a run
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSeries {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of preparing every series of the input directory
#[derive(Debug, Clone, Default)]
pub struct PrepareSummary {
    pub prepared: Vec<PreparedSeries>,
    pub skipped: Vec<SkippedSeries>,
}

/// Writes the metadata document of one series and converts it to NIfTI
///
/// The document lands at `<tmp>/<id>.mitklabel.json` describing the mask
/// `<tmp>/<id>.nii.gz` that inference will produce. The converter is only
/// invoked when `<data_dir>/<id>.nii.gz` does not exist yet.
pub fn prepare_series(config: &PipelineConfig, series_dir: &Path) -> Result<PreparedSeries> {
    let identity = SeriesIdentity::from_directory(series_dir)?;
    let tmp_dir = config.tmp_dir();
    let data_dir = config.data_dir();

    let mask = tmp_dir.join(format!("{}{}", identity.id, VOLUME_SUFFIX));
    let document_path = tmp_dir.join(format!("{}{}", identity.id, DOCUMENT_SUFFIX));
    let volume = data_dir.join(format!("{}{}", identity.id, VOLUME_SUFFIX));

    let document = MetadataExtractor::extract(series_dir, &mask.to_string_lossy())?;
    document.write_to_file(&document_path)?;
    info!("Wrote {}", document_path.display());

    let converted = if volume.exists() {
        info!("{} already exists, skipping conversion", volume.display());
        false
    } else {
        let converter = ExternalTool::new(&config.converter, config.execution_timeout);
        converter.run([
            OsStr::new("-i"),
            identity.representative.as_os_str(),
            OsStr::new("-o"),
            volume.as_os_str(),
        ])?;
        true
    };

    Ok(PreparedSeries {
        id: identity.id,
        document: document_path,
        volume,
        converted,
    })
}

/// Prepares every series directory below the configured input directory
///
/// Series without usable slices are logged and skipped. Any other error,
/// including a converter failure or timeout, aborts the run.
pub fn prepare(config: &PipelineConfig) -> Result<PrepareSummary> {
    fs::create_dir_all(config.data_dir())?;
    fs::create_dir_all(config.tmp_dir())?;

    let mut summary = PrepareSummary::default();
    for series_dir in series_directories(&config.input_dir)? {
        info!("Processing series: {}", series_dir.display());
        match prepare_series(config, &series_dir) {
            Ok(prepared) => summary.prepared.push(prepared),
            Err(e @ SegError::EmptySeries(_)) => {
                error!("Skipping {}: {}", series_dir.display(), e);
                summary.skipped.push(SkippedSeries {
                    path: series_dir,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

/// Lists the immediate subdirectories of `input_dir`, sorted by name
fn series_directories(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
