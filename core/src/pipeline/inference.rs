use crate::config::PipelineConfig;
use crate::error::Result;
use crate::types::{strip_volume_suffix, VOLUME_SUFFIX};
use log::info;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use super::tool::{ExternalTool, ToolOutput};

/// Channel suffix the inference engine expects on single-modality inputs
pub const SINGLE_MODALITY_SUFFIX: &str = "_0000";

/// Renames `<stem>.nii.gz` to `<stem>_0000.nii.gz` in `data_dir`
///
/// Files already carrying the suffix are left alone. Returns the new paths.
pub fn rename_single_modality(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut renamed = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file() || !name.ends_with(VOLUME_SUFFIX) {
            continue;
        }
        let stem = strip_volume_suffix(name);
        if stem.ends_with(SINGLE_MODALITY_SUFFIX) {
            continue;
        }

        let target = path.with_file_name(format!(
            "{}{}{}",
            stem, SINGLE_MODALITY_SUFFIX, VOLUME_SUFFIX
        ));
        fs::rename(&path, &target)?;
        info!("Renamed {} to {}", name, target.display());
        renamed.push(target);
    }
    renamed.sort();
    Ok(renamed)
}

/// Invokes the inference engine on the staged volumes
///
/// Masks are written to the configured tmp directory next to the
/// metadata documents.
pub fn run_inference(config: &PipelineConfig) -> Result<ToolOutput> {
    let tool = ExternalTool::new(&config.inference, config.execution_timeout);
    let data_dir = config.data_dir();
    let tmp_dir = config.tmp_dir();

    tool.run([
        OsStr::new("-i"),
        data_dir.as_os_str(),
        OsStr::new("-o"),
        tmp_dir.as_os_str(),
        OsStr::new("-t"),
        OsStr::new(&config.task_name),
        OsStr::new("-tr"),
        OsStr::new(&config.trainer),
        OsStr::new("-p"),
        OsStr::new(&config.plans),
        OsStr::new("-m"),
        OsStr::new(&config.model),
    ])
}

/// Stages the inputs and runs inference
pub fn predict(config: &PipelineConfig) -> Result<ToolOutput> {
    fs::create_dir_all(config.tmp_dir())?;
    if !config.multi_modal {
        rename_single_modality(&config.data_dir())?;
    }
    info!("Running inference for {}", config.task_name);
    run_inference(config)
}
