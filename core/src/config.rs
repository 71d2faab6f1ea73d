use crate::error::{Result, SegError};
use crate::labels::LabelPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the input directory
pub const INPUT_DIR_ENV: &str = "nnUNet_input";

/// Environment variable naming the output directory
pub const OUTPUT_DIR_ENV: &str = "nnUNet_output";

/// Default converter between DICOM, NIfTI and DICOM-SEG
pub const DEFAULT_CONVERTER: &str = "/app/mitk/apps/MitkFileConverter.sh";

/// Default budget for each external tool invocation
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(1200);

/// Pipeline configuration
///
/// Built once at process start and passed by reference into every
/// pipeline invocation; nothing reads the environment afterwards.
///
/// # Example
///
/// ```
/// use mitkseg_core::PipelineConfig;
/// use std::time::Duration;
///
/// let config = PipelineConfig::default()
///     .with_input_dir("/data/in")
///     .with_output_dir("/data/out")
///     .with_execution_timeout(Duration::from_secs(60));
///
/// assert_eq!(config.tmp_dir().to_str(), Some("/data/out/tmp"));
/// assert_eq!(config.data_dir().to_str(), Some("/data/out/nnunet_data_dir"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Directory holding one subdirectory per DICOM series
    pub input_dir: PathBuf,

    /// Directory receiving volumes, masks and DICOM-SEG objects
    pub output_dir: PathBuf,

    /// DICOM/NIfTI/DICOM-SEG converter executable
    pub converter: PathBuf,

    /// Inference executable
    pub inference: PathBuf,

    /// Inference task name
    pub task_name: String,

    pub trainer: String,

    pub plans: String,

    pub model: String,

    /// Budget for each external tool invocation; a breach is fatal
    pub execution_timeout: Duration,

    /// Whether inputs already carry per-modality `_NNNN` suffixes
    pub multi_modal: bool,

    /// How label values are generated during enrichment
    pub label_policy: LabelPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("/nnUNet_input"),
            output_dir: PathBuf::from("/nnUNet_output"),
            converter: PathBuf::from(DEFAULT_CONVERTER),
            inference: PathBuf::from("nnUNet_predict"),
            task_name: "Task029_LiTS".to_string(),
            trainer: "nnUNetTrainerV2".to_string(),
            plans: "nnUNetPlansv2.1".to_string(),
            model: "3d_fullres".to_string(),
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
            multi_modal: false,
            label_policy: LabelPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(dir) = lookup(INPUT_DIR_ENV).filter(|v| !v.is_empty()) {
            config.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(OUTPUT_DIR_ENV).filter(|v| !v.is_empty()) {
            config.output_dir = PathBuf::from(dir);
        }
        config
    }

    /// Rejects values no pipeline run can work with
    pub fn validate(&self) -> Result<()> {
        if self.execution_timeout.is_zero() {
            return Err(SegError::InvalidConfig(
                "execution timeout must be greater than zero".to_string(),
            ));
        }
        if self.task_name.trim().is_empty() {
            return Err(SegError::InvalidConfig("task name is empty".to_string()));
        }
        Ok(())
    }

    /// Staging directory of the inference input volumes
    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join("nnunet_data_dir")
    }

    /// Inference output directory, also holding the metadata documents
    pub fn tmp_dir(&self) -> PathBuf {
        self.output_dir.join("tmp")
    }

    /// Builder: Set input directory
    pub fn with_input_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.input_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Builder: Set output directory
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Builder: Set converter executable
    pub fn with_converter(mut self, converter: impl AsRef<Path>) -> Self {
        self.converter = converter.as_ref().to_path_buf();
        self
    }

    /// Builder: Set inference executable
    pub fn with_inference(mut self, inference: impl AsRef<Path>) -> Self {
        self.inference = inference.as_ref().to_path_buf();
        self
    }

    /// Builder: Set inference task name
    pub fn with_task_name(mut self, task_name: impl Into<String>) -> Self {
        self.task_name = task_name.into();
        self
    }

    /// Builder: Set execution timeout
    pub fn with_execution_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }

    /// Builder: Set multi-modal input
    pub fn multi_modal(mut self, multi_modal: bool) -> Self {
        self.multi_modal = multi_modal;
        self
    }

    /// Builder: Set label policy
    pub fn with_label_policy(mut self, policy: LabelPolicy) -> Self {
        self.label_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("/nnUNet_input"));
        assert_eq!(config.output_dir, PathBuf::from("/nnUNet_output"));
        assert_eq!(config.converter, PathBuf::from(DEFAULT_CONVERTER));
        assert_eq!(config.execution_timeout, Duration::from_secs(1200));
        assert_eq!(config.task_name, "Task029_LiTS");
        assert!(!config.multi_modal);
        assert_eq!(config.label_policy, LabelPolicy::Contiguous);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(INPUT_DIR_ENV, "/mnt/in"), (OUTPUT_DIR_ENV, "/mnt/out")]);

        let config = PipelineConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.input_dir, PathBuf::from("/mnt/in"));
        assert_eq!(config.data_dir(), PathBuf::from("/mnt/out/nnunet_data_dir"));
        assert_eq!(config.tmp_dir(), PathBuf::from("/mnt/out/tmp"));
    }

    #[test]
    fn test_from_lookup_ignores_empty_values() {
        let config = PipelineConfig::from_lookup(|_| Some(String::new()));
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_validate() {
        assert!(PipelineConfig::default().validate().is_ok());

        let zero = PipelineConfig::default().with_execution_timeout(Duration::ZERO);
        assert!(matches!(zero.validate(), Err(SegError::InvalidConfig(_))));

        let unnamed = PipelineConfig::default().with_task_name(" ");
        assert!(matches!(unnamed.validate(), Err(SegError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_chain() {
        let config = PipelineConfig::default()
            .with_converter("/opt/convert.sh")
            .with_inference("/opt/predict")
            .with_task_name("Task003_Liver")
            .multi_modal(true)
            .with_label_policy(LabelPolicy::Distinct);

        assert_eq!(config.converter, PathBuf::from("/opt/convert.sh"));
        assert_eq!(config.inference, PathBuf::from("/opt/predict"));
        assert_eq!(config.task_name, "Task003_Liver");
        assert!(config.multi_modal);
        assert_eq!(config.label_policy, LabelPolicy::Distinct);
    }
}
