use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Result type for mitkseg operations
pub type Result<T> = std::result::Result<T, SegError>;

/// Error types for mitkseg operations
#[derive(Error, Debug)]
pub enum SegError {
    /// DICOM reading or writing error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// NIfTI reading error
    #[error("NIfTI error: {0}")]
    NiftiError(String),

    /// Metadata document could not be (de)serialized
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A metadata document parsed but does not have the expected shape
    #[error("Malformed metadata document: {0}")]
    MalformedDocument(String),

    /// No slice in the series carried a usable ImagePositionPatient
    #[error("Empty series: no usable DICOM slices in {}", .0.display())]
    EmptySeries(PathBuf),

    /// External executable exited unsuccessfully
    #[error("{tool} failed with {status}")]
    ToolFailed { tool: String, status: ExitStatus },

    /// External executable exceeded its execution budget
    #[error("{tool} timed out after {timeout:?}")]
    ToolTimeout { tool: String, timeout: Duration },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for SegError {
    fn from(e: dicom_object::ReadError) -> Self {
        SegError::DicomError(format!("{}", e))
    }
}

impl From<nifti::error::NiftiError> for SegError {
    fn from(e: nifti::error::NiftiError) -> Self {
        SegError::NiftiError(format!("{}", e))
    }
}
