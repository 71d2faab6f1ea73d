use crate::error::{Result, SegError};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use super::slices::open_header;
use super::tags::{get_string_value, SERIES_INSTANCE_UID};

/// Identity of one input series directory
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesIdentity {
    /// SeriesInstanceUID, or a name derived from the representative file
    pub id: String,

    /// File handed to the DICOM to NIfTI converter
    pub representative: PathBuf,
}

impl SeriesIdentity {
    /// Identifies the series stored in `dir`
    ///
    /// The representative file is the first `.dcm` file by name, or the
    /// first regular file when there are none. Its SeriesInstanceUID is the
    /// id; if it cannot be read the file name up to the first `.` is used.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let representative = representative_file(dir)?;
        let id = match series_instance_uid(&representative) {
            Some(uid) => uid,
            None => {
                let fallback = fallback_id(&representative);
                debug!(
                    "No SeriesInstanceUID in {}, using '{}'",
                    representative.display(),
                    fallback
                );
                fallback
            }
        };

        Ok(Self { id, representative })
    }
}

fn representative_file(dir: &Path) -> Result<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let is_dcm = |path: &&PathBuf| {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
    };

    files
        .iter()
        .find(is_dcm)
        .or_else(|| files.first())
        .cloned()
        .ok_or_else(|| SegError::EmptySeries(dir.to_path_buf()))
}

fn series_instance_uid(path: &Path) -> Option<String> {
    let dcm = open_header(path).ok()?;
    get_string_value(&dcm, SERIES_INSTANCE_UID).filter(|uid| !uid.is_empty())
}

fn fallback_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .unwrap_or_default()
}
