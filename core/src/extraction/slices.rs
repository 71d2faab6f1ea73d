use crate::error::{Result, SegError};
use crate::types::SliceReference;
use dicom_object::{FileDicomObject, InMemDicomObject, OpenFileOptions};
use log::{debug, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::tags::{get_multi_float_value, IMAGE_POSITION_PATIENT, PIXEL_DATA};

/// Opens a DICOM file, stopping before the pixel data
pub fn open_header(path: &Path) -> Result<FileDicomObject<InMemDicomObject>> {
    let dcm = OpenFileOptions::new()
        .read_until(PIXEL_DATA)
        .open_file(path)?;
    Ok(dcm)
}

/// Why a file of a series directory was left out of the reference set
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The file could not be parsed as DICOM
    NotDicom(String),
    /// ImagePositionPatient is absent or does not have three components
    MissingPosition,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotDicom(e) => write!(f, "not a valid DICOM file ({})", e),
            SkipReason::MissingPosition => write!(f, "no z position"),
        }
    }
}

/// Slices of one series ordered by depth, plus the files that were excluded
#[derive(Debug, Clone, Default)]
pub struct SortedSeries {
    /// Reference sequence with contiguous indices `0..N-1`
    pub references: Vec<SliceReference>,

    /// Excluded files and the reason for each
    pub skipped: Vec<(PathBuf, SkipReason)>,
}

impl SortedSeries {
    /// Sorts the DICOM files of a series directory by ascending z position
    ///
    /// # Algorithm
    ///
    /// 1. Enumerate the regular files of `dir`
    /// 2. Parse each header; files that are not DICOM are skipped
    /// 3. Read the z component of ImagePositionPatient; files without it are skipped
    /// 4. Stable sort by z, ties keep directory enumeration order
    /// 5. Number the survivors from zero
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut positioned = Vec::new();
        let mut skipped = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }

            match slice_depth(&path) {
                Ok(z) => positioned.push((z, path)),
                Err(reason) => {
                    warn!("Skipping {}: {}", path.display(), reason);
                    skipped.push((path, reason));
                }
            }
        }

        let references = Self::rank(positioned)?;
        debug!(
            "Sorted {} slices in {} ({} skipped)",
            references.len(),
            dir.display(),
            skipped.len()
        );

        Ok(Self {
            references,
            skipped,
        })
    }

    /// Sorts `(z, path)` pairs and assigns zero-based indices
    fn rank(mut positioned: Vec<(f64, PathBuf)>) -> Result<Vec<SliceReference>> {
        positioned.sort_by(|a, b| a.0.total_cmp(&b.0));

        positioned
            .into_iter()
            .enumerate()
            .map(|(index, (_, path))| {
                let absolute = std::path::absolute(&path)?;
                Ok(SliceReference::new(
                    index,
                    absolute.to_string_lossy().into_owned(),
                ))
            })
            .collect()
    }

    /// Number of slices in the reference sequence
    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Index of the deepest slice, or `None` for an empty series
    pub fn zmax(&self) -> Option<usize> {
        self.references.len().checked_sub(1)
    }

    /// Returns the slice at index 0
    ///
    /// # Errors
    ///
    /// Returns [`SegError::EmptySeries`] when no slice survived sorting
    pub fn first(&self, dir: &Path) -> Result<&SliceReference> {
        self.references
            .first()
            .ok_or_else(|| SegError::EmptySeries(dir.to_path_buf()))
    }
}

/// Reads the depth coordinate of one slice
fn slice_depth(path: &Path) -> std::result::Result<f64, SkipReason> {
    let dcm = open_header(path).map_err(|e| SkipReason::NotDicom(e.to_string()))?;

    match get_multi_float_value(&dcm, IMAGE_POSITION_PATIENT) {
        Some(position) if position.len() == 3 => Ok(position[2]),
        _ => Err(SkipReason::MissingPosition),
    }
}
