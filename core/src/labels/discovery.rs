use crate::error::Result;
use log::debug;
use nifti::typedef::NiftiType;
use nifti::{IntoNdArray, NiftiObject, NiftiVolume, ReaderOptions};
use std::collections::BTreeSet;
use std::path::Path;

/// Distinct non-background voxel values of a mask, in ascending order
///
/// Values are kept exactly as stored, so `1.2` and `1.4` are two labels
/// and a fractional value such as `0.4` is never treated as background.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveredLabels {
    values: Vec<f64>,
}

impl DiscoveredLabels {
    /// Collects the distinct values of `voxels` other than 0
    pub fn from_voxels<I>(voxels: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values: Vec<f64> = voxels
            .into_iter()
            .filter(|v| v.is_finite() && *v != 0.0)
            .collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        Self { values }
    }

    /// Number of distinct non-background values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values rounded to integer label ids; ids that round to 0 are dropped
    pub fn integer_values(&self) -> BTreeSet<i64> {
        self.values
            .iter()
            .map(|v| v.round() as i64)
            .filter(|v| *v != 0)
            .collect()
    }
}

impl FromIterator<f64> for DiscoveredLabels {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::from_voxels(iter)
    }
}

/// Converts the volume in its own sample type and collects its labels
macro_rules! discover_as {
    ($volume:expr, $ty:ty) => {{
        let data = $volume.into_ndarray::<$ty>()?;
        DiscoveredLabels::from_voxels(data.iter().map(|&v| f64::from(v)))
    }};
}

/// Loads a NIfTI mask and returns its distinct nonzero label values
///
/// Integer masks are converted in their stored type instead of widening
/// every voxel to `f64`.
pub fn discover_labels(path: &Path) -> Result<DiscoveredLabels> {
    let volume = ReaderOptions::new().read_file(path)?.into_volume();
    let data_type = volume.data_type();

    let labels = match data_type {
        NiftiType::Uint8 => discover_as!(volume, u8),
        NiftiType::Int8 => discover_as!(volume, i8),
        NiftiType::Uint16 => discover_as!(volume, u16),
        NiftiType::Int16 => discover_as!(volume, i16),
        NiftiType::Uint32 => discover_as!(volume, u32),
        NiftiType::Int32 => discover_as!(volume, i32),
        NiftiType::Float32 => discover_as!(volume, f32),
        _ => discover_as!(volume, f64),
    };

    debug!(
        "Found {} distinct labels in {} ({:?})",
        labels.len(),
        path.display(),
        data_type
    );
    Ok(labels)
}
