use super::temporal::{TemporalValue, TemporoSpatialProperty, TypedProperty};
use crate::extraction::tags::SEGMENT_ALGORITHM_AUTOMATIC;
use serde::{Deserialize, Serialize};

/// Opacity assigned to every generated label
pub const LABEL_OPACITY: f64 = 0.6;

/// One segment of the multi-label stack
///
/// Only created during enrichment, one per label value. The color is
/// cosmetic; consumers identify labels by `value` and `tracking_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEntry {
    /// Segment algorithm type, always "AUTOMATIC"
    #[serde(rename = "DICOM.0062.0002.0062.0008")]
    pub algorithm_type: TypedProperty,

    /// RGB color, each channel in [0, 1)
    pub color: [f64; 3],

    pub locked: bool,

    pub name: String,

    pub opacity: f64,

    pub tracking_id: String,

    /// Voxel value this label stands for
    pub value: i64,

    pub visible: bool,
}

impl LabelEntry {
    /// Creates an automatically generated label entry
    pub fn automatic(value: i64, color: [f64; 3]) -> Self {
        Self {
            algorithm_type: TypedProperty::temporo_spatial(TemporoSpatialProperty::single(
                TemporalValue::fixed(SEGMENT_ALGORITHM_AUTOMATIC),
            )),
            color,
            locked: true,
            name: format!("Label {}", value),
            opacity: LABEL_OPACITY,
            tracking_id: value.to_string(),
            value,
            visible: true,
        }
    }
}
