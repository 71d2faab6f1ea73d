use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of one source slice in the depth-sorted series
///
/// Serialized as a `[index, path]` pair, the layout the viewer expects
/// in its string lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, String)", into = "(usize, String)")]
pub struct SliceReference {
    /// Zero-based rank after sorting by depth
    pub index: usize,

    /// Absolute path of the source DICOM file
    pub absolute_path: String,
}

impl SliceReference {
    pub fn new(index: usize, absolute_path: impl Into<String>) -> Self {
        Self {
            index,
            absolute_path: absolute_path.into(),
        }
    }
}

impl From<(usize, String)> for SliceReference {
    fn from((index, absolute_path): (usize, String)) -> Self {
        Self {
            index,
            absolute_path,
        }
    }
}

impl From<SliceReference> for (usize, String) {
    fn from(reference: SliceReference) -> Self {
        (reference.index, reference.absolute_path)
    }
}

impl fmt::Display for SliceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.absolute_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_as_pair() {
        let reference = SliceReference::new(2, "/data/series/slice_003.dcm");
        let value = serde_json::to_value(&reference).unwrap();

        assert_eq!(value, json!([2, "/data/series/slice_003.dcm"]));

        let parsed: SliceReference = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, reference);
    }

    #[test]
    fn test_rejects_object_layout() {
        let value = json!({"index": 0, "absolute_path": "/a.dcm"});
        assert!(serde_json::from_value::<SliceReference>(value).is_err());
    }
}
