use serde::{Deserialize, Serialize};

/// A single tag value wrapped in the time/space envelope of the viewer format
///
/// `t` and `z` are always zero since only static 3D volumes are produced.
/// `zmax` is the last slice index and is only set for values copied from
/// the source series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalValue {
    pub t: u32,
    pub value: String,
    pub z: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zmax: Option<usize>,
}

impl TemporalValue {
    /// Creates a value spanning the whole series (`zmax` set)
    pub fn spanning(value: impl Into<String>, zmax: usize) -> Self {
        Self {
            t: 0,
            value: value.into(),
            z: 0,
            zmax: Some(zmax),
        }
    }

    /// Creates a fixed value without a slice range
    pub fn fixed(value: impl Into<String>) -> Self {
        Self {
            t: 0,
            value: value.into(),
            z: 0,
            zmax: None,
        }
    }
}

/// `{"values": [...]}` wrapper holding the temporal values of one tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporoSpatialProperty {
    pub values: Vec<TemporalValue>,
}

impl TemporoSpatialProperty {
    pub fn single(value: TemporalValue) -> Self {
        Self {
            values: vec![value],
        }
    }

    /// Returns the string of the first temporal value, if any
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(|v| v.value.as_str())
    }
}

/// Property carrying its own type name, as nested inside label entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedProperty {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: TemporoSpatialProperty,
}

impl TypedProperty {
    pub const TEMPORO_SPATIAL_STRING: &'static str = "TemporoSpatialStringProperty";

    pub fn temporo_spatial(value: TemporoSpatialProperty) -> Self {
        Self {
            kind: Self::TEMPORO_SPATIAL_STRING.to_string(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fixed_value_omits_zmax() {
        let property = TemporoSpatialProperty::single(TemporalValue::fixed("SEG"));
        let value = serde_json::to_value(&property).unwrap();

        assert_eq!(value, json!({"values": [{"t": 0, "value": "SEG", "z": 0}]}));
    }

    #[test]
    fn test_spanning_value_carries_zmax() {
        let property = TemporoSpatialProperty::single(TemporalValue::spanning("P-001", 41));
        let value = serde_json::to_value(&property).unwrap();

        assert_eq!(
            value,
            json!({"values": [{"t": 0, "value": "P-001", "z": 0, "zmax": 41}]})
        );
        assert_eq!(property.first_value(), Some("P-001"));
    }
}
