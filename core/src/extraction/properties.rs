use crate::types::{TemporalValue, TemporoSpatialProperty};
use dicom_object::InMemDicomObject;
use std::collections::BTreeMap;

use super::tags::{get_string_value, tag_key, EXTRACTED_TAGS, HARDCODED_TAGS};

/// Builds the temporo-spatial tag map of a metadata document
///
/// Reads every tag of [`EXTRACTED_TAGS`] from `dcm` (the first slice of the
/// sorted series), each spanning `0..=zmax`. A missing or unreadable tag
/// yields an empty string. The pipeline identity markers of
/// [`HARDCODED_TAGS`] are always added and never read from the input.
pub fn extract_temporo_spatial(
    dcm: &InMemDicomObject,
    zmax: usize,
) -> BTreeMap<String, TemporoSpatialProperty> {
    let mut properties = BTreeMap::new();

    for tag in EXTRACTED_TAGS {
        let value = get_string_value(dcm, tag).unwrap_or_default();
        properties.insert(
            tag_key(tag),
            TemporoSpatialProperty::single(TemporalValue::spanning(value, zmax)),
        );
    }

    for (tag, value) in HARDCODED_TAGS {
        properties.insert(
            tag_key(tag),
            TemporoSpatialProperty::single(TemporalValue::fixed(value)),
        );
    }

    properties
}
