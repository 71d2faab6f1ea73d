use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// Study/Series Identification Tags
pub const ACCESSION_NUMBER: Tag = Tag(0x0008, 0x0050);
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const STUDY_DESCRIPTION: Tag = Tag(0x0008, 0x1030);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);
pub const STUDY_INSTANCE_UID: Tag = Tag(0x0020, 0x000D);
pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);

// Patient Tags
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);
pub const PATIENT_SEX: Tag = Tag(0x0010, 0x0040);

// Clinical Trial Tags
pub const CLINICAL_TRIAL_TIME_POINT_ID: Tag = Tag(0x0012, 0x0050);
pub const CLINICAL_TRIAL_COORDINATING_CENTER_NAME: Tag = Tag(0x0012, 0x0060);
pub const CLINICAL_TRIAL_SERIES_ID: Tag = Tag(0x0012, 0x0071);

// Image Geometry Tags
pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// Segmentation Tags
pub const CONTENT_CREATOR_NAME: Tag = Tag(0x0070, 0x0084);
pub const SEGMENT_SEQUENCE: Tag = Tag(0x0062, 0x0002);
pub const SEGMENT_ALGORITHM_TYPE: Tag = Tag(0x0062, 0x0008);

/// Tags copied from the first slice of a series into the metadata document
pub const EXTRACTED_TAGS: [Tag; 10] = [
    ACCESSION_NUMBER,
    STUDY_DESCRIPTION,
    PATIENT_NAME,
    PATIENT_ID,
    PATIENT_BIRTH_DATE,
    PATIENT_SEX,
    CLINICAL_TRIAL_TIME_POINT_ID,
    CLINICAL_TRIAL_COORDINATING_CENTER_NAME,
    CLINICAL_TRIAL_SERIES_ID,
    STUDY_INSTANCE_UID,
];

/// Pipeline identity markers written regardless of the source series
pub const HARDCODED_TAGS: [(Tag, &str); 3] = [
    (MODALITY, "SEG"),
    (SERIES_DESCRIPTION, "nnUNet Segmentation"),
    (CONTENT_CREATOR_NAME, "EUCAIM"),
];

/// Value written under the segment algorithm type of every label
pub const SEGMENT_ALGORITHM_AUTOMATIC: &str = "AUTOMATIC";

/// Formats a tag as a dotted property key, e.g. `DICOM.0020.000D`
pub fn tag_key(tag: Tag) -> String {
    format!("DICOM.{:04X}.{:04X}", tag.group(), tag.element())
}

/// Property key of the segment algorithm type nested in the segment sequence
pub fn segment_algorithm_key() -> String {
    format!(
        "{}.{:04X}.{:04X}",
        tag_key(SEGMENT_SEQUENCE),
        SEGMENT_ALGORITHM_TYPE.group(),
        SEGMENT_ALGORITHM_TYPE.element()
    )
}

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| {
            s.trim_matches(|c: char| c == '\0' || c.is_whitespace())
                .to_string()
        })
}

/// Helper to get a multi-valued float from DICOM tag
///
/// Returns `None` if the tag is not present or any component fails to parse
pub fn get_multi_float_value(dcm: &InMemDicomObject, tag: Tag) -> Option<Vec<f64>> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_multi_float64().ok())
}
