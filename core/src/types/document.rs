use super::label::LabelEntry;
use super::reference::SliceReference;
use super::temporal::TemporoSpatialProperty;
use crate::error::{Result, SegError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Document type marking a multi-label segmentation stack
pub const DOCUMENT_TYPE: &str = "org.mitk.multilabel.segmentation.stack";

/// Schema version written and accepted by this crate
pub const DOCUMENT_VERSION: u32 = 3;

/// File suffix of persisted metadata documents
pub const DOCUMENT_SUFFIX: &str = ".mitklabel.json";

/// Suffix of the NIfTI volume a document describes
pub const VOLUME_SUFFIX: &str = ".nii.gz";

/// Label metadata sidecar for a flat NIfTI segmentation
///
/// Created once per DICOM series before inference, then read back and
/// enriched with labels once the mask exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Always exactly one group
    pub groups: Vec<Group>,

    pub properties: Properties,

    #[serde(rename = "type")]
    pub kind: String,

    /// Assigned at creation, never recomputed
    pub uid: String,

    pub version: u32,
}

/// The single label group, pointing at the subject volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_file")]
    pub file: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<LabelEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(rename = "StringLookupTableProperty")]
    pub string_lookup_table: StringLookupTable,

    /// Keyed by dotted tag, e.g. `DICOM.0010.0020`
    #[serde(rename = "TemporoSpatialStringProperty")]
    pub temporo_spatial: BTreeMap<String, TemporoSpatialProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLookupTable {
    #[serde(rename = "referenceFiles")]
    pub reference_files: Vec<SliceReference>,
}

impl MetadataDocument {
    /// Creates a fresh document with a newly generated uid
    pub fn new(
        file: impl Into<String>,
        reference_files: Vec<SliceReference>,
        temporo_spatial: BTreeMap<String, TemporoSpatialProperty>,
    ) -> Self {
        Self {
            groups: vec![Group {
                file: file.into(),
                labels: None,
            }],
            properties: Properties {
                string_lookup_table: StringLookupTable { reference_files },
                temporo_spatial,
            },
            kind: DOCUMENT_TYPE.to_string(),
            uid: Uuid::new_v4().to_string(),
            version: DOCUMENT_VERSION,
        }
    }

    /// Returns the single group of the document
    pub fn group(&self) -> Result<&Group> {
        self.groups
            .first()
            .ok_or_else(|| SegError::MalformedDocument("document has no groups".to_string()))
    }

    /// Returns the single group of the document for mutation
    pub fn group_mut(&mut self) -> Result<&mut Group> {
        self.groups
            .first_mut()
            .ok_or_else(|| SegError::MalformedDocument("document has no groups".to_string()))
    }

    pub fn reference_files(&self) -> &[SliceReference] {
        &self.properties.string_lookup_table.reference_files
    }

    /// Subject identifier: the volume file name without `.nii.gz`
    pub fn subject_id(&self) -> Result<String> {
        let file = &self.group()?.file;
        let name = Path::new(file)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SegError::MalformedDocument(format!("invalid _file: {}", file)))?;
        Ok(strip_volume_suffix(name).to_string())
    }

    /// Parses a document, rejecting foreign types and versions
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: MetadataDocument = serde_json::from_str(json)?;
        document.validate()?;
        Ok(document)
    }

    /// Serializes with four-space indentation
    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(buf).map_err(|e| SegError::MalformedDocument(e.to_string()))
    }

    /// Reads a document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Writes the document to disk in one shot, replacing any previous content
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), self.to_json_string()?)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.kind != DOCUMENT_TYPE {
            return Err(SegError::MalformedDocument(format!(
                "unexpected type '{}'",
                self.kind
            )));
        }
        if self.version != DOCUMENT_VERSION {
            return Err(SegError::MalformedDocument(format!(
                "unsupported version {}",
                self.version
            )));
        }
        if self.groups.len() != 1 {
            return Err(SegError::MalformedDocument(format!(
                "expected exactly one group, found {}",
                self.groups.len()
            )));
        }
        Ok(())
    }
}

/// Strips `.nii.gz` (or `.nii`) from a volume file name
pub fn strip_volume_suffix(name: &str) -> &str {
    name.strip_suffix(VOLUME_SUFFIX)
        .or_else(|| name.strip_suffix(".nii"))
        .unwrap_or(name)
}
