use crate::config::PipelineConfig;
use crate::error::Result;
use crate::labels::{Enrichment, LabelEnricher};
use crate::types::{strip_volume_suffix, MetadataDocument, DOCUMENT_SUFFIX, VOLUME_SUFFIX};
use log::{info, warn};
use rand::Rng;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use super::tool::ExternalTool;

/// File suffix of the DICOM-SEG objects produced by the converter
pub const SEGMENTATION_SUFFIX: &str = ".dcm";

/// A subject whose labels were written and handed to the converter
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedSubject {
    pub id: String,

    /// Enriched metadata document
    pub document: PathBuf,

    /// DICOM-SEG object
    pub segmentation: PathBuf,

    /// Number of labels added
    pub labels: usize,

    /// False when the DICOM-SEG object already existed
    pub converted: bool,
}

/// Result of finalizing every metadata document of a run
#[derive(Debug, Clone, Default)]
pub struct FinalizeSummary {
    pub finalized: Vec<FinalizedSubject>,

    /// Documents whose masks had no labels; nothing was converted for them
    pub unlabeled: Vec<PathBuf>,

    /// Masks in the tmp directory without a metadata document
    pub fallback: Vec<PathBuf>,
}

/// Enriches one metadata document and converts its mask to DICOM-SEG
///
/// Returns `None` when the mask has no labels: the document is not
/// rewritten and the converter is not invoked.
pub fn finalize_document<R: Rng>(
    config: &PipelineConfig,
    enricher: &mut LabelEnricher<'_, R>,
    document_path: &Path,
) -> Result<Option<FinalizedSubject>> {
    let mut document = MetadataDocument::from_file(document_path)?;
    let id = document.subject_id()?;

    let labels = match enricher.enrich_from_volume(&mut document)? {
        Enrichment::Labeled(count) => count,
        Enrichment::NoLabels => {
            warn!("No segmentations were produced, skipping: {}", id);
            return Ok(None);
        }
    };
    document.write_to_file(document_path)?;
    info!("Added {} labels to {}", labels, document_path.display());

    let segmentation = config
        .output_dir
        .join(format!("{}{}", id, SEGMENTATION_SUFFIX));
    let converted = if segmentation.exists() {
        info!("{} already exists, skipping conversion", segmentation.display());
        false
    } else {
        let converter = ExternalTool::new(&config.converter, config.execution_timeout);
        converter.run([
            OsStr::new("-i"),
            document_path.as_os_str(),
            OsStr::new("-o"),
            segmentation.as_os_str(),
        ])?;
        true
    };

    Ok(Some(FinalizedSubject {
        id,
        document: document_path.to_path_buf(),
        segmentation,
        labels,
        converted,
    }))
}

/// Finalizes every metadata document found below the tmp directory
pub fn finalize(config: &PipelineConfig) -> Result<FinalizeSummary> {
    let strategy = config.label_policy.strategy();
    let mut enricher = LabelEnricher::new(&*strategy, rand::rng());

    let tmp_dir = config.tmp_dir();
    let mut documents = Vec::new();
    collect_documents(&tmp_dir, &mut documents)?;
    documents.sort();
    info!("Found {} metadata documents", documents.len());

    let mut summary = FinalizeSummary {
        fallback: fallback_masks(&tmp_dir, &documents)?,
        ..Default::default()
    };
    for mask in &summary.fallback {
        warn!("No metadata document for {}, returning mask as is", mask.display());
    }

    for document_path in documents {
        match finalize_document(config, &mut enricher, &document_path)? {
            Some(subject) => summary.finalized.push(subject),
            None => summary.unlabeled.push(document_path),
        }
    }
    Ok(summary)
}

/// Recursively collects `*.mitklabel.json` files
fn collect_documents(dir: &Path, documents: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_documents(&path, documents)?;
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(DOCUMENT_SUFFIX))
        {
            documents.push(path);
        }
    }
    Ok(())
}

/// Lists `*.nii.gz` masks directly in `dir` with no matching document
fn fallback_masks(dir: &Path, documents: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let documented: BTreeSet<&str> = documents
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .filter_map(|n| n.strip_suffix(DOCUMENT_SUFFIX))
        .collect();

    let mut masks = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file()
            && name.ends_with(VOLUME_SUFFIX)
            && !documented.contains(strip_volume_suffix(name))
        {
            masks.push(path);
        }
    }
    masks.sort();
    Ok(masks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::discovery::tests::write_mask;
    use crate::labels::ContiguousLabels;
    use crate::types::SliceReference;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn write_document(tmp_dir: &Path, id: &str) -> PathBuf {
        let mask = tmp_dir.join(format!("{}.nii.gz", id));
        let path = tmp_dir.join(format!("{}{}", id, DOCUMENT_SUFFIX));
        MetadataDocument::new(
            mask.to_string_lossy(),
            vec![SliceReference::new(0, "/in/a.dcm")],
            BTreeMap::new(),
        )
        .write_to_file(&path)
        .unwrap();
        path
    }

    #[test]
    fn test_collect_documents_recursively() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("fold_0");
        fs::create_dir(&nested).unwrap();
        fs::write(temp_dir.path().join("a.mitklabel.json"), "{}").unwrap();
        fs::write(nested.join("b.mitklabel.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("a.nii.gz"), b"").unwrap();

        let mut documents = Vec::new();
        collect_documents(temp_dir.path(), &mut documents).unwrap();
        documents.sort();

        assert_eq!(
            documents,
            vec![
                temp_dir.path().join("a.mitklabel.json"),
                nested.join("b.mitklabel.json")
            ]
        );
    }

    #[test]
    fn test_fallback_masks_without_documents() {
        let temp_dir = TempDir::new().unwrap();
        let documented = write_document(temp_dir.path(), "1.2.3");
        fs::write(temp_dir.path().join("1.2.3.nii.gz"), b"").unwrap();
        fs::write(temp_dir.path().join("orphan.nii.gz"), b"").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"").unwrap();

        let masks = fallback_masks(temp_dir.path(), &[documented]).unwrap();

        assert_eq!(masks, vec![temp_dir.path().join("orphan.nii.gz")]);
    }

    #[test]
    fn test_unlabeled_subject_is_not_converted() {
        let temp_dir = TempDir::new().unwrap();
        let config = PipelineConfig::default()
            .with_output_dir(temp_dir.path())
            .with_converter("/nonexistent/converter.sh");
        fs::create_dir_all(config.tmp_dir()).unwrap();
        let document = write_document(&config.tmp_dir(), "1.2.3");
        write_mask(&config.tmp_dir().join("1.2.3.nii.gz"), &[0, 0, 0]);
        let before = fs::read_to_string(&document).unwrap();

        let mut enricher = LabelEnricher::new(&ContiguousLabels, StdRng::seed_from_u64(3));
        let outcome = finalize_document(&config, &mut enricher, &document).unwrap();

        assert!(outcome.is_none());
        assert_eq!(fs::read_to_string(&document).unwrap(), before);
        assert!(!temp_dir.path().join("1.2.3.dcm").exists());
    }

    #[test]
    fn test_existing_segmentation_skips_converter() {
        let temp_dir = TempDir::new().unwrap();
        let config = PipelineConfig::default()
            .with_output_dir(temp_dir.path())
            .with_converter("/nonexistent/converter.sh");
        fs::create_dir_all(config.tmp_dir()).unwrap();
        let document = write_document(&config.tmp_dir(), "1.2.3");
        write_mask(&config.tmp_dir().join("1.2.3.nii.gz"), &[0, 1, 2, 3]);
        fs::write(temp_dir.path().join("1.2.3.dcm"), b"existing").unwrap();

        let summary = finalize(&config).unwrap();

        assert_eq!(summary.finalized.len(), 1);
        assert!(summary.fallback.is_empty());
        let subject = &summary.finalized[0];
        assert_eq!(subject.id, "1.2.3");
        assert_eq!(subject.labels, 3);
        assert!(!subject.converted);
        let written = MetadataDocument::from_file(&document).unwrap();
        assert_eq!(written.group().unwrap().labels.as_ref().unwrap().len(), 3);
    }
}
