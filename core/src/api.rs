use crate::error::Result;
use crate::extraction::{extract_temporo_spatial, open_header, SortedSeries};
use crate::types::MetadataDocument;
use log::info;
use std::path::Path;

/// Builds pre-inference metadata documents from DICOM series
///
/// # Example
///
/// ```no_run
/// use mitkseg_core::MetadataExtractor;
/// use std::path::Path;
///
/// let document = MetadataExtractor::extract(
///     Path::new("/nnUNet_input/series_01"),
///     "/nnUNet_output/tmp/1.2.3.nii.gz",
/// )
/// .unwrap();
///
/// assert_eq!(document.groups[0].file, "/nnUNet_output/tmp/1.2.3.nii.gz");
/// ```
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Sorts the series in `series_dir` and builds its metadata document
    ///
    /// `volume_file` is the NIfTI volume the document will describe.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SegError::EmptySeries`] if no slice of the series has a
    /// usable position, before any tag is read.
    pub fn extract(series_dir: &Path, volume_file: &str) -> Result<MetadataDocument> {
        let series = SortedSeries::from_directory(series_dir)?;
        Self::extract_from_sorted(series_dir, &series, volume_file)
    }

    /// Builds the document from an already sorted series
    pub fn extract_from_sorted(
        series_dir: &Path,
        series: &SortedSeries,
        volume_file: &str,
    ) -> Result<MetadataDocument> {
        let first = series.first(series_dir)?;
        let zmax = series.len() - 1;

        let dcm = open_header(Path::new(&first.absolute_path))?;
        let temporo_spatial = extract_temporo_spatial(&dcm, zmax);

        info!(
            "Built metadata for {} from {} slices",
            volume_file,
            series.len()
        );

        Ok(MetadataDocument::new(
            volume_file,
            series.references.clone(),
            temporo_spatial,
        ))
    }
}
