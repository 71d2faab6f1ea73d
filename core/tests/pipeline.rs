#![cfg(unix)]

use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_dictionary_std::uids;
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::InMemDicomObject;
use mitkseg_core::extraction::tags::{IMAGE_POSITION_PATIENT, PATIENT_ID, SERIES_INSTANCE_UID};
use mitkseg_core::{pipeline, MetadataDocument, PipelineConfig, SegError};
use ndarray::Array3;
use nifti::writer::WriterOptions;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn write_slice(path: &Path, series_uid: &str, patient_id: &str, z: &str) {
    let elements: Vec<DataElement<InMemDicomObject>> = vec![
        DataElement::new(
            IMAGE_POSITION_PATIENT,
            VR::DS,
            PrimitiveValue::Strs(vec!["0".to_string(), "0".to_string(), z.to_string()].into()),
        ),
        DataElement::new(SERIES_INSTANCE_UID, VR::UI, PrimitiveValue::from(series_uid)),
        DataElement::new(PATIENT_ID, VR::LO, PrimitiveValue::from(patient_id)),
        DataElement::new(Tag(0x0008, 0x0060), VR::CS, PrimitiveValue::from("CT")),
    ];
    InMemDicomObject::from_element_iter(elements)
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                .media_storage_sop_instance_uid("1.2.826.0.1.3680043.2.1125.9"),
        )
        .unwrap()
        .write_to_file(path)
        .unwrap();
}

fn write_mask(path: &Path, voxels: &[u8]) {
    let data = Array3::from_shape_vec((voxels.len(), 1, 1), voxels.to_vec()).unwrap();
    WriterOptions::new(path).write_nifti(&data).unwrap();
}

fn write_script(path: &Path, body: &str) -> PathBuf {
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

struct Workspace {
    _temp_dir: TempDir,
    root: PathBuf,
    config: PipelineConfig,
}

/// Input series, stub converter, and a stub inference engine that copies
/// prepared masks into its output directory
fn workspace() -> Workspace {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let input = root.join("input");
    let masks = root.join("masks");
    let tools = root.join("tools");
    for dir in [&input, &masks, &tools] {
        fs::create_dir_all(dir).unwrap();
    }

    let liver = input.join("liver");
    fs::create_dir(&liver).unwrap();
    write_slice(&liver.join("s1.dcm"), "1.2.3", "P-10", "10.0");
    write_slice(&liver.join("s2.dcm"), "1.2.3", "P-5", "5.0");
    write_slice(&liver.join("s3.dcm"), "1.2.3", "P-20", "20.0");

    let blank = input.join("blank");
    fs::create_dir(&blank).unwrap();
    write_slice(&blank.join("only.dcm"), "4.5.6", "P-B", "1.0");

    let broken = input.join("broken");
    fs::create_dir(&broken).unwrap();
    fs::write(broken.join("junk.dcm"), b"not dicom").unwrap();

    write_mask(&masks.join("1.2.3.nii.gz"), &[0, 1, 2, 2, 0, 1]);
    write_mask(&masks.join("4.5.6.nii.gz"), &[0, 0, 0]);
    write_mask(&masks.join("orphan.nii.gz"), &[0, 4, 4]);

    // -i <input> -o <output>
    let converter = write_script(
        &tools.join("convert.sh"),
        "echo \"converting $2\"\ntouch \"$4\"",
    );
    // -i <data_dir> -o <out_dir> ...
    let inference = write_script(
        &tools.join("predict.sh"),
        &format!("cp \"{}\"/*.nii.gz \"$4\"/", masks.display()),
    );

    let config = PipelineConfig::default()
        .with_input_dir(&input)
        .with_output_dir(root.join("output"))
        .with_converter(converter)
        .with_inference(inference)
        .with_execution_timeout(Duration::from_secs(30));

    Workspace {
        _temp_dir: temp_dir,
        root,
        config,
    }
}

#[test]
fn test_full_run() {
    let ws = workspace();
    let output = ws.root.join("output");

    let summary = pipeline::run(&ws.config).unwrap();

    let mut prepared: Vec<_> = summary
        .prepare
        .prepared
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    prepared.sort();
    assert_eq!(prepared, vec!["1.2.3", "4.5.6"]);
    assert_eq!(summary.prepare.skipped.len(), 1);
    assert!(summary.prepare.skipped[0].path.ends_with("broken"));

    assert!(ws.config.data_dir().join("1.2.3_0000.nii.gz").exists());
    assert!(!ws.config.data_dir().join("1.2.3.nii.gz").exists());

    assert_eq!(summary.finalize.finalized.len(), 1);
    let subject = &summary.finalize.finalized[0];
    assert_eq!(subject.id, "1.2.3");
    assert_eq!(subject.labels, 2);
    assert!(subject.converted);
    assert!(output.join("1.2.3.dcm").exists());

    assert_eq!(summary.finalize.unlabeled.len(), 1);
    assert!(!output.join("4.5.6.dcm").exists());

    assert_eq!(
        summary.finalize.fallback,
        vec![ws.config.tmp_dir().join("orphan.nii.gz")]
    );
    assert!(!output.join("orphan.dcm").exists());
}

#[test]
fn test_run_documents() {
    let ws = workspace();

    pipeline::run(&ws.config).unwrap();

    let labeled =
        MetadataDocument::from_file(ws.config.tmp_dir().join("1.2.3.mitklabel.json")).unwrap();
    let references = labeled.reference_files();
    assert_eq!(references.len(), 3);
    assert!(references[0].absolute_path.ends_with("s2.dcm"));
    assert!(references[1].absolute_path.ends_with("s1.dcm"));
    assert!(references[2].absolute_path.ends_with("s3.dcm"));
    let tags = &labeled.properties.temporo_spatial;
    assert_eq!(tags["DICOM.0010.0020"].first_value(), Some("P-5"));
    assert_eq!(tags["DICOM.0008.0060"].first_value(), Some("SEG"));

    let group = labeled.group().unwrap();
    assert!(group.file.ends_with("tmp/1.2.3.nii.gz"));
    let labels = group.labels.as_ref().unwrap();
    assert_eq!(labels.iter().map(|l| l.value).collect::<Vec<_>>(), vec![1, 2]);

    let unlabeled =
        MetadataDocument::from_file(ws.config.tmp_dir().join("4.5.6.mitklabel.json")).unwrap();
    assert!(unlabeled.group().unwrap().labels.is_none());
}

#[test]
fn test_prepare_skips_existing_volume() {
    let ws = workspace();
    fs::create_dir_all(ws.config.data_dir()).unwrap();
    fs::write(ws.config.data_dir().join("1.2.3.nii.gz"), b"already converted").unwrap();

    let summary = pipeline::prepare(&ws.config).unwrap();

    let liver = summary.prepared.iter().find(|s| s.id == "1.2.3").unwrap();
    assert!(!liver.converted);
    assert_eq!(
        fs::read(ws.config.data_dir().join("1.2.3.nii.gz")).unwrap(),
        b"already converted"
    );
}

#[test]
fn test_converter_failure_is_fatal() {
    let ws = workspace();
    let failing = write_script(&ws.root.join("tools/fail.sh"), "exit 4");
    let config = ws.config.clone().with_converter(failing);

    let result = pipeline::prepare(&config);

    assert!(matches!(result, Err(SegError::ToolFailed { .. })));
}

#[test]
fn test_inference_timeout_is_fatal() {
    let ws = workspace();
    let slow = write_script(&ws.root.join("tools/slow.sh"), "sleep 5");
    let config = ws
        .config
        .clone()
        .with_inference(slow)
        .with_execution_timeout(Duration::from_millis(300));
    pipeline::prepare(&ws.config).unwrap();

    let result = pipeline::predict(&config);

    assert!(matches!(result, Err(SegError::ToolTimeout { .. })));
}
