//! End-to-end extraction scenarios over synthetic instances.

use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::tags;
use dicom_object::mem::InMemDicomObject;
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::{DefaultDicomObject, FileDicomObject};
use dicom_pixeldata::image::{DynamicImage, GenericImageView};
use oculex_core::{
    ArtifactHandle, Collaborators, DicomExtractor, DocumentRasterizer, MetadataValue,
    OctVolumeReader, PixelVolume, Result, ResultWriter, VisualFieldReader,
};
use std::path::Path;
use tempfile::tempdir;

const PHOTOGRAPHY_8_BIT: &str = "1.2.840.10008.5.1.4.1.1.77.1.5.1";
const TOMOGRAPHY: &str = "1.2.840.10008.5.1.4.1.1.77.1.5.4";
const ENCAPSULATED_PDF: &str = "1.2.840.10008.5.1.4.1.1.104.1";
const SPATIAL_REGISTRATION: &str = "1.2.840.10008.5.1.4.1.1.66";
const VISUAL_FIELD: &str = "1.2.840.10008.5.1.4.1.1.80.1";

fn instance(model: &str, sop_class: &str) -> DefaultDicomObject {
    let meta = FileMetaTableBuilder::new()
        .media_storage_sop_class_uid(sop_class)
        .media_storage_sop_instance_uid("1.2.826.0.1.999.1")
        .transfer_syntax("1.2.840.10008.1.2.1")
        .build()
        .unwrap();
    let mut obj = FileDicomObject::new_empty_with_meta(meta);
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(sop_class),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from("1.2.826.0.1.999.1"),
    ));
    obj.put(DataElement::new(
        tags::MANUFACTURER,
        VR::LO,
        PrimitiveValue::from("Carl Zeiss Meditec"),
    ));
    obj.put(DataElement::new(
        tags::MANUFACTURER_MODEL_NAME,
        VR::LO,
        PrimitiveValue::from(model),
    ));
    obj.put(DataElement::new(
        tags::PATIENT_ID,
        VR::LO,
        PrimitiveValue::from("P-0001"),
    ));
    obj.put(DataElement::new(
        tags::MODALITY,
        VR::CS,
        PrimitiveValue::from("OP"),
    ));
    obj.put(DataElement::new(
        tags::STUDY_DATE,
        VR::DA,
        PrimitiveValue::from("20240105"),
    ));
    obj
}

fn with_rgb_pixels(mut obj: DefaultDicomObject) -> DefaultDicomObject {
    obj.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(4u16)));
    obj.put(DataElement::new(
        tags::COLUMNS,
        VR::US,
        PrimitiveValue::from(4u16),
    ));
    obj.put(DataElement::new(
        tags::BITS_ALLOCATED,
        VR::US,
        PrimitiveValue::from(8u16),
    ));
    obj.put(DataElement::new(
        tags::BITS_STORED,
        VR::US,
        PrimitiveValue::from(8u16),
    ));
    obj.put(DataElement::new(
        tags::HIGH_BIT,
        VR::US,
        PrimitiveValue::from(7u16),
    ));
    obj.put(DataElement::new(
        tags::PIXEL_REPRESENTATION,
        VR::US,
        PrimitiveValue::from(0u16),
    ));
    obj.put(DataElement::new(
        tags::SAMPLES_PER_PIXEL,
        VR::US,
        PrimitiveValue::from(3u16),
    ));
    obj.put(DataElement::new(
        tags::PLANAR_CONFIGURATION,
        VR::US,
        PrimitiveValue::from(0u16),
    ));
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from("YBR_FULL"),
    ));
    let data: Vec<u8> = (0..48u8).collect();
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U8(data.into()),
    ));
    obj
}

fn with_gray_frames(mut obj: DefaultDicomObject, frames: u16) -> DefaultDicomObject {
    obj.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(4u16)));
    obj.put(DataElement::new(
        tags::COLUMNS,
        VR::US,
        PrimitiveValue::from(4u16),
    ));
    obj.put(DataElement::new(
        tags::NUMBER_OF_FRAMES,
        VR::IS,
        PrimitiveValue::from(frames.to_string()),
    ));
    obj.put(DataElement::new(
        tags::BITS_ALLOCATED,
        VR::US,
        PrimitiveValue::from(8u16),
    ));
    obj.put(DataElement::new(
        tags::BITS_STORED,
        VR::US,
        PrimitiveValue::from(8u16),
    ));
    obj.put(DataElement::new(
        tags::HIGH_BIT,
        VR::US,
        PrimitiveValue::from(7u16),
    ));
    obj.put(DataElement::new(
        tags::PIXEL_REPRESENTATION,
        VR::US,
        PrimitiveValue::from(0u16),
    ));
    obj.put(DataElement::new(
        tags::SAMPLES_PER_PIXEL,
        VR::US,
        PrimitiveValue::from(1u16),
    ));
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from("MONOCHROME2"),
    ));
    let data: Vec<u8> = (0..frames as usize * 16).map(|i| i as u8).collect();
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U8(data.into()),
    ));
    obj
}

struct TwoPageRasterizer;

impl DocumentRasterizer for TwoPageRasterizer {
    fn rasterize_pages(&self, _document: &[u8]) -> Result<Vec<DynamicImage>> {
        Ok(vec![
            DynamicImage::new_rgb8(8, 8),
            DynamicImage::new_rgb8(8, 8),
        ])
    }
}

struct FixedVolumeReader;

impl OctVolumeReader for FixedVolumeReader {
    fn read_volume(&self, _path: &Path) -> Result<PixelVolume> {
        PixelVolume::new(2, 4, 4, 1, vec![0u8; 32])
    }
}

struct CannedFieldReader;

impl VisualFieldReader for CannedFieldReader {
    fn parse(&self, _store: &oculex_core::AttributeStore) -> Result<serde_json::Value> {
        Ok(serde_json::json!({"test_strategy": "24-2", "md": -1.5}))
    }
}

#[test]
fn test_clarus_photography_yields_rgb_image() {
    let obj = with_rgb_pixels(instance("CLARUS 700", PHOTOGRAPHY_8_BIT));
    let extractor = DicomExtractor::new(Collaborators::none());
    let extraction = extractor.extract_object(obj).unwrap();

    assert!(extraction.warnings.is_empty(), "{:?}", extraction.warnings);
    let artifact = extraction
        .tree
        .get("image_PIL")
        .and_then(MetadataValue::as_artifact)
        .expect("fundus image attached");
    assert!(matches!(artifact, ArtifactHandle::Image { name, .. } if name == "image"));
    assert_eq!(
        extraction.tree.get_str("Photometric Interpretation"),
        Some("RGB from YBR_FULL")
    );
    assert_eq!(
        extraction.tree.get("Bits Allocated"),
        Some(&MetadataValue::Int(8))
    );
}

#[test]
fn test_cirrus_6000_tomography_attaches_stack_and_en_face() {
    let obj = with_gray_frames(instance("CIRRUS HD-OCT 6000", TOMOGRAPHY), 3);
    let extractor = DicomExtractor::new(Collaborators::none());
    let extraction = extractor.extract_object(obj).unwrap();

    assert!(extraction.warnings.is_empty(), "{:?}", extraction.warnings);
    let stack = extraction
        .tree
        .get("bscan_images")
        .and_then(MetadataValue::as_artifact)
        .expect("B-scan stack attached");
    let names: Vec<_> = stack.elements().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["frame 1", "frame 2", "frame 3"]);

    let projection = extraction
        .tree
        .get("en_face_image")
        .and_then(MetadataValue::as_artifact)
        .expect("en-face projection attached");
    let ArtifactHandle::Image { name, image } = projection else {
        panic!("en-face artifact is not a single image");
    };
    assert_eq!(name, "en_face_from_max_operation_across_bscans");
    assert_eq!(image.dimensions(), (4, 3));
    // each output row holds the column-wise maxima of one B-scan; with
    // monotonically increasing samples that is the last row of each frame
    assert_eq!(
        image.as_bytes(),
        &[12, 13, 14, 15, 28, 29, 30, 31, 44, 45, 46, 47]
    );
}

#[test]
fn test_unknown_model_yields_common_fields_only() {
    let obj = with_rgb_pixels(instance("Some Future Device", PHOTOGRAPHY_8_BIT));
    let extractor = DicomExtractor::new(Collaborators::none());
    let extraction = extractor.extract_object(obj).unwrap();

    assert_eq!(extraction.tree.len(), 8);
    assert!(extraction.tree.artifacts().is_empty());
    assert!(extraction.warnings.is_empty());
    assert_eq!(extraction.tree.get_str("Model"), Some("Some Future Device"));
    assert_eq!(
        extraction.tree.get_str("SOP Class Description"),
        Some("Ophthalmic Photography 8 Bit Image Storage")
    );
}

#[test]
fn test_unhandled_storage_class_degrades_with_warning() {
    // CLARUS has no PDF arm; the common fields must still come through
    let obj = instance("CLARUS 700", ENCAPSULATED_PDF);
    let extractor = DicomExtractor::new(Collaborators::none());
    let extraction = extractor.extract_object(obj).unwrap();

    assert_eq!(extraction.tree.len(), 8);
    assert_eq!(extraction.warnings.len(), 1);
    assert!(extraction.warnings[0].contains("not handled for CLARUS 700"));
}

#[test]
fn test_unlisted_registration_series_takes_fallback() {
    let mut obj = instance("CIRRUS HD-OCT 5000", SPATIAL_REGISTRATION);
    obj.put(DataElement::new(
        tags::SERIES_DESCRIPTION,
        VR::LO,
        PrimitiveValue::from("Novel Scan Pattern"),
    ));
    obj.put(DataElement::new(
        tags::LATERALITY,
        VR::CS,
        PrimitiveValue::from("L"),
    ));
    let extractor = DicomExtractor::new(Collaborators::none());
    let extraction = extractor.extract_object(obj).unwrap();

    assert_eq!(
        extraction.tree.get_str("Series Description"),
        Some("Novel Scan Pattern")
    );
    assert_eq!(extraction.tree.get_str("Laterality"), Some("L"));
    assert_eq!(
        extraction.tree.get_str("FrameOfReferenceUID"),
        Some("Unknown")
    );
    assert!(extraction.warnings.is_empty());
}

#[test]
fn test_pdf_pages_rasterized_with_previews() {
    let mut obj = instance("ATLAS 9000", ENCAPSULATED_PDF);
    obj.put(DataElement::new(
        tags::ENCAPSULATED_DOCUMENT,
        VR::OB,
        PrimitiveValue::U8(b"%PDF-1.4 stub".to_vec().into()),
    ));
    let extractor = DicomExtractor::new(Collaborators::none().with_document(TwoPageRasterizer));
    let extraction = extractor.extract_object(obj).unwrap();

    let pages = extraction
        .tree
        .get("png_pages")
        .and_then(MetadataValue::as_artifact)
        .expect("page set attached");
    let names: Vec<_> = pages.elements().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["page_1", "page_2"]);

    let previews = extraction
        .tree
        .get("png_page_previews")
        .and_then(MetadataValue::as_tree)
        .expect("inline previews present");
    let uri = previews.get_str("page_1").unwrap();
    assert!(uri.starts_with("data:image/png;base64,"));
}

#[test]
fn test_missing_rasterizer_downgrades_to_warning() {
    let mut obj = instance("ATLAS 9000", ENCAPSULATED_PDF);
    obj.put(DataElement::new(
        tags::ENCAPSULATED_DOCUMENT,
        VR::OB,
        PrimitiveValue::U8(b"%PDF-1.4 stub".to_vec().into()),
    ));
    let extractor = DicomExtractor::new(Collaborators::none());
    let extraction = extractor.extract_object(obj).unwrap();

    assert!(extraction.tree.get("png_pages").is_none());
    assert_eq!(extraction.warnings.len(), 1);
    assert!(extraction.warnings[0].contains("no document rasterizer configured"));
}

#[test]
fn test_missing_pdf_payload_aborts() {
    let obj = instance("ATLAS 9000", ENCAPSULATED_PDF);
    let extractor = DicomExtractor::new(Collaborators::none().with_document(TwoPageRasterizer));
    let err = extractor.extract_object(obj).unwrap_err();
    assert!(err.to_string().contains("(0x0042, 0x0011)"));
}

#[test]
fn test_visual_field_report_lands_in_tree() {
    let mut obj = instance("FORUM Glaucoma Workplace", VISUAL_FIELD);
    obj.put(DataElement::new(
        tags::SERIES_DESCRIPTION,
        VR::LO,
        PrimitiveValue::from("SFA"),
    ));
    let extractor = DicomExtractor::new(Collaborators::none().with_visual_field(CannedFieldReader));
    let extraction = extractor.extract_object(obj).unwrap();

    let report = extraction
        .tree
        .get("HVF Object")
        .and_then(MetadataValue::as_tree)
        .expect("perimetry report present");
    assert_eq!(report.get_str("test_strategy"), Some("24-2"));
    assert_eq!(report.get("md"), Some(&MetadataValue::Float(-1.5)));
}

#[test]
fn test_maestro_volume_read_from_source_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("maestro.dcm");
    instance("3DOCT-1Maestro2", TOMOGRAPHY)
        .write_to_file(&path)
        .unwrap();

    let extractor = DicomExtractor::new(Collaborators::none().with_oct(FixedVolumeReader));
    let extraction = extractor.extract_file(&path).unwrap();

    let stack = extraction
        .tree
        .get("bscan_images")
        .and_then(MetadataValue::as_artifact)
        .expect("B-scan stack attached");
    let names: Vec<_> = stack.elements().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["frame 1", "frame 2"]);
}

#[test]
fn test_maestro_without_reader_warns_and_continues() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("maestro.dcm");
    instance("3DOCT-1Maestro2", TOMOGRAPHY)
        .write_to_file(&path)
        .unwrap();

    let extractor = DicomExtractor::new(Collaborators::none());
    let extraction = extractor.extract_file(&path).unwrap();

    assert!(extraction.tree.get("bscan_images").is_none());
    assert_eq!(extraction.warnings.len(), 1);
    assert!(extraction.warnings[0].contains("no OCT volume reader configured"));
}

#[test]
fn test_iol_master_keratometry_private_groups() {
    fn axis_item(radius: f64, power: f64, axis: f64) -> InMemDicomObject {
        InMemDicomObject::from_element_iter(vec![
            DataElement::new(
                tags::RADIUS_OF_CURVATURE,
                VR::FL,
                PrimitiveValue::from(radius),
            ),
            DataElement::new(
                tags::KERATOMETRIC_POWER,
                VR::FL,
                PrimitiveValue::from(power),
            ),
            DataElement::new(tags::KERATOMETRIC_AXIS, VR::FL, PrimitiveValue::from(axis)),
        ])
    }
    fn eye(steep: InMemDicomObject, flat: InMemDicomObject) -> InMemDicomObject {
        InMemDicomObject::from_element_iter(vec![
            DataElement::new(
                tags::STEEP_KERATOMETRIC_AXIS_SEQUENCE,
                VR::SQ,
                DataSetSequence::from(vec![steep]),
            ),
            DataElement::new(
                tags::FLAT_KERATOMETRIC_AXIS_SEQUENCE,
                VR::SQ,
                DataSetSequence::from(vec![flat]),
            ),
        ])
    }

    let mut obj = instance("IOLMaster 700", "1.2.840.10008.5.1.4.1.1.78.3");
    // only the public per-eye sequences; the private groups are absent, so
    // the strategy must abort with the offending tag in the message
    obj.put(DataElement::new(
        tags::KERATOMETRY_RIGHT_EYE_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(vec![eye(
            axis_item(7.1, 47.5, 95.0),
            axis_item(7.6, 44.2, 5.0),
        )]),
    ));
    let extractor = DicomExtractor::new(Collaborators::none());
    let err = extractor.extract_object(obj).unwrap_err();
    assert!(err.to_string().contains("(0x2201, 0x1000)"));
}

#[test]
fn test_extract_file_to_writes_sidecar_and_artifacts() {
    let input_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    let path = input_dir.path().join("clarus.dcm");
    with_rgb_pixels(instance("CLARUS 700", PHOTOGRAPHY_8_BIT))
        .write_to_file(&path)
        .unwrap();

    let extractor = DicomExtractor::new(Collaborators::none());
    let writer = ResultWriter::new(output_dir.path());
    let (extraction, written) = extractor.extract_file_to(&path, &writer).unwrap();

    assert!(extraction.warnings.is_empty());
    assert_eq!(
        written.sidecar,
        output_dir.path().join("1.2.826.0.1.999.1.json")
    );
    assert!(written.sidecar.is_file());
    assert_eq!(written.images.len(), 1);
    assert!(written.images[0].ends_with("1.2.826.0.1.999.1/image.png"));
    assert!(written.images[0].is_file());

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&written.sidecar).unwrap()).unwrap();
    assert_eq!(json["Photometric Interpretation"], "RGB from YBR_FULL");
    assert!(json.get("image_PIL").is_none());
}
