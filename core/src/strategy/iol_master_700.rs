//! IOLMaster 700 optical biometer.
//!
//! Beyond photography and PDF reports this device emits three measurement
//! storage classes: intraocular lens calculations, axial length
//! measurements, and keratometry. Their deeply nested sequences are
//! flattened into typed sub-trees; the vendor-private keratometry groups are
//! keyed by tag.

use super::zeiss;
use super::{ExtractCtx, ModelStrategy, SopClassArm, SopDispatch};
use crate::catalog::{uids, StorageClassCatalog};
use crate::error::Result;
use crate::extraction::flatten;
use crate::extraction::tags;
use crate::metadata::MetadataTree;
use crate::store::{tag_key, AttributeStore};
use dicom_core::Tag;
use dicom_object::mem::InMemDicomObject;

fn photography(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::attach_single_image(ctx);
    zeiss::insert_bits_allocated(ctx);
    zeiss::insert_photometric_interpretation(ctx);
    zeiss::insert_pixel_spacing(ctx);
    Ok(())
}

fn true_color_stack(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::attach_frame_stack(ctx);
    Ok(())
}

/// `{Code Value, Code Meaning}` of the first item of a nested code sequence.
fn code_pair_of(item: &InMemDicomObject, sequence: Tag, path: &str) -> Result<MetadataTree> {
    let code = flatten::required_item(item, sequence, 0, path)?;
    flatten::code_pair(code, path)
}

fn code_triples(item: &InMemDicomObject, sequence: Tag, path: &str) -> Result<Vec<MetadataTree>> {
    flatten::required_items(item, sequence, path)?
        .iter()
        .map(|code| flatten::code_triple(code, path))
        .collect()
}

// --- Intraocular Lens Calculations Storage ----------------------------------

fn iol_power_entries(calc: &InMemDicomObject, path: &str) -> Result<Vec<MetadataTree>> {
    flatten::required_items(calc, tags::IOL_POWER_SEQUENCE, path)?
        .iter()
        .map(|item| {
            let mut tree = MetadataTree::new();
            tree.insert(
                "Pre-Selected for Implantation",
                flatten::required_str(item, tags::PRE_SELECTED_FOR_IMPLANTATION, path)?,
            );
            tree.insert("IOL Power", flatten::required_f64(item, tags::IOL_POWER, path)?);
            tree.insert(
                "Predicted Refractive Error",
                flatten::required_f64(item, tags::PREDICTED_REFRACTIVE_ERROR, path)?,
            );
            tree.insert(
                "Implant Part Number",
                flatten::required_str(item, tags::IMPLANT_PART_NUMBER, path)?,
            );
            Ok(tree)
        })
        .collect()
}

fn lens_constant_entries(calc: &InMemDicomObject, path: &str) -> Result<Vec<MetadataTree>> {
    flatten::required_items(calc, tags::LENS_CONSTANT_SEQUENCE, path)?
        .iter()
        .map(|item| code_pair_of(item, tags::CONCEPT_NAME_CODE_SEQUENCE, path))
        .collect()
}

fn corneal_size_entries(calc: &InMemDicomObject, path: &str) -> Result<Vec<MetadataTree>> {
    flatten::required_items(calc, tags::CORNEAL_SIZE_SEQUENCE, path)?
        .iter()
        .map(|item| {
            let mut tree = MetadataTree::new();
            tree.insert(
                "Corneal Size",
                flatten::required_f64(item, tags::CORNEAL_SIZE, path)?,
            );
            tree.insert(
                "Source of Corneal Size Data Code Sequence",
                code_pair_of(item, tags::SOURCE_OF_CORNEAL_SIZE_DATA_CODE_SEQUENCE, path)?,
            );
            Ok(tree)
        })
        .collect()
}

fn anterior_chamber_entries(calc: &InMemDicomObject, path: &str) -> Result<Vec<MetadataTree>> {
    flatten::required_items(calc, tags::ANTERIOR_CHAMBER_DEPTH_SEQUENCE, path)?
        .iter()
        .map(|item| {
            let mut tree = MetadataTree::new();
            tree.insert(
                "Anterior Chamber Depth",
                flatten::required_f64(item, tags::ANTERIOR_CHAMBER_DEPTH, path)?,
            );
            tree.insert(
                "Source of Anterior Chamber Depth Data Code Sequence",
                code_pair_of(
                    item,
                    tags::SOURCE_OF_ANTERIOR_CHAMBER_DEPTH_DATA_CODE_SEQUENCE,
                    path,
                )?,
            );
            Ok(tree)
        })
        .collect()
}

fn keratometric_axis_entries(
    calc: &InMemDicomObject,
    sequence: Tag,
    path: &str,
) -> Result<Vec<MetadataTree>> {
    flatten::required_items(calc, sequence, path)?
        .iter()
        .map(|item| {
            let mut tree = MetadataTree::new();
            tree.insert(
                "Radius of Curvature",
                flatten::required_f64(item, tags::RADIUS_OF_CURVATURE, path)?,
            );
            tree.insert(
                "Keratometric Power",
                flatten::required_f64(item, tags::KERATOMETRIC_POWER, path)?,
            );
            tree.insert(
                "Keratometric Axis",
                flatten::required_f64(item, tags::KERATOMETRIC_AXIS, path)?,
            );
            Ok(tree)
        })
        .collect()
}

fn corneal_axis_entries(
    measurement: &InMemDicomObject,
    sequence: Tag,
    path: &str,
) -> Result<Vec<MetadataTree>> {
    flatten::required_items(measurement, sequence, path)?
        .iter()
        .map(|item| {
            let mut tree = MetadataTree::new();
            tree.insert(
                "Radius of Curvature",
                flatten::required_f64(item, tags::RADIUS_OF_CURVATURE, path)?,
            );
            tree.insert(
                "Corneal Power",
                flatten::required_f64(item, tags::CORNEAL_POWER, path)?,
            );
            tree.insert(
                "Corneal Axis",
                flatten::required_f64(item, tags::CORNEAL_AXIS, path)?,
            );
            Ok(tree)
        })
        .collect()
}

fn cornea_measurement_entries(calc: &InMemDicomObject, path: &str) -> Result<Vec<MetadataTree>> {
    flatten::required_items(calc, tags::CORNEA_MEASUREMENTS_SEQUENCE, path)?
        .iter()
        .map(|measurement| {
            let methods: Vec<MetadataTree> = flatten::required_items(
                measurement,
                tags::CORNEA_MEASUREMENT_METHOD_CODE_SEQUENCE,
                path,
            )?
            .iter()
            .map(|code| flatten::code_pair(code, path))
            .collect::<Result<_>>()?;
            let mut tree = MetadataTree::new();
            tree.insert(
                "Keratometer Index",
                flatten::required_f64(measurement, tags::KERATOMETER_INDEX, path)?,
            );
            tree.insert(
                "Source of Cornea Measurement Data Code Sequence",
                code_pair_of(
                    measurement,
                    tags::SOURCE_OF_CORNEA_MEASUREMENT_DATA_CODE_SEQUENCE,
                    path,
                )?,
            );
            tree.insert(
                "Steep Corneal Axis Sequence",
                corneal_axis_entries(measurement, tags::STEEP_CORNEAL_AXIS_SEQUENCE, path)?,
            );
            tree.insert(
                "Flat Corneal Axis Sequence",
                corneal_axis_entries(measurement, tags::FLAT_CORNEAL_AXIS_SEQUENCE, path)?,
            );
            tree.insert("Cornea Measurement Method Code Sequence", methods);
            Ok(tree)
        })
        .collect()
}

fn calculation_entry(calc: &InMemDicomObject, path: &str) -> Result<MetadataTree> {
    let axial = flatten::required_item(calc, tags::OPHTHALMIC_AXIAL_LENGTH_SEQUENCE, 0, path)?;
    let mut axial_tree = MetadataTree::new();
    axial_tree.insert(
        "OphthalmicAxialLength",
        flatten::required_f64(axial, tags::OPHTHALMIC_AXIAL_LENGTH, path)?,
    );
    let source = flatten::required_item(
        axial,
        tags::SOURCE_OF_OPHTHALMIC_AXIAL_LENGTH_CODE_SEQUENCE,
        0,
        path,
    )?;
    axial_tree.insert(
        "Source of Ophthalmic Axial Length Code Sequence",
        flatten::required_str(source, tags::CODE_MEANING, path)?,
    );
    let selection = flatten::required_item(
        axial,
        tags::OPHTHALMIC_AXIAL_LENGTH_SELECTION_METHOD_CODE_SEQUENCE,
        0,
        path,
    )?;
    axial_tree.insert(
        "Ophthalmic Axial Length Selection Method Code Sequence",
        flatten::required_str(selection, tags::CODE_MEANING, path)?,
    );

    let astigmatism = flatten::required_item(
        calc,
        tags::SURGICALLY_INDUCED_ASTIGMATISM_SEQUENCE,
        0,
        path,
    )?;
    let mut astigmatism_tree = MetadataTree::new();
    astigmatism_tree.insert(
        "Cylinder Axis",
        flatten::required_f64(astigmatism, tags::CYLINDER_AXIS, path)?,
    );
    astigmatism_tree.insert(
        "Cylinder Power",
        flatten::required_f64(astigmatism, tags::CYLINDER_POWER, path)?,
    );

    let mut tree = MetadataTree::new();
    tree.insert("Ophthalmic Axial Length Sequence", axial_tree);
    tree.insert(
        "IOL Formula Code Sequence",
        code_pair_of(calc, tags::IOL_FORMULA_CODE_SEQUENCE, path)?,
    );
    tree.insert(
        "Keratometer Index",
        flatten::required_f64(calc, tags::KERATOMETER_INDEX, path)?,
    );
    tree.insert(
        "Target Refraction",
        flatten::required_f64(calc, tags::TARGET_REFRACTION, path)?,
    );
    tree.insert(
        "Refractive Procedure Occurred",
        flatten::required_str(calc, tags::REFRACTIVE_PROCEDURE_OCCURRED, path)?,
    );
    tree.insert("Surgically Induced Astigmatism Sequence", astigmatism_tree);
    tree.insert(
        "Type of Optical Correction",
        flatten::required_str(calc, tags::TYPE_OF_OPTICAL_CORRECTION, path)?,
    );
    tree.insert("IOL Power Sequence", iol_power_entries(calc, path)?);
    tree.insert("Lens Constant Sequence", lens_constant_entries(calc, path)?);
    tree.insert(
        "IOL Manufacturer",
        flatten::required_str(calc, tags::IOL_MANUFACTURER, path)?,
    );
    tree.insert(
        "Implant Name",
        flatten::required_str(calc, tags::IMPLANT_NAME, path)?,
    );
    tree.insert(
        "Keratometry Measurement Type Code Sequence",
        code_pair_of(calc, tags::KERATOMETRY_MEASUREMENT_TYPE_CODE_SEQUENCE, path)?,
    );
    tree.insert(
        "IOL Power For Exact Emmetropia",
        flatten::required_f64(calc, tags::IOL_POWER_FOR_EXACT_EMMETROPIA, path)?,
    );
    tree.insert(
        "IOL Power For Exact Target Refraction",
        flatten::required_f64(calc, tags::IOL_POWER_FOR_EXACT_TARGET_REFRACTION, path)?,
    );
    tree.insert("CornealSizeSequence", corneal_size_entries(calc, path)?);
    tree.insert(
        "AnteriorChamberDepthSequence",
        anterior_chamber_entries(calc, path)?,
    );
    tree.insert(
        "SteepKeratometricAxisSequence",
        keratometric_axis_entries(calc, tags::STEEP_KERATOMETRIC_AXIS_SEQUENCE, path)?,
    );
    tree.insert(
        "FlatKeratometricAxisSequence",
        keratometric_axis_entries(calc, tags::FLAT_KERATOMETRIC_AXIS_SEQUENCE, path)?,
    );
    tree.insert(
        "CorneaMeasurementsSequence",
        cornea_measurement_entries(calc, path)?,
    );
    Ok(tree)
}

fn iol_calculations(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)?;
    let path = "IntraocularLensCalculationsLeftEyeSequence";
    let calculations: Vec<MetadataTree> = flatten::store_items(
        ctx.store,
        tags::INTRAOCULAR_LENS_CALCULATIONS_LEFT_EYE_SEQUENCE,
        path,
    )?
    .iter()
    .map(|calc| calculation_entry(calc, path))
    .collect::<Result<_>>()?;
    ctx.tree.insert(path, calculations);
    ctx.tree.insert(
        "Measurement Laterality",
        ctx.store.get_or_unknown(tags::MEASUREMENT_LATERALITY),
    );
    let references = flatten::referenced_instances(
        ctx.store,
        tags::REFERENCED_REFRACTIVE_MEASUREMENTS_SEQUENCE,
        false,
        Some(ctx.catalog),
    )?;
    ctx.tree
        .insert("ReferencedRefractiveMeasurementsSequence", references);
    Ok(())
}

// --- Ophthalmic Axial Measurements Storage ----------------------------------

fn total_length_entry(
    length: &InMemDicomObject,
    catalog: &StorageClassCatalog,
    path: &str,
) -> Result<MetadataTree> {
    let mut tree = MetadataTree::new();
    tree.insert(
        "Ophthalmic Axial Length",
        flatten::required_f64(length, tags::OPHTHALMIC_AXIAL_LENGTH, path)?,
    );
    // key carries a trailing space to distinguish it from the segmental form
    tree.insert(
        "Ophthalmic Axial Length Measurement ",
        flatten::required_str(length, tags::AXIAL_MEASUREMENT_NAME, path)?,
    );
    let source = flatten::required_item(length, tags::AXIAL_SOURCE_ITEMS, 0, path)?;
    let source_code = flatten::required_item(source, tags::AXIAL_SOURCE_CODE, 0, path)?;
    tree.insert(
        "Ophthalmic Axial Length Data Source Code Sequence",
        flatten::code_pair(source_code, path)?,
    );
    tree.insert(
        "Ophthalmic Axial Length Data Source",
        flatten::required_str(source, tags::AXIAL_SOURCE_LABEL, path)?,
    );
    let qc = flatten::required_item(length, tags::AXIAL_QC_IMAGE_SEQ, 0, path)?;
    let class_uid = flatten::required_str(qc, tags::REFERENCED_SOP_CLASS_UID, path)?;
    let mut qc_tree = MetadataTree::new();
    qc_tree.insert("Referenced SOP Class UID", catalog.describe(&class_uid));
    qc_tree.insert(
        "Referenced SOP Instance UID",
        flatten::required_str(qc, tags::REFERENCED_SOP_INSTANCE_UID, path)?,
    );
    qc_tree.insert(
        "Referenced Frame Number",
        flatten::required_i64(qc, tags::REFERENCED_FRAME_NUMBER, path)?,
    );
    tree.insert(
        "Referenced Ophthalmic Axial Length Measurement QC Image Sequence",
        qc_tree,
    );
    Ok(tree)
}

fn segment_entry(segment: &InMemDicomObject, path: &str) -> Result<MetadataTree> {
    let mut tree = MetadataTree::new();
    tree.insert(
        "Ophthalmic Axial Length",
        flatten::required_f64(segment, tags::OPHTHALMIC_AXIAL_LENGTH, path)?,
    );
    tree.insert(
        "Ophthalmic Axial Length Measurement",
        flatten::required_str(segment, tags::AXIAL_MEASUREMENT_NAME, path)?,
    );
    let name = flatten::required_item(
        segment,
        tags::OPHTHALMIC_AXIAL_LENGTH_MEASUREMENTS_SEGMENT_NAME_CODE_SEQUENCE,
        0,
        path,
    )?;
    tree.insert(
        "Ophthalmic Axial Length Measurements Segment Name Code Sequence",
        flatten::code_triple(name, path)?,
    );
    let source = flatten::required_item(segment, tags::AXIAL_SOURCE_ITEMS, 0, path)?;
    tree.insert(
        "Ophthalmic Axial Length Data Source",
        flatten::required_str(source, tags::AXIAL_SOURCE_LABEL, path)?,
    );
    let optical = flatten::required_item(
        segment,
        tags::OPTICAL_OPHTHALMIC_AXIAL_LENGTH_MEASUREMENTS_SEQUENCE,
        0,
        path,
    )?;
    let optical_code = flatten::required_item(
        optical,
        tags::OPHTHALMIC_AXIAL_LENGTH_DATA_SOURCE_CODE_SEQUENCE,
        0,
        path,
    )?;
    let mut optical_tree = MetadataTree::new();
    optical_tree.insert(
        "Ophthalmic Axial Length Data Source Code Sequence",
        flatten::code_triple(optical_code, path)?,
    );
    optical_tree.insert(
        "Ophthalmic Axial Length Data Source LO",
        flatten::required_str(optical, tags::AXIAL_SOURCE_LABEL, path)?,
    );
    tree.insert(
        "Optical Ophthalmic Axial Length Measurements Sequence",
        optical_tree,
    );
    Ok(tree)
}

fn selected_length_entry(selected: &InMemDicomObject, path: &str) -> Result<MetadataTree> {
    let mut tree = MetadataTree::new();
    tree.insert(
        "Ophthalmic Axial Length Measurement",
        flatten::required_str(selected, tags::AXIAL_SELECTED_TYPE, path)?,
    );
    let total = flatten::required_item(selected, tags::AXIAL_SELECTED_TOTAL_SEQ, 0, path)?;
    tree.insert(
        "Ophthalmic Axial Length",
        flatten::required_f64(total, tags::AXIAL_SELECTED_LENGTH, path)?,
    );
    let metrics: Vec<MetadataTree> =
        flatten::required_items(total, tags::AXIAL_QUALITY_SEQ, path)?
            .iter()
            .map(|metric| {
                let units =
                    flatten::required_item(metric, tags::MEASUREMENT_UNITS_CODE_SEQUENCE, 0, path)?;
                let mut tree = MetadataTree::new();
                tree.insert(
                    "CodeValue",
                    flatten::required_str(units, tags::CODE_VALUE, path)?,
                );
                tree.insert(
                    "CodeMeaning",
                    flatten::required_str(units, tags::CODE_MEANING, path)?,
                );
                Ok(tree)
            })
            .collect::<Result<_>>()?;
    tree.insert("Ophthalmic Axial Length Quality Metric Sequence", metrics);
    Ok(tree)
}

fn eye_measurements(
    store: &AttributeStore,
    sequence: Tag,
    catalog: &StorageClassCatalog,
    path: &str,
) -> Result<Vec<MetadataTree>> {
    flatten::store_items(store, sequence, path)?
        .iter()
        .map(|eye| {
            let mut tree = MetadataTree::new();
            tree.insert(
                "Pupil Dilated",
                flatten::required_str(eye, tags::PUPIL_DILATED, path)?,
            );
            tree.insert(
                "Lens Status Code Sequence",
                code_triples(eye, tags::LENS_STATUS_CODE_SEQUENCE, path)?,
            );
            tree.insert(
                "Vitreous Status Code Sequence",
                code_triples(eye, tags::VITREOUS_STATUS_CODE_SEQUENCE, path)?,
            );
            // measurements[0] holds total lengths, measurements[1] segments
            let totals_host = flatten::required_item(
                eye,
                tags::OPHTHALMIC_AXIAL_LENGTH_MEASUREMENTS_SEQUENCE,
                0,
                path,
            )?;
            let segments_host = flatten::required_item(
                eye,
                tags::OPHTHALMIC_AXIAL_LENGTH_MEASUREMENTS_SEQUENCE,
                1,
                path,
            )?;
            let mut lengths = Vec::new();
            for length in flatten::required_items(
                totals_host,
                tags::OPHTHALMIC_AXIAL_LENGTH_MEASUREMENTS_TOTAL_LENGTH_SEQUENCE,
                path,
            )? {
                lengths.push(total_length_entry(length, catalog, path)?);
            }
            for segment in flatten::required_items(
                segments_host,
                tags::OPHTHALMIC_AXIAL_LENGTH_MEASUREMENTS_SEGMENTAL_LENGTH_SEQUENCE,
                path,
            )? {
                lengths.push(segment_entry(segment, path)?);
            }
            tree.insert("Ophthalmic Axial Length Measurements Sequence", lengths);
            let selected: Vec<MetadataTree> = flatten::required_items(
                eye,
                tags::OPTICAL_SELECTED_OPHTHALMIC_AXIAL_LENGTH_SEQUENCE,
                path,
            )?
            .iter()
            .map(|item| selected_length_entry(item, path))
            .collect::<Result<_>>()?;
            tree.insert("Optical Selected Ophthalmic Axial Length Sequence", selected);
            Ok(tree)
        })
        .collect()
}

fn axial_measurements(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    let right = eye_measurements(
        ctx.store,
        tags::OPHTHALMIC_AXIAL_MEASUREMENTS_RIGHT_EYE_SEQUENCE,
        ctx.catalog,
        "OphthalmicAxialMeasurementsRightEyeSequence",
    )?;
    let left = eye_measurements(
        ctx.store,
        tags::OPHTHALMIC_AXIAL_MEASUREMENTS_LEFT_EYE_SEQUENCE,
        ctx.catalog,
        "OphthalmicAxialMeasurementsLeftEyeSequence",
    )?;
    ctx.tree
        .insert("OphthalmicAxialMeasurementsRightEyeSequence", right);
    ctx.tree
        .insert("OphthalmicAxialMeasurementsLeftEyeSequence", left);
    ctx.tree.insert(
        "Measurement Laterality",
        ctx.store.get_or_unknown(tags::MEASUREMENT_LATERALITY),
    );
    Ok(())
}

// --- Keratometry Measurements Storage ---------------------------------------

fn keratometric_axis_tree(
    eye: &InMemDicomObject,
    sequence: Tag,
    path: &str,
) -> Result<MetadataTree> {
    let axis = flatten::required_item(eye, sequence, 0, path)?;
    let mut tree = MetadataTree::new();
    tree.insert(
        "RadiusOfCurvature",
        flatten::required_f64(axis, tags::RADIUS_OF_CURVATURE, path)?,
    );
    // key carries a trailing space for sidecar compatibility
    tree.insert(
        "KeratometricPower ",
        flatten::required_f64(axis, tags::KERATOMETRIC_POWER, path)?,
    );
    tree.insert(
        "KeratometricAxis",
        flatten::required_f64(axis, tags::KERATOMETRIC_AXIS, path)?,
    );
    Ok(tree)
}

fn keratometry_eye(store: &AttributeStore, sequence: Tag, path: &str) -> Result<MetadataTree> {
    let eye = flatten::store_item(store, sequence, path)?;
    let mut tree = MetadataTree::new();
    tree.insert(
        "Steep Keratometric Axis Sequence",
        keratometric_axis_tree(eye, tags::STEEP_KERATOMETRIC_AXIS_SEQUENCE, path)?,
    );
    tree.insert(
        "Flat Keratometric Axis Sequence",
        keratometric_axis_tree(eye, tags::FLAT_KERATOMETRIC_AXIS_SEQUENCE, path)?,
    );
    Ok(tree)
}

/// `(0x1201, 0x1001)` / `(0x1201, 0x1002)`: per-eye keratometry summary.
fn ker_summary_group(
    store: &AttributeStore,
    group: Tag,
    catalog: &StorageClassCatalog,
) -> Result<MetadataTree> {
    let path = tag_key(group);
    let item = flatten::store_item(store, group, &path)?;
    let mut tree = MetadataTree::new();
    for axis_tag in [tags::KER_STEEP_AXIS, tags::KER_FLAT_AXIS] {
        let axis = flatten::required_item(item, axis_tag, 0, &path)?;
        tree.insert(
            tag_key(axis_tag),
            flatten::required_f64(axis, tags::KER_VALUE, &path)?,
        );
    }
    tree.insert(
        tag_key(tags::KER_MEAN),
        flatten::required_f64(item, tags::KER_MEAN, &path)?,
    );
    tree.insert(
        tag_key(tags::KER_QUALITY),
        flatten::required_f64(item, tags::KER_QUALITY, &path)?,
    );
    let reference = flatten::required_item(item, tags::KER_REFERENCE_GROUP, 0, &path)?;
    let class_uid = flatten::required_str(reference, tags::KER_REFERENCE_CLASS, &path)?;
    tree.insert(tag_key(tags::KER_REFERENCE_GROUP), catalog.describe(&class_uid));
    Ok(tree)
}

/// `(0x1201, 0x1008)` / `(0x1201, 0x1009)`: per-eye measurement detail.
fn ker_detail_group(store: &AttributeStore, group: Tag) -> Result<MetadataTree> {
    let path = tag_key(group);
    let item = flatten::store_item(store, group, &path)?;
    let mut tree = MetadataTree::new();
    tree.insert(
        tag_key(tags::KER_QUALITY),
        flatten::required_f64(item, tags::KER_QUALITY, &path)?,
    );
    for axis_tag in [tags::KER_DETAIL_STEEP, tags::KER_DETAIL_FLAT] {
        let axis = flatten::required_item(item, axis_tag, 0, &path)?;
        let mut axis_tree = MetadataTree::new();
        for value_tag in [
            tags::KER_VALUE,
            tags::KER_DETAIL_POWER,
            tags::KER_DETAIL_RADIUS,
            tags::KER_DETAIL_AXIS,
        ] {
            axis_tree.insert(
                tag_key(value_tag),
                flatten::required_f64(axis, value_tag, &path)?,
            );
        }
        tree.insert(tag_key(axis_tag), axis_tree);
    }
    tree.insert(
        tag_key(tags::KER_DETAIL_MODE),
        flatten::required_str(item, tags::KER_DETAIL_MODE, &path)?,
    );
    tree.insert(
        tag_key(tags::KER_DETAIL_STATUS),
        flatten::required_str(item, tags::KER_DETAIL_STATUS, &path)?,
    );
    Ok(tree)
}

/// `(0x1201, 0x100f)` / `(0x1201, 0x1010)`: per-eye averaged summary.
fn ker_mean_group(store: &AttributeStore, group: Tag) -> Result<MetadataTree> {
    let path = tag_key(group);
    let item = flatten::store_item(store, group, &path)?;
    let mut tree = MetadataTree::new();
    tree.insert(
        tag_key(tags::KER_MEAN),
        flatten::required_f64(item, tags::KER_MEAN, &path)?,
    );
    for axis_tag in [tags::KER_SUMMARY_STEEP, tags::KER_SUMMARY_FLAT] {
        let axis = flatten::required_item(item, axis_tag, 0, &path)?;
        let mut axis_tree = MetadataTree::new();
        for value_tag in [
            tags::KER_SUMMARY_RADIUS,
            tags::KER_SUMMARY_POWER,
            tags::KER_SUMMARY_ASTIGMATISM,
            tags::KER_SUMMARY_AXIS,
        ] {
            axis_tree.insert(
                tag_key(value_tag),
                flatten::required_f64(axis, value_tag, &path)?,
            );
        }
        tree.insert(tag_key(axis_tag), axis_tree);
    }
    tree.insert(
        tag_key(tags::KER_SUMMARY_MEAN),
        flatten::required_f64(item, tags::KER_SUMMARY_MEAN, &path)?,
    );
    Ok(tree)
}

/// `(0x1201, 0x1018)` / `(0x1201, 0x1019)`: opaque per-eye payload.
fn ker_payload_summary(store: &AttributeStore, group: Tag) -> Result<String> {
    let path = tag_key(group);
    let item = flatten::store_item(store, group, &path)?;
    Ok(flatten::opaque_summary(flatten::required_element(
        item,
        tags::KER_PAYLOAD,
        &path,
    )?))
}

/// `(0x1203, 0x1001)` / `(0x1203, 0x1002)`: white-to-white distance.
fn white_to_white(store: &AttributeStore, group: Tag) -> Result<f64> {
    let path = tag_key(group);
    let eye = flatten::store_item(store, group, &path)?;
    let measurement = flatten::required_item(eye, tags::WTW_MEASUREMENT, 0, &path)?;
    flatten::required_f64(measurement, tags::WTW_VALUE, &path)
}

fn keratometry(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_2)?;
    ctx.tree.insert(
        "Keratometry Right Eye Sequence",
        keratometry_eye(
            ctx.store,
            tags::KERATOMETRY_RIGHT_EYE_SEQUENCE,
            "KeratometryRightEyeSequence",
        )?,
    );
    ctx.tree.insert(
        "Keratometry Left Eye Sequence",
        keratometry_eye(
            ctx.store,
            tags::KERATOMETRY_LEFT_EYE_SEQUENCE,
            "KeratometryLeftEyeSequence",
        )?,
    );
    for group in [tags::KER_RIGHT_EYE_GROUP, tags::KER_LEFT_EYE_GROUP] {
        let summary = ker_summary_group(ctx.store, group, ctx.catalog)?;
        ctx.tree.insert(tag_key(group), summary);
    }
    for group in [tags::KER_RIGHT_DETAIL_GROUP, tags::KER_LEFT_DETAIL_GROUP] {
        let detail = ker_detail_group(ctx.store, group)?;
        ctx.tree.insert(tag_key(group), detail);
    }
    for group in [tags::KER_RIGHT_SUMMARY_GROUP, tags::KER_LEFT_SUMMARY_GROUP] {
        let mean = ker_mean_group(ctx.store, group)?;
        ctx.tree.insert(tag_key(group), mean);
    }
    for group in [tags::KER_RIGHT_PAYLOAD_GROUP, tags::KER_LEFT_PAYLOAD_GROUP] {
        let payload = ker_payload_summary(ctx.store, group)?;
        ctx.tree.insert(tag_key(group), payload);
    }
    for group in [tags::WTW_RIGHT_EYE_GROUP, tags::WTW_LEFT_EYE_GROUP] {
        let distance = white_to_white(ctx.store, group)?;
        ctx.tree.insert(tag_key(group), distance);
    }
    Ok(())
}

pub(super) static STRATEGY: ModelStrategy = ModelStrategy {
    model: "IOLMaster 700",
    includes_series_description: false,
    arms: &[
        SopClassArm {
            sop_class: uids::OPHTHALMIC_PHOTOGRAPHY_8_BIT,
            dispatch: SopDispatch::Always(photography),
        },
        SopClassArm {
            sop_class: uids::MULTI_FRAME_TRUE_COLOR_SC,
            dispatch: SopDispatch::Always(true_color_stack),
        },
        SopClassArm {
            sop_class: uids::ENCAPSULATED_PDF,
            dispatch: SopDispatch::Always(zeiss::encapsulated_pdf),
        },
        SopClassArm {
            sop_class: uids::INTRAOCULAR_LENS_CALCULATIONS,
            dispatch: SopDispatch::Always(iol_calculations),
        },
        SopClassArm {
            sop_class: uids::OPHTHALMIC_AXIAL_MEASUREMENTS,
            dispatch: SopDispatch::Always(axial_measurements),
        },
        SopClassArm {
            sop_class: uids::KERATOMETRY_MEASUREMENTS,
            dispatch: SopDispatch::Always(keratometry),
        },
    ],
    fallback: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataValue;
    use dicom_core::value::DataSetSequence;
    use dicom_core::{DataElement, PrimitiveValue, VR};
    use dicom_object::meta::FileMetaTableBuilder;
    use dicom_object::FileDicomObject;

    fn axis_item(radius: f64, power: f64, axis: f64) -> InMemDicomObject {
        InMemDicomObject::from_element_iter(vec![
            DataElement::new(
                tags::RADIUS_OF_CURVATURE,
                VR::FL,
                PrimitiveValue::from(radius),
            ),
            DataElement::new(tags::KERATOMETRIC_POWER, VR::FL, PrimitiveValue::from(power)),
            DataElement::new(tags::KERATOMETRIC_AXIS, VR::FL, PrimitiveValue::from(axis)),
        ])
    }

    #[test]
    fn test_keratometry_eye_reads_both_axes() {
        let eye = InMemDicomObject::from_element_iter(vec![
            DataElement::new(
                tags::STEEP_KERATOMETRIC_AXIS_SEQUENCE,
                VR::SQ,
                DataSetSequence::from(vec![axis_item(7.1, 47.5, 95.0)]),
            ),
            DataElement::new(
                tags::FLAT_KERATOMETRIC_AXIS_SEQUENCE,
                VR::SQ,
                DataSetSequence::from(vec![axis_item(7.6, 44.2, 5.0)]),
            ),
        ]);
        let meta = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.78.3")
            .media_storage_sop_instance_uid("1.2.3")
            .transfer_syntax("1.2.840.10008.1.2.1")
            .build()
            .unwrap();
        let mut obj = FileDicomObject::new_empty_with_meta(meta);
        obj.put(DataElement::new(
            tags::KERATOMETRY_RIGHT_EYE_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![eye]),
        ));
        let store = AttributeStore::from_object(obj);
        let tree = keratometry_eye(
            &store,
            tags::KERATOMETRY_RIGHT_EYE_SEQUENCE,
            "KeratometryRightEyeSequence",
        )
        .unwrap();
        let steep = tree
            .get("Steep Keratometric Axis Sequence")
            .and_then(|v| v.as_tree())
            .unwrap();
        let flat = tree
            .get("Flat Keratometric Axis Sequence")
            .and_then(|v| v.as_tree())
            .unwrap();
        assert_eq!(
            steep.get("KeratometricPower "),
            Some(&MetadataValue::Float(47.5))
        );
        assert_eq!(flat.get("RadiusOfCurvature"), Some(&MetadataValue::Float(7.6)));
        assert_eq!(flat.get("KeratometricAxis"), Some(&MetadataValue::Float(5.0)));
    }
}
