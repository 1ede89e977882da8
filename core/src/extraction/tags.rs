//! Tags used by the device strategies.
//!
//! Standard attributes come from the published dictionary; the constants
//! below cover the Carl Zeiss Meditec private groups the strategies read,
//! which have no dictionary entry.

use dicom_core::Tag;

pub use dicom_dictionary_std::tags::*;

/// CZM multi-valued text tags, joined into one string when extracted.
pub const CZM_TEXT_1: Tag = Tag(0x2201, 0x1000);
pub const CZM_TEXT_2: Tag = Tag(0x2201, 0x1002);

/// CZM analysis payload group: opaque binary members summarized by size.
pub const CZM_ANALYSIS_GROUP: u16 = 0x0409;

/// Elements of the analysis group present on thickness registrations.
pub const CZM_ANALYSIS_SMALL: &[u16] = &[0x1001, 0x1002, 0x1003];

/// Elements of the analysis group present on OU / progression analyses.
pub const CZM_ANALYSIS_FULL: &[u16] = &[
    0x1001, 0x1002, 0x1003, 0x1004, 0x1005, 0x1006, 0x1007, 0x10d2, 0x10d3, 0x10d4, 0x10d5,
    0x10d6, 0x10d7, 0x10d8, 0x10d9, 0x10da, 0x10db, 0x10dc, 0x10dd, 0x10ef,
];

pub const fn czm_analysis(element: u16) -> Tag {
    Tag(CZM_ANALYSIS_GROUP, element)
}

/// CZM frame-group sequences on spatial-registration instances.
pub const CZM_FRAME_GROUP_A0: Tag = Tag(0x0407, 0x10a0);
pub const CZM_FRAME_GROUP_A1: Tag = Tag(0x0407, 0x10a1);
pub const CZM_FRAME_GROUP_A2: Tag = Tag(0x0407, 0x10a2);
pub const CZM_FRAME_GROUP_A3: Tag = Tag(0x0407, 0x10a3);
pub const CZM_FRAME_GROUP_A4: Tag = Tag(0x0407, 0x10a4);
pub const CZM_FRAME_GROUP_A5: Tag = Tag(0x0407, 0x10a5);
pub const CZM_FRAME_GROUP_A6: Tag = Tag(0x0407, 0x10a6);
pub const CZM_FRAME_GROUP_A7: Tag = Tag(0x0407, 0x10a7);
pub const CZM_FRAME_GROUP_B5: Tag = Tag(0x0407, 0x10b5);

/// Members of a frame-group item.
pub const CZM_FRAME_ITEMS: Tag = Tag(0x0407, 0x1005);
pub const CZM_FRAME_DATA: Tag = Tag(0x0407, 0x1006);
pub const CZM_FRAME_TYPE: Tag = Tag(0x0407, 0x100e);
pub const CZM_FRAME_AUX_1: Tag = Tag(0x0407, 0x1015);
pub const CZM_FRAME_AUX_2: Tag = Tag(0x0407, 0x1016);
pub const CZM_FRAME_REF_CLASS: Tag = Tag(0x0407, 0x101c);

/// HFA perimetry payload on spatial-registration instances.
pub const HFA_PAYLOAD: Tag = Tag(0x0301, 0x1008);

/// IOLMaster keratometry private groups.
pub const KER_RIGHT_EYE_GROUP: Tag = Tag(0x1201, 0x1001);
pub const KER_LEFT_EYE_GROUP: Tag = Tag(0x1201, 0x1002);
pub const KER_STEEP_AXIS: Tag = Tag(0x1201, 0x1003);
pub const KER_FLAT_AXIS: Tag = Tag(0x1201, 0x1004);
pub const KER_VALUE: Tag = Tag(0x1201, 0x1005);
pub const KER_MEAN: Tag = Tag(0x1201, 0x1006);
pub const KER_QUALITY: Tag = Tag(0x1201, 0x1007);
pub const KER_RIGHT_DETAIL_GROUP: Tag = Tag(0x1201, 0x1008);
pub const KER_LEFT_DETAIL_GROUP: Tag = Tag(0x1201, 0x1009);
pub const KER_DETAIL_STEEP: Tag = Tag(0x1201, 0x100a);
pub const KER_DETAIL_FLAT: Tag = Tag(0x1201, 0x100b);
pub const KER_DETAIL_POWER: Tag = Tag(0x1201, 0x100c);
pub const KER_DETAIL_RADIUS: Tag = Tag(0x1201, 0x100d);
pub const KER_DETAIL_AXIS: Tag = Tag(0x1201, 0x100e);
pub const KER_RIGHT_SUMMARY_GROUP: Tag = Tag(0x1201, 0x100f);
pub const KER_LEFT_SUMMARY_GROUP: Tag = Tag(0x1201, 0x1010);
pub const KER_SUMMARY_STEEP: Tag = Tag(0x1201, 0x1011);
pub const KER_SUMMARY_FLAT: Tag = Tag(0x1201, 0x1012);
pub const KER_SUMMARY_RADIUS: Tag = Tag(0x1201, 0x1013);
pub const KER_SUMMARY_POWER: Tag = Tag(0x1201, 0x1014);
pub const KER_SUMMARY_ASTIGMATISM: Tag = Tag(0x1201, 0x1015);
pub const KER_SUMMARY_AXIS: Tag = Tag(0x1201, 0x1016);
pub const KER_SUMMARY_MEAN: Tag = Tag(0x1201, 0x1017);
pub const KER_RIGHT_PAYLOAD_GROUP: Tag = Tag(0x1201, 0x1018);
pub const KER_LEFT_PAYLOAD_GROUP: Tag = Tag(0x1201, 0x1019);
pub const KER_PAYLOAD: Tag = Tag(0x1201, 0x101a);
pub const KER_DETAIL_MODE: Tag = Tag(0x1201, 0x101b);
pub const KER_DETAIL_STATUS: Tag = Tag(0x1201, 0x101c);
pub const KER_REFERENCE_GROUP: Tag = Tag(0x1201, 0x101d);
pub const KER_REFERENCE_CLASS: Tag = Tag(0x1201, 0x101e);

/// IOLMaster white-to-white private groups.
pub const WTW_RIGHT_EYE_GROUP: Tag = Tag(0x1203, 0x1001);
pub const WTW_LEFT_EYE_GROUP: Tag = Tag(0x1203, 0x1002);
pub const WTW_MEASUREMENT: Tag = Tag(0x1203, 0x100a);
pub const WTW_VALUE: Tag = Tag(0x1203, 0x100b);

/// Raw sub-elements of the axial-length measurement sequences that the
/// strategies address by number.
pub const AXIAL_MEASUREMENT_NAME: Tag = Tag(0x0022, 0x1140);
pub const AXIAL_SOURCE_ITEMS: Tag = Tag(0x0022, 0x1225);
pub const AXIAL_SOURCE_CODE: Tag = Tag(0x0022, 0x1150);
pub const AXIAL_SOURCE_LABEL: Tag = Tag(0x0022, 0x1159);
pub const AXIAL_QC_IMAGE_SEQ: Tag = Tag(0x0022, 0x1330);
pub const AXIAL_SELECTED_TYPE: Tag = Tag(0x0022, 0x1010);
pub const AXIAL_SELECTED_TOTAL_SEQ: Tag = Tag(0x0022, 0x1260);
pub const AXIAL_SELECTED_LENGTH: Tag = Tag(0x0022, 0x1019);
pub const AXIAL_QUALITY_SEQ: Tag = Tag(0x0022, 0x1262);
