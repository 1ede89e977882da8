//! Catalog of the ophthalmic storage classes this crate knows about.
//!
//! The catalog maps a SOP class UID to its human-readable description. It is
//! built once at start-up and shared read-only with every extraction; lookup
//! of an unrecognized UID yields a sentinel description, never an error.

use std::collections::HashMap;

/// Sentinel description for storage classes missing from the catalog.
pub const UNKNOWN_SOP_CLASS: &str = "Unknown SOP Class";

/// SOP class UIDs used as first-level dispatch keys by the strategies.
pub mod uids {
    pub const OPHTHALMIC_PHOTOGRAPHY_8_BIT: &str = "1.2.840.10008.5.1.4.1.1.77.1.5.1";
    pub const OPHTHALMIC_PHOTOGRAPHY_16_BIT: &str = "1.2.840.10008.5.1.4.1.1.77.1.5.2";
    pub const OPHTHALMIC_TOMOGRAPHY: &str = "1.2.840.10008.5.1.4.1.1.77.1.5.4";
    pub const OPHTHALMIC_AXIAL_MEASUREMENTS: &str = "1.2.840.10008.5.1.4.1.1.78.7";
    pub const INTRAOCULAR_LENS_CALCULATIONS: &str = "1.2.840.10008.5.1.4.1.1.78.8";
    pub const KERATOMETRY_MEASUREMENTS: &str = "1.2.840.10008.5.1.4.1.1.78.3";
    pub const VISUAL_FIELD_PERIMETRY: &str = "1.2.840.10008.5.1.4.1.1.80.1";
    pub const MULTI_FRAME_TRUE_COLOR_SC: &str = "1.2.840.10008.5.1.4.1.1.7.2";
    pub const ENCAPSULATED_PDF: &str = "1.2.840.10008.5.1.4.1.1.104.1";
    pub const SPATIAL_REGISTRATION: &str = "1.2.840.10008.5.1.4.1.1.66";
}

/// Storage-class identifier to description mapping.
///
/// Fixed at construction; safe to share across concurrent extractions.
#[derive(Debug, Clone)]
pub struct StorageClassCatalog {
    classes: HashMap<&'static str, &'static str>,
}

impl StorageClassCatalog {
    /// Builds the catalog of ophthalmology storage classes.
    pub fn new() -> Self {
        let classes = HashMap::from([
            (
                "1.2.840.10008.5.1.4.1.1.77.1.5.1",
                "Ophthalmic Photography 8 Bit Image Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.77.1.5.2",
                "Ophthalmic Photography 16 Bit Image Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.77.1.5.5",
                "Wide Field Ophthalmic Photography Stereographic Projection Image Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.77.1.5.6",
                "Wide Field Ophthalmic Photography 3D Coordinates Image Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.77.1.5.4",
                "Ophthalmic Tomography Image Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.77.1.5.7",
                "Ophthalmic Optical Coherence Tomography En Face Image Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.77.1.5.8",
                "Ophthalmic Optical Coherence Tomography B-scan Volume Analysis Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.78.7",
                "Ophthalmic Axial Measurements Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.78.8",
                "Intraocular Lens Calculations Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.81.1",
                "Ophthalmic Thickness Map Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.82.1",
                "Corneal Topography Map Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.79.1",
                "Macular Grid Thickness and Volume Report Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.80.1",
                "Ophthalmic Visual Field Static Perimetry Measurements Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.78.1",
                "Lensometry Measurements Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.78.2",
                "Autorefraction Measurements Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.78.3",
                "Keratometry Measurements Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.78.4",
                "Subjective Refraction Measurements Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.78.5",
                "Visual Acuity Measurements Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.78.6",
                "Spectacle Prescription Report Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.7",
                "Secondary Capture Image Storage",
            ),
            (
                "1.2.840.10008.5.1.4.1.1.7.2",
                "Multi-frame True Color Secondary Capture Image Storage",
            ),
            ("1.2.840.10008.5.1.4.1.1.104.1", "Encapsulated PDF Storage"),
            ("1.2.840.10008.5.1.4.1.1.66", "Spatial Registration Storage"),
            (
                "1.2.840.10008.5.1.4.1.1.12.77",
                "Ophthalmic Tomography Image Storage",
            ),
        ]);
        Self { classes }
    }

    /// Returns the description of a storage class, or the unknown sentinel.
    pub fn describe(&self, sop_class_uid: &str) -> &'static str {
        match self.classes.get(sop_class_uid.trim()) {
            Some(description) => description,
            None => {
                log::warn!("unrecognized SOP class UID: {sop_class_uid}");
                UNKNOWN_SOP_CLASS
            }
        }
    }

    /// Whether the catalog knows this storage class.
    pub fn contains(&self, sop_class_uid: &str) -> bool {
        self.classes.contains_key(sop_class_uid.trim())
    }
}

impl Default for StorageClassCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(uids::ENCAPSULATED_PDF, "Encapsulated PDF Storage")]
    #[case(uids::SPATIAL_REGISTRATION, "Spatial Registration Storage")]
    #[case(
        uids::OPHTHALMIC_PHOTOGRAPHY_8_BIT,
        "Ophthalmic Photography 8 Bit Image Storage"
    )]
    #[case(
        uids::VISUAL_FIELD_PERIMETRY,
        "Ophthalmic Visual Field Static Perimetry Measurements Storage"
    )]
    fn test_describe_known(#[case] uid: &str, #[case] expected: &str) {
        let catalog = StorageClassCatalog::new();
        assert_eq!(catalog.describe(uid), expected);
    }

    #[test]
    fn test_describe_unknown_is_sentinel() {
        let catalog = StorageClassCatalog::new();
        assert_eq!(catalog.describe("1.2.3.4.5.6.7.8.9"), UNKNOWN_SOP_CLASS);
        assert_eq!(catalog.describe(""), UNKNOWN_SOP_CLASS);
        assert!(!catalog.contains("1.2.3.4.5.6.7.8.9"));
    }

    #[test]
    fn test_describe_trims_whitespace() {
        let catalog = StorageClassCatalog::new();
        assert_eq!(
            catalog.describe(" 1.2.840.10008.5.1.4.1.1.104.1 "),
            "Encapsulated PDF Storage"
        );
    }
}
