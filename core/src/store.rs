//! Attribute store over a decoded DICOM instance.
//!
//! Wraps a [`DefaultDicomObject`] with lookup-with-default accessors and
//! pixel-volume retrieval. One store is created per input file and is
//! immutable for the lifetime of an extraction.

use crate::error::{OculexError, Result};
use crate::render::PixelVolume;
use dicom_core::Tag;
use dicom_object::mem::InMemDicomObject;
use dicom_object::{open_file, DefaultDicomObject};
use dicom_pixeldata::PixelDecoder;
use std::path::{Path, PathBuf};

pub use dicom_object::mem::InMemElement;

/// Sentinel for attributes absent from the dataset.
pub const UNKNOWN: &str = "Unknown";

fn clean(s: &str) -> &str {
    s.trim_end_matches('\0').trim()
}

/// Formats a tag the way sidecar keys and error messages spell it.
pub fn tag_key(tag: Tag) -> String {
    format!("(0x{:04x}, 0x{:04x})", tag.group(), tag.element())
}

pub struct AttributeStore {
    object: DefaultDicomObject,
    path: Option<PathBuf>,
}

impl AttributeStore {
    /// Opens and decodes a DICOM file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let object = open_file(path)?;
        Ok(Self {
            object,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wraps an already decoded object (used by tests and embedders).
    pub fn from_object(object: DefaultDicomObject) -> Self {
        Self { object, path: None }
    }

    /// The file this store was opened from, when known.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn object(&self) -> &DefaultDicomObject {
        &self.object
    }

    pub fn element(&self, tag: Tag) -> Option<&InMemElement> {
        self.object.element(tag).ok()
    }

    /// Element access that aborts extraction when the attribute is absent.
    pub fn require(&self, tag: Tag) -> Result<&InMemElement> {
        self.object
            .element(tag)
            .map_err(|_| OculexError::MissingNestedAttribute(tag_key(tag)))
    }

    /// String value of an attribute, trimmed of padding; `None` when absent
    /// or not convertible.
    pub fn get_str(&self, tag: Tag) -> Option<String> {
        self.element(tag)
            .and_then(|e| e.to_str().ok())
            .map(|s| clean(&s).to_string())
    }

    /// String value with the `"Unknown"` default the common extractor uses.
    pub fn get_or_unknown(&self, tag: Tag) -> String {
        self.get_str(tag).unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn get_i64(&self, tag: Tag) -> Option<i64> {
        self.element(tag).and_then(|e| e.to_int::<i64>().ok())
    }

    pub fn get_f64s(&self, tag: Tag) -> Option<Vec<f64>> {
        self.element(tag)
            .and_then(|e| e.value().primitive())
            .and_then(|p| p.to_multi_float64().ok())
    }

    pub fn get_bytes(&self, tag: Tag) -> Option<Vec<u8>> {
        self.element(tag)
            .and_then(|e| e.value().primitive())
            .map(|p| p.to_bytes().into_owned())
    }

    /// Items of a sequence attribute, `None` when absent or not a sequence.
    pub fn items(&self, tag: Tag) -> Option<&[InMemDicomObject]> {
        self.element(tag).and_then(|e| e.items())
    }

    /// Decodes the pixel data into an 8-bit volume.
    ///
    /// 16-bit data is rescaled to 8 bits by dropping the low byte. Failure is
    /// the recoverable [`OculexError::PixelDecode`] class; callers skip the
    /// artifact and continue.
    pub fn pixel_volume(&self) -> Result<PixelVolume> {
        let decoded = self
            .object
            .decode_pixel_data()
            .map_err(|e| OculexError::PixelDecode(e.to_string()))?;
        let frames = decoded.number_of_frames() as usize;
        let rows = decoded.rows() as u32;
        let columns = decoded.columns() as u32;
        let samples = decoded.samples_per_pixel() as u16;
        let data: Vec<u8> = if decoded.bits_allocated() <= 8 {
            decoded
                .to_vec::<u8>()
                .map_err(|e| OculexError::PixelDecode(e.to_string()))?
        } else {
            decoded
                .to_vec::<u16>()
                .map_err(|e| OculexError::PixelDecode(e.to_string()))?
                .into_iter()
                .map(|v| (v >> 8) as u8)
                .collect()
        };
        PixelVolume::new(frames, rows, columns, samples, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};
    use dicom_dictionary_std::tags;
    use dicom_object::meta::FileMetaTableBuilder;
    use dicom_object::FileDicomObject;

    fn photography_object() -> DefaultDicomObject {
        let meta = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.77.1.5.1")
            .media_storage_sop_instance_uid("1.2.3.4")
            .transfer_syntax("1.2.840.10008.1.2.1")
            .build()
            .unwrap();
        let mut obj = FileDicomObject::new_empty_with_meta(meta);
        obj.put(DataElement::new(
            tags::MANUFACTURER,
            VR::LO,
            PrimitiveValue::from("Carl Zeiss Meditec"),
        ));
        obj.put(DataElement::new(
            tags::PIXEL_SPACING,
            VR::DS,
            PrimitiveValue::Strs(vec!["0.5".to_string(), "0.5".to_string()].into()),
        ));
        obj
    }

    #[test]
    fn test_get_str_trims_padding() {
        let store = AttributeStore::from_object(photography_object());
        assert_eq!(
            store.get_str(tags::MANUFACTURER).as_deref(),
            Some("Carl Zeiss Meditec")
        );
    }

    #[test]
    fn test_missing_attribute_defaults_to_unknown() {
        let store = AttributeStore::from_object(photography_object());
        assert_eq!(store.get_str(tags::MODALITY), None);
        assert_eq!(store.get_or_unknown(tags::MODALITY), UNKNOWN);
    }

    #[test]
    fn test_require_names_the_missing_tag() {
        let store = AttributeStore::from_object(photography_object());
        let err = store.require(tags::LATERALITY).unwrap_err();
        assert!(err.to_string().contains("(0x0020, 0x0060)"));
    }

    #[test]
    fn test_multi_valued_decimals() {
        let store = AttributeStore::from_object(photography_object());
        assert_eq!(store.get_f64s(tags::PIXEL_SPACING), Some(vec![0.5, 0.5]));
    }
}
