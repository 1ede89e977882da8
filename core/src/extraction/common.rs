//! Baseline metadata present for every instance, regardless of device.

use crate::catalog::StorageClassCatalog;
use crate::extraction::tags;
use crate::metadata::MetadataTree;
use crate::store::AttributeStore;

/// Extracts the eight common fields. Missing attributes are represented as
/// `"Unknown"`, never as an error.
pub fn extract_common(store: &AttributeStore, catalog: &StorageClassCatalog) -> MetadataTree {
    let sop_class = store.get_or_unknown(tags::SOP_CLASS_UID);
    let mut tree = MetadataTree::new();
    tree.insert("Manufacturer", store.get_or_unknown(tags::MANUFACTURER));
    tree.insert("Patient ID", store.get_or_unknown(tags::PATIENT_ID));
    tree.insert("Model", store.get_or_unknown(tags::MANUFACTURER_MODEL_NAME));
    tree.insert("Modality", store.get_or_unknown(tags::MODALITY));
    tree.insert("Study Date", store.get_or_unknown(tags::STUDY_DATE));
    tree.insert("SOP Class", sop_class.clone());
    tree.insert("SOP Class Description", catalog.describe(&sop_class));
    tree.insert("SOP Instance", store.get_or_unknown(tags::SOP_INSTANCE_UID));
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UNKNOWN_SOP_CLASS;
    use dicom_core::{DataElement, PrimitiveValue, VR};
    use dicom_object::meta::FileMetaTableBuilder;
    use dicom_object::FileDicomObject;

    fn store_with_sop_class(uid: &str) -> AttributeStore {
        let meta = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid(uid)
            .media_storage_sop_instance_uid("1.2.3.4.5")
            .transfer_syntax("1.2.840.10008.1.2.1")
            .build()
            .unwrap();
        let mut obj = FileDicomObject::new_empty_with_meta(meta);
        obj.put(DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(uid),
        ));
        obj.put(DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("1.2.3.4.5"),
        ));
        obj.put(DataElement::new(
            tags::MANUFACTURER,
            VR::LO,
            PrimitiveValue::from("Carl Zeiss Meditec"),
        ));
        AttributeStore::from_object(obj)
    }

    #[test]
    fn test_common_fields_complete_and_ordered() {
        let store = store_with_sop_class("1.2.840.10008.5.1.4.1.1.104.1");
        let tree = extract_common(&store, &StorageClassCatalog::new());
        assert_eq!(
            tree.keys().collect::<Vec<_>>(),
            vec![
                "Manufacturer",
                "Patient ID",
                "Model",
                "Modality",
                "Study Date",
                "SOP Class",
                "SOP Class Description",
                "SOP Instance",
            ]
        );
        assert_eq!(
            tree.get_str("SOP Class Description"),
            Some("Encapsulated PDF Storage")
        );
        // absent attributes carry the sentinel, not an error
        assert_eq!(tree.get_str("Modality"), Some("Unknown"));
    }

    #[test]
    fn test_unrecognized_sop_class_is_reported_not_fatal() {
        let store = store_with_sop_class("1.2.3.999");
        let tree = extract_common(&store, &StorageClassCatalog::new());
        assert_eq!(tree.get_str("SOP Class Description"), Some(UNKNOWN_SOP_CLASS));
    }
}
