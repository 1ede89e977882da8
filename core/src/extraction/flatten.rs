//! Sequence flattening helpers shared by the device strategies.
//!
//! Two output shapes exist: fully typed sub-trees for clinically significant
//! groups, and opaque `"{VR}: Array of {n} elements"` summaries for
//! vendor-private payloads where only presence and size matter. Which shape
//! applies to which attribute path is fixed by the calling strategy.
//!
//! Navigation through an assumed sequence shape raises
//! [`OculexError::MissingNestedAttribute`] when the shape does not hold; that
//! is the one error class that aborts extraction of a file.

use crate::catalog::StorageClassCatalog;
use crate::error::{OculexError, Result};
use crate::extraction::tags;
use crate::metadata::{MetadataTree, MetadataValue};
use crate::store::{tag_key, AttributeStore, InMemElement};
use dicom_core::value::Value;
use dicom_core::{PrimitiveValue, Tag};
use dicom_object::mem::InMemDicomObject;

/// Element count the way the summaries report it: bytes for binary values,
/// value multiplicity otherwise.
fn element_len(element: &InMemElement) -> usize {
    match element.value() {
        Value::Primitive(p) => match p {
            PrimitiveValue::Empty => 0,
            PrimitiveValue::U8(v) => v.len(),
            PrimitiveValue::Str(s) => s.len(),
            PrimitiveValue::Strs(v) => v.len(),
            PrimitiveValue::I16(v) => v.len(),
            PrimitiveValue::U16(v) => v.len(),
            PrimitiveValue::I32(v) => v.len(),
            PrimitiveValue::U32(v) => v.len(),
            PrimitiveValue::I64(v) => v.len(),
            PrimitiveValue::U64(v) => v.len(),
            PrimitiveValue::F32(v) => v.len(),
            PrimitiveValue::F64(v) => v.len(),
            other => other.multiplicity() as usize,
        },
        Value::Sequence(seq) => seq.items().len(),
        Value::PixelSequence(_) => 0,
    }
}

/// Opaque summary of an element: `"{VR}: Array of {n} elements"`.
pub fn opaque_summary(element: &InMemElement) -> String {
    format!("{}: Array of {} elements", element.vr(), element_len(element))
}

/// Opaque summary of a top-level attribute that the strategy requires.
pub fn opaque_required(store: &AttributeStore, tag: Tag) -> Result<String> {
    Ok(opaque_summary(store.require(tag)?))
}

/// Joins a multi-valued text attribute into one string.
pub fn join_text(store: &AttributeStore, tag: Tag) -> Result<String> {
    let element = store.require(tag)?;
    let joined = element
        .value()
        .primitive()
        .map(|p| p.to_multi_str().concat())
        .ok_or_else(|| OculexError::MissingNestedAttribute(tag_key(tag)))?;
    Ok(joined.trim_end_matches('\0').trim_end().to_string())
}

fn missing(path: &str, tag: Tag) -> OculexError {
    OculexError::MissingNestedAttribute(format!("{path} -> {}", tag_key(tag)))
}

/// Required element of a sequence item.
pub fn required_element<'a>(
    item: &'a InMemDicomObject,
    tag: Tag,
    path: &str,
) -> Result<&'a InMemElement> {
    item.element(tag).map_err(|_| missing(path, tag))
}

/// Required items of a sequence element inside an item.
pub fn required_items<'a>(
    item: &'a InMemDicomObject,
    tag: Tag,
    path: &str,
) -> Result<&'a [InMemDicomObject]> {
    required_element(item, tag, path)?
        .items()
        .ok_or_else(|| missing(path, tag))
}

/// Required item at an index of a nested sequence.
pub fn required_item<'a>(
    item: &'a InMemDicomObject,
    tag: Tag,
    index: usize,
    path: &str,
) -> Result<&'a InMemDicomObject> {
    required_items(item, tag, path)?
        .get(index)
        .ok_or_else(|| missing(path, tag))
}

/// Required items of a top-level sequence attribute.
pub fn store_items<'a>(store: &'a AttributeStore, tag: Tag, path: &str) -> Result<&'a [InMemDicomObject]> {
    store
        .require(tag)?
        .items()
        .ok_or_else(|| missing(path, tag))
}

/// Required first item of a top-level sequence attribute.
pub fn store_item<'a>(store: &'a AttributeStore, tag: Tag, path: &str) -> Result<&'a InMemDicomObject> {
    store_items(store, tag, path)?
        .first()
        .ok_or_else(|| missing(path, tag))
}

/// Required trimmed string of a sequence item element.
pub fn required_str(item: &InMemDicomObject, tag: Tag, path: &str) -> Result<String> {
    required_element(item, tag, path)?
        .to_str()
        .map(|s| s.trim_end_matches('\0').trim().to_string())
        .map_err(|_| missing(path, tag))
}

/// Required numeric value of a sequence item element.
pub fn required_f64(item: &InMemDicomObject, tag: Tag, path: &str) -> Result<f64> {
    required_element(item, tag, path)?
        .to_float64()
        .map_err(|_| missing(path, tag))
}

/// Required integer value of a sequence item element.
pub fn required_i64(item: &InMemDicomObject, tag: Tag, path: &str) -> Result<i64> {
    required_element(item, tag, path)?
        .to_int::<i64>()
        .map_err(|_| missing(path, tag))
}

/// Code meaning of `ConceptNameCodeSequence[0]` of an item.
pub fn concept_name_meaning(item: &InMemDicomObject, path: &str) -> Result<String> {
    let code = required_item(item, tags::CONCEPT_NAME_CODE_SEQUENCE, 0, path)?;
    required_str(code, tags::CODE_MEANING, path)
}

/// `{Code Value, Code Meaning}` pair of a code item.
pub fn code_pair(item: &InMemDicomObject, path: &str) -> Result<MetadataTree> {
    let mut tree = MetadataTree::new();
    tree.insert("Code Value", required_str(item, tags::CODE_VALUE, path)?);
    tree.insert("Code Meaning", required_str(item, tags::CODE_MEANING, path)?);
    Ok(tree)
}

/// `{Code Value, Coding Scheme Designator, Code Meaning}` triple of a code
/// item, used by the measurement status sequences.
pub fn code_triple(item: &InMemDicomObject, path: &str) -> Result<MetadataTree> {
    let mut tree = MetadataTree::new();
    tree.insert("Code Value", required_str(item, tags::CODE_VALUE, path)?);
    tree.insert(
        "Coding Scheme Designator",
        required_str(item, tags::CODING_SCHEME_DESIGNATOR, path)?,
    );
    tree.insert("Code Meaning", required_str(item, tags::CODE_MEANING, path)?);
    Ok(tree)
}

/// Flattens the acquisition context to its concept-name code meanings.
pub fn acquisition_context(store: &AttributeStore) -> Result<Vec<MetadataTree>> {
    let path = "AcquisitionContextSequence";
    store_items(store, tags::ACQUISITION_CONTEXT_SEQUENCE, path)?
        .iter()
        .map(|item| {
            let mut tree = MetadataTree::new();
            tree.insert("CodeMeaning", concept_name_meaning(item, path)?);
            Ok(tree)
        })
        .collect()
}

/// Flattens a referenced-instance sequence to class/instance pairs.
///
/// With `describe_class` set the class identifier is resolved through the
/// catalog; `with_purpose` additionally carries the purpose-of-reference
/// code meaning.
pub fn referenced_instances(
    store: &AttributeStore,
    sequence: Tag,
    with_purpose: bool,
    describe_class: Option<&StorageClassCatalog>,
) -> Result<Vec<MetadataTree>> {
    let path = "ReferencedInstanceSequence";
    store_items(store, sequence, path)?
        .iter()
        .map(|item| {
            let class_uid = required_str(item, tags::REFERENCED_SOP_CLASS_UID, path)?;
            let mut tree = MetadataTree::new();
            match describe_class {
                Some(catalog) => tree.insert("ReferencedSOPClassUID", catalog.describe(&class_uid)),
                None => tree.insert("ReferencedSOPClassUID", class_uid),
            }
            tree.insert(
                "ReferencedSOPInstance_UID",
                required_str(item, tags::REFERENCED_SOP_INSTANCE_UID, path)?,
            );
            if with_purpose {
                let purpose =
                    required_item(item, tags::PURPOSE_OF_REFERENCE_CODE_SEQUENCE, 0, path)?;
                tree.insert("CodeMeaning", required_str(purpose, tags::CODE_MEANING, path)?);
            }
            Ok(tree)
        })
        .collect()
}

/// Declarative description of one CZM private frame group.
#[derive(Debug, Clone, Copy)]
pub struct FrameGroupSpec {
    pub group: Tag,
    /// Resolve `(0407,101c)` through the catalog.
    pub with_referenced_class: bool,
    /// Summarize the `(0407,1015)`/`(0407,1016)` payload members.
    pub with_payload_summaries: bool,
}

impl FrameGroupSpec {
    pub const fn plain(group: Tag) -> Self {
        Self {
            group,
            with_referenced_class: false,
            with_payload_summaries: false,
        }
    }

    pub const fn with_class(group: Tag) -> Self {
        Self {
            group,
            with_referenced_class: true,
            with_payload_summaries: false,
        }
    }

    pub const fn with_payloads(group: Tag) -> Self {
        Self {
            group,
            with_referenced_class: false,
            with_payload_summaries: true,
        }
    }
}

/// Flattens one frame group: frame type, optional referenced-class
/// description, per-slice opaque image summaries, optional payload
/// summaries.
pub fn flatten_frame_group(
    store: &AttributeStore,
    spec: FrameGroupSpec,
    catalog: &StorageClassCatalog,
) -> Result<MetadataTree> {
    let path = tag_key(spec.group);
    let group = store_item(store, spec.group, &path)?;
    let mut tree = MetadataTree::new();
    tree.insert(
        tag_key(tags::CZM_FRAME_TYPE),
        required_str(group, tags::CZM_FRAME_TYPE, &path)?,
    );
    if spec.with_referenced_class {
        let class_uid = required_str(group, tags::CZM_FRAME_REF_CLASS, &path)?;
        tree.insert(tag_key(tags::CZM_FRAME_REF_CLASS), catalog.describe(&class_uid));
    }
    let images: Vec<MetadataValue> = required_items(group, tags::CZM_FRAME_ITEMS, &path)?
        .iter()
        .map(|slice| {
            Ok(MetadataValue::from(opaque_summary(required_element(
                slice,
                tags::CZM_FRAME_DATA,
                &path,
            )?)))
        })
        .collect::<Result<_>>()?;
    tree.insert("images", images);
    if spec.with_payload_summaries {
        tree.insert(
            tag_key(tags::CZM_FRAME_AUX_1),
            opaque_summary(required_element(group, tags::CZM_FRAME_AUX_1, &path)?),
        );
        tree.insert(
            tag_key(tags::CZM_FRAME_AUX_2),
            opaque_summary(required_element(group, tags::CZM_FRAME_AUX_2, &path)?),
        );
    }
    Ok(tree)
}
