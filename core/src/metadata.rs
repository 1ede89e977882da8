//! The normalized metadata tree produced by an extraction.
//!
//! A [`MetadataTree`] is an ordered string-keyed mapping whose values are
//! scalars, nested trees, lists, or in-memory raster artifacts. Artifacts are
//! carried inside the tree until the result writer consumes them, but they
//! are never serialized into the sidecar document.

use dicom_pixeldata::image::{DynamicImage, GenericImageView};
use serde_json::Value as Json;
use std::fmt;

/// A rendered raster artifact attached to a metadata tree.
///
/// Held in memory only; [`MetadataTree::to_json`] skips these entries.
#[derive(Clone)]
pub enum ArtifactHandle {
    /// A single raster image; `name` is the file stem used on write.
    Image { name: String, image: DynamicImage },
    /// An ordered, named stack of per-frame images (B-scan stacks,
    /// multi-frame secondary captures).
    FrameStack(Vec<(String, DynamicImage)>),
    /// An ordered, named set of rasterized document pages.
    PageSet(Vec<(String, DynamicImage)>),
}

impl ArtifactHandle {
    /// Named elements of this artifact, in order.
    pub fn elements(&self) -> Vec<(&str, &DynamicImage)> {
        match self {
            ArtifactHandle::Image { name, image } => vec![(name.as_str(), image)],
            ArtifactHandle::FrameStack(frames) | ArtifactHandle::PageSet(frames) => {
                frames.iter().map(|(n, i)| (n.as_str(), i)).collect()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArtifactHandle::Image { .. } => 1,
            ArtifactHandle::FrameStack(frames) | ArtifactHandle::PageSet(frames) => frames.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn image_eq(a: &DynamicImage, b: &DynamicImage) -> bool {
    a.dimensions() == b.dimensions() && a.color() == b.color() && a.as_bytes() == b.as_bytes()
}

impl PartialEq for ArtifactHandle {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ArtifactHandle::Image { name: n1, image: i1 },
                ArtifactHandle::Image { name: n2, image: i2 },
            ) => n1 == n2 && image_eq(i1, i2),
            (ArtifactHandle::FrameStack(a), ArtifactHandle::FrameStack(b))
            | (ArtifactHandle::PageSet(a), ArtifactHandle::PageSet(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((n1, i1), (n2, i2))| n1 == n2 && image_eq(i1, i2))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactHandle::Image { name, image } => {
                let (w, h) = image.dimensions();
                write!(f, "Image({name}, {w}x{h})")
            }
            ArtifactHandle::FrameStack(frames) => write!(f, "FrameStack({} frames)", frames.len()),
            ArtifactHandle::PageSet(pages) => write!(f, "PageSet({} pages)", pages.len()),
        }
    }
}

/// One value in a metadata tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tree(MetadataTree),
    List(Vec<MetadataValue>),
    Artifact(ArtifactHandle),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&MetadataTree> {
        match self {
            MetadataValue::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_artifact(&self) -> Option<&ArtifactHandle> {
        match self {
            MetadataValue::Artifact(a) => Some(a),
            _ => None,
        }
    }

    /// Serializable form; artifacts have none.
    pub fn to_json(&self) -> Option<Json> {
        match self {
            MetadataValue::Null => Some(Json::Null),
            MetadataValue::Bool(b) => Some(Json::Bool(*b)),
            MetadataValue::Int(i) => Some(Json::from(*i)),
            MetadataValue::Float(x) => serde_json::Number::from_f64(*x).map(Json::Number),
            MetadataValue::Str(s) => Some(Json::String(s.clone())),
            MetadataValue::Tree(t) => Some(t.to_json()),
            MetadataValue::List(items) => {
                Some(Json::Array(items.iter().filter_map(Self::to_json).collect()))
            }
            // never persisted in the sidecar
            MetadataValue::Artifact(_) => None,
        }
    }

    pub fn from_json(value: &Json) -> MetadataValue {
        match value {
            Json::Null => MetadataValue::Null,
            Json::Bool(b) => MetadataValue::Bool(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MetadataValue::Int(i)
                } else {
                    MetadataValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => MetadataValue::Str(s.clone()),
            Json::Array(items) => {
                MetadataValue::List(items.iter().map(MetadataValue::from_json).collect())
            }
            Json::Object(_) => MetadataValue::Tree(MetadataTree::from_json(value)),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Str(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Str(s)
    }
}

impl From<i64> for MetadataValue {
    fn from(i: i64) -> Self {
        MetadataValue::Int(i)
    }
}

impl From<i32> for MetadataValue {
    fn from(i: i32) -> Self {
        MetadataValue::Int(i64::from(i))
    }
}

impl From<f64> for MetadataValue {
    fn from(x: f64) -> Self {
        MetadataValue::Float(x)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        MetadataValue::Bool(b)
    }
}

impl From<MetadataTree> for MetadataValue {
    fn from(t: MetadataTree) -> Self {
        MetadataValue::Tree(t)
    }
}

impl From<Vec<MetadataValue>> for MetadataValue {
    fn from(items: Vec<MetadataValue>) -> Self {
        MetadataValue::List(items)
    }
}

impl From<Vec<MetadataTree>> for MetadataValue {
    fn from(items: Vec<MetadataTree>) -> Self {
        MetadataValue::List(items.into_iter().map(MetadataValue::Tree).collect())
    }
}

impl From<ArtifactHandle> for MetadataValue {
    fn from(a: ArtifactHandle) -> Self {
        MetadataValue::Artifact(a)
    }
}

/// Ordered string-keyed mapping of extracted metadata.
///
/// Insertion order is preserved; inserting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTree {
    entries: Vec<(String, MetadataValue)>,
}

impl MetadataTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key, replacing the value in place if the key exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetadataValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All artifact handles in this tree, depth first, with the key of the
    /// entry that carries them.
    pub fn artifacts(&self) -> Vec<(&str, &ArtifactHandle)> {
        let mut found = Vec::new();
        self.collect_artifacts(&mut found);
        found
    }

    fn collect_artifacts<'a>(&'a self, found: &mut Vec<(&'a str, &'a ArtifactHandle)>) {
        for (key, value) in &self.entries {
            match value {
                MetadataValue::Artifact(a) => found.push((key.as_str(), a)),
                MetadataValue::Tree(t) => t.collect_artifacts(found),
                MetadataValue::List(items) => {
                    for item in items {
                        if let MetadataValue::Tree(t) = item {
                            t.collect_artifacts(found);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Serializes the tree, skipping artifact entries.
    pub fn to_json(&self) -> Json {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.entries {
            if let Some(json) = value.to_json() {
                map.insert(key.clone(), json);
            }
        }
        Json::Object(map)
    }

    /// Rebuilds a tree from a sidecar document. Non-object input yields an
    /// empty tree.
    pub fn from_json(value: &Json) -> Self {
        let mut tree = MetadataTree::new();
        if let Json::Object(map) = value {
            for (key, value) in map {
                tree.insert(key.clone(), MetadataValue::from_json(value));
            }
        }
        tree
    }
}

impl<'a> IntoIterator for &'a MetadataTree {
    type Item = &'a (String, MetadataValue);
    type IntoIter = std::slice::Iter<'a, (String, MetadataValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_pixeldata::image::DynamicImage;

    fn sample_tree() -> MetadataTree {
        let mut inner = MetadataTree::new();
        inner.insert("Power", 21.5);
        inner.insert("Formula", "SRK/T");

        let mut tree = MetadataTree::new();
        tree.insert("Manufacturer", "Carl Zeiss Meditec");
        tree.insert("Frames", 128);
        tree.insert("Left Eye", true);
        tree.insert("Calculation", inner);
        tree.insert(
            "Measurements",
            vec![MetadataValue::from(1.0), MetadataValue::from(2.5)],
        );
        tree
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut tree = MetadataTree::new();
        tree.insert("a", 1);
        tree.insert("b", 2);
        tree.insert("a", 3);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(tree.get("a"), Some(&MetadataValue::Int(3)));
    }

    #[test]
    fn test_json_round_trip_preserves_order_and_values() {
        let tree = sample_tree();
        let json = tree.to_json();
        let restored = MetadataTree::from_json(&json);
        assert_eq!(restored, tree);
        assert_eq!(
            restored.keys().collect::<Vec<_>>(),
            tree.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_artifacts_skipped_in_json_but_collected() {
        let mut tree = sample_tree();
        tree.insert(
            "image",
            ArtifactHandle::Image {
                name: "image".into(),
                image: DynamicImage::new_luma8(4, 4),
            },
        );
        let mut nested = MetadataTree::new();
        nested.insert(
            "pages",
            ArtifactHandle::PageSet(vec![("page_1".into(), DynamicImage::new_rgb8(2, 2))]),
        );
        tree.insert("report", nested);

        let json = tree.to_json();
        assert!(json.get("image").is_none());
        assert!(json["report"].get("pages").is_none());

        let artifacts = tree.artifacts();
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].0, "image");
        assert_eq!(artifacts[1].0, "pages");
        assert_eq!(artifacts[1].1.elements()[0].0, "page_1");
    }
}
