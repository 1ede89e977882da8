//! High-level extraction pipeline.
//!
//! A [`DicomExtractor`] owns the strategy registry, the storage-class
//! catalog, and the collaborators, and turns one instance at a time into an
//! [`Extraction`].

use crate::catalog::StorageClassCatalog;
use crate::collab::Collaborators;
use crate::error::Result;
use crate::extraction::tags;
use crate::store::AttributeStore;
use crate::strategy::{Extraction, StrategyRegistry};
use crate::writer::{ResultWriter, WrittenResult};
use dicom_object::DefaultDicomObject;
use log::info;
use std::path::Path;

pub struct DicomExtractor {
    registry: StrategyRegistry,
    catalog: StorageClassCatalog,
    collaborators: Collaborators,
}

impl DicomExtractor {
    /// Extractor with the built-in device strategies.
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_registry(StrategyRegistry::with_builtin_strategies(), collaborators)
    }

    /// Extractor over a caller-assembled registry.
    pub fn with_registry(registry: StrategyRegistry, collaborators: Collaborators) -> Self {
        Self {
            registry,
            catalog: StorageClassCatalog::new(),
            collaborators,
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Extraction> {
        let store = AttributeStore::open(path.as_ref())?;
        self.extract_store(&store)
    }

    pub fn extract_object(&self, object: DefaultDicomObject) -> Result<Extraction> {
        let store = AttributeStore::from_object(object);
        self.extract_store(&store)
    }

    fn extract_store(&self, store: &AttributeStore) -> Result<Extraction> {
        let model = store.get_or_unknown(tags::MANUFACTURER_MODEL_NAME);
        let strategy = self.registry.resolve(&model);
        info!(
            "extracting {} instance {}",
            model,
            store.get_or_unknown(tags::SOP_INSTANCE_UID)
        );
        strategy.extract(store, &self.catalog, &self.collaborators)
    }

    /// Extracts one file and persists the result under `writer`'s root.
    pub fn extract_file_to(
        &self,
        path: impl AsRef<Path>,
        writer: &ResultWriter,
    ) -> Result<(Extraction, WrittenResult)> {
        let store = AttributeStore::open(path.as_ref())?;
        let extraction = self.extract_store(&store)?;
        let instance = store.get_or_unknown(tags::SOP_INSTANCE_UID);
        let written = writer.write(&instance, &extraction.tree)?;
        Ok((extraction, written))
    }
}

impl Default for DicomExtractor {
    fn default() -> Self {
        Self::new(Collaborators::none())
    }
}
