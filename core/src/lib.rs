pub mod api;
pub mod catalog;
pub mod collab;
pub mod error;
pub mod extraction;
pub mod metadata;
pub mod render;
pub mod store;
pub mod strategy;
pub mod writer;

pub use api::DicomExtractor;
pub use catalog::StorageClassCatalog;
pub use collab::{Collaborators, DocumentRasterizer, OctVolumeReader, VisualFieldReader};
pub use error::{OculexError, Result};
pub use metadata::{ArtifactHandle, MetadataTree, MetadataValue};
pub use render::PixelVolume;
pub use store::AttributeStore;
pub use strategy::{Extraction, ModelStrategy, StrategyRegistry};
pub use writer::{ResultWriter, WrittenResult};
