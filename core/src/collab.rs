//! Collaborator seams for the decoding work this crate does not do itself.
//!
//! Page-document rasterization, proprietary OCT-volume containers, and
//! visual-field report parsing are consumed through these traits. A missing
//! collaborator downgrades the affected branch to a warning; it never aborts
//! an extraction.

use crate::error::Result;
use crate::render::PixelVolume;
use crate::store::AttributeStore;
use dicom_pixeldata::image::DynamicImage;
use std::path::Path;

/// Renders an embedded page-oriented document (PDF) into one raster image
/// per page, in page order.
pub trait DocumentRasterizer {
    fn rasterize_pages(&self, document: &[u8]) -> Result<Vec<DynamicImage>>;
}

/// Decodes a proprietary OCT container into a stack of depth slices.
pub trait OctVolumeReader {
    fn read_volume(&self, path: &Path) -> Result<PixelVolume>;
}

/// Parses a visual-field perimetry instance into a serializable report.
pub trait VisualFieldReader {
    fn parse(&self, store: &AttributeStore) -> Result<serde_json::Value>;
}

/// The set of collaborators available to an extraction. Any of them may be
/// absent.
#[derive(Default)]
pub struct Collaborators {
    pub document: Option<Box<dyn DocumentRasterizer>>,
    pub oct: Option<Box<dyn OctVolumeReader>>,
    pub visual_field: Option<Box<dyn VisualFieldReader>>,
}

impl Collaborators {
    /// No collaborators configured; metadata-only extraction.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, rasterizer: impl DocumentRasterizer + 'static) -> Self {
        self.document = Some(Box::new(rasterizer));
        self
    }

    pub fn with_oct(mut self, reader: impl OctVolumeReader + 'static) -> Self {
        self.oct = Some(Box::new(reader));
        self
    }

    pub fn with_visual_field(mut self, reader: impl VisualFieldReader + 'static) -> Self {
        self.visual_field = Some(Box::new(reader));
        self
    }
}
