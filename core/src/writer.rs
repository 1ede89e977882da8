//! Writes extraction results to disk.
//!
//! Each instance produces a JSON sidecar named after its SOP Instance UID,
//! plus one PNG per artifact element in a sibling directory of the same
//! name. Directories are created on demand; an existing result for the same
//! instance is overwritten.

use crate::error::{OculexError, Result};
use crate::metadata::MetadataTree;
use dicom_pixeldata::image::{DynamicImage, ImageFormat};
use log::debug;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Paths produced by a single [`ResultWriter::write`] call.
#[derive(Debug, Clone)]
pub struct WrittenResult {
    pub sidecar: PathBuf,
    pub images: Vec<PathBuf>,
}

/// Persists metadata trees and their artifacts under one output root.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    root: PathBuf,
}

impl ResultWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the sidecar and every artifact element of `tree`.
    pub fn write(&self, instance_uid: &str, tree: &MetadataTree) -> Result<WrittenResult> {
        let stem = sanitize(instance_uid);
        fs::create_dir_all(&self.root)?;

        let sidecar = self.root.join(format!("{stem}.json"));
        fs::write(&sidecar, serde_json::to_vec_pretty(&tree.to_json())?)?;
        debug!("wrote sidecar {}", sidecar.display());

        let artifacts = tree.artifacts();
        let mut images = Vec::new();
        if !artifacts.is_empty() {
            let dir = self.root.join(&stem);
            fs::create_dir_all(&dir)?;
            for (_, artifact) in artifacts {
                for (name, image) in artifact.elements() {
                    let path = dir.join(format!("{}.png", sanitize(name)));
                    save_png(image, &path)?;
                    debug!("wrote artifact {}", path.display());
                    images.push(path);
                }
            }
        }
        Ok(WrittenResult { sidecar, images })
    }
}

/// Keeps file names to a portable subset; UIDs and element names pass
/// through unchanged in practice.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn save_png(image: &DynamicImage, path: &Path) -> Result<()> {
    let file = fs::File::create(path)?;
    image
        .write_to(&mut BufWriter::new(file), ImageFormat::Png)
        .map_err(|e| OculexError::Render(e.to_string()))
}
