//! Topcon 3DOCT-1Maestro2.
//!
//! These volumes live in a proprietary container that the OCT reader
//! collaborator decodes from the source file; there is no storage-class
//! branching for this device.

use super::{ExtractCtx, ModelStrategy};
use crate::error::Result;
use crate::metadata::ArtifactHandle;
use crate::render;

fn oct_volume(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    let Some(reader) = ctx.collab.oct.as_deref() else {
        ctx.warn("no OCT volume reader configured, skipping B-scan extraction");
        return Ok(());
    };
    let Some(path) = ctx.store.path() else {
        ctx.warn("instance was not opened from a file, skipping B-scan extraction");
        return Ok(());
    };
    let volume = reader.read_volume(path)?;
    match render::rasterize_frames(&volume) {
        Ok(frames) => ctx
            .tree
            .insert("bscan_images", ArtifactHandle::FrameStack(frames)),
        Err(e) => ctx.warn(format!("could not rasterize frame stack: {e}")),
    }
    Ok(())
}

pub(super) static STRATEGY: ModelStrategy = ModelStrategy {
    model: "3DOCT-1Maestro2",
    includes_series_description: false,
    arms: &[],
    fallback: Some(oct_volume),
};
