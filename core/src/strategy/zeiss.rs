//! Handlers and tree-building helpers shared across the Carl Zeiss Meditec
//! device strategies.

use super::ExtractCtx;
use crate::error::{OculexError, Result};
use crate::extraction::flatten::{self, FrameGroupSpec};
use crate::extraction::tags;
use crate::metadata::{ArtifactHandle, MetadataTree, MetadataValue};
use crate::render;
use crate::store::{tag_key, UNKNOWN};
use dicom_core::Tag;

/// Rasterizes an embedded PDF into per-page artifacts plus inline previews
/// for the sidecar. The document payload is required; the rasterizer
/// collaborator is not.
pub(super) fn encapsulated_pdf(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    let document = ctx
        .store
        .get_bytes(tags::ENCAPSULATED_DOCUMENT)
        .ok_or_else(|| OculexError::MissingNestedAttribute(tag_key(tags::ENCAPSULATED_DOCUMENT)))?;
    let Some(rasterizer) = ctx.collab.document.as_deref() else {
        ctx.warn("no document rasterizer configured, skipping page rasterization");
        return Ok(());
    };
    let pages = rasterizer.rasterize_pages(&document)?;
    let mut named = Vec::with_capacity(pages.len());
    let mut previews = MetadataTree::new();
    for (index, page) in pages.into_iter().enumerate() {
        let name = format!("page_{}", index + 1);
        previews.insert(&name, render::encode_png_data_uri(&page)?);
        named.push((name, page));
    }
    ctx.tree.insert("png_pages", ArtifactHandle::PageSet(named));
    ctx.tree.insert("png_page_previews", previews);
    Ok(())
}

pub(super) fn insert_laterality(ctx: &mut ExtractCtx<'_>) {
    ctx.tree
        .insert("Laterality", ctx.store.get_or_unknown(tags::LATERALITY));
}

pub(super) fn insert_device_serial(ctx: &mut ExtractCtx<'_>) {
    ctx.tree.insert(
        "DeviceSerialNumber",
        ctx.store.get_or_unknown(tags::DEVICE_SERIAL_NUMBER),
    );
}

pub(super) fn insert_bits_allocated(ctx: &mut ExtractCtx<'_>) {
    match ctx.store.get_i64(tags::BITS_ALLOCATED) {
        Some(bits) => ctx.tree.insert("Bits Allocated", bits),
        None => ctx.tree.insert("Bits Allocated", UNKNOWN),
    }
}

pub(super) fn insert_photometric_interpretation(ctx: &mut ExtractCtx<'_>) {
    ctx.tree.insert(
        "Photometric Interpretation",
        ctx.store.get_or_unknown(tags::PHOTOMETRIC_INTERPRETATION),
    );
}

pub(super) fn insert_pixel_spacing(ctx: &mut ExtractCtx<'_>) {
    match ctx.store.get_f64s(tags::PIXEL_SPACING) {
        Some(spacing) => ctx.tree.insert(
            "Pixel Spacing",
            spacing
                .into_iter()
                .map(MetadataValue::from)
                .collect::<Vec<_>>(),
        ),
        None => ctx.tree.insert("Pixel Spacing", UNKNOWN),
    }
}

/// Joined multi-valued private text, keyed by its tag.
pub(super) fn insert_czm_text(ctx: &mut ExtractCtx<'_>, tag: Tag) -> Result<()> {
    let text = flatten::join_text(ctx.store, tag)?;
    ctx.tree.insert(tag_key(tag), text);
    Ok(())
}

/// Opaque size summaries for the listed analysis-group elements.
pub(super) fn insert_czm_analysis(ctx: &mut ExtractCtx<'_>, elements: &[u16]) -> Result<()> {
    for &element in elements {
        let tag = tags::czm_analysis(element);
        let summary = flatten::opaque_required(ctx.store, tag)?;
        ctx.tree.insert(tag_key(tag), summary);
    }
    Ok(())
}

pub(super) fn insert_acquisition_context(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    let context = flatten::acquisition_context(ctx.store)?;
    ctx.tree.insert("AcquisitionContextSequence", context);
    Ok(())
}

pub(super) fn insert_referenced_instances(
    ctx: &mut ExtractCtx<'_>,
    with_purpose: bool,
) -> Result<()> {
    let instances = flatten::referenced_instances(
        ctx.store,
        tags::REFERENCED_INSTANCE_SEQUENCE,
        with_purpose,
        None,
    )?;
    ctx.tree.insert("ReferencedInstanceSequence", instances);
    Ok(())
}

pub(super) fn insert_frame_groups(
    ctx: &mut ExtractCtx<'_>,
    specs: &[FrameGroupSpec],
) -> Result<()> {
    for spec in specs {
        let group = flatten::flatten_frame_group(ctx.store, *spec, ctx.catalog)?;
        ctx.tree.insert(tag_key(spec.group), group);
    }
    Ok(())
}

/// Attaches the single-frame raster under `image_PIL`. Decode or render
/// trouble downgrades to a warning.
pub(super) fn attach_single_image(ctx: &mut ExtractCtx<'_>) {
    let Some(volume) = ctx.pixel_volume() else {
        return;
    };
    match render::rasterize_single(&volume) {
        Ok(image) => ctx.tree.insert(
            "image_PIL",
            ArtifactHandle::Image {
                name: "image".into(),
                image,
            },
        ),
        Err(e) => ctx.warn(format!("could not rasterize frame: {e}")),
    }
}

/// Attaches every frame of a multi-frame instance under `bscan_images`.
pub(super) fn attach_frame_stack(ctx: &mut ExtractCtx<'_>) {
    let Some(volume) = ctx.pixel_volume() else {
        return;
    };
    match render::rasterize_frames(&volume) {
        Ok(frames) => ctx
            .tree
            .insert("bscan_images", ArtifactHandle::FrameStack(frames)),
        Err(e) => ctx.warn(format!("could not rasterize frame stack: {e}")),
    }
}

/// Spatial-registration series without a dedicated handler: report the
/// registration frame identity fields and stop.
pub(super) fn registration_fallback(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    insert_laterality(ctx);
    ctx.tree.insert(
        "PositionReferenceIndicator",
        ctx.store
            .get_or_unknown(tags::POSITION_REFERENCE_INDICATOR),
    );
    insert_device_serial(ctx);
    ctx.tree.insert(
        "FrameOfReferenceUID",
        ctx.store.get_or_unknown(tags::FRAME_OF_REFERENCE_UID),
    );
    ctx.tree.insert(
        "SynchronizationFrameOfReferenceUID",
        ctx.store
            .get_or_unknown(tags::SYNCHRONIZATION_FRAME_OF_REFERENCE_UID),
    );
    Ok(())
}
