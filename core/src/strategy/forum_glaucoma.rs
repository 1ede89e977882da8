//! FORUM Glaucoma Workplace: static perimetry measurements and PDF reports.

use super::zeiss;
use super::{ExtractCtx, ModelStrategy, SopClassArm, SopDispatch};
use crate::catalog::uids;
use crate::error::Result;
use crate::metadata::MetadataValue;

/// Visual-field instances are handed to the perimetry reader collaborator;
/// its report lands in the tree as a nested document.
fn visual_field(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    let Some(reader) = ctx.collab.visual_field.as_deref() else {
        ctx.warn("no visual-field reader configured, skipping perimetry report");
        return Ok(());
    };
    let report = reader.parse(ctx.store)?;
    ctx.tree
        .insert("HVF Object", MetadataValue::from_json(&report));
    Ok(())
}

pub(super) static STRATEGY: ModelStrategy = ModelStrategy {
    model: "FORUM Glaucoma Workplace",
    includes_series_description: true,
    arms: &[
        SopClassArm {
            sop_class: uids::VISUAL_FIELD_PERIMETRY,
            dispatch: SopDispatch::Always(visual_field),
        },
        SopClassArm {
            sop_class: uids::ENCAPSULATED_PDF,
            dispatch: SopDispatch::Always(zeiss::encapsulated_pdf),
        },
    ],
    fallback: None,
};
