//! Humphrey Field Analyzer perimeters.
//!
//! Two distinct model names appear in the wild: `HFA 3` emits
//! spatial-registration instances with a private perimetry payload, while
//! `Humphrey Field Analyzer 3` emits multi-frame photography instances.

use super::zeiss;
use super::{ExtractCtx, ModelStrategy, SopClassArm, SopDispatch};
use crate::catalog::uids;
use crate::error::Result;
use crate::extraction::flatten;
use crate::extraction::tags;
use crate::store::tag_key;

fn registration(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::insert_laterality(ctx);
    zeiss::insert_acquisition_context(ctx)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)?;
    let summary = flatten::opaque_required(ctx.store, tags::HFA_PAYLOAD)?;
    ctx.tree.insert(tag_key(tags::HFA_PAYLOAD), summary);
    Ok(())
}

fn photography_stack(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::attach_frame_stack(ctx);
    Ok(())
}

pub(super) static HFA_3: ModelStrategy = ModelStrategy {
    model: "HFA 3",
    includes_series_description: false,
    arms: &[SopClassArm {
        sop_class: uids::SPATIAL_REGISTRATION,
        dispatch: SopDispatch::Always(registration),
    }],
    fallback: None,
};

pub(super) static HUMPHREY_FIELD_ANALYZER_3: ModelStrategy = ModelStrategy {
    model: "Humphrey Field Analyzer 3",
    includes_series_description: false,
    arms: &[SopClassArm {
        sop_class: uids::OPHTHALMIC_PHOTOGRAPHY_8_BIT,
        dispatch: SopDispatch::Always(photography_stack),
    }],
    fallback: None,
};
