//! CLARUS 700 widefield fundus camera.
//!
//! Its photography instances declare a YCbCr photometric interpretation that
//! must be converted to RGB before the pixels are meaningful as color.

use super::zeiss;
use super::{ExtractCtx, ModelStrategy, SopClassArm, SopDispatch};
use crate::catalog::uids;
use crate::error::Result;
use crate::extraction::tags;
use crate::metadata::ArtifactHandle;
use crate::render;

fn photography(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    if let Some(volume) = ctx.pixel_volume() {
        match render::rasterize_single_ycbcr(&volume) {
            Ok(image) => ctx.tree.insert(
                "image_PIL",
                ArtifactHandle::Image {
                    name: "image".into(),
                    image,
                },
            ),
            Err(e) => ctx.warn(format!("could not convert fundus image: {e}")),
        }
    }
    zeiss::insert_bits_allocated(ctx);
    ctx.tree.insert(
        "Photometric Interpretation",
        format!(
            "RGB from {}",
            ctx.store.get_or_unknown(tags::PHOTOMETRIC_INTERPRETATION)
        ),
    );
    Ok(())
}

pub(super) static STRATEGY: ModelStrategy = ModelStrategy {
    model: "CLARUS 700",
    includes_series_description: false,
    arms: &[SopClassArm {
        sop_class: uids::OPHTHALMIC_PHOTOGRAPHY_8_BIT,
        dispatch: SopDispatch::Always(photography),
    }],
    fallback: None,
};
