//! CIRRUS HD-OCT 4000 / 5000 / 6000.
//!
//! The three generations share most of their spatial-registration series
//! handling; they differ in which storage classes they emit and in how
//! tomography volumes are rendered (the 6000 additionally gets an en-face
//! maximum projection).

use super::zeiss;
use super::{ExtractCtx, ModelStrategy, SopClassArm, SopDispatch};
use crate::catalog::uids;
use crate::error::Result;
use crate::extraction::flatten::{self, FrameGroupSpec};
use crate::extraction::tags;
use crate::metadata::ArtifactHandle;
use crate::render;

fn insert_channel_code_meaning(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    let path = "ChannelDescriptionCodeSequence";
    let channel = flatten::store_item(ctx.store, tags::CHANNEL_DESCRIPTION_CODE_SEQUENCE, path)?;
    let meaning = flatten::required_str(channel, tags::CODE_MEANING, path)?;
    ctx.tree.insert("Image Type", meaning);
    Ok(())
}

fn photography_5000(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::attach_single_image(ctx);
    insert_channel_code_meaning(ctx)?;
    zeiss::insert_laterality(ctx);
    zeiss::insert_bits_allocated(ctx);
    zeiss::insert_photometric_interpretation(ctx);
    zeiss::insert_pixel_spacing(ctx);
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)
}

fn photography_6000(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::attach_single_image(ctx);
    zeiss::insert_laterality(ctx);
    zeiss::insert_bits_allocated(ctx);
    zeiss::insert_photometric_interpretation(ctx);
    zeiss::insert_pixel_spacing(ctx);
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)
}

/// Single-raster tomography series of the 5000.
fn tomography_single(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::attach_single_image(ctx);
    zeiss::insert_laterality(ctx);
    zeiss::insert_bits_allocated(ctx);
    zeiss::insert_photometric_interpretation(ctx);
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)
}

fn tomography_stack(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::attach_frame_stack(ctx);
    Ok(())
}

/// 6000 tomography: B-scan stack plus the en-face projection obtained by
/// collapsing the depth axis with a maximum.
fn tomography_with_en_face(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    let Some(volume) = ctx.pixel_volume() else {
        return Ok(());
    };
    match render::rasterize_frames(&volume) {
        Ok(frames) => ctx
            .tree
            .insert("bscan_images", ArtifactHandle::FrameStack(frames)),
        Err(e) => ctx.warn(format!("could not rasterize frame stack: {e}")),
    }
    match render::project_max(&volume) {
        Ok(image) => ctx.tree.insert(
            "en_face_image",
            ArtifactHandle::Image {
                name: "en_face_from_max_operation_across_bscans".into(),
                image,
            },
        ),
        Err(e) => ctx.warn(format!("could not project en-face image: {e}")),
    }
    Ok(())
}

const CUBE_GROUPS: &[FrameGroupSpec] = &[
    FrameGroupSpec::plain(tags::CZM_FRAME_GROUP_A0),
    FrameGroupSpec::with_payloads(tags::CZM_FRAME_GROUP_A1),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A2),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A3),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A6),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A7),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_B5),
];

// Optic disc cubes carry the same groups minus the fundus group.
const DISC_GROUPS: &[FrameGroupSpec] = &[
    FrameGroupSpec::with_payloads(tags::CZM_FRAME_GROUP_A1),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A2),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A3),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A6),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A7),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_B5),
];

const RASTER_21_GROUPS: &[FrameGroupSpec] = &[
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A3),
    FrameGroupSpec::plain(tags::CZM_FRAME_GROUP_A5),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A6),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_B5),
];

const FIVE_LINE_GROUPS: &[FrameGroupSpec] = &[
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A3),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A4),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_A6),
    FrameGroupSpec::with_class(tags::CZM_FRAME_GROUP_B5),
];

fn macular_thickness(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::insert_laterality(ctx);
    zeiss::insert_device_serial(ctx);
    zeiss::insert_referenced_instances(ctx, false)?;
    zeiss::insert_acquisition_context(ctx)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_2)?;
    zeiss::insert_czm_analysis(ctx, tags::CZM_ANALYSIS_SMALL)
}

fn macular_cube(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::insert_laterality(ctx);
    zeiss::insert_device_serial(ctx);
    zeiss::insert_acquisition_context(ctx)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_2)?;
    zeiss::insert_frame_groups(ctx, CUBE_GROUPS)
}

fn glaucoma_ou(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::insert_laterality(ctx);
    zeiss::insert_device_serial(ctx);
    zeiss::insert_referenced_instances(ctx, true)?;
    zeiss::insert_acquisition_context(ctx)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_2)?;
    zeiss::insert_czm_analysis(ctx, tags::CZM_ANALYSIS_FULL)
}

fn optic_disc_cube(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::insert_laterality(ctx);
    zeiss::insert_device_serial(ctx);
    zeiss::insert_acquisition_context(ctx)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_2)?;
    zeiss::insert_frame_groups(ctx, DISC_GROUPS)
}

fn raster_21_lines(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_2)?;
    zeiss::insert_acquisition_context(ctx)?;
    zeiss::insert_frame_groups(ctx, RASTER_21_GROUPS)
}

fn five_line_raster(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_2)?;
    zeiss::insert_acquisition_context(ctx)?;
    zeiss::insert_frame_groups(ctx, FIVE_LINE_GROUPS)
}

fn guided_progression(ctx: &mut ExtractCtx<'_>) -> Result<()> {
    zeiss::insert_laterality(ctx);
    zeiss::insert_device_serial(ctx);
    zeiss::insert_acquisition_context(ctx)?;
    zeiss::insert_referenced_instances(ctx, true)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_1)?;
    zeiss::insert_czm_text(ctx, tags::CZM_TEXT_2)?;
    zeiss::insert_czm_analysis(ctx, tags::CZM_ANALYSIS_FULL)
}

pub(super) static CIRRUS_4000: ModelStrategy = ModelStrategy {
    model: "CIRRUS HD-OCT 4000",
    includes_series_description: true,
    arms: &[
        SopClassArm {
            sop_class: uids::ENCAPSULATED_PDF,
            dispatch: SopDispatch::Always(zeiss::encapsulated_pdf),
        },
        SopClassArm {
            sop_class: uids::SPATIAL_REGISTRATION,
            dispatch: SopDispatch::BySeries {
                labels: &[
                    (&["Macular Thickness"], macular_thickness),
                    (&["Macular Cube 512x128"], macular_cube),
                ],
                fallback: zeiss::registration_fallback,
            },
        },
    ],
    fallback: None,
};

pub(super) static CIRRUS_5000: ModelStrategy = ModelStrategy {
    model: "CIRRUS HD-OCT 5000",
    includes_series_description: true,
    arms: &[
        SopClassArm {
            sop_class: uids::OPHTHALMIC_PHOTOGRAPHY_8_BIT,
            dispatch: SopDispatch::Always(photography_5000),
        },
        SopClassArm {
            sop_class: uids::ENCAPSULATED_PDF,
            dispatch: SopDispatch::Always(zeiss::encapsulated_pdf),
        },
        SopClassArm {
            sop_class: uids::OPHTHALMIC_TOMOGRAPHY,
            dispatch: SopDispatch::BySeries {
                labels: &[(&["RASTER_SINGLE"], tomography_single)],
                fallback: tomography_stack,
            },
        },
        SopClassArm {
            sop_class: uids::SPATIAL_REGISTRATION,
            dispatch: SopDispatch::BySeries {
                labels: &[
                    (&["Macular Thickness"], macular_thickness),
                    (&["Macular Cube 512x128"], macular_cube),
                    (&["Glaucoma OU Analysis"], glaucoma_ou),
                    (&["Optic Disc Cube 200x200"], optic_disc_cube),
                    (&["RASTER_21_LINES", "HD 5 Line Raster"], raster_21_lines),
                    (&["5 Line Raster"], five_line_raster),
                    (&["Guided Progression Analysis"], guided_progression),
                ],
                fallback: zeiss::registration_fallback,
            },
        },
    ],
    fallback: None,
};

pub(super) static CIRRUS_6000: ModelStrategy = ModelStrategy {
    model: "CIRRUS HD-OCT 6000",
    includes_series_description: true,
    arms: &[
        SopClassArm {
            sop_class: uids::OPHTHALMIC_PHOTOGRAPHY_8_BIT,
            dispatch: SopDispatch::Always(photography_6000),
        },
        SopClassArm {
            sop_class: uids::ENCAPSULATED_PDF,
            dispatch: SopDispatch::Always(zeiss::encapsulated_pdf),
        },
        SopClassArm {
            sop_class: uids::OPHTHALMIC_TOMOGRAPHY,
            dispatch: SopDispatch::Always(tomography_with_en_face),
        },
        SopClassArm {
            sop_class: uids::SPATIAL_REGISTRATION,
            dispatch: SopDispatch::BySeries {
                labels: &[
                    (&["Macular Thickness"], macular_thickness),
                    (&["Macular Cube 512x128"], macular_cube),
                    (&["Glaucoma OU Analysis"], glaucoma_ou),
                    (&["Optic Disc Cube 200x200"], optic_disc_cube),
                    (&["Guided Progression Analysis"], guided_progression),
                ],
                fallback: zeiss::registration_fallback,
            },
        },
    ],
    fallback: None,
};
