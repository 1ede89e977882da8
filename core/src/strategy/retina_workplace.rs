//! Retina Workplace review software: emits PDF reports only.

use super::zeiss;
use super::{ModelStrategy, SopClassArm, SopDispatch};
use crate::catalog::uids;

pub(super) static STRATEGY: ModelStrategy = ModelStrategy {
    model: "Retina Workplace",
    includes_series_description: false,
    arms: &[SopClassArm {
        sop_class: uids::ENCAPSULATED_PDF,
        dispatch: SopDispatch::Always(zeiss::encapsulated_pdf),
    }],
    fallback: None,
};
