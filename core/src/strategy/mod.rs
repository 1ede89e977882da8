//! Device strategies and the dispatch machinery that selects them.
//!
//! Dispatch is data, not control flow: a [`ModelStrategy`] is a table of
//! [`SopClassArm`]s, each either handling its storage class unconditionally
//! or branching on the series label with a mandatory fallback. The
//! [`StrategyRegistry`] maps device model names to strategies; unknown models
//! resolve to a baseline strategy that yields the common fields only.

use crate::catalog::StorageClassCatalog;
use crate::collab::Collaborators;
use crate::error::Result;
use crate::extraction::common::extract_common;
use crate::extraction::tags;
use crate::metadata::MetadataTree;
use crate::render::PixelVolume;
use crate::store::AttributeStore;
use log::{debug, warn};
use std::collections::HashMap;

mod atlas_9000;
mod cirrus_hd_oct;
mod clarus_700;
mod forum_glaucoma;
mod hfa;
mod iol_master_700;
mod maestro;
mod plex_elite;
mod retina_workplace;
mod zeiss;

/// The result of extracting one instance: the metadata tree (artifacts
/// included) and any warnings raised along the way. Warnings mark branches
/// that were skipped, never a corrupted tree.
#[derive(Debug)]
pub struct Extraction {
    pub tree: MetadataTree,
    pub warnings: Vec<String>,
}

/// Mutable extraction state handed to series handlers.
pub struct ExtractCtx<'a> {
    pub store: &'a AttributeStore,
    pub catalog: &'a StorageClassCatalog,
    pub collab: &'a Collaborators,
    pub tree: MetadataTree,
    pub warnings: Vec<String>,
}

impl ExtractCtx<'_> {
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.warnings.push(message);
    }

    /// Decodes the pixel data, downgrading a decode failure to a warning so
    /// the metadata already gathered survives.
    pub fn pixel_volume(&mut self) -> Option<PixelVolume> {
        match self.store.pixel_volume() {
            Ok(volume) => Some(volume),
            Err(e) => {
                self.warn(format!("pixel data could not be decoded, skipping artifact: {e}"));
                None
            }
        }
    }
}

/// Handler for one storage class / series label combination.
pub type SeriesHandler = fn(&mut ExtractCtx<'_>) -> Result<()>;

/// How a strategy handles one storage class.
pub enum SopDispatch {
    /// Same handling for every series of this class.
    Always(SeriesHandler),
    /// Branch on the series label. Unlisted labels take the fallback.
    BySeries {
        labels: &'static [(&'static [&'static str], SeriesHandler)],
        fallback: SeriesHandler,
    },
}

/// One row of a strategy's dispatch table.
pub struct SopClassArm {
    pub sop_class: &'static str,
    pub dispatch: SopDispatch,
}

/// A device model's extraction strategy.
pub struct ModelStrategy {
    pub model: &'static str,
    /// Whether instances of this model carry a series description worth
    /// reporting alongside the common fields.
    pub includes_series_description: bool,
    pub arms: &'static [SopClassArm],
    /// Catch-all handler for models that are not dispatched by storage
    /// class at all.
    pub fallback: Option<SeriesHandler>,
}

/// Baseline for models without a registered strategy.
static DEFAULT_STRATEGY: ModelStrategy = ModelStrategy {
    model: "",
    includes_series_description: false,
    arms: &[],
    fallback: None,
};

impl ModelStrategy {
    /// Runs this strategy over one instance.
    ///
    /// Unrecognized storage classes and series labels degrade to the common
    /// fields; only a malformed nested structure aborts.
    pub fn extract(
        &self,
        store: &AttributeStore,
        catalog: &StorageClassCatalog,
        collab: &Collaborators,
    ) -> Result<Extraction> {
        let mut ctx = ExtractCtx {
            store,
            catalog,
            collab,
            tree: extract_common(store, catalog),
            warnings: Vec::new(),
        };
        if self.includes_series_description {
            ctx.tree.insert(
                "Series Description",
                store.get_or_unknown(tags::SERIES_DESCRIPTION),
            );
        }

        let sop_class = store.get_or_unknown(tags::SOP_CLASS_UID);
        let arm = self.arms.iter().find(|arm| arm.sop_class == sop_class);
        match arm {
            Some(arm) => match &arm.dispatch {
                SopDispatch::Always(handler) => handler(&mut ctx)?,
                SopDispatch::BySeries { labels, fallback } => {
                    let series = store.get_or_unknown(tags::SERIES_DESCRIPTION);
                    let handler = labels
                        .iter()
                        .find(|(names, _)| names.contains(&series.as_str()))
                        .map(|(_, handler)| *handler);
                    match handler {
                        Some(handler) => handler(&mut ctx)?,
                        None => {
                            debug!(
                                "series {series:?} not specifically handled for {}, using fallback",
                                self.model
                            );
                            fallback(&mut ctx)?;
                        }
                    }
                }
            },
            None => match self.fallback {
                Some(handler) => handler(&mut ctx)?,
                None if self.model.is_empty() => {
                    debug!("no device strategy registered, common fields only");
                }
                None => {
                    ctx.warn(format!(
                        "storage class {sop_class} is not handled for {}, common fields only",
                        self.model
                    ));
                }
            },
        }

        Ok(Extraction {
            tree: ctx.tree,
            warnings: ctx.warnings,
        })
    }
}

/// Immutable after construction: build it, register any overrides, then
/// share it for the life of the process.
pub struct StrategyRegistry {
    strategies: HashMap<&'static str, &'static ModelStrategy>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Registry with every built-in device strategy. Registration order is
    /// fixed so overriding behavior is deterministic.
    pub fn with_builtin_strategies() -> Self {
        let mut registry = Self::empty();
        for strategy in [
            &atlas_9000::STRATEGY,
            &cirrus_hd_oct::CIRRUS_4000,
            &cirrus_hd_oct::CIRRUS_5000,
            &cirrus_hd_oct::CIRRUS_6000,
            &clarus_700::STRATEGY,
            &forum_glaucoma::STRATEGY,
            &hfa::HFA_3,
            &hfa::HUMPHREY_FIELD_ANALYZER_3,
            &iol_master_700::STRATEGY,
            &maestro::STRATEGY,
            &plex_elite::STRATEGY,
            &retina_workplace::STRATEGY,
        ] {
            registry.register(strategy);
        }
        registry
    }

    /// Registers a strategy; a later registration for the same model name
    /// wins.
    pub fn register(&mut self, strategy: &'static ModelStrategy) {
        self.strategies.insert(strategy.model, strategy);
    }

    /// Resolves a model name, falling back to the baseline strategy.
    pub fn resolve(&self, model: &str) -> &'static ModelStrategy {
        match self.strategies.get(model) {
            Some(strategy) => strategy,
            None => {
                debug!("unknown device model {model:?}");
                &DEFAULT_STRATEGY
            }
        }
    }

    /// Registered model names, sorted.
    pub fn models(&self) -> Vec<&'static str> {
        let mut models: Vec<_> = self.strategies.keys().copied().collect();
        models.sort_unstable();
        models
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtin_strategies()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_roster() {
        let registry = StrategyRegistry::with_builtin_strategies();
        assert_eq!(
            registry.models(),
            vec![
                "3DOCT-1Maestro2",
                "ATLAS 9000",
                "CIRRUS HD-OCT 4000",
                "CIRRUS HD-OCT 5000",
                "CIRRUS HD-OCT 6000",
                "CLARUS 700",
                "FORUM Glaucoma Workplace",
                "HFA 3",
                "Humphrey Field Analyzer 3",
                "IOLMaster 700",
                "PLEX ELITE PE9000",
                "Retina Workplace",
            ]
        );
    }

    #[test]
    fn test_unknown_model_resolves_to_baseline() {
        let registry = StrategyRegistry::with_builtin_strategies();
        let strategy = registry.resolve("Some Future Device");
        assert!(strategy.arms.is_empty());
        assert!(strategy.fallback.is_none());
    }

    #[test]
    fn test_later_registration_wins() {
        static OVERRIDE: ModelStrategy = ModelStrategy {
            model: "CLARUS 700",
            includes_series_description: true,
            arms: &[],
            fallback: None,
        };
        let mut registry = StrategyRegistry::with_builtin_strategies();
        registry.register(&OVERRIDE);
        assert!(registry.resolve("CLARUS 700").includes_series_description);
    }
}
