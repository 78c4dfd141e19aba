#![warn(unreachable_pub, missing_debug_implementations)]

//! The core popcat library. This crate defines the validation engine that turns loosely
//! structured population-genetics parameters into simulator-ready [demographic
//! models](DemographicModel), [DFEs](Dfe) and [genomes](Genome), and the [catalog](Catalog) they
//! are registered into.

#[macro_use]
mod ident;

pub mod catalog;
pub mod citation;
pub mod demography;
pub mod dfe;
pub mod genetic_map;
pub mod genome;
pub mod species;
pub mod units;

mod error;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{Catalog, CatalogBuilder, CatalogError, CatalogSource, EntityKind};
pub use citation::{CiteReason, Citation};
pub use demography::{
    DemographicEvent, DemographicModel, DemographicModelSpec, Epoch, EventSequence, ModelId,
    PiecewiseModelSpec, PopIndex, Population, PopulationConfig, PopulationHistory, PopulationId,
};
pub use dfe::{Dfe, DfeId, DfeSpec, EffectDist, MutationType};
pub use error::Error;
pub use genetic_map::{GeneticMap, GeneticMapId, MapFetcher, MapResolver, ResolvedMap};
pub use genome::{Chromosome, ChromosomeName, Genome, Rate, RateProvenance};
pub use species::{Contig, Species, SpeciesId, SpeciesSpec};
pub use units::{BasePairs, Generations};
