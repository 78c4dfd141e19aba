use crate::catalog::CatalogError;
use crate::demography::{MalformedEventSequenceError, ModelValidationError};
use crate::dfe::{DfeValidationError, InvalidDistributionError};
use crate::genetic_map::{FetchError, GeneticMapError};
use crate::genome::GenomeError;
use crate::species::SpeciesError;

/// Any error raised while building, registering or resolving catalog entries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidDistribution(#[from] InvalidDistributionError),

    #[error(transparent)]
    Dfe(#[from] DfeValidationError),

    #[error(transparent)]
    MalformedEvents(#[from] MalformedEventSequenceError),

    #[error(transparent)]
    Model(#[from] ModelValidationError),

    #[error(transparent)]
    Genome(#[from] GenomeError),

    #[error(transparent)]
    GeneticMap(#[from] GeneticMapError),

    #[error(transparent)]
    Species(#[from] SpeciesError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
