//! Utilities for interfacing with popcat: catalog definition files and a local genetic map
//! fetcher.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

mod catalog_file;
mod fetch;

use std::path::{Path, PathBuf};

use popcat_core::{Catalog, CatalogBuilder};

pub use catalog_file::{
    CatalogFile, DfeEntry, GeneticMapEntry, GenomeEntry, ModelEntry, MutationTypeEntry,
    PopulationEntry, SpeciesEntry,
};
pub use fetch::DirectoryFetcher;

/// Reads a [`CatalogFile`] from a file in JSON or Dhall format.
pub fn read_catalog_file(path: impl AsRef<Path>) -> Result<CatalogFile, Error> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let file: CatalogFile = match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents)?,
        Some("dhall") => serde_dhall::from_str(&contents).parse().map_err(Box::new)?,
        _ => return Err(Error::UnknownFileType(path.as_ref().into())),
    };
    Ok(file)
}

/// Loads the catalog file at `path` on top of `builder` and freezes the result. Nothing from the
/// file is registered unless all of it validates.
pub fn read_catalog(
    mut builder: CatalogBuilder,
    path: impl AsRef<Path>,
) -> Result<Catalog, Error> {
    let file = read_catalog_file(path.as_ref())?;
    builder.load(&file)?;
    log::info!("loaded catalog file {}", path.as_ref().display());
    let catalog = builder.freeze().map_err(popcat_core::Error::from)?;
    Ok(catalog)
}

/// Error kinds for catalog files and I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown file type.
    #[error("unknown file type: {0}")]
    UnknownFileType(PathBuf),

    /// Error deserializing Dhall.
    #[error("Dhall error")]
    Dhall(#[from] Box<serde_dhall::Error>),

    /// Error deserializing JSON.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// A catalog entry failed validation or registration.
    #[error("invalid catalog entry")]
    Catalog(#[from] popcat_core::Error),
}
