//! This crate contains the built-in catalog: implementations of the
//! [`CatalogSource`](popcat_core::CatalogSource) trait for each bundled species and genetic map.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

pub mod drosophila_melanogaster;
pub mod genetic_maps;
pub mod mus_musculus;

use popcat_core::{Catalog, CatalogBuilder, CatalogSource, Error};

pub use crate::drosophila_melanogaster::DrosophilaMelanogaster;
pub use crate::genetic_maps::HapmapII;
pub use crate::mus_musculus::MusMusculus;

/// All built-in sources, in registration order.
pub fn sources() -> [&'static dyn CatalogSource; 3] {
    [&HapmapII, &MusMusculus, &DrosophilaMelanogaster]
}

/// A catalog builder holding every built-in entry. More sources can be loaded on top before
/// freezing.
pub fn builtin_builder() -> Result<CatalogBuilder, Error> {
    let mut builder = CatalogBuilder::new();
    for source in sources() {
        builder.load(source)?;
    }
    Ok(builder)
}

/// The frozen built-in catalog.
pub fn builtin() -> Result<Catalog, Error> {
    let catalog = builtin_builder()?.freeze()?;
    log::info!("loaded built-in catalog with {} species", catalog.nr_species());
    Ok(catalog)
}
