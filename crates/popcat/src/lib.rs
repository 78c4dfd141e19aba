//! `popcat` is a validated catalog of population-genetics simulation inputs. It turns published
//! scientific parameters (piecewise population size histories, distributions of fitness effects,
//! chromosome tables and genetic map locations) into internally consistent objects that a
//! simulator can consume, and keeps them in a per-species registry that enforces identity and
//! citation requirements.

#![warn(unreachable_pub, missing_docs)]

pub mod core;

/// The built-in catalog.
pub mod impls {
    pub use species_impls::*;
}

/// Catalog definition files and local genetic map fetching.
pub mod utils {
    pub use popcat_utils::*;
}

pub use crate::core::{Catalog, CatalogBuilder, CatalogSource, Error};
