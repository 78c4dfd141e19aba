//! Core popcat data structures, traits and routines. Most users start from a
//! [catalog builder](CatalogBuilder), load [sources](CatalogSource) into it and
//! [freeze](CatalogBuilder::freeze) it into a [`Catalog`].

pub use popcat_core::*;
