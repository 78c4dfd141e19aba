//! The species catalog. Entries are registered into a [`CatalogBuilder`], which is then
//! [frozen](CatalogBuilder::freeze) into a read-only [`Catalog`] shared by all consumers.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::demography::DemographicModel;
use crate::dfe::Dfe;
use crate::genetic_map::{GeneticMap, GeneticMapRegistry};
use crate::species::{Species, SpeciesId};

/// The kinds of entities held by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Species,
    DemographicModel,
    Dfe,
    GeneticMap,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Species => "species",
            EntityKind::DemographicModel => "demographic model",
            EntityKind::Dfe => "DFE",
            EntityKind::GeneticMap => "genetic map",
        };
        write!(f, "{s}")
    }
}

/// A source of catalog entries, e.g. one built-in species or a definition file.
pub trait CatalogSource {
    /// Registers this source's entries into `builder`.
    fn register(&self, builder: &mut CatalogBuilder) -> Result<(), crate::Error>;
}

/// The catalog during construction.
#[derive(Debug, Default, Clone)]
pub struct CatalogBuilder {
    species: BTreeMap<SpeciesId, Species>,
    maps: GeneticMapRegistry,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_species(&mut self, species: Species) -> Result<(), CatalogError> {
        if self.species.contains_key(species.id()) {
            return Err(CatalogError::duplicate(EntityKind::Species, species.id()));
        }
        log::debug!("registered species {}", species.id());
        self.species.insert(species.id().clone(), species);
        Ok(())
    }

    pub fn register_demographic_model(
        &mut self,
        species: &str,
        model: DemographicModel,
    ) -> Result<(), CatalogError> {
        self.species_mut(species)?.add_demographic_model(model)
    }

    pub fn register_dfe(&mut self, species: &str, dfe: Dfe) -> Result<(), CatalogError> {
        self.species_mut(species)?.add_dfe(dfe)
    }

    pub fn register_genetic_map(&mut self, map: GeneticMap) -> Result<(), CatalogError> {
        self.maps.register(map)
    }

    /// Registers everything from `source`. Either all of the source's entries are registered or,
    /// on error, none are.
    pub fn load<S: CatalogSource + ?Sized>(&mut self, source: &S) -> Result<(), crate::Error> {
        let mut scratch = self.clone();
        source.register(&mut scratch)?;
        *self = scratch;
        Ok(())
    }

    pub fn get_species(&self, id: &str) -> Result<&Species, CatalogError> {
        self.species
            .get(id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Species, id))
    }

    /// Ends the build phase.
    ///
    /// Correctness properties:
    ///
    /// - Every genome's default genetic map is registered
    pub fn freeze(self) -> Result<Catalog, CatalogError> {
        for species in self.species.values() {
            if let Some(map) = species.genome().default_genetic_map() {
                if !self.maps.contains(map.as_str()) {
                    return Err(CatalogError::UnregisteredDefaultMap {
                        species: species.id().clone(),
                        map: map.to_string(),
                    });
                }
            }
        }
        let catalog = Catalog {
            species: self
                .species
                .into_iter()
                .map(|(id, species)| (id, Arc::new(species)))
                .collect(),
            maps: self.maps,
        };
        log::info!(
            "catalog frozen: {} species, {} demographic models, {} DFEs, {} genetic maps",
            catalog.species.len(),
            catalog.species().map(|s| s.demographic_models().count()).sum::<usize>(),
            catalog.species().map(|s| s.dfes().count()).sum::<usize>(),
            catalog.maps.len()
        );
        Ok(catalog)
    }

    fn species_mut(&mut self, id: &str) -> Result<&mut Species, CatalogError> {
        self.species
            .get_mut(id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Species, id))
    }
}

/// The frozen catalog. It has no mutating methods and can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Catalog {
    species: BTreeMap<SpeciesId, Arc<Species>>,
    maps: GeneticMapRegistry,
}

impl Catalog {
    pub fn get_species(&self, id: &str) -> Result<&Arc<Species>, CatalogError> {
        self.species
            .get(id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Species, id))
    }

    pub fn get_demographic_model(
        &self,
        species: &str,
        model: &str,
    ) -> Result<&Arc<DemographicModel>, CatalogError> {
        self.get_species(species)?.get_demographic_model(model)
    }

    pub fn get_dfe(&self, species: &str, dfe: &str) -> Result<&Arc<Dfe>, CatalogError> {
        self.get_species(species)?.get_dfe(dfe)
    }

    pub fn get_genetic_map(&self, id: &str) -> Result<&Arc<GeneticMap>, CatalogError> {
        self.maps.lookup(id)
    }

    /// Iterate over species in ID order.
    pub fn species(&self) -> impl Iterator<Item = &Arc<Species>> + '_ {
        self.species.values()
    }

    pub fn genetic_maps(&self) -> impl Iterator<Item = &Arc<GeneticMap>> + '_ {
        self.maps.iter()
    }

    pub fn nr_species(&self) -> usize {
        self.species.len()
    }
}

/// Catalog registration or lookup error.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// An ID is already registered. Scoped IDs read `Species/Id`.
    #[error("{kind} {id} is already registered")]
    DuplicateId { kind: EntityKind, id: String },

    /// A lookup found nothing.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    /// A model or DFE carries no citations.
    #[error("{kind} {id} has no citations")]
    MissingCitation { kind: EntityKind, id: String },

    /// A genome names a default genetic map that is not registered.
    #[error("default genetic map {map} of species {species} is not registered")]
    UnregisteredDefaultMap { species: SpeciesId, map: String },
}

impl CatalogError {
    pub fn duplicate(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        Self::DuplicateId {
            kind,
            id: id.to_string(),
        }
    }

    pub fn not_found(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing;

    use super::*;

    struct Mouse;

    impl CatalogSource for Mouse {
        fn register(&self, builder: &mut CatalogBuilder) -> Result<(), crate::Error> {
            builder.register_species(testing::mouse())?;
            builder.register_demographic_model("MusMus", testing::domesticus_model())?;
            builder.register_dfe("MusMus", testing::booker_dfe())?;
            Ok(())
        }
    }

    #[test]
    fn duplicate_model_registration_fails() -> anyhow::Result<()> {
        let mut builder = CatalogBuilder::new();
        builder.register_species(testing::mouse())?;
        builder.register_demographic_model("MusMus", testing::domesticus_model())?;
        let res = builder.register_demographic_model("MusMus", testing::domesticus_model());
        assert!(matches!(
            res,
            Err(CatalogError::DuplicateId {
                kind: EntityKind::DemographicModel,
                ref id,
            }) if id == "MusMus/DomesticusEurope_1F22"
        ));
        Ok(())
    }

    #[test]
    fn registering_into_unknown_species_fails() {
        let mut builder = CatalogBuilder::new();
        let res = builder.register_dfe("HomSap", testing::booker_dfe());
        assert!(matches!(
            res,
            Err(CatalogError::NotFound {
                kind: EntityKind::Species,
                ..
            })
        ));
    }

    #[test]
    fn failed_load_leaves_builder_untouched() -> anyhow::Result<()> {
        let mut builder = CatalogBuilder::new();
        builder.load(&Mouse)?;
        // The second load registers the species again and must fail as a whole.
        assert!(builder.load(&Mouse).is_err());
        let species = builder.get_species("MusMus")?;
        assert_eq!(species.demographic_models().count(), 1);
        assert_eq!(species.dfes().count(), 1);
        Ok(())
    }

    #[test]
    fn freeze_requires_default_maps() -> anyhow::Result<()> {
        let mut builder = CatalogBuilder::new();
        builder.register_species(testing::mapped_mouse())?;
        assert!(matches!(
            builder.clone().freeze(),
            Err(CatalogError::UnregisteredDefaultMap { .. })
        ));
        builder.register_genetic_map(testing::mouse_map())?;
        let catalog = builder.freeze()?;
        assert!(catalog.get_genetic_map("Cox2009_mm10").is_ok());
        Ok(())
    }

    #[test]
    fn frozen_catalog_lookups() -> anyhow::Result<()> {
        let mut builder = CatalogBuilder::new();
        builder.load(&Mouse)?;
        let catalog = builder.freeze()?;
        assert_eq!(catalog.nr_species(), 1);
        let model = catalog.get_demographic_model("MusMus", "DomesticusEurope_1F22")?;
        assert_eq!(model.nr_populations(), 1);
        assert!(catalog.get_dfe("MusMus", "Gamma_B21").is_ok());
        assert!(matches!(
            catalog.get_species("HomSap"),
            Err(CatalogError::NotFound {
                kind: EntityKind::Species,
                ..
            })
        ));
        assert!(matches!(
            catalog.get_dfe("MusMus", "Gamma_K17"),
            Err(CatalogError::NotFound {
                kind: EntityKind::Dfe,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn frozen_catalog_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
