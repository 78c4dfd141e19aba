//! Species: a genome plus the demographic models and DFEs registered for it.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{CatalogError, EntityKind};
use crate::citation::Citation;
use crate::demography::{DemographicModel, ModelId};
use crate::dfe::{Dfe, DfeId};
use crate::genetic_map::GeneticMapId;
use crate::genome::{ChromosomeName, Genome, Rate};
use crate::units::BasePairs;

name!(SpeciesId);

/// An unvalidated species.
#[derive(Debug, Clone, typed_builder::TypedBuilder, serde::Serialize, serde::Deserialize)]
pub struct SpeciesSpec {
    /// Short catalog ID, e.g. `MusMus`.
    #[builder(setter(into))]
    pub id: SpeciesId,
    #[builder(setter(into))]
    pub scientific_name: String,
    #[builder(default, setter(into))]
    #[serde(default)]
    pub common_name: String,
    pub genome: Genome,
    /// Years per generation.
    pub generation_time: f64,
    /// Census (or long-term effective) population size.
    pub population_size: f64,
    pub citations: Vec<Citation>,
}

impl SpeciesSpec {
    /// Validate a specification, producing a `Species` with no models or DFEs.
    ///
    /// Correctness properties:
    ///
    /// - The ID and scientific name are not blank
    /// - Generation time and population size are finite and positive
    /// - There is at least one citation
    pub fn validate(self) -> Result<Species, SpeciesError> {
        if self.id.is_blank() {
            return Err(SpeciesError::EmptyId);
        }
        if self.scientific_name.trim().is_empty() {
            return Err(SpeciesError::EmptyName(self.id));
        }
        if !self.generation_time.is_finite() || self.generation_time <= 0.0 {
            return Err(SpeciesError::NonPositiveGenerationTime {
                id: self.id,
                value: self.generation_time,
            });
        }
        if !self.population_size.is_finite() || self.population_size <= 0.0 {
            return Err(SpeciesError::NonPositivePopulationSize {
                id: self.id,
                value: self.population_size,
            });
        }
        if self.citations.is_empty() {
            return Err(SpeciesError::NoCitations(self.id));
        }
        Ok(Species {
            id: self.id,
            scientific_name: self.scientific_name,
            common_name: self.common_name,
            genome: Arc::new(self.genome),
            generation_time: self.generation_time,
            population_size: self.population_size,
            citations: self.citations,
            models: BTreeMap::new(),
            dfes: BTreeMap::new(),
        })
    }
}

/// A species and everything registered for it.
#[derive(Debug, Clone)]
pub struct Species {
    id: SpeciesId,
    scientific_name: String,
    common_name: String,
    genome: Arc<Genome>,
    generation_time: f64,
    population_size: f64,
    citations: Vec<Citation>,
    models: BTreeMap<ModelId, Arc<DemographicModel>>,
    dfes: BTreeMap<DfeId, Arc<Dfe>>,
}

impl Species {
    pub fn id(&self) -> &SpeciesId {
        &self.id
    }

    pub fn scientific_name(&self) -> &str {
        &self.scientific_name
    }

    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn generation_time(&self) -> f64 {
        self.generation_time
    }

    pub fn population_size(&self) -> f64 {
        self.population_size
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Registers a demographic model. A model must carry at least one citation, and its ID must
    /// not already be in use; a failed registration leaves the species unchanged.
    pub fn add_demographic_model(&mut self, model: DemographicModel) -> Result<(), CatalogError> {
        let kind = EntityKind::DemographicModel;
        if model.citations().is_empty() {
            return Err(CatalogError::MissingCitation {
                kind,
                id: model.id().to_string(),
            });
        }
        if self.models.contains_key(model.id()) {
            return Err(CatalogError::duplicate(kind, self.scoped(model.id())));
        }
        log::debug!("registered demographic model {}", self.scoped(model.id()));
        self.models.insert(model.id().clone(), Arc::new(model));
        Ok(())
    }

    /// Registers a DFE, with the same requirements as [`Self::add_demographic_model`].
    pub fn add_dfe(&mut self, dfe: Dfe) -> Result<(), CatalogError> {
        let kind = EntityKind::Dfe;
        if dfe.citations().is_empty() {
            return Err(CatalogError::MissingCitation {
                kind,
                id: dfe.id().to_string(),
            });
        }
        if self.dfes.contains_key(dfe.id()) {
            return Err(CatalogError::duplicate(kind, self.scoped(dfe.id())));
        }
        log::debug!("registered DFE {}", self.scoped(dfe.id()));
        self.dfes.insert(dfe.id().clone(), Arc::new(dfe));
        Ok(())
    }

    pub fn get_demographic_model(&self, id: &str) -> Result<&Arc<DemographicModel>, CatalogError> {
        self.models.get(id).ok_or_else(|| {
            CatalogError::not_found(EntityKind::DemographicModel, self.scoped(id))
        })
    }

    pub fn get_dfe(&self, id: &str) -> Result<&Arc<Dfe>, CatalogError> {
        self.dfes
            .get(id)
            .ok_or_else(|| CatalogError::not_found(EntityKind::Dfe, self.scoped(id)))
    }

    /// Iterate over demographic models in ID order.
    pub fn demographic_models(&self) -> impl Iterator<Item = &Arc<DemographicModel>> + '_ {
        self.models.values()
    }

    /// Iterate over DFEs in ID order.
    pub fn dfes(&self) -> impl Iterator<Item = &Arc<Dfe>> + '_ {
        self.dfes.values()
    }

    /// Describes a simulated region spanning `chromosome`. If `model` is given, its mutation rate
    /// replaces the chromosome's.
    pub fn contig(&self, chromosome: &str, model: Option<&str>) -> Result<Contig, crate::Error> {
        let chrom = self.genome.lookup(chromosome)?;
        let mutation_rate = match model {
            Some(id) => Rate::estimated(self.get_demographic_model(id)?.mutation_rate()),
            None => chrom.mutation_rate,
        };
        Ok(Contig {
            species: self.id.clone(),
            chromosome: chrom.name.clone(),
            length: chrom.length,
            mutation_rate,
            recombination_rate: chrom.recombination_rate,
            genetic_map: self.genome.default_genetic_map().cloned(),
        })
    }

    fn scoped(&self, id: impl std::fmt::Display) -> String {
        format!("{}/{}", self.id, id)
    }
}

/// A region to simulate: one chromosome with the rates that apply to it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Contig {
    pub species: SpeciesId,
    pub chromosome: ChromosomeName,
    pub length: BasePairs,
    pub mutation_rate: Rate,
    pub recombination_rate: Rate,
    pub genetic_map: Option<GeneticMapId>,
}

/// Species validation error.
#[derive(Debug, thiserror::Error)]
pub enum SpeciesError {
    /// The species ID is empty.
    #[error("species ID is empty")]
    EmptyId,

    /// The scientific name is empty.
    #[error("species {0} has no scientific name")]
    EmptyName(SpeciesId),

    /// The generation time is not positive.
    #[error("species {id}: generation time must be positive (got {value})")]
    NonPositiveGenerationTime { id: SpeciesId, value: f64 },

    /// The population size is not positive.
    #[error("species {id}: population size must be positive (got {value})")]
    NonPositivePopulationSize { id: SpeciesId, value: f64 },

    /// The species carries no citations.
    #[error("species {0} has no citations")]
    NoCitations(SpeciesId),
}

#[cfg(test)]
mod tests {
    use crate::genome::RateProvenance;
    use crate::testing;

    use super::*;

    #[test]
    fn duplicate_model_fails() {
        let mut species = testing::mouse();
        species
            .add_demographic_model(testing::domesticus_model())
            .unwrap();
        let res = species.add_demographic_model(testing::domesticus_model());
        assert!(matches!(
            res,
            Err(CatalogError::DuplicateId {
                kind: EntityKind::DemographicModel,
                ..
            })
        ));
        assert_eq!(species.demographic_models().count(), 1);
    }

    #[test]
    fn duplicate_dfe_fails() {
        let mut species = testing::mouse();
        species.add_dfe(testing::booker_dfe()).unwrap();
        let res = species.add_dfe(testing::booker_dfe());
        assert!(matches!(
            res,
            Err(CatalogError::DuplicateId {
                kind: EntityKind::Dfe,
                ..
            })
        ));
    }

    #[test]
    fn uncited_dfe_fails() {
        let mut species = testing::mouse();
        let dfe = crate::dfe::DfeSpec::builder()
            .id("Neutral")
            .description("all neutral")
            .mutation_types(vec![crate::dfe::MutationType::neutral()])
            .proportions(vec![1.0])
            .build()
            .validate()
            .unwrap();
        assert!(matches!(
            species.add_dfe(dfe),
            Err(CatalogError::MissingCitation { .. })
        ));
        assert_eq!(species.dfes().count(), 0);
    }

    #[test]
    fn missing_model_is_not_found() {
        let species = testing::mouse();
        assert!(matches!(
            species.get_demographic_model("Nope"),
            Err(CatalogError::NotFound {
                kind: EntityKind::DemographicModel,
                ..
            })
        ));
        assert!(species.get_dfe("Nope").is_err());
    }

    #[test]
    fn contig_uses_model_mutation_rate() -> anyhow::Result<()> {
        let mut species = testing::mouse();
        species.add_demographic_model(testing::domesticus_model())?;
        let plain = species.contig("chrX", None)?;
        assert_eq!(plain.length, BasePairs::new(169476592));
        assert!(plain.mutation_rate.is_placeholder());
        let contig = species.contig("chrX", Some("DomesticusEurope_1F22"))?;
        assert_eq!(contig.mutation_rate.value, 5.7e-9);
        assert_eq!(contig.mutation_rate.provenance, RateProvenance::Estimated);
        assert!(species.contig("chr2L", None).is_err());
        assert!(species.contig("chrX", Some("Nope")).is_err());
        Ok(())
    }

    #[test]
    fn uncited_species_fails() {
        let res = SpeciesSpec::builder()
            .id("AnoGam")
            .scientific_name("Anopheles gambiae")
            .genome(testing::two_chromosome_genome())
            .generation_time(1.0 / 11.0)
            .population_size(1e6)
            .citations(Vec::new())
            .build()
            .validate();
        assert!(matches!(res, Err(SpeciesError::NoCitations(..))));
    }

    #[test]
    fn non_positive_population_size_fails() {
        let res = SpeciesSpec::builder()
            .id("AnoGam")
            .scientific_name("Anopheles gambiae")
            .genome(testing::two_chromosome_genome())
            .generation_time(1.0 / 11.0)
            .population_size(0.0)
            .citations(vec![testing::citation()])
            .build()
            .validate();
        assert!(matches!(
            res,
            Err(SpeciesError::NonPositivePopulationSize { .. })
        ));
    }
}
