use popcat_core::{
    CatalogBuilder, CatalogSource, Citation, DfeSpec, Error, GeneticMap, Genome, MutationType,
    PiecewiseModelSpec, Population, PopulationHistory, SpeciesSpec,
};

/// A catalog definition file. Entries are given in the loose form scientific parameters are
/// usually published in (parallel arrays, string distribution tags) and are validated exactly
/// like built-in entries when the file is loaded.
///
/// Models and DFEs name the species they belong to, which may be a species defined in the same
/// file or one that is already registered.
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct CatalogFile {
    /// Genetic maps.
    #[serde(default)]
    pub genetic_maps: Vec<GeneticMapEntry>,
    /// Species.
    #[serde(default)]
    pub species: Vec<SpeciesEntry>,
    /// Demographic models.
    #[serde(default)]
    pub demographic_models: Vec<ModelEntry>,
    /// DFEs.
    #[serde(default)]
    pub dfes: Vec<DfeEntry>,
}

/// A genetic map entry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GeneticMapEntry {
    /// Map ID.
    pub id: String,
    /// Archive URL.
    pub url: String,
    /// Per-chromosome file name pattern, containing `{name}`.
    pub file_pattern: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// A species entry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SpeciesEntry {
    /// Species ID.
    pub id: String,
    /// Scientific name.
    pub scientific_name: String,
    /// Common name.
    #[serde(default)]
    pub common_name: String,
    /// Years per generation.
    pub generation_time: f64,
    /// Population size.
    pub population_size: f64,
    /// Genome.
    pub genome: GenomeEntry,
    /// Citations.
    pub citations: Vec<Citation>,
}

/// A genome given as a chromosome table.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GenomeEntry {
    /// Whitespace-separated `name length` lines.
    pub chromosomes: String,
    /// Mutation rate applied to every chromosome.
    pub mutation_rate: f64,
    /// Recombination rate applied to every chromosome.
    pub recombination_rate: f64,
    /// ID of the default genetic map.
    #[serde(default)]
    pub default_genetic_map: Option<String>,
}

/// A demographic model given as one piecewise-constant history per population.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModelEntry {
    /// ID of the species the model belongs to.
    pub species: String,
    /// Model ID.
    pub id: String,
    /// Description.
    pub description: String,
    /// Long description.
    #[serde(default)]
    pub long_description: String,
    /// Populations, in index order.
    pub populations: Vec<PopulationEntry>,
    /// Years per generation.
    pub generation_time: f64,
    /// Mutation rate.
    pub mutation_rate: f64,
    /// Citations.
    pub citations: Vec<Citation>,
}

/// One population's history as parallel arrays.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PopulationEntry {
    /// Population ID.
    pub id: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Epoch start times in generations, non-decreasing.
    pub times: Vec<f64>,
    /// Epoch sizes, parallel to `times`.
    pub sizes: Vec<f64>,
}

/// A DFE entry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DfeEntry {
    /// ID of the species the DFE belongs to.
    pub species: String,
    /// DFE ID.
    pub id: String,
    /// Description.
    pub description: String,
    /// Long description.
    #[serde(default)]
    pub long_description: String,
    /// Mutation types.
    pub mutation_types: Vec<MutationTypeEntry>,
    /// Proportions, parallel to `mutation_types`.
    pub proportions: Vec<f64>,
    /// Citations.
    pub citations: Vec<Citation>,
}

/// A mutation type given as a distribution tag and its arguments.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MutationTypeEntry {
    /// Dominance coefficient.
    #[serde(default = "default_dominance")]
    pub dominance_coeff: f64,
    /// Distribution tag, e.g. `g` for gamma. Absent for neutral mutations.
    #[serde(default)]
    pub distribution_type: Option<String>,
    /// Distribution arguments.
    #[serde(default)]
    pub distribution_args: Vec<f64>,
}

fn default_dominance() -> f64 {
    popcat_core::dfe::mutation::DEFAULT_DOMINANCE
}

impl CatalogSource for CatalogFile {
    fn register(&self, builder: &mut CatalogBuilder) -> Result<(), Error> {
        for entry in &self.genetic_maps {
            let map = GeneticMap::new(entry.id.as_str(), &entry.url, &entry.file_pattern)?
                .with_description(&entry.description);
            builder.register_genetic_map(map)?;
        }
        for entry in &self.species {
            let mut genome = Genome::from_table(
                &entry.genome.chromosomes,
                entry.genome.mutation_rate,
                entry.genome.recombination_rate,
            )?;
            if let Some(map) = &entry.genome.default_genetic_map {
                genome = genome.with_default_genetic_map(map.as_str());
            }
            let species = SpeciesSpec::builder()
                .id(entry.id.as_str())
                .scientific_name(&entry.scientific_name)
                .common_name(&entry.common_name)
                .genome(genome)
                .generation_time(entry.generation_time)
                .population_size(entry.population_size)
                .citations(entry.citations.clone())
                .build()
                .validate()?;
            builder.register_species(species)?;
        }
        for entry in &self.demographic_models {
            let histories = entry
                .populations
                .iter()
                .map(|pop| {
                    PopulationHistory::from_arrays(
                        Population::new(pop.id.as_str(), &pop.description),
                        &pop.times,
                        &pop.sizes,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            let model = PiecewiseModelSpec::builder()
                .id(entry.id.as_str())
                .description(&entry.description)
                .long_description(&entry.long_description)
                .histories(histories)
                .generation_time(entry.generation_time)
                .mutation_rate(entry.mutation_rate)
                .citations(entry.citations.clone())
                .build()
                .assemble()?;
            builder.register_demographic_model(&entry.species, model)?;
        }
        for entry in &self.dfes {
            let mutation_types = entry
                .mutation_types
                .iter()
                .map(|mt| {
                    MutationType::from_tag(
                        mt.dominance_coeff,
                        mt.distribution_type.as_deref(),
                        &mt.distribution_args,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            let dfe = DfeSpec::builder()
                .id(entry.id.as_str())
                .description(&entry.description)
                .long_description(&entry.long_description)
                .mutation_types(mutation_types)
                .proportions(entry.proportions.clone())
                .citations(entry.citations.clone())
                .build()
                .validate()?;
            builder.register_dfe(&entry.species, dfe)?;
        }
        Ok(())
    }
}
