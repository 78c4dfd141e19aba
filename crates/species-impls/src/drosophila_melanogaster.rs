//! The fruit fly.

use popcat_core::{
    CatalogBuilder, CatalogSource, Citation, CiteReason, DemographicModel, Epoch, Error,
    Generations, Genome, PiecewiseModelSpec, Population, PopulationHistory, Species, SpeciesSpec,
};

/// Species ID.
pub const ID: &str = "DroMel";

// Chromosome lengths from the DM6 assembly. No per-chromosome rates are known, so every
// chromosome gets the fallback rates below.
const CHROMOSOME_TABLE: &str = "
chrX    23542271
chr2L   23513712
chr2R   25286936
chr3L   28110227
chr3R   32079331
chr4    1348131
chrY    3667352
chrM    19524
";

// Both are known underestimates.
const FALLBACK_MUTATION_RATE: f64 = 8.4e-9;
const FALLBACK_RECOMBINATION_RATE: f64 = 1e-8;

const GENERATION_TIME: f64 = 0.1;

/// *Drosophila melanogaster*: the DM6 genome and an African three-epoch history.
#[derive(Debug, Default, Clone, Copy)]
pub struct DrosophilaMelanogaster;

impl DrosophilaMelanogaster {
    /// The species, without models.
    pub fn species() -> Result<Species, Error> {
        let species = SpeciesSpec::builder()
            .id(ID)
            .scientific_name("Drosophila melanogaster")
            .common_name("Fruit fly")
            .genome(Self::genome()?)
            .generation_time(GENERATION_TIME)
            .population_size(1_720_600.0)
            .citations(vec![sheehan_song([
                CiteReason::GenerationTime,
                CiteReason::MutationRate,
            ])])
            .build()
            .validate()?;
        Ok(species)
    }

    /// The DM6 genome.
    pub fn genome() -> Result<Genome, Error> {
        let genome = Genome::from_table(
            CHROMOSOME_TABLE,
            FALLBACK_MUTATION_RATE,
            FALLBACK_RECOMBINATION_RATE,
        )?;
        Ok(genome)
    }

    /// The three-epoch model estimated for an African population: a bottleneck followed by
    /// recovery.
    pub fn sheehan_song_three_epoch() -> Result<DemographicModel, Error> {
        // Times are given in units of 4 * N_ref generations. The reference size and both times
        // are simulation assumptions; the three sizes are estimates.
        let n_ref = 100_000.0;
        let t_bottleneck = Generations::from_coalescent(0.5, n_ref);
        let t_ancestral = Generations::from_coalescent(5.0, n_ref);
        let (n_recent, n_bottleneck, n_ancestral) = (544_200.0, 145_300.0, 652_700.0);
        let history = PopulationHistory::new(
            Population::new("AFR", "African D. melanogaster population"),
            [
                Epoch::new(Generations::ZERO, n_recent),
                Epoch::new(t_bottleneck, n_bottleneck),
                Epoch::new(t_ancestral, n_ancestral),
            ],
        );
        let model = PiecewiseModelSpec::builder()
            .id("SheehanSongThreeEpoch")
            .description("Three epoch African population")
            .long_description(
                "The three epoch (modern, bottleneck, ancestral) model estimated for a single \
                 African population by Sheehan and Song with a deep-learning approach.",
            )
            .histories(vec![history])
            .generation_time(GENERATION_TIME)
            .mutation_rate(FALLBACK_MUTATION_RATE)
            .citations(vec![sheehan_song([CiteReason::DemographicModel])])
            .build()
            .assemble()?;
        Ok(model)
    }
}

impl CatalogSource for DrosophilaMelanogaster {
    fn register(&self, builder: &mut CatalogBuilder) -> Result<(), Error> {
        builder.register_species(Self::species()?)?;
        builder.register_demographic_model(ID, Self::sheehan_song_three_epoch()?)?;
        Ok(())
    }
}

fn sheehan_song<const N: usize>(reasons: [CiteReason; N]) -> Citation {
    Citation::new(
        "Sheehan and Song",
        2016,
        "https://doi.org/10.1371/journal.pcbi.1004845",
        reasons,
    )
}

#[cfg(test)]
mod tests {
    use popcat_core::{BasePairs, PopIndex};

    use super::*;

    #[test]
    fn genome_rates_are_flagged() -> anyhow::Result<()> {
        let genome = DrosophilaMelanogaster::genome()?;
        assert_eq!(genome.nr_chromosomes(), 8);
        assert_eq!(genome.lookup("chr2L")?.length, BasePairs::new(23513712));
        assert!(genome.has_placeholder_rates());
        assert!(genome.lookup("chr3L").is_ok());
        assert!(genome.lookup("chr5").is_err());
        Ok(())
    }

    #[test]
    fn three_epochs_in_generations() -> anyhow::Result<()> {
        let model = DrosophilaMelanogaster::sheehan_song_three_epoch()?;
        let times = model
            .events()
            .iter()
            .map(|e| (e.time.into_f64(), e.size))
            .collect::<Vec<_>>();
        assert_eq!(
            times,
            vec![
                (0.0, 544_200.0),
                (200_000.0, 145_300.0),
                (2_000_000.0, 652_700.0)
            ]
        );
        assert_eq!(model.population_size_at(PopIndex::ZERO, 199_999.0), Some(544_200.0));
        Ok(())
    }
}
