use crate::citation::{CiteReason, Citation};
use crate::demography::{DemographicModel, PiecewiseModelSpec, Population, PopulationHistory};
use crate::dfe::{Dfe, DfeSpec, EffectDist, MutationType};
use crate::genetic_map::GeneticMap;
use crate::genome::{Chromosome, Genome, Rate};
use crate::species::{Species, SpeciesSpec};
use crate::units::BasePairs;

pub(crate) fn citation() -> Citation {
    Citation::new(
        "Fujiwara et al.",
        2022,
        "https://doi.org/10.1093/gbe/evac068",
        [CiteReason::DemographicModel, CiteReason::MutationRate],
    )
}

pub(crate) fn booker_dfe() -> Dfe {
    let negative = MutationType::new(
        0.5,
        EffectDist::Gamma {
            mean: -5.96e-2,
            shape: 0.186,
        },
    )
    .unwrap();
    DfeSpec::builder()
        .id("Gamma_B21")
        .description("Deleterious Gamma DFE CDS")
        .long_description("Neutral and deleterious mutations in coding sequence.")
        .mutation_types(vec![MutationType::neutral(), negative])
        .proportions(vec![0.334, 0.666])
        .citations(vec![Citation::new(
            "Booker et al.",
            2021,
            "https://doi.org/10.1101/2021.06.10.447924",
            [CiteReason::Dfe],
        )])
        .build()
        .validate()
        .unwrap()
}

// The five most recent epochs of the German house mouse history.
pub(crate) fn domesticus_model() -> DemographicModel {
    let history = PopulationHistory::from_arrays(
        Population::new(
            "M_musculus_domesticus",
            "Mus musculus domesticus German population",
        ),
        &[0.0, 83.0, 180.0, 291.0, 420.0],
        &[2040.0, 2040.0, 3844.0, 90428.0, 145603.0],
    )
    .unwrap();
    PiecewiseModelSpec::builder()
        .id("DomesticusEurope_1F22")
        .description("M. musculus domesticus piecewise constant size")
        .histories(vec![history])
        .generation_time(1.0)
        .mutation_rate(5.7e-9)
        .citations(vec![citation()])
        .build()
        .assemble()
        .unwrap()
}

pub(crate) fn two_chromosome_genome() -> Genome {
    let chrom = |name: &str, len| {
        Chromosome::new(
            name.into(),
            BasePairs::new(len),
            Rate::estimated(8.4e-9),
            Rate::estimated(1e-8),
        )
    };
    Genome::new(vec![chrom("chrX", 23542271), chrom("chr2L", 23513712)]).unwrap()
}

pub(crate) fn dromel_genome() -> Genome {
    let table = "
        chrX    23542271
        chr2L   23513712
        chr2R   25286936
        chr3L   28110227
        chr3R   32079331
        chr4    1348131
        chrY    3667352
        chrM    19524
    ";
    Genome::from_table(table, 8.4e-9, 1e-8).unwrap()
}

fn mouse_spec(genome: Genome) -> Species {
    SpeciesSpec::builder()
        .id("MusMus")
        .scientific_name("Mus musculus")
        .common_name("Mouse")
        .genome(genome)
        .generation_time(0.75)
        .population_size(500_000.0)
        .citations(vec![citation()])
        .build()
        .validate()
        .unwrap()
}

fn mouse_genome() -> Genome {
    Genome::from_table("chr19 61420004\nchrX 169476592", 5.7e-9, 0.5e-8).unwrap()
}

pub(crate) fn mouse() -> Species {
    mouse_spec(mouse_genome())
}

pub(crate) fn mouse_map() -> GeneticMap {
    GeneticMap::new(
        "Cox2009_mm10",
        "https://example.org/maps/cox2009_mm10.tar.gz",
        "{name}.map",
    )
    .unwrap()
}

/// A mouse whose genome names [`mouse_map`] as its default genetic map.
pub(crate) fn mapped_mouse() -> Species {
    mouse_spec(mouse_genome().with_default_genetic_map("Cox2009_mm10"))
}
