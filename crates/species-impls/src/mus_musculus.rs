//! The house mouse.

use popcat_core::{
    BasePairs, CatalogBuilder, CatalogSource, Chromosome, Citation, CiteReason, DemographicModel,
    Dfe, DfeSpec, EffectDist, Error, Genome, MutationType, PiecewiseModelSpec, Population,
    PopulationHistory, Rate, Species, SpeciesSpec,
};

/// Species ID.
pub const ID: &str = "MusMus";

const MUTATION_RATE: f64 = 5.7e-9;
// No per-chromosome estimate is available.
const RECOMBINATION_RATE: f64 = 0.5e-8;

// GRCm39 assembly.
const CHROMOSOMES: [(&str, u64); 22] = [
    ("chr1", 195154279),
    ("chr2", 181755017),
    ("chr3", 159745316),
    ("chr4", 156860686),
    ("chr5", 151758149),
    ("chr6", 149588044),
    ("chr7", 144995196),
    ("chr8", 130127694),
    ("chr9", 124359700),
    ("chr10", 130530862),
    ("chr11", 121973369),
    ("chr12", 120092757),
    ("chr13", 120883175),
    ("chr14", 125139656),
    ("chr15", 104073951),
    ("chr16", 98008968),
    ("chr17", 95294699),
    ("chr18", 90720763),
    ("chr19", 61420004),
    ("chrX", 169476592),
    ("chrY", 91455967),
    ("chrM", 16299),
];

// MSMC estimates, 57 time periods each. Sizes apply from `times[k]` until `times[k + 1]`.
const DOMESTICUS_TIMES: [f64; 57] = [
    0.0, 83.0, 180.0, 291.0, 420.0, 570.0, 743.0, 943.0, 1175.0, 1443.0, 1754.0, 2114.0, 2530.0,
    3012.0, 3570.0, 4216.0, 4964.0, 5829.0, 6831.0, 7991.0, 9334.0, 10889.0, 12688.0, 14772.0,
    17183.0, 19975.0, 23207.0, 26948.0, 31279.0, 36292.0, 42096.0, 48815.0, 56592.0, 65596.0,
    76019.0, 88084.0, 102052.0, 118221.0, 136938.0, 158606.0, 183689.0, 212726.0, 246340.0,
    285254.0, 330300.0, 382446.0, 442812.0, 512693.0, 593589.0, 687237.0, 795646.0, 921140.0,
    1066418.0, 1234595.0, 1429281.0, 1654653.0, 1915544.0,
];

const DOMESTICUS_SIZES: [f64; 57] = [
    2040.0, 2040.0, 3844.0, 90428.0, 145603.0, 111242.0, 115399.0, 147212.0, 159142.0, 136620.0,
    97250.0, 58488.0, 33028.0, 18939.0, 11758.0, 8463.0, 7480.0, 8332.0, 11240.0, 16490.0,
    23419.0, 29931.0, 34163.0, 36886.0, 41195.0, 50557.0, 67337.0, 90926.0, 115426.0, 131016.0,
    132063.0, 121751.0, 107067.0, 93046.0, 81892.0, 74185.0, 69939.0, 69317.0, 73097.0, 82953.0,
    101471.0, 131392.0, 173264.0, 222951.0, 271935.0, 309961.0, 327217.0, 316861.0, 279833.0,
    227037.0, 173594.0, 131050.0, 98811.0, 98811.0, 133912.0, 133912.0, 133912.0,
];

const MUSCULUS_TIMES: [f64; 57] = [
    0.0, 35.0, 76.0, 123.0, 177.0, 240.0, 313.0, 398.0, 495.0, 609.0, 740.0, 891.0, 1067.0,
    1270.0, 1505.0, 1778.0, 2093.0, 2458.0, 2881.0, 3370.0, 3936.0, 4591.0, 5350.0, 6229.0,
    7246.0, 8423.0, 9785.0, 11363.0, 13189.0, 15303.0, 17750.0, 20583.0, 23863.0, 27659.0,
    32054.0, 37142.0, 43031.0, 49849.0, 57741.0, 66878.0, 77455.0, 89698.0, 103872.0, 120280.0,
    139274.0, 161262.0, 186716.0, 216182.0, 250293.0, 289781.0, 335491.0, 388409.0, 449667.0,
    520579.0, 602670.0, 697702.0, 807711.0,
];

const MUSCULUS_SIZES: [f64; 57] = [
    179912.0, 179912.0, 8931.0, 8035.0, 9029.0, 9960.0, 12104.0, 16254.0, 25527.0, 42715.0,
    61935.0, 68111.0, 55959.0, 36220.0, 20382.0, 11222.0, 6695.0, 4605.0, 3751.0, 3643.0, 4177.0,
    5506.0, 7990.0, 12072.0, 17741.0, 23546.0, 26648.0, 25399.0, 21219.0, 16747.0, 13588.0,
    12259.0, 13023.0, 16339.0, 22556.0, 30806.0, 38441.0, 42857.0, 43874.0, 43467.0, 43933.0,
    47001.0, 54304.0, 67725.0, 88494.0, 116547.0, 151909.0, 194969.0, 245823.0, 302950.0,
    359368.0, 400867.0, 407105.0, 407105.0, 152757.0, 152757.0, 152757.0,
];

/// *Mus musculus*: the GRCm39 genome, two single-population MSMC histories and a coding-sequence
/// DFE.
#[derive(Debug, Default, Clone, Copy)]
pub struct MusMusculus;

impl MusMusculus {
    /// The species, without models or DFEs.
    pub fn species() -> Result<Species, Error> {
        let species = SpeciesSpec::builder()
            .id(ID)
            .scientific_name("Mus musculus")
            .common_name("Mouse")
            .genome(Self::genome()?)
            .generation_time(1.0)
            .population_size(500_000.0)
            .citations(vec![fujiwara([
                CiteReason::MutationRate,
                CiteReason::GenerationTime,
            ])])
            .build()
            .validate()?;
        Ok(species)
    }

    /// The GRCm39 genome.
    pub fn genome() -> Result<Genome, Error> {
        let chromosomes = CHROMOSOMES
            .iter()
            .map(|&(name, length)| {
                Chromosome::new(
                    name.into(),
                    BasePairs::new(length),
                    Rate::estimated(MUTATION_RATE),
                    Rate::placeholder(RECOMBINATION_RATE),
                )
            })
            .collect();
        Ok(Genome::new(chromosomes)?.with_citations(vec![fujiwara([CiteReason::MutationRate])]))
    }

    /// A piecewise-constant history of a German *M. m. domesticus* population.
    pub fn domesticus_europe() -> Result<DemographicModel, Error> {
        let population = Population::new(
            "M_musculus_domesticus",
            "Mus musculus domesticus German population",
        );
        let model = msmc_model(
            "DomesticusEurope_1F22",
            "M. musculus domesticus piecewise constant size",
            "This model comes from MSMC using four randomly sampled individuals \
             (DEU01, DEU03, DEU04, DEU06) from a German population. The model is estimated with \
             57 time periods.",
            PopulationHistory::from_arrays(population, &DOMESTICUS_TIMES, &DOMESTICUS_SIZES)?,
        )?;
        Ok(model)
    }

    /// A piecewise-constant history of a Korean *M. m. musculus* population.
    pub fn musculus_korea() -> Result<DemographicModel, Error> {
        let population = Population::new(
            "M_musculus_musculus",
            "Mus musculus musculus Korean population",
        );
        let model = msmc_model(
            "MusculusKorea_1F22",
            "M. musculus musculus piecewise constant size",
            "This model comes from MSMC using four randomly sampled individuals \
             (KOR01, KOR02, KOR03, KOR05) from a Korean population. The model is estimated with \
             57 time periods.",
            PopulationHistory::from_arrays(population, &MUSCULUS_TIMES, &MUSCULUS_SIZES)?,
        )?;
        Ok(model)
    }

    /// The gamma DFE for coding sequence of *M. m. castaneus*.
    pub fn booker_gamma() -> Result<Dfe, Error> {
        let negative = MutationType::new(
            0.5,
            EffectDist::Gamma {
                mean: -5.96e-2,
                shape: 0.186,
            },
        )?;
        let dfe = DfeSpec::builder()
            .id("Gamma_B21")
            .description("Deleterious Gamma DFE CDS")
            .long_description(
                "Negative mutation types representing a Mus musculus castaneus DFE for \
                 protein-coding exons. Parameters are based on an analysis of the unfolded site \
                 frequency spectrum using polyDFE v2.",
            )
            .mutation_types(vec![MutationType::neutral(), negative])
            .proportions(vec![0.334, 0.666])
            .citations(vec![Citation::new(
                "Booker et al.",
                2021,
                "https://doi.org/10.1101/2021.06.10.447924",
                [CiteReason::Dfe],
            )])
            .build()
            .validate()?;
        Ok(dfe)
    }
}

impl CatalogSource for MusMusculus {
    fn register(&self, builder: &mut CatalogBuilder) -> Result<(), Error> {
        builder.register_species(Self::species()?)?;
        builder.register_demographic_model(ID, Self::domesticus_europe()?)?;
        builder.register_demographic_model(ID, Self::musculus_korea()?)?;
        builder.register_dfe(ID, Self::booker_gamma()?)?;
        Ok(())
    }
}

fn fujiwara<const N: usize>(reasons: [CiteReason; N]) -> Citation {
    Citation::new(
        "Fujiwara et al.",
        2022,
        "https://doi.org/10.1093/gbe/evac068",
        reasons,
    )
}

fn msmc_model(
    id: &str,
    description: &str,
    long_description: &str,
    history: PopulationHistory,
) -> Result<DemographicModel, Error> {
    let model = PiecewiseModelSpec::builder()
        .id(id)
        .description(description)
        .long_description(long_description)
        .histories(vec![history])
        .generation_time(1.0)
        .mutation_rate(MUTATION_RATE)
        .citations(vec![fujiwara([CiteReason::DemographicModel])])
        .build()
        .assemble()?;
    Ok(model)
}
