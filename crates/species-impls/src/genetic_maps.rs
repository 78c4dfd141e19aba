//! Genetic maps shared by several species.

use popcat_core::{CatalogBuilder, CatalogSource, Error, GeneticMap};

/// ID of the Phase II HapMap genetic map lifted over to GRCh37.
pub const HAPMAP_II_GRCH37: &str = "HapmapII_GRCh37";

/// The Phase II HapMap genetic map (lifted over to GRCh37) used in 1000 Genomes.
#[derive(Debug, Default, Clone, Copy)]
pub struct HapmapII;

impl HapmapII {
    /// The map description.
    pub fn map() -> Result<GeneticMap, Error> {
        let map = GeneticMap::new(
            HAPMAP_II_GRCH37,
            "http://ftp-trace.ncbi.nih.gov/1000genomes/ftp/technical/working/\
             20110106_recombination_hotspots/HapmapII_GRCh37_RecombinationHotspots.tar.gz",
            "genetic_map_GRCh37_{name}.txt",
        )?
        .with_description("The Phase II HapMap genetic map, lifted over to GRCh37");
        Ok(map)
    }
}

impl CatalogSource for HapmapII {
    fn register(&self, builder: &mut CatalogBuilder) -> Result<(), Error> {
        builder.register_genetic_map(Self::map()?)?;
        Ok(())
    }
}
