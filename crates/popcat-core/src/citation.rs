//! Provenance records attached to catalog entries. Citations are purely descriptive and have no
//! effect on simulation.

use std::collections::BTreeSet;

/// Why a publication is cited.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CiteReason {
    DemographicModel,
    Dfe,
    GenerationTime,
    MutationRate,
    RecombinationRate,
    PopulationSize,
    Assembly,
    GeneticMap,
}

impl std::fmt::Display for CiteReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CiteReason::DemographicModel => "demographic model",
            CiteReason::Dfe => "DFE",
            CiteReason::GenerationTime => "generation time",
            CiteReason::MutationRate => "mutation rate",
            CiteReason::RecombinationRate => "recombination rate",
            CiteReason::PopulationSize => "population size",
            CiteReason::Assembly => "genome assembly",
            CiteReason::GeneticMap => "genetic map",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Citation {
    pub author: String,
    pub year: u16,
    pub doi: String,
    pub reasons: BTreeSet<CiteReason>,
}

impl Citation {
    pub fn new(
        author: impl Into<String>,
        year: u16,
        doi: impl Into<String>,
        reasons: impl IntoIterator<Item = CiteReason>,
    ) -> Self {
        Self {
            author: author.into(),
            year,
            doi: doi.into(),
            reasons: reasons.into_iter().collect(),
        }
    }

    pub fn cites_for(&self, reason: CiteReason) -> bool {
        self.reasons.contains(&reason)
    }
}

impl std::fmt::Display for Citation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) {}", self.author, self.year, self.doi)
    }
}
