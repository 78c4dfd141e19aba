//! Physical genome descriptions: chromosome lengths and per-chromosome rates.

use rustc_hash::FxHashMap;

use crate::citation::Citation;
use crate::genetic_map::GeneticMapId;
use crate::units::BasePairs;

name!(ChromosomeName);

/// Where a rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateProvenance {
    /// A published, chromosome-specific estimate.
    Estimated,
    /// A genome-wide fallback standing in for an unknown chromosome-specific value.
    Placeholder,
}

/// A per-base, per-generation rate together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rate {
    pub value: f64,
    pub provenance: RateProvenance,
}

impl Rate {
    pub fn estimated(value: f64) -> Self {
        Self {
            value,
            provenance: RateProvenance::Estimated,
        }
    }

    pub fn placeholder(value: f64) -> Self {
        Self {
            value,
            provenance: RateProvenance::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.provenance == RateProvenance::Placeholder
    }
}

#[derive(Debug, Clone, PartialEq, derive_new::new, serde::Serialize, serde::Deserialize)]
pub struct Chromosome {
    pub name: ChromosomeName,
    pub length: BasePairs,
    pub mutation_rate: Rate,
    pub recombination_rate: Rate,
}

/// A set of uniquely named chromosomes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "GenomeDesc", into = "GenomeDesc")]
pub struct Genome {
    chromosomes: Vec<Chromosome>,
    by_name: FxHashMap<ChromosomeName, usize>,
    default_genetic_map: Option<GeneticMapId>,
    citations: Vec<Citation>,
}

impl Genome {
    /// Creates a new genome.
    ///
    /// Correctness properties:
    ///
    /// - There is at least one chromosome
    /// - Chromosome names are non-blank and unique
    /// - Lengths are positive
    /// - Rates are finite and non-negative
    pub fn new(chromosomes: Vec<Chromosome>) -> Result<Self, GenomeError> {
        if chromosomes.is_empty() {
            return Err(GenomeError::NoChromosomes);
        }
        let mut by_name = FxHashMap::default();
        for (i, chrom) in chromosomes.iter().enumerate() {
            if chrom.name.is_blank() {
                return Err(GenomeError::EmptyName { index: i });
            }
            if chrom.length == BasePairs::ZERO {
                return Err(GenomeError::ZeroLength(chrom.name.clone()));
            }
            for (kind, rate) in [
                ("mutation", chrom.mutation_rate),
                ("recombination", chrom.recombination_rate),
            ] {
                if !rate.value.is_finite() || rate.value < 0.0 {
                    return Err(GenomeError::InvalidRate {
                        chromosome: chrom.name.clone(),
                        kind,
                        value: rate.value,
                    });
                }
            }
            if by_name.insert(chrom.name.clone(), i).is_some() {
                return Err(GenomeError::DuplicateChromosome(chrom.name.clone()));
            }
        }
        Ok(Self {
            chromosomes,
            by_name,
            default_genetic_map: None,
            citations: Vec::new(),
        })
    }

    /// Builds a genome from a literal table of `name length` lines. Blank lines and lines
    /// starting with `#` are skipped. Every chromosome gets the fallback rates, flagged as
    /// placeholders.
    pub fn from_table(
        table: &str,
        fallback_mutation_rate: f64,
        fallback_recombination_rate: f64,
    ) -> Result<Self, GenomeError> {
        let mut chromosomes = Vec::new();
        for (i, line) in table.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(name), Some(length), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(GenomeError::MalformedTableLine {
                    line: i + 1,
                    text: line.to_owned(),
                });
            };
            let length = length
                .parse::<BasePairs>()
                .map_err(|_| GenomeError::InvalidLength {
                    chromosome: ChromosomeName::new(name),
                    text: length.to_owned(),
                })?;
            chromosomes.push(Chromosome::new(
                ChromosomeName::new(name),
                length,
                Rate::placeholder(fallback_mutation_rate),
                Rate::placeholder(fallback_recombination_rate),
            ));
        }
        let genome = Self::new(chromosomes)?;
        log::warn!(
            "genome of {} chromosomes uses placeholder rates (mutation {}, recombination {})",
            genome.nr_chromosomes(),
            fallback_mutation_rate,
            fallback_recombination_rate
        );
        Ok(genome)
    }

    pub fn with_default_genetic_map(mut self, map: impl Into<GeneticMapId>) -> Self {
        self.default_genetic_map = Some(map.into());
        self
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    /// Looks up a chromosome by name.
    pub fn lookup(&self, name: &str) -> Result<&Chromosome, GenomeError> {
        self.by_name
            .get(name)
            .map(|&i| &self.chromosomes[i])
            .ok_or_else(|| GenomeError::UnknownChromosome(ChromosomeName::new(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn default_genetic_map(&self) -> Option<&GeneticMapId> {
        self.default_genetic_map.as_ref()
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    delegate::delegate! {
        to self.chromosomes {
            #[call(len)]
            pub fn nr_chromosomes(&self) -> usize;

            #[call(iter)]
            pub fn chromosomes(&self) -> impl Iterator<Item = &Chromosome>;
        }
    }

    pub fn total_length(&self) -> BasePairs {
        self.chromosomes.iter().map(|c| c.length).sum()
    }

    /// The length-weighted mean mutation rate.
    pub fn mean_mutation_rate(&self) -> f64 {
        self.weighted_mean(|c| c.mutation_rate.value)
    }

    /// The length-weighted mean recombination rate.
    pub fn mean_recombination_rate(&self) -> f64 {
        self.weighted_mean(|c| c.recombination_rate.value)
    }

    pub fn has_placeholder_rates(&self) -> bool {
        self.chromosomes
            .iter()
            .any(|c| c.mutation_rate.is_placeholder() || c.recombination_rate.is_placeholder())
    }

    fn weighted_mean(&self, rate: impl Fn(&Chromosome) -> f64) -> f64 {
        let total = self.total_length().into_f64();
        self.chromosomes
            .iter()
            .map(|c| rate(c) * c.length.into_f64())
            .sum::<f64>()
            / total
    }
}

/// The serialized form of a [`Genome`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GenomeDesc {
    pub chromosomes: Vec<Chromosome>,
    #[serde(default)]
    pub default_genetic_map: Option<GeneticMapId>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl TryFrom<GenomeDesc> for Genome {
    type Error = GenomeError;

    fn try_from(desc: GenomeDesc) -> Result<Self, Self::Error> {
        let mut genome = Genome::new(desc.chromosomes)?.with_citations(desc.citations);
        genome.default_genetic_map = desc.default_genetic_map;
        Ok(genome)
    }
}

impl From<Genome> for GenomeDesc {
    fn from(genome: Genome) -> Self {
        Self {
            chromosomes: genome.chromosomes,
            default_genetic_map: genome.default_genetic_map,
            citations: genome.citations,
        }
    }
}

/// Genome construction or lookup error.
#[derive(Debug, thiserror::Error)]
pub enum GenomeError {
    /// The genome is empty.
    #[error("genome has no chromosomes")]
    NoChromosomes,

    /// A chromosome name is blank.
    #[error("chromosome at index {index} has an empty name")]
    EmptyName { index: usize },

    /// Two chromosomes share a name.
    #[error("duplicate chromosome {0}")]
    DuplicateChromosome(ChromosomeName),

    /// A lookup named a chromosome the genome does not have.
    #[error("unknown chromosome {0}")]
    UnknownChromosome(ChromosomeName),

    /// A chromosome has length zero.
    #[error("chromosome {0} has zero length")]
    ZeroLength(ChromosomeName),

    /// A rate is negative or not finite.
    #[error("chromosome {chromosome} has an invalid {kind} rate ({value})")]
    InvalidRate {
        chromosome: ChromosomeName,
        kind: &'static str,
        value: f64,
    },

    /// A chromosome table line is not `name length`.
    #[error("malformed chromosome table line {line}: {text:?}")]
    MalformedTableLine { line: usize, text: String },

    /// A chromosome table length is not an integer.
    #[error("chromosome {chromosome} has an invalid length {text:?}")]
    InvalidLength {
        chromosome: ChromosomeName,
        text: String,
    },
}
