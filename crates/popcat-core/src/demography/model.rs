use rustc_hash::FxHashSet;

use crate::citation::Citation;
use crate::demography::{
    events::{Epoch, EventSequence, MalformedEventSequenceError, MigrationChange},
    DemographicEvent, PopIndex, Population, PopulationConfig, PopulationId,
};
use crate::units::Generations;

name!(ModelId);

// Relative tolerance when comparing an initial size with the size of a time-zero event.
const SIZE_TOLERANCE: f64 = 1e-9;

/// An unvalidated demographic model.
#[derive(Debug, Clone, typed_builder::TypedBuilder, serde::Serialize, serde::Deserialize)]
pub struct DemographicModelSpec {
    /// Unique within a species.
    #[builder(setter(into))]
    pub id: ModelId,
    #[builder(setter(into))]
    pub description: String,
    #[builder(default, setter(into))]
    #[serde(default)]
    pub long_description: String,
    pub populations: Vec<Population>,
    /// One per population, in the same order.
    pub population_configs: Vec<PopulationConfig>,
    #[builder(default)]
    #[serde(default)]
    pub events: EventSequence,
    /// Years per generation.
    pub generation_time: f64,
    /// Mean per-base, per-generation mutation rate.
    pub mutation_rate: f64,
    #[builder(default)]
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl DemographicModelSpec {
    /// Validate a specification, producing a `DemographicModel`.
    ///
    /// Correctness properties:
    ///
    /// - The ID is not blank
    /// - There is at least one population, and population IDs are unique
    /// - There is exactly one configuration per population
    /// - Initial sizes are finite and positive
    /// - Every event (and every migration source) references a declared population
    /// - A population's time-zero event agrees with its initial size
    /// - Generation time and mutation rate are finite and positive
    pub fn validate(self) -> Result<DemographicModel, ModelValidationError> {
        use ModelValidationError::*;
        if self.id.is_blank() {
            return Err(EmptyId);
        }
        if self.populations.is_empty() {
            return Err(NoPopulations(self.id));
        }
        // CORRECTNESS: There is exactly one configuration per population.
        if self.populations.len() != self.population_configs.len() {
            return Err(ConfigCountMismatch {
                id: self.id,
                populations: self.populations.len(),
                configs: self.population_configs.len(),
            });
        }
        let mut ids = FxHashSet::default();
        for pop in &self.populations {
            if !ids.insert(&pop.id) {
                return Err(DuplicatePopulation {
                    id: self.id,
                    population: pop.id.clone(),
                });
            }
        }
        for (i, config) in self.population_configs.iter().enumerate() {
            if !config.initial_size.is_finite() || config.initial_size <= 0.0 {
                return Err(NonPositiveInitialSize {
                    id: self.id,
                    population: PopIndex::new(i),
                    size: config.initial_size,
                });
            }
        }
        let nr_populations = self.populations.len();
        let in_range = |pop: PopIndex| pop.inner() < nr_populations;
        for event in &self.events {
            // CORRECTNESS: Every event references a declared population.
            if !in_range(event.population) {
                return Err(PopulationOutOfRange {
                    id: self.id,
                    population: event.population,
                    nr_populations,
                });
            }
            if let Some(MigrationChange { source, .. }) = event.migration {
                if !in_range(source) {
                    return Err(PopulationOutOfRange {
                        id: self.id,
                        population: source,
                        nr_populations,
                    });
                }
            }
        }
        // CORRECTNESS: Sizes are piecewise constant, so an event at time zero must agree with the
        // initial configuration.
        for (i, config) in self.population_configs.iter().enumerate() {
            let pop = PopIndex::new(i);
            let first = self.events.for_population(pop).next();
            if let Some(&DemographicEvent { time, size, .. }) = first {
                let initial = config.initial_size;
                if time == Generations::ZERO && (size - initial).abs() > SIZE_TOLERANCE * initial {
                    return Err(InitialSizeMismatch {
                        id: self.id,
                        population: pop,
                        initial,
                        first: size,
                    });
                }
            }
        }
        if !self.generation_time.is_finite() || self.generation_time <= 0.0 {
            return Err(NonPositiveGenerationTime {
                id: self.id,
                value: self.generation_time,
            });
        }
        if !self.mutation_rate.is_finite() || self.mutation_rate <= 0.0 {
            return Err(NonPositiveMutationRate {
                id: self.id,
                value: self.mutation_rate,
            });
        }
        Ok(DemographicModel {
            id: self.id,
            description: self.description,
            long_description: self.long_description,
            populations: self.populations,
            population_configs: self.population_configs,
            events: self.events,
            generation_time: self.generation_time,
            mutation_rate: self.mutation_rate,
            citations: self.citations,
        })
    }
}

/// The size history of one population.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PopulationHistory {
    pub population: Population,
    pub epochs: Vec<Epoch>,
}

impl PopulationHistory {
    pub fn new(population: Population, epochs: impl IntoIterator<Item = Epoch>) -> Self {
        Self {
            population,
            epochs: epochs.into_iter().collect(),
        }
    }

    /// Pairs up parallel time and size arrays.
    pub fn from_arrays(
        population: Population,
        times: &[f64],
        sizes: &[f64],
    ) -> Result<Self, MalformedEventSequenceError> {
        if times.len() != sizes.len() {
            return Err(MalformedEventSequenceError::HistoryLengthMismatch {
                population: population.id,
                times: times.len(),
                sizes: sizes.len(),
            });
        }
        let epochs = times
            .iter()
            .zip(sizes)
            .map(|(&time, &size)| Epoch::new(time, size));
        Ok(Self::new(population, epochs))
    }
}

/// A model given as one piecewise-constant history per population. Assembly derives the
/// population configurations (initial size = first epoch's size, with the population's identity
/// as metadata) and the event sequence.
#[derive(Debug, Clone, typed_builder::TypedBuilder)]
pub struct PiecewiseModelSpec {
    #[builder(setter(into))]
    pub id: ModelId,
    #[builder(setter(into))]
    pub description: String,
    #[builder(default, setter(into))]
    pub long_description: String,
    pub histories: Vec<PopulationHistory>,
    pub generation_time: f64,
    pub mutation_rate: f64,
    #[builder(default)]
    pub citations: Vec<Citation>,
}

impl PiecewiseModelSpec {
    pub fn assemble(self) -> Result<DemographicModel, ModelValidationError> {
        let mut builder = EventSequence::builder();
        let mut populations = Vec::with_capacity(self.histories.len());
        let mut configs = Vec::with_capacity(self.histories.len());
        for (i, history) in self.histories.into_iter().enumerate() {
            let pop = PopIndex::new(i);
            let initial_size = history
                .epochs
                .first()
                .map(|epoch| epoch.size)
                .ok_or(MalformedEventSequenceError::EmptyHistory(pop))?;
            builder = builder.population(pop, history.epochs)?;
            configs.push(PopulationConfig::for_population(
                &history.population,
                initial_size,
            ));
            populations.push(history.population);
        }
        DemographicModelSpec::builder()
            .id(self.id)
            .description(self.description)
            .long_description(self.long_description)
            .populations(populations)
            .population_configs(configs)
            .events(builder.build())
            .generation_time(self.generation_time)
            .mutation_rate(self.mutation_rate)
            .citations(self.citations)
            .build()
            .validate()
    }
}

/// A validated demographic model. The simulation engine consumes it read-only.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "DemographicModelSpec")]
pub struct DemographicModel {
    id: ModelId,
    description: String,
    long_description: String,
    populations: Vec<Population>,
    population_configs: Vec<PopulationConfig>,
    events: EventSequence,
    generation_time: f64,
    mutation_rate: f64,
    citations: Vec<Citation>,
}

impl DemographicModel {
    pub fn id(&self) -> &ModelId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    pub fn population_configs(&self) -> &[PopulationConfig] {
        &self.population_configs
    }

    pub fn events(&self) -> &EventSequence {
        &self.events
    }

    pub fn generation_time(&self) -> f64 {
        self.generation_time
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn nr_populations(&self) -> usize {
        self.populations.len()
    }

    pub fn population_index(&self, id: &str) -> Option<PopIndex> {
        self.populations
            .iter()
            .position(|p| p.id.as_str() == id)
            .map(PopIndex::new)
    }

    pub fn population(&self, pop: PopIndex) -> Option<&Population> {
        self.populations.get(pop.inner())
    }

    pub fn initial_sizes(&self) -> impl Iterator<Item = f64> + '_ {
        self.population_configs.iter().map(|c| c.initial_size)
    }

    /// All events, stably sorted by time.
    pub fn events_chronological(&self) -> Vec<&DemographicEvent> {
        self.events.chronological()
    }

    /// The size of `pop` at `time`: the size set by its latest event at or before `time`, or its
    /// initial size if there is none.
    pub fn population_size_at(&self, pop: PopIndex, time: impl Into<Generations>) -> Option<f64> {
        let time = time.into();
        let initial = self.population_configs.get(pop.inner())?.initial_size;
        let size = self
            .events
            .for_population(pop)
            .take_while(|e| e.time <= time)
            .last()
            .map_or(initial, |e| e.size);
        Some(size)
    }

    /// Iterate over the population IDs in index order.
    pub fn population_ids(&self) -> impl Iterator<Item = &PopulationId> + '_ {
        self.populations.iter().map(|p| &p.id)
    }
}

impl TryFrom<DemographicModelSpec> for DemographicModel {
    type Error = ModelValidationError;

    fn try_from(spec: DemographicModelSpec) -> Result<Self, Self::Error> {
        spec.validate()
    }
}

/// Demographic model validation error.
#[derive(Debug, thiserror::Error)]
pub enum ModelValidationError {
    /// The model ID is empty.
    #[error("model ID is empty")]
    EmptyId,

    /// The model declares no populations.
    #[error("model {0} declares no populations")]
    NoPopulations(ModelId),

    /// Populations and population configurations differ in number.
    #[error("model {id} has {populations} populations but {configs} population configurations")]
    ConfigCountMismatch {
        id: ModelId,
        populations: usize,
        configs: usize,
    },

    /// A population ID is declared twice.
    #[error("model {id} declares population {population} more than once")]
    DuplicatePopulation { id: ModelId, population: PopulationId },

    /// An initial population size is not positive.
    #[error("model {id}: initial size of population {population} must be positive (got {size})")]
    NonPositiveInitialSize {
        id: ModelId,
        population: PopIndex,
        size: f64,
    },

    /// An event or migration refers to an undeclared population.
    #[error("model {id} references population {population}, but only {nr_populations} exist")]
    PopulationOutOfRange {
        id: ModelId,
        population: PopIndex,
        nr_populations: usize,
    },

    /// A population's event at time zero disagrees with its initial size.
    #[error("model {id}: initial size {initial} of population {population} differs from {first}")]
    InitialSizeMismatch {
        id: ModelId,
        population: PopIndex,
        initial: f64,
        first: f64,
    },

    /// The generation time is not positive.
    #[error("model {id}: generation time must be positive (got {value})")]
    NonPositiveGenerationTime { id: ModelId, value: f64 },

    /// The mutation rate is not positive.
    #[error("model {id}: mutation rate must be positive (got {value})")]
    NonPositiveMutationRate { id: ModelId, value: f64 },

    /// The event sequence is malformed.
    #[error("malformed event sequence")]
    Events(#[from] MalformedEventSequenceError),
}
