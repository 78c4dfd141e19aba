use rustc_hash::FxHashSet;

use crate::demography::{PopIndex, PopulationId};
use crate::units::Generations;

/// A change of the backwards-in-time migration rate into a population from `source`.
#[derive(Debug, Clone, Copy, PartialEq, derive_new::new, serde::Serialize, serde::Deserialize)]
pub struct MigrationChange {
    pub source: PopIndex,
    pub rate: f64,
}

/// One piece of a population's history: going back in time, from `time` onwards the population
/// has `size` individuals (until the next epoch begins).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Epoch {
    pub time: Generations,
    pub size: f64,
    #[serde(default)]
    pub migration: Option<MigrationChange>,
}

impl Epoch {
    pub fn new(time: impl Into<Generations>, size: f64) -> Self {
        Self {
            time: time.into(),
            size,
            migration: None,
        }
    }

    pub fn with_migration(mut self, migration: MigrationChange) -> Self {
        self.migration = Some(migration);
        self
    }
}

/// A discrete change of one population's state.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DemographicEvent {
    pub time: Generations,
    pub population: PopIndex,
    pub size: f64,
    #[serde(default)]
    pub migration: Option<MigrationChange>,
}

/// An ordered sequence of demographic events. Within each population, event times are
/// non-decreasing and sizes are positive. Order across populations is insignificant.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<DemographicEvent>", into = "Vec<DemographicEvent>")]
pub struct EventSequence {
    events: Vec<DemographicEvent>,
}

impl EventSequence {
    pub fn builder() -> EventSequenceBuilder {
        EventSequenceBuilder::default()
    }

    /// The events of one population, in order.
    pub fn for_population(&self, pop: PopIndex) -> impl Iterator<Item = &DemographicEvent> + '_ {
        self.events.iter().filter(move |e| e.population == pop)
    }

    /// All events, stably sorted by time.
    pub fn chronological(&self) -> Vec<&DemographicEvent> {
        let mut events = self.events.iter().collect::<Vec<_>>();
        events.sort_by(|a, b| a.time.into_f64().total_cmp(&b.time.into_f64()));
        events
    }

    pub fn as_slice(&self) -> &[DemographicEvent] {
        &self.events
    }

    delegate::delegate! {
        to self.events {
            pub fn iter(&self) -> std::slice::Iter<'_, DemographicEvent>;

            pub fn len(&self) -> usize;

            pub fn is_empty(&self) -> bool;
        }
    }
}

impl<'a> IntoIterator for &'a EventSequence {
    type Item = &'a DemographicEvent;
    type IntoIter = std::slice::Iter<'a, DemographicEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl TryFrom<Vec<DemographicEvent>> for EventSequence {
    type Error = MalformedEventSequenceError;

    fn try_from(events: Vec<DemographicEvent>) -> Result<Self, Self::Error> {
        let pops = events
            .iter()
            .map(|e| e.population)
            .collect::<FxHashSet<_>>();
        let mut pops = pops.into_iter().collect::<Vec<_>>();
        pops.sort();
        let builder = EventSequenceBuilder::default();
        for pop in pops {
            let epochs = events
                .iter()
                .filter(|e| e.population == pop)
                .map(|e| Epoch {
                    time: e.time,
                    size: e.size,
                    migration: e.migration,
                })
                .collect::<Vec<_>>();
            builder.check(pop, &epochs)?;
        }
        Ok(Self { events })
    }
}

impl From<EventSequence> for Vec<DemographicEvent> {
    fn from(seq: EventSequence) -> Self {
        seq.events
    }
}

/// Builds an [`EventSequence`] one population at a time. Each population's epochs are taken in
/// the given order; they are validated, never re-sorted.
#[derive(Debug, Default)]
pub struct EventSequenceBuilder {
    events: Vec<DemographicEvent>,
    seen: FxHashSet<PopIndex>,
}

impl EventSequenceBuilder {
    /// Appends the history of `pop`.
    ///
    /// Correctness properties:
    ///
    /// - A population's history is given at most once
    /// - A history has at least one epoch
    /// - Times are finite, non-negative and non-decreasing
    /// - Sizes are finite and positive
    /// - Migration rates lie in `[0, 1]` and never name `pop` itself as the source
    pub fn population(
        mut self,
        pop: PopIndex,
        epochs: impl IntoIterator<Item = Epoch>,
    ) -> Result<Self, MalformedEventSequenceError> {
        let epochs = epochs.into_iter().collect::<Vec<_>>();
        self.check(pop, &epochs)?;
        self.seen.insert(pop);
        self.events
            .extend(epochs.into_iter().map(|epoch| DemographicEvent {
                time: epoch.time,
                population: pop,
                size: epoch.size,
                migration: epoch.migration,
            }));
        Ok(self)
    }

    /// Appends the history of `pop` given as parallel time and size arrays.
    pub fn population_from_arrays(
        self,
        pop: PopIndex,
        times: &[f64],
        sizes: &[f64],
    ) -> Result<Self, MalformedEventSequenceError> {
        if times.len() != sizes.len() {
            return Err(MalformedEventSequenceError::LengthMismatch {
                population: pop,
                times: times.len(),
                sizes: sizes.len(),
            });
        }
        let epochs = times
            .iter()
            .zip(sizes)
            .map(|(&time, &size)| Epoch::new(time, size));
        self.population(pop, epochs)
    }

    /// Like [`Self::population_from_arrays`], with a third parallel array of migration changes.
    pub fn population_from_arrays_with_migration(
        self,
        pop: PopIndex,
        times: &[f64],
        sizes: &[f64],
        migrations: &[Option<MigrationChange>],
    ) -> Result<Self, MalformedEventSequenceError> {
        if times.len() != sizes.len() {
            return Err(MalformedEventSequenceError::LengthMismatch {
                population: pop,
                times: times.len(),
                sizes: sizes.len(),
            });
        }
        if times.len() != migrations.len() {
            return Err(MalformedEventSequenceError::MigrationLengthMismatch {
                population: pop,
                times: times.len(),
                migrations: migrations.len(),
            });
        }
        let epochs = times
            .iter()
            .zip(sizes)
            .zip(migrations)
            .map(|((&time, &size), &migration)| Epoch {
                time: Generations::new(time),
                size,
                migration,
            });
        self.population(pop, epochs)
    }

    pub fn build(self) -> EventSequence {
        EventSequence {
            events: self.events,
        }
    }

    fn check(&self, pop: PopIndex, epochs: &[Epoch]) -> Result<(), MalformedEventSequenceError> {
        use MalformedEventSequenceError::*;
        if self.seen.contains(&pop) {
            return Err(DuplicatePopulation(pop));
        }
        if epochs.is_empty() {
            return Err(EmptyHistory(pop));
        }
        let mut previous = Generations::ZERO;
        for (index, epoch) in epochs.iter().enumerate() {
            let time = epoch.time.into_f64();
            // CORRECTNESS: Times are finite, non-negative and non-decreasing.
            if !time.is_finite() || time < 0.0 {
                return Err(InvalidTime {
                    population: pop,
                    index,
                    time: epoch.time,
                });
            }
            if epoch.time < previous {
                return Err(NonMonotonicTime {
                    population: pop,
                    index,
                    previous,
                    time: epoch.time,
                });
            }
            previous = epoch.time;
            // CORRECTNESS: Sizes are finite and positive.
            if !epoch.size.is_finite() || epoch.size <= 0.0 {
                return Err(NonPositiveSize {
                    population: pop,
                    index,
                    size: epoch.size,
                });
            }
            if let Some(MigrationChange { source, rate }) = epoch.migration {
                if source == pop {
                    return Err(SelfMigration { population: pop, index });
                }
                if !(0.0..=1.0).contains(&rate) {
                    return Err(InvalidMigrationRate {
                        population: pop,
                        index,
                        rate,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Error building an event sequence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedEventSequenceError {
    /// The time and size arrays of a population differ in length.
    #[error("population {population}: {times} times but {sizes} sizes")]
    LengthMismatch {
        population: PopIndex,
        times: usize,
        sizes: usize,
    },

    /// The time and size arrays of a named history differ in length.
    #[error("population {population}: {times} times but {sizes} sizes")]
    HistoryLengthMismatch {
        population: PopulationId,
        times: usize,
        sizes: usize,
    },

    /// The migration array of a population differs in length from its times.
    #[error("population {population}: {times} times but {migrations} migration changes")]
    MigrationLengthMismatch {
        population: PopIndex,
        times: usize,
        migrations: usize,
    },

    /// A population was given no epochs.
    #[error("population {0} has an empty history")]
    EmptyHistory(PopIndex),

    /// A population was given more than one history.
    #[error("population {0} has more than one history")]
    DuplicatePopulation(PopIndex),

    /// An epoch time is negative or not finite.
    #[error("population {population}, epoch {index}: invalid time {time}")]
    InvalidTime {
        population: PopIndex,
        /// The position of the epoch in the population's history.
        index: usize,
        time: Generations,
    },

    /// Epoch times decrease.
    #[error("population {population}, epoch {index}: time {time} precedes {previous}")]
    NonMonotonicTime {
        population: PopIndex,
        index: usize,
        previous: Generations,
        time: Generations,
    },

    /// An epoch size is zero, negative, or not finite.
    #[error("population {population}, epoch {index}: size must be positive (got {size})")]
    NonPositiveSize {
        population: PopIndex,
        index: usize,
        size: f64,
    },

    /// A migration rate lies outside `[0, 1]`.
    #[error("population {population}, epoch {index}: migration rate {rate} not in [0, 1]")]
    InvalidMigrationRate {
        population: PopIndex,
        index: usize,
        rate: f64,
    },

    /// A migration change names the target population as its source.
    #[error("population {population}, epoch {index}: population migrates into itself")]
    SelfMigration { population: PopIndex, index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    const POP: PopIndex = PopIndex::ZERO;

    #[test]
    fn events_follow_input_order() {
        let seq = EventSequence::builder()
            .population_from_arrays(POP, &[0.0, 83.0, 180.0], &[2040.0, 2040.0, 3844.0])
            .unwrap()
            .build();
        let pairs = seq
            .iter()
            .map(|e| (e.time.into_f64(), e.size))
            .collect::<Vec<_>>();
        assert_eq!(pairs, vec![(0.0, 2040.0), (83.0, 2040.0), (180.0, 3844.0)]);
        assert!(seq.iter().all(|e| e.population == POP));
    }

    #[test]
    fn unsorted_times_fail() {
        let res = EventSequence::builder().population_from_arrays(
            POP,
            &[0.0, 180.0, 83.0],
            &[2040.0, 2040.0, 3844.0],
        );
        assert!(matches!(
            res,
            Err(MalformedEventSequenceError::NonMonotonicTime { index: 2, .. })
        ));
    }

    #[test]
    fn equal_times_are_allowed() {
        let res = EventSequence::builder().population_from_arrays(
            POP,
            &[0.0, 10.0, 10.0],
            &[1.0, 2.0, 3.0],
        );
        assert!(res.is_ok());
    }

    #[test]
    fn single_epoch_is_constant_size() {
        let seq = EventSequence::builder()
            .population(POP, [Epoch::new(0.0, 10_000.0)])
            .unwrap()
            .build();
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn length_mismatch_fails() {
        let res = EventSequence::builder().population_from_arrays(POP, &[0.0, 1.0], &[1.0]);
        assert!(matches!(
            res,
            Err(MalformedEventSequenceError::LengthMismatch { times: 2, sizes: 1, .. })
        ));
    }

    #[test]
    fn migration_array_length_mismatch_fails() {
        let res = EventSequence::builder().population_from_arrays_with_migration(
            POP,
            &[0.0, 1.0],
            &[1.0, 2.0],
            &[None],
        );
        assert!(matches!(
            res,
            Err(MalformedEventSequenceError::MigrationLengthMismatch { migrations: 1, .. })
        ));
    }

    #[test]
    fn non_positive_size_fails() {
        let res = EventSequence::builder().population_from_arrays(POP, &[0.0, 1.0], &[1.0, 0.0]);
        assert!(matches!(
            res,
            Err(MalformedEventSequenceError::NonPositiveSize { index: 1, .. })
        ));
    }

    #[test]
    fn negative_time_fails() {
        let res = EventSequence::builder().population_from_arrays(POP, &[-1.0], &[1.0]);
        assert!(matches!(
            res,
            Err(MalformedEventSequenceError::InvalidTime { .. })
        ));
    }

    #[test]
    fn empty_history_fails() {
        let res = EventSequence::builder().population(POP, Vec::new());
        assert!(matches!(res, Err(MalformedEventSequenceError::EmptyHistory(..))));
    }

    #[test]
    fn duplicate_population_fails() {
        let res = EventSequence::builder()
            .population(POP, [Epoch::new(0.0, 1.0)])
            .and_then(|b| b.population(POP, [Epoch::new(0.0, 1.0)]));
        assert!(matches!(
            res,
            Err(MalformedEventSequenceError::DuplicatePopulation(..))
        ));
    }

    #[test]
    fn bad_migration_fails() {
        let other = PopIndex::new(1);
        let too_high = Epoch::new(0.0, 1.0).with_migration(MigrationChange::new(other, 1.5));
        let res = EventSequence::builder().population(POP, [too_high]);
        assert!(matches!(
            res,
            Err(MalformedEventSequenceError::InvalidMigrationRate { .. })
        ));
        let to_self = Epoch::new(0.0, 1.0).with_migration(MigrationChange::new(POP, 0.1));
        let res = EventSequence::builder().population(POP, [to_self]);
        assert!(matches!(
            res,
            Err(MalformedEventSequenceError::SelfMigration { .. })
        ));
    }

    #[test]
    fn populations_are_concatenated() {
        let seq = EventSequence::builder()
            .population_from_arrays(POP, &[0.0, 100.0], &[10.0, 20.0])
            .unwrap()
            .population_from_arrays(PopIndex::new(1), &[0.0, 50.0], &[30.0, 40.0])
            .unwrap()
            .build();
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.for_population(PopIndex::new(1)).count(), 2);
        let times = seq
            .chronological()
            .iter()
            .map(|e| e.time.into_f64())
            .collect::<Vec<_>>();
        assert_eq!(times, vec![0.0, 0.0, 50.0, 100.0]);
    }

    #[test]
    fn deserialization_revalidates() {
        let good = r#"[{"time": 0.0, "population": 0, "size": 10.0},
                       {"time": 5.0, "population": 0, "size": 20.0}]"#;
        let seq: EventSequence = serde_json::from_str(good).unwrap();
        assert_eq!(seq.len(), 2);
        let bad = r#"[{"time": 5.0, "population": 0, "size": 10.0},
                      {"time": 1.0, "population": 0, "size": 20.0}]"#;
        assert!(serde_json::from_str::<EventSequence>(bad).is_err());
    }
}
