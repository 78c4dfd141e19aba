//! This module defines piecewise-constant demographic histories. Per-population
//! [epochs](Epoch) are turned into an [`EventSequence`] by an [`EventSequenceBuilder`], and a
//! [`DemographicModelSpec`] (or [`PiecewiseModelSpec`]) is validated into a
//! [`DemographicModel`].

pub mod events;
pub mod model;

pub use events::{
    DemographicEvent, Epoch, EventSequence, EventSequenceBuilder, MalformedEventSequenceError,
    MigrationChange,
};
pub use model::{
    DemographicModel, DemographicModelSpec, ModelId, ModelValidationError, PiecewiseModelSpec,
    PopulationHistory,
};

identifier!(PopIndex, usize);
name!(PopulationId);

/// A population declared by a model.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Population {
    pub id: PopulationId,
    pub description: String,
}

impl Population {
    pub fn new(id: impl Into<PopulationId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }

    /// The metadata attached to this population's configuration. It carries the full identity
    /// of the population, so [`Population::from_metadata`] recovers an identical value.
    pub fn to_metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id.as_str(),
            "description": self.description,
        })
    }

    pub fn from_metadata(metadata: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(metadata.clone())
    }
}

/// The state of a population at time zero.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PopulationConfig {
    pub initial_size: f64,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl PopulationConfig {
    /// A configuration without metadata.
    pub fn new(initial_size: f64) -> Self {
        Self {
            initial_size,
            metadata: None,
        }
    }

    /// A configuration carrying `population`'s identity as metadata.
    pub fn for_population(population: &Population, initial_size: f64) -> Self {
        Self {
            initial_size,
            metadata: Some(population.to_metadata()),
        }
    }

    /// Recovers the population described by the metadata, if any.
    pub fn population(&self) -> Option<Result<Population, serde_json::Error>> {
        self.metadata.as_ref().map(Population::from_metadata)
    }
}
