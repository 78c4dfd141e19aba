//! This module defines distributions of fitness effects ([`Dfe`]): categorical mixtures over
//! [mutation types](MutationType). A [`DfeSpec`] is validated into a [`Dfe`].

pub mod mutation;

use rand::distributions::{WeightedError, WeightedIndex};
use rand::prelude::*;

use crate::citation::Citation;

pub use mutation::{EffectDist, InvalidDistributionError, MutationType, MutationTypeDesc, Sign};

name!(DfeId);

/// Maximum allowed deviation of the summed proportions from 1.
pub const PROPORTION_TOLERANCE: f64 = 1e-6;

/// An unvalidated DFE.
#[derive(Debug, Clone, typed_builder::TypedBuilder, serde::Serialize, serde::Deserialize)]
pub struct DfeSpec {
    /// Unique within a species.
    #[builder(setter(into))]
    pub id: DfeId,
    #[builder(setter(into))]
    pub description: String,
    #[builder(default, setter(into))]
    #[serde(default)]
    pub long_description: String,
    pub mutation_types: Vec<MutationType>,
    /// Parallel to `mutation_types`.
    pub proportions: Vec<f64>,
    #[builder(default)]
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl DfeSpec {
    /// Validate a specification, producing a `Dfe`.
    ///
    /// Correctness properties:
    ///
    /// - The ID is not blank
    /// - There is at least one mutation type
    /// - There is exactly one proportion per mutation type
    /// - Proportions are finite and non-negative
    /// - Proportions sum to 1 within [`PROPORTION_TOLERANCE`]
    pub fn validate(self) -> Result<Dfe, DfeValidationError> {
        if self.id.is_blank() {
            return Err(DfeValidationError::EmptyId);
        }
        if self.mutation_types.is_empty() {
            return Err(DfeValidationError::NoMutationTypes(self.id));
        }
        if self.mutation_types.len() != self.proportions.len() {
            return Err(DfeValidationError::LengthMismatch {
                id: self.id,
                mutation_types: self.mutation_types.len(),
                proportions: self.proportions.len(),
            });
        }
        if let Some((index, &value)) = self
            .proportions
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(DfeValidationError::InvalidProportion {
                id: self.id,
                index,
                value,
            });
        }
        let sum = self.proportions.iter().sum::<f64>();
        if (sum - 1.0).abs() > PROPORTION_TOLERANCE {
            return Err(DfeValidationError::ProportionSum { id: self.id, sum });
        }
        let categories = WeightedIndex::new(&self.proportions)?;
        Ok(Dfe {
            id: self.id,
            description: self.description,
            long_description: self.long_description,
            mutation_types: self.mutation_types,
            proportions: self.proportions,
            citations: self.citations,
            categories,
        })
    }
}

/// A validated distribution of fitness effects.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "DfeSpec")]
pub struct Dfe {
    id: DfeId,
    description: String,
    long_description: String,
    mutation_types: Vec<MutationType>,
    proportions: Vec<f64>,
    citations: Vec<Citation>,
    #[serde(skip_serializing)]
    categories: WeightedIndex<f64>,
}

impl Dfe {
    pub fn id(&self) -> &DfeId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn long_description(&self) -> &str {
        &self.long_description
    }

    pub fn mutation_types(&self) -> &[MutationType] {
        &self.mutation_types
    }

    pub fn proportions(&self) -> &[f64] {
        &self.proportions
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Iterate over `(mutation type, proportion)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&MutationType, f64)> + '_ {
        self.mutation_types
            .iter()
            .zip(self.proportions.iter().copied())
    }

    /// Choose a mutation type, treating the proportions as a categorical distribution.
    pub fn sample_mutation_type<R: Rng + ?Sized>(&self, rng: &mut R) -> &MutationType {
        &self.mutation_types[self.categories.sample(rng)]
    }

    /// The expected selection coefficient across all categories.
    pub fn mean_selection_coefficient(&self) -> f64 {
        self.iter()
            .map(|(mt, p)| p * mt.distribution().mean())
            .sum()
    }
}

impl TryFrom<DfeSpec> for Dfe {
    type Error = DfeValidationError;

    fn try_from(spec: DfeSpec) -> Result<Self, Self::Error> {
        spec.validate()
    }
}

impl Distribution<f64> for Dfe {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sample_mutation_type(rng).draw_selection_coefficient(rng)
    }
}

/// DFE validation error.
#[derive(Debug, thiserror::Error)]
pub enum DfeValidationError {
    /// The DFE ID is empty.
    #[error("DFE ID is empty")]
    EmptyId,

    /// The DFE has no mutation types.
    #[error("DFE {0} has no mutation types")]
    NoMutationTypes(DfeId),

    /// Mutation types and proportions differ in length.
    #[error("DFE {id} has {mutation_types} mutation types but {proportions} proportions")]
    LengthMismatch {
        id: DfeId,
        mutation_types: usize,
        proportions: usize,
    },

    /// A proportion is negative or not finite.
    #[error("DFE {id} has an invalid proportion at index {index} ({value})")]
    InvalidProportion { id: DfeId, index: usize, value: f64 },

    /// The proportions do not sum to 1.
    #[error("DFE {id} proportions sum to {sum}, expected 1")]
    ProportionSum { id: DfeId, sum: f64 },

    /// The proportions cannot be sampled from.
    #[error("invalid categorical weights")]
    Weights(#[from] WeightedError),
}

#[cfg(test)]
mod tests {
    use crate::testing;

    use super::*;

    #[test]
    fn valid_dfe_succeeds() {
        let dfe = testing::booker_dfe();
        assert_eq!(dfe.id().as_str(), "Gamma_B21");
        assert_eq!(dfe.mutation_types().len(), 2);
        let sum = dfe.proportions().iter().sum::<f64>();
        assert!((sum - 1.0).abs() <= PROPORTION_TOLERANCE);
    }

    #[test]
    fn proportions_summing_below_one_fail() {
        let res = spec(vec![0.3, 0.6]).validate();
        assert!(matches!(res, Err(DfeValidationError::ProportionSum { .. })));
    }

    #[test]
    fn length_mismatch_fails() {
        let res = spec(vec![1.0]).validate();
        assert!(matches!(
            res,
            Err(DfeValidationError::LengthMismatch {
                mutation_types: 2,
                proportions: 1,
                ..
            })
        ));
    }

    #[test]
    fn negative_proportion_fails() {
        let res = spec(vec![1.5, -0.5]).validate();
        assert!(matches!(
            res,
            Err(DfeValidationError::InvalidProportion { index: 1, .. })
        ));
    }

    #[test]
    fn no_mutation_types_fails() {
        let res = DfeSpec::builder()
            .id("Empty")
            .description("nothing")
            .mutation_types(Vec::new())
            .proportions(Vec::new())
            .build()
            .validate();
        assert!(matches!(res, Err(DfeValidationError::NoMutationTypes(..))));
    }

    #[test]
    fn zero_proportion_category_is_never_drawn() {
        let dfe = spec(vec![1.0, 0.0]).validate().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!((0..1000).all(|_| dfe.sample_mutation_type(&mut rng).is_neutral()));
    }

    #[test]
    fn categorical_sampling_follows_proportions() {
        let dfe = testing::booker_dfe();
        let mut rng = StdRng::seed_from_u64(2);
        let n = 20_000;
        let nr_neutral = (0..n)
            .filter(|_| dfe.sample_mutation_type(&mut rng).is_neutral())
            .count();
        let frac = nr_neutral as f64 / n as f64;
        assert!((frac - 0.334).abs() < 0.02, "neutral fraction {frac}");
    }

    #[test]
    fn deserialized_dfe_is_validated() {
        let json = serde_json::to_string(&testing::booker_dfe()).unwrap();
        let dfe: Dfe = serde_json::from_str(&json).unwrap();
        assert_eq!(dfe.proportions(), &[0.334, 0.666]);
        let bad = json.replace("0.666", "0.566");
        assert!(serde_json::from_str::<Dfe>(&bad).is_err());
    }

    fn spec(proportions: Vec<f64>) -> DfeSpec {
        let negative = MutationType::new(
            0.5,
            EffectDist::Gamma {
                mean: -0.01,
                shape: 0.2,
            },
        )
        .unwrap();
        DfeSpec::builder()
            .id("Test")
            .description("test DFE")
            .mutation_types(vec![MutationType::neutral(), negative])
            .proportions(proportions)
            .build()
    }
}
