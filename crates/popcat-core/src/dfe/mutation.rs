//! Mutation types: one class of selection coefficients together with a dominance coefficient.

use rand::prelude::*;
use rand_distr::{Exp, Gamma, LogNormal, Normal, Uniform};

/// Dominance coefficient used when none is given.
pub const DEFAULT_DOMINANCE: f64 = 0.5;

/// Direction of a one-sided distribution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

impl Sign {
    fn of(value: f64) -> Self {
        if value < 0.0 {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    fn factor(self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

/// The distribution selection coefficients are drawn from. Each variant carries exactly the
/// parameters it needs, so a tag can never be paired with the wrong arguments.
#[derive(Debug, Default, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectDist {
    /// Neutral mutations (s = 0).
    #[default]
    Fixed,
    /// Every mutation has the same coefficient.
    PointMass { value: f64 },
    /// Exponential with the given (possibly negative) mean.
    Exponential { mean: f64 },
    /// Gamma with the given (possibly negative) mean and shape.
    Gamma { mean: f64, shape: f64 },
    Normal { mean: f64, sd: f64 },
    Uniform { low: f64, high: f64 },
    /// Lognormal in `meanlog`/`sdlog`, optionally negated.
    Lognormal {
        meanlog: f64,
        sdlog: f64,
        #[serde(default)]
        sign: Sign,
    },
}

impl EffectDist {
    /// Parses a loosely specified distribution: a short or long tag plus a flat argument list.
    ///
    /// | tag | arguments |
    /// |---|---|
    /// | `f`, `fixed`, `neutral` | none (neutral), or `[value]` (point mass) |
    /// | `p`, `point_mass` | `[value]` |
    /// | `e`, `exponential` | `[mean]` |
    /// | `g`, `gamma` | `[mean, shape]` |
    /// | `n`, `normal` | `[mean, sd]` |
    /// | `u`, `uniform` | `[low, high]` |
    /// | `lp`, `lognormal` | `[meanlog, sdlog]` |
    /// | `ln` | `[meanlog, sdlog]`, negated |
    pub fn from_tag(tag: &str, args: &[f64]) -> Result<Self, InvalidDistributionError> {
        let dist = match tag {
            "f" | "fixed" | "neutral" => match *args {
                [] => EffectDist::Fixed,
                [value] => EffectDist::PointMass { value },
                _ => return Err(InvalidDistributionError::FixedArgCount(args.len())),
            },
            "p" | "point_mass" => {
                let [value] = take_args("point_mass", args)?;
                EffectDist::PointMass { value }
            }
            "e" | "exponential" => {
                let [mean] = take_args("exponential", args)?;
                EffectDist::Exponential { mean }
            }
            "g" | "gamma" => {
                let [mean, shape] = take_args("gamma", args)?;
                EffectDist::Gamma { mean, shape }
            }
            "n" | "normal" => {
                let [mean, sd] = take_args("normal", args)?;
                EffectDist::Normal { mean, sd }
            }
            "u" | "uniform" => {
                let [low, high] = take_args("uniform", args)?;
                EffectDist::Uniform { low, high }
            }
            "lp" | "lognormal" => {
                let [meanlog, sdlog] = take_args("lognormal", args)?;
                EffectDist::Lognormal {
                    meanlog,
                    sdlog,
                    sign: Sign::Positive,
                }
            }
            "ln" => {
                let [meanlog, sdlog] = take_args("lognormal", args)?;
                EffectDist::Lognormal {
                    meanlog,
                    sdlog,
                    sign: Sign::Negative,
                }
            }
            other => return Err(InvalidDistributionError::UnknownTag(other.to_owned())),
        };
        dist.validate()?;
        Ok(dist)
    }

    /// The canonical tag of this distribution.
    pub fn tag(&self) -> &'static str {
        match self {
            EffectDist::Fixed => "fixed",
            EffectDist::PointMass { .. } => "point_mass",
            EffectDist::Exponential { .. } => "exponential",
            EffectDist::Gamma { .. } => "gamma",
            EffectDist::Normal { .. } => "normal",
            EffectDist::Uniform { .. } => "uniform",
            EffectDist::Lognormal { .. } => "lognormal",
        }
    }

    /// Checks parameter signs and ranges.
    pub fn validate(&self) -> Result<(), InvalidDistributionError> {
        let tag = self.tag();
        match *self {
            EffectDist::Fixed => Ok(()),
            EffectDist::PointMass { value } => finite(tag, "value", value),
            EffectDist::Exponential { mean } => {
                finite(tag, "mean", mean)?;
                require(mean != 0.0, tag, "mean", mean, "non-zero")
            }
            EffectDist::Gamma { mean, shape } => {
                finite(tag, "mean", mean)?;
                finite(tag, "shape", shape)?;
                require(mean != 0.0, tag, "mean", mean, "non-zero")?;
                require(shape > 0.0, tag, "shape", shape, "positive")
            }
            EffectDist::Normal { mean, sd } => {
                finite(tag, "mean", mean)?;
                finite(tag, "sd", sd)?;
                require(sd >= 0.0, tag, "sd", sd, "non-negative")
            }
            EffectDist::Uniform { low, high } => {
                finite(tag, "low", low)?;
                finite(tag, "high", high)?;
                require(low <= high, tag, "high", high, "at least `low`")?;
                // The inclusive sampler scales by `1 - EPSILON`, which must stay finite too.
                let in_range = ((high - low) / (1.0 - f64::EPSILON)).is_finite();
                require(in_range, tag, "high", high, "within range of `low`")
            }
            EffectDist::Lognormal { meanlog, sdlog, .. } => {
                finite(tag, "meanlog", meanlog)?;
                finite(tag, "sdlog", sdlog)?;
                require(sdlog >= 0.0, tag, "sdlog", sdlog, "non-negative")
            }
        }
    }

    /// The expected selection coefficient.
    pub fn mean(&self) -> f64 {
        match *self {
            EffectDist::Fixed => 0.0,
            EffectDist::PointMass { value } => value,
            EffectDist::Exponential { mean } | EffectDist::Gamma { mean, .. } => mean,
            EffectDist::Normal { mean, .. } => mean,
            EffectDist::Uniform { low, high } => (low + high) / 2.0,
            EffectDist::Lognormal {
                meanlog,
                sdlog,
                sign,
            } => sign.factor() * (meanlog + sdlog * sdlog / 2.0).exp(),
        }
    }

    fn sampler(&self) -> Result<Sampler, InvalidDistributionError> {
        self.validate()?;
        let tag = self.tag();
        let rejected = |e: &dyn std::fmt::Display| InvalidDistributionError::Rejected {
            tag,
            reason: e.to_string(),
        };
        let sampler = match *self {
            EffectDist::Fixed => Sampler::Constant(0.0),
            EffectDist::PointMass { value } => Sampler::Constant(value),
            EffectDist::Exponential { mean } => Sampler::Exp {
                dist: Exp::new(1.0 / mean.abs()).map_err(|e| rejected(&e))?,
                sign: Sign::of(mean),
            },
            EffectDist::Gamma { mean, shape } => Sampler::Gamma {
                dist: Gamma::new(shape, mean.abs() / shape).map_err(|e| rejected(&e))?,
                sign: Sign::of(mean),
            },
            EffectDist::Normal { mean, sd } => {
                Sampler::Normal(Normal::new(mean, sd).map_err(|e| rejected(&e))?)
            }
            EffectDist::Uniform { low, high } => {
                Sampler::Uniform(Uniform::new_inclusive(low, high))
            }
            EffectDist::Lognormal {
                meanlog,
                sdlog,
                sign,
            } => Sampler::LogNormal {
                dist: LogNormal::new(meanlog, sdlog).map_err(|e| rejected(&e))?,
                sign,
            },
        };
        Ok(sampler)
    }
}

fn take_args<const N: usize>(
    tag: &'static str,
    args: &[f64],
) -> Result<[f64; N], InvalidDistributionError> {
    <[f64; N]>::try_from(args).map_err(|_| InvalidDistributionError::WrongArgCount {
        tag,
        expected: N,
        got: args.len(),
    })
}

fn finite(
    tag: &'static str,
    param: &'static str,
    value: f64,
) -> Result<(), InvalidDistributionError> {
    require(value.is_finite(), tag, param, value, "finite")
}

fn require(
    ok: bool,
    tag: &'static str,
    param: &'static str,
    value: f64,
    requirement: &'static str,
) -> Result<(), InvalidDistributionError> {
    if ok {
        Ok(())
    } else {
        Err(InvalidDistributionError::InvalidParam {
            tag,
            param,
            value,
            requirement,
        })
    }
}

#[derive(Debug, Clone)]
enum Sampler {
    Constant(f64),
    Exp { dist: Exp<f64>, sign: Sign },
    Gamma { dist: Gamma<f64>, sign: Sign },
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
    LogNormal { dist: LogNormal<f64>, sign: Sign },
}

impl Distribution<f64> for Sampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Sampler::Constant(value) => *value,
            Sampler::Exp { dist, sign } => sign.factor() * dist.sample(rng),
            Sampler::Gamma { dist, sign } => sign.factor() * dist.sample(rng),
            Sampler::Normal(dist) => dist.sample(rng),
            Sampler::Uniform(dist) => dist.sample(rng),
            Sampler::LogNormal { dist, sign } => sign.factor() * dist.sample(rng),
        }
    }
}

/// A class of mutations. Immutable once constructed; the sampler is built (and its parameters
/// checked) up front so drawing never fails.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "MutationTypeDesc", into = "MutationTypeDesc")]
pub struct MutationType {
    dominance_coeff: f64,
    distribution: EffectDist,
    sampler: Sampler,
}

impl MutationType {
    pub fn new(
        dominance_coeff: f64,
        distribution: EffectDist,
    ) -> Result<Self, InvalidDistributionError> {
        if !dominance_coeff.is_finite() {
            return Err(InvalidDistributionError::InvalidDominance(dominance_coeff));
        }
        let sampler = distribution.sampler()?;
        Ok(Self {
            dominance_coeff,
            distribution,
            sampler,
        })
    }

    /// A neutral mutation type with the default dominance coefficient.
    pub fn neutral() -> Self {
        Self {
            dominance_coeff: DEFAULT_DOMINANCE,
            distribution: EffectDist::Fixed,
            sampler: Sampler::Constant(0.0),
        }
    }

    /// Builds a mutation type from an optional tag and its arguments. Without a tag the type is
    /// neutral, and no arguments may be given.
    pub fn from_tag(
        dominance_coeff: f64,
        tag: Option<&str>,
        args: &[f64],
    ) -> Result<Self, InvalidDistributionError> {
        let distribution = match tag {
            Some(tag) => EffectDist::from_tag(tag, args)?,
            None if args.is_empty() => EffectDist::Fixed,
            None => {
                return Err(InvalidDistributionError::WrongArgCount {
                    tag: "fixed",
                    expected: 0,
                    got: args.len(),
                })
            }
        };
        Self::new(dominance_coeff, distribution)
    }

    pub fn dominance_coeff(&self) -> f64 {
        self.dominance_coeff
    }

    pub fn distribution(&self) -> &EffectDist {
        &self.distribution
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self.distribution, EffectDist::Fixed)
    }

    /// Draws one selection coefficient.
    pub fn draw_selection_coefficient<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sampler.sample(rng)
    }
}

impl Default for MutationType {
    fn default() -> Self {
        Self::neutral()
    }
}

impl PartialEq for MutationType {
    fn eq(&self, other: &Self) -> bool {
        self.dominance_coeff == other.dominance_coeff && self.distribution == other.distribution
    }
}

impl Distribution<f64> for MutationType {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.draw_selection_coefficient(rng)
    }
}

/// The serialized form of a [`MutationType`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MutationTypeDesc {
    #[serde(default = "default_dominance")]
    pub dominance_coeff: f64,
    #[serde(default)]
    pub distribution: EffectDist,
}

fn default_dominance() -> f64 {
    DEFAULT_DOMINANCE
}

impl TryFrom<MutationTypeDesc> for MutationType {
    type Error = InvalidDistributionError;

    fn try_from(desc: MutationTypeDesc) -> Result<Self, Self::Error> {
        Self::new(desc.dominance_coeff, desc.distribution)
    }
}

impl From<MutationType> for MutationTypeDesc {
    fn from(mt: MutationType) -> Self {
        Self {
            dominance_coeff: mt.dominance_coeff,
            distribution: mt.distribution,
        }
    }
}

/// Error constructing a mutation type or its distribution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidDistributionError {
    /// The distribution tag is not recognized.
    #[error("unknown distribution tag `{0}`")]
    UnknownTag(String),

    /// A distribution was given the wrong number of arguments.
    #[error("{tag} distribution takes {expected} argument(s), got {got}")]
    WrongArgCount {
        /// The canonical tag.
        tag: &'static str,
        /// The number of arguments the tag requires.
        expected: usize,
        /// The number of arguments given.
        got: usize,
    },

    /// The fixed tag was given more than one argument.
    #[error("fixed distribution takes 0 or 1 arguments, got {0}")]
    FixedArgCount(usize),

    /// A parameter is out of its allowed range.
    #[error("{tag} parameter `{param}` must be {requirement} (got {value})")]
    InvalidParam {
        /// The canonical tag.
        tag: &'static str,
        /// The parameter name.
        param: &'static str,
        /// The offending value.
        value: f64,
        /// What the value must satisfy.
        requirement: &'static str,
    },

    /// The underlying sampler rejected the parameters.
    #[error("{tag} distribution rejected its parameters: {reason}")]
    Rejected { tag: &'static str, reason: String },

    /// The dominance coefficient is NaN or infinite.
    #[error("dominance coefficient must be finite (got {0})")]
    InvalidDominance(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKER_MEAN: f64 = -0.0596;
    const BOOKER_SHAPE: f64 = 0.186;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0)
    }

    #[test]
    fn untagged_type_is_neutral() {
        let mt = MutationType::from_tag(DEFAULT_DOMINANCE, None, &[]).unwrap();
        assert!(mt.is_neutral());
        let mut rng = rng();
        assert!((0..100).all(|_| mt.draw_selection_coefficient(&mut rng) == 0.0));
    }

    #[test]
    fn untagged_type_with_args_fails() {
        let res = MutationType::from_tag(DEFAULT_DOMINANCE, None, &[1.0]);
        assert!(matches!(
            res,
            Err(InvalidDistributionError::WrongArgCount { expected: 0, .. })
        ));
    }

    #[test]
    fn gamma_sample_mean_matches() {
        let mt = MutationType::from_tag(0.5, Some("g"), &[BOOKER_MEAN, BOOKER_SHAPE]).unwrap();
        let mut rng = rng();
        let n = 100_000;
        let draws = (0..n)
            .map(|_| mt.draw_selection_coefficient(&mut rng))
            .collect::<Vec<_>>();
        assert!(draws.iter().all(|&s| s <= 0.0));
        let mean = draws.iter().sum::<f64>() / n as f64;
        assert!(
            ((mean - BOOKER_MEAN) / BOOKER_MEAN).abs() < 0.05,
            "sample mean {mean} too far from {BOOKER_MEAN}"
        );
    }

    #[test]
    fn exponential_sample_mean_matches() {
        let mt = MutationType::new(0.5, EffectDist::Exponential { mean: 0.01 }).unwrap();
        let mut rng = rng();
        let n = 50_000;
        let mean = (0..n)
            .map(|_| mt.draw_selection_coefficient(&mut rng))
            .sum::<f64>()
            / n as f64;
        assert!((mean - 0.01).abs() / 0.01 < 0.05);
    }

    #[test]
    fn point_mass_returns_constant() {
        let mt = MutationType::from_tag(0.5, Some("f"), &[-0.01]).unwrap();
        assert_eq!(mt.distribution(), &EffectDist::PointMass { value: -0.01 });
        assert!(!mt.is_neutral());
        let mut rng = rng();
        assert!((0..10).all(|_| mt.draw_selection_coefficient(&mut rng) == -0.01));
    }

    #[test]
    fn uniform_stays_in_range() {
        let mt = MutationType::from_tag(0.5, Some("u"), &[-0.1, 0.1]).unwrap();
        let mut rng = rng();
        assert!((0..1000)
            .map(|_| mt.draw_selection_coefficient(&mut rng))
            .all(|s| (-0.1..=0.1).contains(&s)));
    }

    #[test]
    fn uniform_range_too_wide_fails() {
        let res = EffectDist::from_tag("u", &[0.0, f64::MAX]);
        assert!(matches!(
            res,
            Err(InvalidDistributionError::InvalidParam {
                tag: "uniform",
                param: "high",
                ..
            })
        ));
        let res = MutationType::from_tag(0.5, Some("u"), &[0.0, f64::MAX]);
        assert!(res.is_err());
        let res = MutationType::from_tag(0.5, Some("u"), &[-f64::MAX / 2.0, f64::MAX / 2.0]);
        assert!(res.is_err());
    }

    #[test]
    fn fixed_with_two_args_fails() {
        let res = EffectDist::from_tag("f", &[-0.01, 0.5]);
        let err = res.unwrap_err();
        assert_eq!(err, InvalidDistributionError::FixedArgCount(2));
        assert_eq!(err.to_string(), "fixed distribution takes 0 or 1 arguments, got 2");
    }

    #[test]
    fn negative_lognormal_is_negative() {
        let mt = MutationType::from_tag(0.5, Some("ln"), &[-3.0, 1.0]).unwrap();
        let mut rng = rng();
        assert!((0..1000).all(|_| mt.draw_selection_coefficient(&mut rng) < 0.0));
    }

    #[test]
    fn unknown_tag_fails() {
        let res = EffectDist::from_tag("beta", &[1.0, 2.0]);
        assert!(matches!(res, Err(InvalidDistributionError::UnknownTag(tag)) if tag == "beta"));
    }

    #[test]
    fn wrong_arg_count_fails() {
        let res = EffectDist::from_tag("g", &[-0.01]);
        assert!(matches!(
            res,
            Err(InvalidDistributionError::WrongArgCount {
                tag: "gamma",
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn gamma_zero_mean_fails() {
        let res = EffectDist::from_tag("g", &[0.0, 0.2]);
        assert!(matches!(
            res,
            Err(InvalidDistributionError::InvalidParam { param: "mean", .. })
        ));
    }

    #[test]
    fn gamma_non_positive_shape_fails() {
        let res = MutationType::new(
            0.5,
            EffectDist::Gamma {
                mean: -0.01,
                shape: 0.0,
            },
        );
        assert!(matches!(
            res,
            Err(InvalidDistributionError::InvalidParam { param: "shape", .. })
        ));
    }

    #[test]
    fn normal_negative_sd_fails() {
        let res = EffectDist::from_tag("n", &[0.0, -1.0]);
        assert!(matches!(
            res,
            Err(InvalidDistributionError::InvalidParam { param: "sd", .. })
        ));
    }

    #[test]
    fn non_finite_dominance_fails() {
        let res = MutationType::new(f64::NAN, EffectDist::Fixed);
        assert!(matches!(res, Err(InvalidDistributionError::InvalidDominance(..))));
    }

    #[test]
    fn deserialization_validates() {
        let ok: MutationType = serde_json::from_str(
            r#"{"dominance_coeff": 0.5, "distribution": {"type": "gamma", "mean": -0.01, "shape": 0.2}}"#,
        )
        .unwrap();
        assert_eq!(ok.distribution().tag(), "gamma");
        let neutral: MutationType = serde_json::from_str("{}").unwrap();
        assert!(neutral.is_neutral());
        assert_eq!(neutral.dominance_coeff(), DEFAULT_DOMINANCE);
        let bad = serde_json::from_str::<MutationType>(
            r#"{"distribution": {"type": "gamma", "mean": -0.01, "shape": -1.0}}"#,
        );
        assert!(bad.is_err());
    }
}
