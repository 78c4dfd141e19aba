/// Time measured in generations before the present.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialOrd,
    PartialEq,
    derive_more::Add,
    derive_more::Sub,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct Generations(f64);

impl Generations {
    pub const ZERO: Generations = Self::new(0.0);

    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    pub const fn into_f64(self) -> f64 {
        self.0
    }

    /// Converts a time given in units of `4 * n_ref` generations, the usual coalescent scaling.
    pub fn from_coalescent(t: f64, n_ref: f64) -> Self {
        Self(t * 4.0 * n_ref)
    }
}

impl From<f64> for Generations {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Generations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} generations", self.0)
    }
}

/// A physical sequence length.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    PartialEq,
    Eq,
    Hash,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Sum,
    derive_more::FromStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct BasePairs(u64);

impl BasePairs {
    pub const ZERO: BasePairs = Self::new(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn into_u64(self) -> u64 {
        self.0
    }

    pub fn into_f64(self) -> f64 {
        self.0 as f64
    }
}

impl From<u64> for BasePairs {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for BasePairs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}bp", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalescent_scaling() {
        let t = Generations::from_coalescent(0.5, 100_000.0);
        assert_eq!(t, Generations::new(200_000.0));
    }

    #[test]
    fn base_pairs_sum() {
        let total = [BasePairs::new(10), BasePairs::new(32)]
            .into_iter()
            .sum::<BasePairs>();
        assert_eq!(total, BasePairs::new(42));
        assert_eq!(total.to_string(), "42bp");
    }
}
