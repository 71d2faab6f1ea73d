use clap::ValueEnum;
use log::warn;
use std::fmt;

use super::discovery::DiscoveredLabels;

/// Decides which label values a mask's metadata will describe
pub trait LabelStrategy {
    /// Maps the distinct nonzero values of a mask to label values
    fn label_values(&self, discovered: &DiscoveredLabels) -> Vec<i64>;
}

/// Labels `1..=n` where `n` is the number of distinct nonzero values
///
/// Assumes the mask uses contiguous ids starting at 1. For sparse masks
/// such as `{1, 5, 9}` the generated values do not match the voxels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContiguousLabels;

impl LabelStrategy for ContiguousLabels {
    fn label_values(&self, discovered: &DiscoveredLabels) -> Vec<i64> {
        (1..=discovered.len() as i64).collect()
    }
}

/// Labels exactly the distinct nonzero values found in the mask
///
/// Fractional values are rounded to the nearest id. Values rounding to 0
/// are dropped, as 0 is the background label.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistinctValueLabels;

impl LabelStrategy for DistinctValueLabels {
    fn label_values(&self, discovered: &DiscoveredLabels) -> Vec<i64> {
        let values: Vec<i64> = discovered.integer_values().into_iter().collect();
        if values.len() < discovered.len() {
            warn!(
                "{} mask values collapsed to {} integer labels",
                discovered.len(),
                values.len()
            );
        }
        values
    }
}

/// Selectable label generation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LabelPolicy {
    /// Contiguous ids 1..=n
    #[default]
    Contiguous,
    /// Actual distinct mask values
    Distinct,
}

impl LabelPolicy {
    /// Returns the strategy implementing this policy
    pub fn strategy(&self) -> Box<dyn LabelStrategy> {
        match self {
            LabelPolicy::Contiguous => Box::new(ContiguousLabels),
            LabelPolicy::Distinct => Box::new(DistinctValueLabels),
        }
    }
}

impl fmt::Display for LabelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelPolicy::Contiguous => write!(f, "contiguous"),
            LabelPolicy::Distinct => write!(f, "distinct"),
        }
    }
}
