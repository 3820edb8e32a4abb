use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::error::{LossError, Result};

/// Loss weights for one attribute: `positive` scales the term of examples
/// labelled 1, `negative` the term of examples labelled 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeWeights {
    pub positive: f64,
    pub negative: f64,
}

impl Default for AttributeWeights {
    fn default() -> Self {
        AttributeWeights { positive: 1.0, negative: 1.0 }
    }
}

/// One `AttributeWeights` per attribute index, built once when the loss
/// layer is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeWeightTable {
    weights: Vec<AttributeWeights>,
}

impl AttributeWeightTable {
    /// Every attribute weighted (1, 1): the plain unweighted loss.
    pub fn uniform(attribute_count: usize) -> AttributeWeightTable {
        AttributeWeightTable {
            weights: vec![AttributeWeights::default(); attribute_count],
        }
    }

    /// Exponential rebalancing from per-attribute positive ratios:
    ///
    ///   positive_i = exp((1 - r_i) / ε²)
    ///   negative_i = exp(r_i / ε²)
    ///
    /// Rare positives get heavier positive weights. A larger ε flattens both
    /// weights toward 1.
    pub fn from_positive_ratio(
        attribute_count: usize,
        positive_ratio: &[f64],
        epsilon: f64,
    ) -> Result<AttributeWeightTable> {
        if positive_ratio.len() != attribute_count {
            return Err(LossError::config(format!(
                "positive_ratio has {} entries but the predictions have {} attributes",
                positive_ratio.len(),
                attribute_count
            )));
        }
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(LossError::config(format!("epsilon must be > 0, got {epsilon}")));
        }

        let eps2 = epsilon * epsilon;
        let weights = positive_ratio
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                if !(0.0..=1.0).contains(&r) {
                    warn!(attribute = i, ratio = r, "positive ratio outside [0, 1]");
                }
                AttributeWeights {
                    positive: ((1.0 - r) / eps2).exp(),
                    negative: (r / eps2).exp(),
                }
            })
            .collect();
        Ok(AttributeWeightTable { weights })
    }

    /// Uniform weights when `positive_ratio` is empty, rebalanced otherwise.
    pub fn build(
        attribute_count: usize,
        positive_ratio: &[f64],
        epsilon: f64,
    ) -> Result<AttributeWeightTable> {
        if positive_ratio.is_empty() {
            Ok(AttributeWeightTable::uniform(attribute_count))
        } else {
            AttributeWeightTable::from_positive_ratio(attribute_count, positive_ratio, epsilon)
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, attribute: usize) -> Option<&AttributeWeights> {
        self.weights.get(attribute)
    }

    pub fn as_slice(&self) -> &[AttributeWeights] {
        &self.weights
    }
}
