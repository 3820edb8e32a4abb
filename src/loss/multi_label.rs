//! Multi-label sigmoid cross-entropy with per-attribute class rebalancing.
//!
//! Each example carries `attribute_count` independent binary labels. The
//! negative log-likelihood of every label is scaled by the positive or
//! negative weight of its attribute (see `AttributeWeightTable`), summed over
//! the batch and divided by the normalizer of the configured mode.

use tracing::{debug, info, warn};

use crate::error::{LossError, Result};
use crate::layers::layer::Layer;
use crate::layers::sigmoid::SigmoidLayer;
use crate::loss::attribute_weights::AttributeWeightTable;
use crate::loss::config::LossConfig;
use crate::loss::normalization::{get_normalizer, NormalizationMode};
use crate::math::tensor::Tensor;

/// Where the layer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Built but not configured yet.
    Idle,
    /// Configured; waiting for the first reshape.
    Configured,
    /// Shapes are known; `forward` may run.
    Reshaped,
    /// At least one forward pass has produced a loss.
    Computed,
}

/// Bookkeeping of the most recent forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LossState {
    /// Batch size.
    pub outer_num: usize,
    /// Elements per example.
    pub inner_num: usize,
    pub valid_count: i64,
    pub normalizer: f64,
    /// The scalar output: summed loss divided by `normalizer`.
    pub loss: f64,
}

/// Loss layer over two inputs: raw prediction scores of shape
/// `(batch, attributes, ...)` and 0/1 targets with the same element count.
///
/// Owns the sigmoid that turns scores into probabilities. Not meant to be
/// driven from several threads at once; use one instance per thread.
#[derive(Debug)]
pub struct MultiLabelSigmoidCrossEntropyLoss {
    config: LossConfig,
    normalization: NormalizationMode,
    sigmoid: SigmoidLayer,
    weights: AttributeWeightTable,
    attribute_count: usize,
    prediction_shape: Vec<usize>,
    target_shape: Vec<usize>,
    outer_num: usize,
    inner_num: usize,
    state: LossState,
    phase: Phase,
    output: Tensor,
}

impl MultiLabelSigmoidCrossEntropyLoss {
    pub const TYPE_NAME: &'static str = "MultiLabelSigmoidCrossEntropyLoss";

    pub fn new(config: LossConfig) -> Result<Self> {
        config.validate()?;
        let normalization = config.resolved_normalization();
        Ok(MultiLabelSigmoidCrossEntropyLoss {
            config,
            normalization,
            sigmoid: SigmoidLayer::new(),
            weights: AttributeWeightTable::uniform(0),
            attribute_count: 0,
            prediction_shape: Vec::new(),
            target_shape: Vec::new(),
            outer_num: 0,
            inner_num: 0,
            state: LossState::default(),
            phase: Phase::Idle,
            output: Tensor::scalar(0.0),
        })
    }

    pub fn config(&self) -> &LossConfig {
        &self.config
    }

    pub fn normalization(&self) -> NormalizationMode {
        self.normalization
    }

    pub fn attribute_count(&self) -> usize {
        self.attribute_count
    }

    pub fn weights(&self) -> &AttributeWeightTable {
        &self.weights
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// State of the last forward pass, if one has run.
    pub fn last_state(&self) -> Option<&LossState> {
        match self.phase {
            Phase::Computed => Some(&self.state),
            _ => None,
        }
    }

    /// Output scalar of the last forward pass.
    pub fn loss(&self) -> f64 {
        self.output.data()[0]
    }

    /// `loss()` scaled by the configured loss weight.
    pub fn weighted_loss(&self) -> f64 {
        self.loss() * self.config.resolved_loss_weight()
    }

    /// Probabilities computed by the inner sigmoid in the last forward pass.
    pub fn probabilities(&self) -> &Tensor {
        self.sigmoid.output()
    }

    fn inputs<'a>(bottom: &[&'a Tensor]) -> Result<(&'a Tensor, &'a Tensor)> {
        match bottom {
            [predictions, targets] => Ok((*predictions, *targets)),
            _ => Err(LossError::shape(format!(
                "{} takes predictions and targets, got {} inputs",
                Self::TYPE_NAME,
                bottom.len()
            ))),
        }
    }

    /// Weighted negative log-likelihood over every element.
    ///
    /// Targets are truncated to integers. Values other than 0 and 1 add
    /// nothing to the sum yet are still counted as valid, so `valid_count`
    /// always ends up equal to the element count.
    fn accumulate(&self, probabilities: &[f64], targets: &[f64]) -> (f64, i64) {
        let weights = self.weights.as_slice();
        let mut loss = 0.0;
        let mut valid_count = 0i64;
        for (i, (&p, &t)) in probabilities.iter().zip(targets).enumerate() {
            let w = &weights[i % self.attribute_count];
            match t as i64 {
                1 => loss -= w.positive * p.ln(),
                0 => loss -= w.negative * (1.0 - p).ln(),
                _ => {}
            }
            valid_count += 1;
        }
        (loss, valid_count)
    }
}

impl Layer for MultiLabelSigmoidCrossEntropyLoss {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    /// Fixes the attribute count from the predictions' second axis and
    /// builds the weight table. Runs once; the table never changes afterwards.
    fn configure(&mut self, bottom: &[&Tensor]) -> Result<()> {
        if self.phase != Phase::Idle {
            return Err(LossError::config(format!("{} is already configured", Self::TYPE_NAME)));
        }
        let (predictions, _) = Self::inputs(bottom)?;
        let attribute_count = predictions.dim(1).ok_or_else(|| {
            LossError::shape(format!(
                "predictions need a (batch, attributes) shape, got {:?}",
                predictions.shape()
            ))
        })?;
        if attribute_count == 0 {
            return Err(LossError::shape("predictions have zero attributes"));
        }

        if self.config.ignore_label.is_some() {
            warn!("ignore_label is not supported by {} and has no effect", Self::TYPE_NAME);
        }

        self.weights = AttributeWeightTable::build(
            attribute_count,
            &self.config.positive_ratio,
            self.config.epsilon,
        )?;
        self.sigmoid.configure(&[predictions])?;
        self.attribute_count = attribute_count;
        self.phase = Phase::Configured;

        info!(
            attribute_count,
            normalization = %self.normalization,
            weighted = !self.config.positive_ratio.is_empty(),
            "multi-label loss configured"
        );
        Ok(())
    }

    fn reshape(&mut self, bottom: &[&Tensor]) -> Result<()> {
        if self.phase == Phase::Idle {
            return Err(LossError::fatal(format!(
                "{} reshaped before configure",
                Self::TYPE_NAME
            )));
        }
        let (predictions, targets) = Self::inputs(bottom)?;
        if predictions.count() != targets.count() {
            return Err(LossError::shape(format!(
                "predictions and targets must have the same count: {} vs {}",
                predictions.count(),
                targets.count()
            )));
        }
        self.outer_num = predictions.dim(0).unwrap_or(0);
        self.inner_num = predictions.count_from(1);
        self.prediction_shape = predictions.shape().to_vec();
        self.target_shape = targets.shape().to_vec();
        self.sigmoid.reshape(&[predictions])?;
        self.output.reshape(&[]);
        if self.phase == Phase::Configured {
            self.phase = Phase::Reshaped;
        }

        debug!(outer_num = self.outer_num, inner_num = self.inner_num, "multi-label loss reshaped");
        Ok(())
    }

    /// Re-runs `reshape` first when the input shapes differ from the last call.
    fn forward(&mut self, bottom: &[&Tensor]) -> Result<&Tensor> {
        let (predictions, targets) = Self::inputs(bottom)?;
        match self.phase {
            Phase::Idle => {
                return Err(LossError::fatal(format!(
                    "{} forward before configure",
                    Self::TYPE_NAME
                )))
            }
            Phase::Configured => self.reshape(bottom)?,
            Phase::Reshaped | Phase::Computed => {
                if predictions.shape() != self.prediction_shape.as_slice()
                    || targets.shape() != self.target_shape.as_slice()
                {
                    self.reshape(bottom)?;
                }
            }
        }

        self.sigmoid.forward(&[predictions])?;
        let (loss, valid_count) = self.accumulate(self.sigmoid.output().data(), targets.data());
        let normalizer = get_normalizer(self.normalization, self.outer_num, self.inner_num, valid_count);

        self.state = LossState {
            outer_num: self.outer_num,
            inner_num: self.inner_num,
            valid_count,
            normalizer,
            loss: loss / normalizer,
        };
        self.output.data_mut()[0] = self.state.loss;
        self.phase = Phase::Computed;

        debug!(
            raw_loss = loss,
            valid_count,
            normalizer,
            loss = self.state.loss,
            "multi-label loss forward"
        );
        Ok(&self.output)
    }

    fn output(&self) -> &Tensor {
        &self.output
    }
}
