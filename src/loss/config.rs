use serde::{Serialize, Deserialize};

use crate::error::{LossError, Result};
use crate::loss::normalization::NormalizationMode;

fn default_epsilon() -> f64 {
    1.0
}

/// Settings for `MultiLabelSigmoidCrossEntropyLoss`.
///
/// Every field is optional in JSON, so `{}` is a valid config: unweighted
/// loss, normalized by batch size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossConfig {
    /// Per-attribute frequency of the positive label. Empty disables
    /// rebalancing; otherwise it must have one entry per attribute.
    #[serde(default)]
    pub positive_ratio: Vec<f64>,
    /// Smoothing constant of the rebalancing weights. Defaults to 1, which
    /// keeps the weights between 1 and e.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalization: Option<NormalizationMode>,
    /// Legacy switch, only read when `normalization` is absent:
    /// `true` → VALID, `false` → BATCH_SIZE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize: Option<bool>,
    /// Accepted for compatibility; has no effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_label: Option<i64>,
    /// Factor the surrounding net applies to this loss; 1 when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_weight: Option<f64>,
}

impl Default for LossConfig {
    fn default() -> Self {
        LossConfig {
            positive_ratio: Vec::new(),
            epsilon: default_epsilon(),
            normalization: None,
            normalize: None,
            ignore_label: None,
            loss_weight: None,
        }
    }
}

impl LossConfig {
    pub fn with_normalization(mut self, mode: NormalizationMode) -> Self {
        self.normalization = Some(mode);
        self
    }

    pub fn with_positive_ratio(mut self, positive_ratio: Vec<f64>, epsilon: f64) -> Self {
        self.positive_ratio = positive_ratio;
        self.epsilon = epsilon;
        self
    }

    /// Explicit mode first, then the legacy `normalize` flag, then BATCH_SIZE.
    pub fn resolved_normalization(&self) -> NormalizationMode {
        match (self.normalization, self.normalize) {
            (Some(mode), _) => mode,
            (None, Some(true)) => NormalizationMode::Valid,
            (None, Some(false)) => NormalizationMode::BatchSize,
            (None, None) => NormalizationMode::BatchSize,
        }
    }

    pub fn resolved_loss_weight(&self) -> f64 {
        self.loss_weight.unwrap_or(1.0)
    }

    /// Checks what can be checked without knowing the attribute count.
    pub fn validate(&self) -> Result<()> {
        if !self.positive_ratio.is_empty() && !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(LossError::config(format!(
                "epsilon must be > 0 when positive_ratio is set, got {}",
                self.epsilon
            )));
        }
        if let Some(w) = self.loss_weight {
            if !w.is_finite() {
                return Err(LossError::config(format!("loss_weight must be finite, got {w}")));
            }
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<LossConfig> {
        let config: LossConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads and validates a config from a JSON file.
    pub fn load_json(path: &str) -> Result<LossConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: LossConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_default() {
        let config = LossConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LossConfig::default());
        assert_eq!(config.resolved_normalization(), NormalizationMode::BatchSize);
        assert_eq!(config.resolved_loss_weight(), 1.0);
    }

    #[test]
    fn default_epsilon_keeps_weights_between_one_and_e() {
        let config = LossConfig::default();
        assert_eq!(config.epsilon, 1.0);
        let from_json = LossConfig::from_json_str(r#"{"positive_ratio": [0.0, 1.0]}"#).unwrap();
        assert_eq!(from_json.epsilon, 1.0);

        let table = crate::loss::attribute_weights::AttributeWeightTable::build(
            2,
            &from_json.positive_ratio,
            from_json.epsilon,
        )
        .unwrap();
        let e = 1f64.exp();
        assert!(table.as_slice().iter().all(|w| (1.0..=e).contains(&w.positive) && (1.0..=e).contains(&w.negative)));
    }

    #[test]
    fn legacy_normalize_flag() {
        let on = LossConfig { normalize: Some(true), ..LossConfig::default() };
        let off = LossConfig { normalize: Some(false), ..LossConfig::default() };
        assert_eq!(on.resolved_normalization(), NormalizationMode::Valid);
        assert_eq!(off.resolved_normalization(), NormalizationMode::BatchSize);
    }

    #[test]
    fn explicit_mode_wins_over_legacy_flag() {
        let config = LossConfig {
            normalization: Some(NormalizationMode::None),
            normalize: Some(true),
            ..LossConfig::default()
        };
        assert_eq!(config.resolved_normalization(), NormalizationMode::None);
    }

    #[test]
    fn parses_full_document() {
        let json = r#"{
            "positive_ratio": [0.1, 0.7],
            "epsilon": 0.5,
            "normalization": "FULL",
            "ignore_label": -1,
            "loss_weight": 2.0
        }"#;
        let config = LossConfig::from_json_str(json).unwrap();
        assert_eq!(config.positive_ratio, vec![0.1, 0.7]);
        assert_eq!(config.epsilon, 0.5);
        assert_eq!(config.resolved_normalization(), NormalizationMode::Full);
        assert_eq!(config.ignore_label, Some(-1));
        assert_eq!(config.resolved_loss_weight(), 2.0);
    }

    #[test]
    fn rejects_zero_epsilon_with_ratios() {
        let err = LossConfig::from_json_str(r#"{"positive_ratio": [0.5], "epsilon": 0.0}"#)
            .unwrap_err();
        assert!(matches!(err, LossError::Config { .. }));
        // epsilon is unused without ratios
        assert!(LossConfig::from_json_str(r#"{"epsilon": 0.0}"#).is_ok());
    }

    #[test]
    fn rejects_unknown_mode_name() {
        let err = LossConfig::from_json_str(r#"{"normalization": "MEAN"}"#).unwrap_err();
        assert!(matches!(err, LossError::Json(_)));
    }
}
