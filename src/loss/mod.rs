pub mod attribute_weights;
pub mod config;
pub mod multi_label;
pub mod normalization;

pub use attribute_weights::{AttributeWeights, AttributeWeightTable};
pub use config::LossConfig;
pub use multi_label::{MultiLabelSigmoidCrossEntropyLoss, LossState, Phase};
pub use normalization::{get_normalizer, NormalizationMode};
