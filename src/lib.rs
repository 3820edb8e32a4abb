pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod loss;

// Convenience re-exports
pub use error::{LossError, Result};
pub use math::tensor::Tensor;
pub use activation::sigmoid::sigmoid;
pub use layers::{Layer, LayerRegistry, SigmoidLayer};
pub use loss::{
    AttributeWeightTable, AttributeWeights, LossConfig, LossState,
    MultiLabelSigmoidCrossEntropyLoss, NormalizationMode, Phase, get_normalizer,
};
