use crate::error::Result;
use crate::math::tensor::Tensor;

/// Lifecycle shared by every layer.
///
/// `bottom` holds the layer's inputs in order. Each layer owns its output
/// buffer, which `forward` fills and returns.
///
/// 1. `configure` once, with the first batch of inputs.
/// 2. `reshape` whenever the input shapes change.
/// 3. `forward` every iteration.
pub trait Layer {
    /// Registry name of the concrete layer type.
    fn type_name(&self) -> &'static str;

    fn configure(&mut self, bottom: &[&Tensor]) -> Result<()>;

    fn reshape(&mut self, bottom: &[&Tensor]) -> Result<()>;

    fn forward(&mut self, bottom: &[&Tensor]) -> Result<&Tensor>;

    /// Output of the most recent `forward`.
    fn output(&self) -> &Tensor;
}
