use tracing::debug;

use crate::activation::sigmoid::sigmoid;
use crate::error::{LossError, Result};
use crate::layers::layer::Layer;
use crate::math::tensor::Tensor;

/// Element-wise sigmoid over a single input; the output keeps the input shape.
#[derive(Debug, Default)]
pub struct SigmoidLayer {
    output: Tensor,
}

impl SigmoidLayer {
    pub fn new() -> SigmoidLayer {
        SigmoidLayer { output: Tensor::default() }
    }

    fn input<'a>(bottom: &[&'a Tensor]) -> Result<&'a Tensor> {
        match bottom {
            [input, ..] => Ok(*input),
            [] => Err(LossError::shape("Sigmoid layer needs one input")),
        }
    }
}

impl Layer for SigmoidLayer {
    fn type_name(&self) -> &'static str {
        "Sigmoid"
    }

    fn configure(&mut self, bottom: &[&Tensor]) -> Result<()> {
        Self::input(bottom).map(|_| ())
    }

    fn reshape(&mut self, bottom: &[&Tensor]) -> Result<()> {
        let input = Self::input(bottom)?;
        if self.output.shape() != input.shape() {
            debug!(shape = ?input.shape(), "sigmoid output reshaped");
            self.output.reshape(input.shape());
        }
        Ok(())
    }

    fn forward(&mut self, bottom: &[&Tensor]) -> Result<&Tensor> {
        let input = Self::input(bottom)?;
        if input.count() != self.output.count() {
            return Err(LossError::fatal(format!(
                "sigmoid forward on {} elements but output holds {}; reshape first",
                input.count(),
                self.output.count()
            )));
        }
        for (out, &x) in self.output.data_mut().iter_mut().zip(input.data()) {
            *out = sigmoid(x);
        }
        Ok(&self.output)
    }

    fn output(&self) -> &Tensor {
        &self.output
    }
}
