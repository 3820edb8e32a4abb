pub mod layer;
pub mod sigmoid;
pub mod registry;

pub use layer::Layer;
pub use sigmoid::SigmoidLayer;
pub use registry::{LayerRegistry, LayerConstructor};
