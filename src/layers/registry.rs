use std::collections::HashMap;

use crate::error::{LossError, Result};
use crate::layers::layer::Layer;
use crate::layers::sigmoid::SigmoidLayer;
use crate::loss::config::LossConfig;
use crate::loss::multi_label::MultiLabelSigmoidCrossEntropyLoss;

/// Builds a boxed layer from its config.
pub type LayerConstructor = fn(&LossConfig) -> Result<Box<dyn Layer>>;

/// Maps layer type names to constructors.
///
/// Nothing registers itself: callers populate the registry explicitly, or
/// start from `with_builtin()`.
#[derive(Default)]
pub struct LayerRegistry {
    constructors: HashMap<String, LayerConstructor>,
}

impl LayerRegistry {
    pub fn new() -> LayerRegistry {
        LayerRegistry { constructors: HashMap::new() }
    }

    /// Registry holding every layer type this crate ships.
    pub fn with_builtin() -> LayerRegistry {
        let mut registry = LayerRegistry::new();
        registry.register("Sigmoid", |_| Ok(Box::new(SigmoidLayer::new())));
        registry.register(MultiLabelSigmoidCrossEntropyLoss::TYPE_NAME, |config| {
            Ok(Box::new(MultiLabelSigmoidCrossEntropyLoss::new(config.clone())?))
        });
        registry
    }

    /// Adds or replaces the constructor for `name`. Returns true when an
    /// earlier entry was replaced.
    pub fn register(&mut self, name: &str, constructor: LayerConstructor) -> bool {
        self.constructors.insert(name.to_string(), constructor).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn create(&self, name: &str, config: &LossConfig) -> Result<Box<dyn Layer>> {
        let constructor = self.constructors.get(name).ok_or_else(|| {
            LossError::config(format!(
                "unknown layer type '{}' (known: {})",
                name,
                self.names().join(", ")
            ))
        })?;
        constructor(config)
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_types_are_known() {
        let registry = LayerRegistry::with_builtin();
        assert_eq!(registry.names(), vec!["MultiLabelSigmoidCrossEntropyLoss", "Sigmoid"]);
        let layer = registry.create("Sigmoid", &LossConfig::default()).unwrap();
        assert_eq!(layer.type_name(), "Sigmoid");
    }

    #[test]
    fn unknown_type_is_a_config_error() {
        let registry = LayerRegistry::new();
        let err = registry.create("Sigmoid", &LossConfig::default()).err().unwrap();
        assert!(matches!(err, LossError::Config { .. }));
    }

    #[test]
    fn register_reports_replacement() {
        let mut registry = LayerRegistry::new();
        assert!(!registry.register("Sigmoid", |_| Ok(Box::new(SigmoidLayer::new()))));
        assert!(registry.register("Sigmoid", |_| Ok(Box::new(SigmoidLayer::new()))));
        assert!(registry.contains("Sigmoid"));
    }
}
