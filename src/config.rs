use crate::compiler::DEFAULT_PLACEHOLDER;

/// Names the locator and compiler look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Placeholder used when a builder function declares no parameter
    pub placeholder: String,
    /// Function whose builder compiles to a pipeline
    pub pipeline_builder: String,
    /// Function whose builder compiles to one operator expression
    pub operator_builder: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            pipeline_builder: "aggregate".to_string(),
            operator_builder: "aggregateOp".to_string(),
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_pipeline_builder(mut self, name: impl Into<String>) -> Self {
        self.pipeline_builder = name.into();
        self
    }

    pub fn with_operator_builder(mut self, name: impl Into<String>) -> Self {
        self.operator_builder = name.into();
        self
    }
}
