use crate::schemas::FunctionDefinition;

/// Per-call settings a model honours when generating.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub functions: Option<Vec<FunctionDefinition>>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_functions(mut self, functions: Vec<FunctionDefinition>) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Overlays every option set on `incoming_options` onto `self`.
    pub fn merge_options(&mut self, incoming_options: CallOptions) {
        self.max_tokens = incoming_options.max_tokens.or(self.max_tokens);
        self.temperature = incoming_options.temperature.or(self.temperature);
        self.functions = incoming_options.functions.or(self.functions.take());
    }
}
