use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Missing prompt variable: {0}")]
    MissingVariable(String),

    #[error("Invalid template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Variable {0} must be a list of messages")]
    InvalidPlaceholderValue(String),

    #[error("Prompt hub request failed: {0}")]
    HubRequestError(#[from] reqwest::Error),

    #[error("Unsupported prompt manifest: {0}")]
    ManifestError(String),
}
