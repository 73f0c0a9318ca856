use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing or invalid environment variable {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// `server.port` -> `CHATBOT_SERVER__PORT`
pub fn to_env_var(field_path: &str) -> String {
    format!(
        "{}_{}",
        super::ENV_PREFIX,
        field_path.to_uppercase().replace('.', "__")
    )
}
