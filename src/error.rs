use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Failed to parse policy document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to decode policy document: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    #[error("Policy source error: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, PolicyError>;
