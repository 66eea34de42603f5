use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read ragdoll options: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse ragdoll options: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("Invalid ragdoll option `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
