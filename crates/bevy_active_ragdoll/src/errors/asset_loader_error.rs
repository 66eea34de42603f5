use bevy_active_ragdoll_core::errors::{ConfigError, SkeletonError};
use thiserror::Error;

/// Errors produced by the ragdoll asset loaders
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AssetLoaderError {
    #[error("Could not read asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse RON: {0}")]
    RonSpannedError(#[from] ron::error::SpannedError),
    #[error("Invalid ragdoll options: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid ragdoll skeleton: {0}")]
    Skeleton(#[from] SkeletonError),
}
