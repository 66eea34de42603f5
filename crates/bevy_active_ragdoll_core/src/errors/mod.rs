mod config_error;
mod physics_error;
mod queue_error;
mod ragdoll_error;
mod skeleton_error;

pub use config_error::*;
pub use physics_error::*;
pub use queue_error::*;
pub use ragdoll_error::*;
pub use skeleton_error::*;
