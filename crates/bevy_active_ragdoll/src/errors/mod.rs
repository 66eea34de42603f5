mod asset_loader_error;

pub use asset_loader_error::*;
