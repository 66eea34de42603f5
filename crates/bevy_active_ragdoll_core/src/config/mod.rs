mod file;
mod options;

pub use file::OptionsFile;
pub use options::RagdollOptions;
