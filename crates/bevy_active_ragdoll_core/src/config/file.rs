use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use bevy::log::info;

use super::RagdollOptions;
use crate::errors::ConfigError;

/// Options backed by a RON file on disk, reloaded only when the file's modification time
/// changes.
#[derive(Debug, Clone)]
pub struct OptionsFile {
    path: PathBuf,
    modified: Option<SystemTime>,
    options: RagdollOptions,
}

impl OptionsFile {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let modified = std::fs::metadata(&path)?.modified().ok();
        let options = RagdollOptions::from_ron_bytes(&std::fs::read(&path)?)?;
        Ok(Self {
            path,
            modified,
            options,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &RagdollOptions {
        &self.options
    }

    /// Returns `Ok(true)` when a new snapshot was loaded. On error the previous snapshot is
    /// kept.
    pub fn reload_if_modified(&mut self) -> Result<bool, ConfigError> {
        let modified = std::fs::metadata(&self.path)?.modified().ok();
        if modified.is_some() && modified == self.modified {
            return Ok(false);
        }

        let options = RagdollOptions::from_ron_bytes(&std::fs::read(&self.path)?)?;
        self.modified = modified;
        if options == self.options {
            return Ok(false);
        }
        info!("Reloaded ragdoll options from {:?}", self.path);
        self.options = options;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "bevy_active_ragdoll_{}_{name}.ragdoll.ron",
            std::process::id()
        ))
    }

    #[test]
    fn reloads_only_changed_contents() {
        let path = temp_path("reload");
        std::fs::write(&path, "(blend_in_time: 0.3)").unwrap();

        let mut file = OptionsFile::load(&path).unwrap();
        assert_eq!(file.options().blend_in_time, 0.3);
        assert!(!file.reload_if_modified().unwrap());

        std::fs::write(&path, "(blend_in_time: 0.6)").unwrap();
        // Coarse filesystem timestamps may not change; contents decide either way
        let reloaded = file.reload_if_modified().unwrap();
        if reloaded {
            assert_eq!(file.options().blend_in_time, 0.6);
        }

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn invalid_reload_keeps_previous_snapshot() {
        let path = temp_path("invalid");
        std::fs::write(&path, "(get_up_blend_time: 0.4)").unwrap();
        let mut file = OptionsFile::load(&path).unwrap();

        std::fs::write(&path, "(get_up_blend_time: -1.0, blend_in_time: 0.9)").unwrap();
        // Force the timestamp comparison to miss
        file.modified = None;
        assert!(file.reload_if_modified().is_err());
        assert_eq!(file.options().get_up_blend_time, 0.4);

        std::fs::remove_file(&path).unwrap();
    }
}
