use bevy::{
    asset::{AssetLoader, Assets, LoadContext, io::Reader},
    ecs::{
        change_detection::DetectChanges,
        system::{Res, ResMut},
    },
    log::info,
    reflect::TypePath,
};
use bevy_active_ragdoll_core::{
    config::RagdollOptions,
    skeleton::{Skeleton, serial::SkeletonSerial},
};

use crate::{components::ActiveRagdollOptions, errors::AssetLoaderError};

#[derive(Default, TypePath)]
pub struct RagdollOptionsLoader;

impl AssetLoader for RagdollOptionsLoader {
    type Asset = RagdollOptions;
    type Settings = ();
    type Error = AssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes).await?;
        let options = RagdollOptions::from_ron_bytes(&bytes)?;

        Ok(options)
    }

    fn extensions(&self) -> &[&str] {
        &["ragdoll.ron"]
    }
}

#[derive(Default, TypePath)]
pub struct SkeletonLoader;

impl AssetLoader for SkeletonLoader {
    type Asset = Skeleton;
    type Settings = ();
    type Error = AssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes).await?;
        let serial: SkeletonSerial = ron::de::from_bytes(&bytes)?;

        Ok(serial.to_value()?)
    }

    fn extensions(&self) -> &[&str] {
        &["skel.ron"]
    }
}

/// Copies the options asset into [`ActiveRagdollOptions`] when it is (re)loaded. Runs before
/// the driver, so every tick sees a single snapshot.
pub fn sync_ragdoll_options(
    mut active: ResMut<ActiveRagdollOptions>,
    assets: Res<Assets<RagdollOptions>>,
) {
    if !assets.is_changed() {
        return;
    }
    let Some(handle) = active.source.clone() else {
        return;
    };
    let Some(loaded) = assets.get(&handle) else {
        return;
    };
    if *loaded != active.options {
        info!("Ragdoll options reloaded");
        active.options = loaded.clone();
    }
}
