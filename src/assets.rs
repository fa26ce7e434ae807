//! Asset provider seam. The core asks for a model by path and gets back
//! its clip list and facial blend parameters; decoding is someone else's
//! problem.

use std::collections::HashMap;

use thiserror::Error;

pub const GIFT_BOX_PATH: &str = "models/GiftBox/gift_loot_box_thing_wip.glb";
pub const ROBOT_PATH: &str = "models/RobotExpressive/RobotExpressive.glb";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("malformed asset {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// A named, timed animation track.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    pub name: String,
    /// Seconds.
    pub duration: f32,
}

impl ClipInfo {
    pub fn new(name: &str, duration: f32) -> Self {
        Self {
            name: name.to_string(),
            duration,
        }
    }
}

/// A loaded model: clips plus whatever drives the face.
#[derive(Debug, Clone, Default)]
pub struct ModelAsset {
    pub clips: Vec<ClipInfo>,
    /// Morph target names on the face mesh, in dictionary order.
    pub morph_targets: Vec<String>,
    pub geometries: u32,
    pub materials: u32,
}

pub trait AssetProvider {
    fn load(&mut self, path: &str) -> Result<ModelAsset, AssetError>;
}

/// In-memory provider keyed by asset path.
#[derive(Default)]
pub struct AssetLibrary {
    models: HashMap<String, ModelAsset>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding the gift box and the robot as they ship.
    pub fn bundled() -> Self {
        let mut lib = Self::new();
        lib.insert(
            GIFT_BOX_PATH,
            ModelAsset {
                clips: vec![ClipInfo::new("Take 001", 2.4)],
                morph_targets: Vec::new(),
                geometries: 4,
                materials: 5,
            },
        );
        lib.insert(
            ROBOT_PATH,
            ModelAsset {
                clips: vec![
                    ClipInfo::new("Idle", 4.0),
                    ClipInfo::new("Walking", 1.2),
                    ClipInfo::new("Running", 0.8),
                    ClipInfo::new("Dance", 3.0),
                    ClipInfo::new("Death", 1.6),
                    ClipInfo::new("Jump", 1.0),
                    ClipInfo::new("ThumbsUp", 1.5),
                    ClipInfo::new("Wave", 2.0),
                    ClipInfo::new("Yes", 1.3),
                    ClipInfo::new("No", 1.3),
                ],
                morph_targets: vec!["Angry".into(), "Surprised".into(), "Sad".into()],
                geometries: 12,
                materials: 6,
            },
        );
        lib
    }

    pub fn insert(&mut self, path: &str, model: ModelAsset) {
        self.models.insert(path.to_string(), model);
    }

    pub fn remove(&mut self, path: &str) -> Option<ModelAsset> {
        self.models.remove(path)
    }
}

impl AssetProvider for AssetLibrary {
    fn load(&mut self, path: &str) -> Result<ModelAsset, AssetError> {
        let model = self
            .models
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        if let Some(bad) = model.clips.iter().find(|c| !(c.duration > 0.0)) {
            return Err(AssetError::Malformed {
                path: path.to_string(),
                reason: format!("clip {:?} has no duration", bad.name),
            });
        }
        Ok(model)
    }
}
