use glam::Vec3;

/// Placement of a scene node. Rotation is yaw only; everything in this
/// scene stands upright on the ground plane.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    /// Radians about +Y.
    pub yaw: f32,
    pub scale: f32,
}

impl Transform {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            yaw: 0.0,
            scale: 1.0,
        }
    }

    /// World-space facing direction. Models face local +Z.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }
}

/// What a node is, so owners can find their own nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    GiftBox,
    Companion,
    Waste,
}

/// GPU-side resources a node holds. Released explicitly on disposal.
#[derive(Debug, Clone, Copy)]
pub struct Mesh {
    /// Distinct geometry buffers owned by this node.
    pub geometries: u32,
    /// Distinct materials owned by this node.
    pub materials: u32,
}

/// Per-instance surface tint, linear RGB in [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct Tint(pub [f32; 3]);

/// Facial blend parameters, indexed like the model's morph dictionary.
#[derive(Debug, Clone, Default)]
pub struct MorphWeights {
    pub names: Vec<String>,
    pub influences: Vec<f32>,
}

impl MorphWeights {
    pub fn new(names: Vec<String>) -> Self {
        let influences = vec![0.0; names.len()];
        Self { names, influences }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Tags a node as a waste marker.
#[derive(Debug, Clone, Copy)]
pub struct WasteMarker;
