//! Render surface: the spatial container that owns every visible node.
//!
//! Backed by a `hecs::World`; each node is an entity carrying at least a
//! [`NodeKind`], a [`Transform`] and a [`Mesh`]. Only the component that
//! added a node removes it.

use crate::ecs::components::{Mesh, MorphWeights, NodeKind, Transform};

/// Running totals of GPU resources given back by disposed nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Released {
    pub geometries: u32,
    pub materials: u32,
}

pub struct Scene {
    world: hecs::World,
    released: Released,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            released: Released::default(),
        }
    }

    /// Add a node to the surface.
    pub fn add(&mut self, kind: NodeKind, transform: Transform, mesh: Mesh) -> hecs::Entity {
        let node = self.world.spawn((kind, transform, mesh));
        log::trace!("scene: added {kind:?} node {node:?}");
        node
    }

    /// Attach an extra component (tint, morph weights, tags) to a live node.
    pub fn attach<C: hecs::Component>(&mut self, node: hecs::Entity, component: C) -> bool {
        self.world.insert_one(node, component).is_ok()
    }

    /// Detach a node without releasing its resources.
    pub fn remove(&mut self, node: hecs::Entity) -> bool {
        self.world.despawn(node).is_ok()
    }

    /// Detach a node and release the geometry/material it owned.
    pub fn dispose(&mut self, node: hecs::Entity) -> bool {
        let mesh = self.world.get::<&Mesh>(node).ok().map(|m| *m);
        if !self.remove(node) {
            return false;
        }
        if let Some(mesh) = mesh {
            self.released.geometries += mesh.geometries;
            self.released.materials += mesh.materials;
        }
        true
    }

    pub fn transform(&self, node: hecs::Entity) -> Option<Transform> {
        self.world.get::<&Transform>(node).ok().map(|t| *t)
    }

    /// Run `f` against a node's morph weights, if it has any.
    pub fn with_morphs<R>(
        &mut self,
        node: hecs::Entity,
        f: impl FnOnce(&mut MorphWeights) -> R,
    ) -> Option<R> {
        let mut morphs = self.world.get::<&mut MorphWeights>(node).ok()?;
        Some(f(&mut morphs))
    }

    /// Number of live nodes of a kind.
    pub fn count(&self, kind: NodeKind) -> usize {
        self.world
            .query::<&NodeKind>()
            .iter()
            .filter(|(_, k)| **k == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn released(&self) -> Released {
        self.released
    }
}
