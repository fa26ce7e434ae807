//! Procedural waste markers dropped behind the companion.
//!
//! On every period the spawner proposes a spot: the trail point two units
//! behind the companion, jittered on the ground plane. Spots too close to a
//! live marker are resampled a bounded number of times; if every proposal
//! collides the tick is skipped.

use glam::Vec3;

use crate::config::Tuning;
use crate::ecs::components::{Mesh, NodeKind, Tint, Transform, WasteMarker};
use crate::scene::Scene;
use crate::util::timer::Interval;

/// #b89682
const BASE_COLOR: [f32; 3] = [0.722, 0.588, 0.510];
const HUE_JITTER: f32 = 0.06;
const SAT_JITTER: f32 = 0.1;
const LIGHT_JITTER: f32 = 0.08;

pub struct WasteSpawner {
    schedule: Interval,
    markers: Vec<hecs::Entity>,
    trail: f32,
    jitter: f32,
    height: f32,
    min_separation: f32,
    attempts: u32,
}

impl WasteSpawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            schedule: Interval::new(tuning.waste_period),
            markers: Vec::new(),
            trail: tuning.waste_trail,
            jitter: tuning.waste_jitter,
            height: tuning.waste_height,
            min_separation: tuning.waste_min_separation,
            attempts: tuning.waste_attempts.max(1),
        }
    }

    /// Arm the periodic schedule, dropping any previous one.
    pub fn start(&mut self) {
        self.schedule.start();
    }

    pub fn stop(&mut self) {
        self.schedule.stop();
    }

    pub fn is_running(&self) -> bool {
        self.schedule.is_running()
    }

    /// Advance the schedule. Each completed period proposes one marker,
    /// but only while the companion is alive. Returns markers added.
    pub fn tick(
        &mut self,
        dt: f32,
        alive: bool,
        companion: &Transform,
        scene: &mut Scene,
        rng: &mut fastrand::Rng,
    ) -> usize {
        let fires = self.schedule.tick(dt);
        let mut added = 0;
        for _ in 0..fires {
            if alive && self.spawn(companion, scene, rng).is_some() {
                added += 1;
            }
        }
        added
    }

    /// Propose and place one marker. `None` when every attempt collided.
    pub fn spawn(
        &mut self,
        companion: &Transform,
        scene: &mut Scene,
        rng: &mut fastrand::Rng,
    ) -> Option<hecs::Entity> {
        let live = self.positions(scene);
        let position = (0..self.attempts)
            .map(|_| self.propose(companion, rng))
            .find(|candidate| {
                live.iter()
                    .all(|p| p.distance(*candidate) >= self.min_separation)
            });

        let Some(position) = position else {
            log::debug!(
                "waste placement exhausted after {} attempts, skipping",
                self.attempts
            );
            return None;
        };

        let mut transform = Transform::at(position);
        transform.yaw = rng.f32() * std::f32::consts::TAU;
        // Geometry is shared across markers; each owns its material.
        let node = scene.add(
            NodeKind::Waste,
            transform,
            Mesh {
                geometries: 0,
                materials: 1,
            },
        );
        scene.attach(node, WasteMarker);
        scene.attach(node, Tint(jittered_color(rng)));
        self.markers.push(node);
        log::debug!("waste dropped at {position:?} ({} live)", self.markers.len());
        Some(node)
    }

    fn propose(&self, companion: &Transform, rng: &mut fastrand::Rng) -> Vec3 {
        let behind = companion.translation - companion.forward() * self.trail;
        let dx = (rng.f32() * 2.0 - 1.0) * self.jitter;
        let dz = (rng.f32() * 2.0 - 1.0) * self.jitter;
        Vec3::new(behind.x + dx, self.height, behind.z + dz)
    }

    /// Remove every live marker and release its material.
    pub fn clear_all(&mut self, scene: &mut Scene) -> usize {
        let count = self.markers.len();
        for node in self.markers.drain(..) {
            scene.dispose(node);
        }
        if count > 0 {
            log::debug!("cleared {count} waste markers");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn positions(&self, scene: &Scene) -> Vec<Vec3> {
        self.markers
            .iter()
            .filter_map(|&n| scene.transform(n))
            .map(|t| t.translation)
            .collect()
    }
}

fn jittered_color(rng: &mut fastrand::Rng) -> [f32; 3] {
    let [h, s, l] = rgb_to_hsl(BASE_COLOR);
    let h = (h + (rng.f32() - 0.5) * HUE_JITTER).clamp(0.0, 1.0);
    let s = (s + (rng.f32() - 0.5) * SAT_JITTER).clamp(0.0, 1.0);
    let l = (l + (rng.f32() - 0.5) * LIGHT_JITTER).clamp(0.0, 1.0);
    hsl_to_rgb([h, s, l])
}

fn rgb_to_hsl([r, g, b]: [f32; 3]) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) * 0.5;
    if max == min {
        return [0.0, 0.0, l];
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    [h / 6.0, s, l]
}

fn hsl_to_rgb([h, s, l]: [f32; 3]) -> [f32; 3] {
    if s == 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |mut t: f32| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawner() -> WasteSpawner {
        WasteSpawner::new(&Tuning::default())
    }

    fn companion() -> Transform {
        Transform::at(Vec3::ZERO)
    }

    #[test]
    fn markers_trail_behind_companion() {
        let mut scene = Scene::new();
        let mut rng = fastrand::Rng::with_seed(7);
        let mut w = spawner();
        let node = w.spawn(&companion(), &mut scene, &mut rng).unwrap();
        let p = scene.transform(node).unwrap().translation;
        // Facing +Z, so behind is around z = -2.
        assert!(p.z <= -1.0 && p.z >= -3.0, "z was {}", p.z);
        assert!(p.x.abs() <= 1.0);
        assert_eq!(p.y, 0.25);
    }

    #[test]
    fn live_markers_keep_separation() {
        let mut scene = Scene::new();
        let mut rng = fastrand::Rng::with_seed(42);
        let mut w = spawner();
        for _ in 0..40 {
            w.spawn(&companion(), &mut scene, &mut rng);
        }
        let pts = w.positions(&scene);
        assert!(!pts.is_empty());
        for (i, a) in pts.iter().enumerate() {
            for b in &pts[i + 1..] {
                assert!(a.distance(*b) >= 0.8, "{a:?} vs {b:?}");
            }
        }
        // A 2x2 jitter box can't hold 40 markers 0.8 apart.
        assert!(pts.len() < 40);
    }

    #[test]
    fn exhausted_placement_skips_tick() {
        let mut scene = Scene::new();
        let mut rng = fastrand::Rng::with_seed(1);
        let tuning = Tuning {
            waste_min_separation: 100.0,
            ..Tuning::default()
        };
        let mut w = WasteSpawner::new(&tuning);
        assert!(w.spawn(&companion(), &mut scene, &mut rng).is_some());
        assert!(w.spawn(&companion(), &mut scene, &mut rng).is_none());
        assert_eq!(w.len(), 1);
        assert_eq!(scene.count(NodeKind::Waste), 1);
    }

    #[test]
    fn schedule_only_spawns_while_alive() {
        let mut scene = Scene::new();
        let mut rng = fastrand::Rng::with_seed(3);
        let mut w = spawner();
        w.start();
        assert_eq!(w.tick(14.9, true, &companion(), &mut scene, &mut rng), 0);
        assert_eq!(w.tick(0.2, true, &companion(), &mut scene, &mut rng), 1);
        assert_eq!(w.tick(15.0, false, &companion(), &mut scene, &mut rng), 0);
        w.stop();
        assert_eq!(w.tick(60.0, true, &companion(), &mut scene, &mut rng), 0);
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn clear_all_releases_materials() {
        let mut scene = Scene::new();
        let mut rng = fastrand::Rng::with_seed(9);
        let mut w = spawner();
        w.spawn(&companion(), &mut scene, &mut rng);
        w.spawn(&companion(), &mut scene, &mut rng);
        let n = w.len();
        assert_eq!(w.clear_all(&mut scene), n);
        assert!(w.is_empty());
        assert_eq!(scene.count(NodeKind::Waste), 0);
        assert_eq!(scene.released().materials, n as u32);
        assert_eq!(scene.released().geometries, 0);
    }

    #[test]
    fn hsl_round_trip_base_color() {
        let back = hsl_to_rgb(rgb_to_hsl(BASE_COLOR));
        for (a, b) in back.iter().zip(BASE_COLOR.iter()) {
            assert!((a - b).abs() < 1e-4);
        }
    }
}
