//! Battery level → facial expression and scene light feedback.

use std::cell::RefCell;
use std::rc::Rc;

use crate::scene::Scene;

/// Name of the facial blend parameter driven by battery level.
pub const SAD_MORPH: &str = "Sad";

/// Receives the light feedback signal (battery fraction, 0..=1).
/// Implementations own any clamping so the scene never goes fully dark.
pub trait LightRig {
    fn set_intensity(&mut self, level: f32);
}

impl<L: LightRig> LightRig for Rc<RefCell<L>> {
    fn set_intensity(&mut self, level: f32) {
        self.borrow_mut().set_intensity(level);
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

const BASE_AMBIENT: f32 = 0.6;
const BASE_SUN: f32 = 1.8;
const BASE_FILL: f32 = 0.7;
const BASE_RIM: f32 = 1.1;
const BASE_GLOW: f32 = 0.5;

const BACKGROUND_WARM: [f32; 3] = [1.0, 0.961, 0.918]; // #fff5ea
const BACKGROUND_DUSK: [f32; 3] = [0.969, 0.902, 0.831]; // #f7e6d4

const FOG_DIM: f32 = 0.022;
const FOG_BRIGHT: f32 = 0.0125;

/// Five-light rig that dims with the battery but keeps a floor.
#[derive(Debug, Clone)]
pub struct AmbientRig {
    floor: f32,
    pub ambient: f32,
    pub sun: f32,
    pub fill: f32,
    pub rim: f32,
    pub glow: f32,
    pub fog_density: f32,
    pub background: [f32; 3],
}

impl AmbientRig {
    pub fn new(floor: f32) -> Self {
        Self {
            floor: floor.clamp(0.0, 1.0),
            ambient: BASE_AMBIENT,
            sun: BASE_SUN,
            fill: BASE_FILL,
            rim: BASE_RIM,
            glow: BASE_GLOW,
            fog_density: FOG_BRIGHT,
            background: BACKGROUND_WARM,
        }
    }
}

impl LightRig for AmbientRig {
    fn set_intensity(&mut self, level: f32) {
        let safe = level.clamp(self.floor, 1.0);
        self.ambient = lerp(0.35, BASE_AMBIENT, safe);
        self.sun = BASE_SUN * safe;
        self.fill = lerp(0.25, BASE_FILL, safe);
        self.rim = BASE_RIM * lerp(0.6, 1.0, safe);
        self.glow = BASE_GLOW * lerp(0.7, 1.0, safe);
        self.fog_density = lerp(FOG_DIM, FOG_BRIGHT, safe);
        self.background = lerp3(BACKGROUND_WARM, BACKGROUND_DUSK, 1.0 - safe);
    }
}

/// Maps battery to the companion's face and the light rig.
pub struct ExpressionBridge {
    face: hecs::Entity,
    /// Index of the "Sad" morph, if the model has one.
    sad: Option<usize>,
}

impl ExpressionBridge {
    pub fn new(scene: &mut Scene, face: hecs::Entity) -> Self {
        let sad = scene
            .with_morphs(face, |m| {
                if m.names.is_empty() {
                    log::warn!("no morph targets found for the face");
                } else {
                    log::info!("available morph targets: {:?}", m.names);
                }
                m.index_of(SAD_MORPH)
            })
            .flatten();
        if sad.is_none() {
            log::debug!("face has no {SAD_MORPH} blend parameter, expression disabled");
        }
        Self { face, sad }
    }

    /// 0 at full charge, 1 when empty.
    pub fn sadness(battery: f32) -> f32 {
        (1.0 - battery / 100.0).clamp(0.0, 1.0)
    }

    /// Light feedback signal; the rig applies its own floor.
    pub fn light_level(battery: f32) -> f32 {
        (battery / 100.0).clamp(0.0, 1.0)
    }

    pub fn refresh_face(&self, scene: &mut Scene, battery: f32) {
        let Some(idx) = self.sad else {
            return;
        };
        scene.with_morphs(self.face, |m| {
            if let Some(w) = m.influences.get_mut(idx) {
                *w = Self::sadness(battery);
            }
        });
    }

    pub fn refresh_lights(&self, lights: &mut dyn LightRig, battery: f32) {
        lights.set_intensity(Self::light_level(battery));
    }
}
