//! The gift box: a one-shot incubate → reveal → hatched sequence.

use glam::Vec3;

use crate::anim::Mixer;
use crate::assets::{AssetProvider, GIFT_BOX_PATH};
use crate::bus::{EventBus, WorldEvent};
use crate::config::Tuning;
use crate::ecs::components::{Mesh, NodeKind, Transform};
use crate::ui::Cue;
use crate::util::timer::Countdown;
use crate::world::Stage;

/// Reveal clip name after aliasing.
pub const HATCH_CLIP: &str = "Hatch";
/// The name the exporter gave the reveal clip.
const SHIPPED_CLIP: &str = "Take 001";
const BOX_SCALE: f32 = 0.52;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatchState {
    Idle,
    Hatching,
    Hatched,
}

/// Loaded box resources.
struct GiftBox {
    node: hecs::Entity,
    mixer: Mixer<()>,
}

pub struct HatchSequencer {
    state: HatchState,
    gift: Option<GiftBox>,
    /// The box's own hatch button.
    trigger_enabled: bool,
    incubation: Countdown,
    sound_cue: Countdown,
    incubation_delay: f32,
    sound_cue_delay: f32,
}

impl HatchSequencer {
    /// Load the box onto the stage. A failed load leaves an inert
    /// sequencer with no trigger.
    pub fn new(assets: &mut dyn AssetProvider, tuning: &Tuning, stage: &mut Stage) -> Self {
        let gift = match assets.load(GIFT_BOX_PATH) {
            Ok(model) => {
                let mut transform = Transform::at(Vec3::ZERO);
                transform.scale = BOX_SCALE;
                let node = stage.scene.add(
                    NodeKind::GiftBox,
                    transform,
                    Mesh {
                        geometries: model.geometries,
                        materials: model.materials,
                    },
                );
                let mut mixer = Mixer::new(&model.clips);
                mixer.rename_clip(SHIPPED_CLIP, HATCH_CLIP);
                log::info!("gift box loaded ({} clips)", model.clips.len());
                Some(GiftBox { node, mixer })
            }
            Err(e) => {
                log::error!("failed to load gift box model: {e}");
                None
            }
        };

        Self {
            state: HatchState::Idle,
            trigger_enabled: gift.is_some(),
            gift,
            incubation: Countdown::new(),
            sound_cue: Countdown::new(),
            incubation_delay: tuning.incubation_delay,
            sound_cue_delay: tuning.sound_cue_delay,
        }
    }

    pub fn can_trigger(&self) -> bool {
        self.gift.is_some() && self.state == HatchState::Idle
    }

    /// Start incubating. False (and nothing happens) unless idle and loaded.
    pub fn trigger(&mut self, stage: &mut Stage, bus: &mut EventBus) -> bool {
        if !self.can_trigger() {
            return false;
        }

        self.state = HatchState::Hatching;
        stage.ui.show_hatching_overlay(true);
        stage.ui.set_status_message("Egg wobbling… almost ready!");
        stage.ui.log_event("Incubation sequence started");
        bus.publish(WorldEvent::Hatching);

        self.trigger_enabled = false;
        self.incubation.arm(self.incubation_delay);
        log::info!("incubating for {:.1}s", self.incubation_delay);
        true
    }

    /// Advance the reveal, the sound cue and the incubation delay, in that
    /// order, so work scheduled this frame starts counting next frame.
    pub fn update(&mut self, dt: f32, stage: &mut Stage, bus: &mut EventBus) {
        let dt = dt.max(0.0);

        let revealed = self
            .gift
            .as_mut()
            .and_then(|g| g.mixer.advance(dt))
            .is_some();

        if self.sound_cue.tick(dt) {
            stage.audio.play(Cue::HatchPop);
        }

        if revealed {
            self.finish(stage, bus);
            return;
        }

        if self.incubation.tick(dt) && !self.start_reveal() {
            // Retryable: back to idle with the trigger restored.
            log::warn!("reveal could not start, hatch abandoned");
            self.state = HatchState::Idle;
            self.trigger_enabled = self.gift.is_some();
            stage.ui.show_hatching_overlay(false);
            bus.publish(WorldEvent::HatchAbandoned);
        }
    }

    fn start_reveal(&mut self) -> bool {
        let Some(gift) = self.gift.as_mut() else {
            return false;
        };
        if !gift.mixer.play_once(HATCH_CLIP, ()) {
            return false;
        }
        self.sound_cue.arm(self.sound_cue_delay);
        true
    }

    fn finish(&mut self, stage: &mut Stage, bus: &mut EventBus) {
        self.state = HatchState::Hatched;
        self.dispose(stage);
        stage.ui.show_hatching_overlay(false);
        stage
            .ui
            .set_status_message("Your buddy just hatched! Give them something to do");
        log::info!("gift box hatched");
        bus.publish(WorldEvent::Hatched);
    }

    /// Cancel outstanding timers, then release the box.
    pub fn dispose(&mut self, stage: &mut Stage) {
        self.incubation.cancel();
        self.sound_cue.cancel();
        self.trigger_enabled = false;
        if let Some(gift) = self.gift.take() {
            stage.scene.dispose(gift.node);
        }
    }

    pub fn state(&self) -> HatchState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.gift.is_some()
    }

    pub fn trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    pub fn incubation_pending(&self) -> bool {
        self.incubation.is_armed()
    }
}
