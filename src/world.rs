//! Composition root: owns the stage, the gift box and (once hatched) the
//! companion, routes user intents and drives the per-frame update.

use glam::Vec3;

use crate::assets::{AssetProvider, ModelAsset, ROBOT_PATH};
use crate::bus::{EventBus, WorldEvent};
use crate::config::Tuning;
use crate::ecs::components::{Mesh, MorphWeights, NodeKind, Transform};
use crate::expression::LightRig;
use crate::hatch::HatchSequencer;
use crate::pet::{Mode, PetController};
use crate::scene::Scene;
use crate::ui::{AudioSink, Presenter};

/// Shared context handed to every component: the render surface, the
/// outward-facing sinks and the session's RNG.
pub struct Stage {
    pub scene: Scene,
    pub ui: Box<dyn Presenter>,
    pub lights: Box<dyn LightRig>,
    pub audio: Box<dyn AudioSink>,
    pub rng: fastrand::Rng,
}

impl Stage {
    pub fn new(
        ui: Box<dyn Presenter>,
        lights: Box<dyn LightRig>,
        audio: Box<dyn AudioSink>,
        rng: fastrand::Rng,
    ) -> Self {
        Self {
            scene: Scene::new(),
            ui,
            lights,
            audio,
            rng,
        }
    }
}

/// User intents from the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SelectMode(Mode),
    PerformAction,
    Deploy,
    Reset,
}

enum CompanionSlot {
    /// Box hasn't hatched yet.
    Unhatched,
    /// Hatched but the model failed to load.
    LoadFailed,
    Ready(PetController),
}

pub struct World {
    stage: Stage,
    tuning: Tuning,
    assets: Box<dyn AssetProvider>,
    bus: EventBus,
    hatch: HatchSequencer,
    companion: CompanionSlot,
}

impl World {
    pub fn new(mut stage: Stage, mut assets: Box<dyn AssetProvider>, tuning: Tuning) -> Self {
        let hatch = HatchSequencer::new(assets.as_mut(), &tuning, &mut stage);
        stage.ui.enable_reset(false);
        Self {
            stage,
            tuning,
            assets,
            bus: EventBus::new(),
            hatch,
            companion: CompanionSlot::Unhatched,
        }
    }

    /// Route a control-panel intent. Returns whether it took effect.
    pub fn handle(&mut self, intent: Intent) -> bool {
        log::debug!("intent: {intent:?}");
        match intent {
            Intent::SelectMode(mode) => match &mut self.companion {
                CompanionSlot::Ready(pet) => {
                    pet.set_mode(mode, &mut self.stage);
                    true
                }
                _ => false,
            },
            Intent::PerformAction => {
                let done = match &mut self.companion {
                    CompanionSlot::Ready(pet) => pet.perform_action(&mut self.stage),
                    _ => false,
                };
                self.stage.ui.log_event("Action sent to your buddy");
                done
            }
            Intent::Deploy => {
                let triggered = self.hatch.trigger(&mut self.stage, &mut self.bus);
                if triggered {
                    self.stage.ui.enable_deploy(false);
                }
                triggered
            }
            Intent::Reset => {
                let done = match &mut self.companion {
                    CompanionSlot::Ready(pet) => {
                        pet.reset(&mut self.stage);
                        true
                    }
                    _ => false,
                };
                // The panel confirms the press even with nothing to reset.
                self.stage
                    .ui
                    .set_status_message("Quick reboot complete. Keep caring!");
                done
            }
        }
    }

    /// One frame. Box first, then event fallout, then the companion's
    /// state step (which advances its pose), then coarse timers.
    pub fn update(&mut self, dt: f32) {
        self.hatch.update(dt, &mut self.stage, &mut self.bus);

        while self.bus.has_pending() {
            for event in self.bus.drain() {
                self.on_event(event);
            }
        }

        if let CompanionSlot::Ready(pet) = &mut self.companion {
            pet.update(dt, &mut self.stage);
            pet.run_timers(dt, &mut self.stage);
        }
    }

    fn on_event(&mut self, event: WorldEvent) {
        match event {
            WorldEvent::Hatching => self.stage.ui.enable_deploy(false),
            WorldEvent::HatchAbandoned => self.stage.ui.enable_deploy(true),
            WorldEvent::Hatched => {
                self.stage.ui.enable_deploy(false);
                self.load_companion();
            }
            WorldEvent::CompanionReady => log::info!("companion ready"),
        }
    }

    /// Try again after a failed companion load.
    pub fn retry_companion_load(&mut self) -> bool {
        if !matches!(self.companion, CompanionSlot::LoadFailed) {
            return false;
        }
        self.load_companion();
        matches!(self.companion, CompanionSlot::Ready(_))
    }

    fn load_companion(&mut self) {
        if matches!(self.companion, CompanionSlot::Ready(_)) {
            return;
        }
        match self.assets.load(ROBOT_PATH) {
            Ok(model) => {
                let pet = self.spawn_companion(&model);
                self.companion = CompanionSlot::Ready(pet);
                self.stage
                    .ui
                    .set_status_message("Hi! I'm awake and ready to play.");
                self.stage.ui.log_event("Your robot friend just said hello");
                self.bus.publish(WorldEvent::CompanionReady);
            }
            Err(e) => {
                log::error!("failed to load companion model: {e}");
                self.companion = CompanionSlot::LoadFailed;
            }
        }
    }

    fn spawn_companion(&mut self, model: &ModelAsset) -> PetController {
        let node = self.stage.scene.add(
            NodeKind::Companion,
            Transform::at(Vec3::ZERO),
            Mesh {
                geometries: model.geometries,
                materials: model.materials,
            },
        );
        self.stage
            .scene
            .attach(node, MorphWeights::new(model.morph_targets.clone()));
        log::info!("companion loaded ({} clips)", model.clips.len());
        PetController::new(node, model, &self.tuning, &mut self.stage)
    }

    pub fn hatch(&self) -> &HatchSequencer {
        &self.hatch
    }

    pub fn pet(&self) -> Option<&PetController> {
        match &self.companion {
            CompanionSlot::Ready(pet) => Some(pet),
            _ => None,
        }
    }

    pub fn companion_load_failed(&self) -> bool {
        matches!(self.companion, CompanionSlot::LoadFailed)
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }
}
