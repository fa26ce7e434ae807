//! Pet lifecycle: battery economy, modes, reactions, death and reset.

use crate::anim::{LoopPolicy, Mixer};
use crate::assets::ModelAsset;
use crate::config::Tuning;
use crate::expression::ExpressionBridge;
use crate::waste::WasteSpawner;
use crate::world::Stage;

pub const WALKING: &str = "Walking";
pub const JUMP: &str = "Jump";
pub const DANCE: &str = "Dance";
pub const THUMBS_UP: &str = "ThumbsUp";
pub const DEATH: &str = "Death";

/// Clips that play once and hold their last pose.
const ONE_SHOTS: [&str; 4] = [DEATH, DANCE, THUMBS_UP, JUMP];

const FULL_BATTERY: f32 = 100.0;

/// What the next "do it" press means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Feed,
    Play,
    Clean,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Feed, Mode::Play, Mode::Clean];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Feed => "Feed",
            Mode::Play => "Play",
            Mode::Clean => "Clean",
        }
    }
}

/// Snapshot of the companion's life state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetState {
    /// 0..=100.
    pub battery: f32,
    pub alive: bool,
    pub mode: Mode,
    pub low_power_notified: bool,
}

/// Low-battery notice with a dead band: set at or below `enter`, re-armed
/// only once the battery climbs above `exit`.
#[derive(Debug, Clone, Copy)]
pub struct LowPowerLatch {
    enter: f32,
    exit: f32,
    notified: bool,
}

impl LowPowerLatch {
    pub fn new(enter: f32, exit: f32) -> Self {
        Self {
            enter,
            exit,
            notified: false,
        }
    }

    /// Feed the current level. Returns true when a notice should be posted.
    pub fn observe(&mut self, battery: f32, alive: bool) -> bool {
        if battery <= self.enter && alive && !self.notified {
            self.notified = true;
            true
        } else {
            if battery > self.exit && self.notified {
                self.notified = false;
            }
            false
        }
    }

    pub fn clear(&mut self) {
        self.notified = false;
    }

    pub fn is_set(&self) -> bool {
        self.notified
    }
}

/// Continuations the companion's mixer can hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    DefaultLoop,
}

pub struct PetController {
    node: hecs::Entity,
    battery: f32,
    alive: bool,
    mode: Mode,
    latch: LowPowerLatch,
    drain_rate: f32,
    action_fade: f32,
    loop_fade: f32,
    mixer: Mixer<Resume>,
    expression: ExpressionBridge,
    waste: WasteSpawner,
}

impl PetController {
    /// Bind to a companion node already on the stage.
    pub fn new(node: hecs::Entity, model: &ModelAsset, tuning: &Tuning, stage: &mut Stage) -> Self {
        let mut mixer = Mixer::new(&model.clips);
        for name in ONE_SHOTS {
            if !mixer.set_loop(name, LoopPolicy::OnceThenHold) {
                log::warn!("companion model has no {name} clip");
            }
        }
        mixer.fade_to_action(WALKING, tuning.loop_fade);

        let expression = ExpressionBridge::new(&mut stage.scene, node);

        let mut pet = Self {
            node,
            battery: FULL_BATTERY,
            alive: true,
            mode: Mode::Feed,
            latch: LowPowerLatch::new(tuning.low_power_enter, tuning.low_power_exit),
            drain_rate: tuning.drain_rate,
            action_fade: tuning.action_fade,
            loop_fade: tuning.loop_fade,
            mixer,
            expression,
            waste: WasteSpawner::new(tuning),
        };
        pet.waste.start();
        pet.sync_ui(stage, true);
        pet
    }

    pub fn set_mode(&mut self, mode: Mode, stage: &mut Stage) {
        self.mode = mode;
        self.sync_ui(stage, true);
    }

    /// Act on the current mode. Rejected (false) while powered down.
    pub fn perform_action(&mut self, stage: &mut Stage) -> bool {
        if !self.alive {
            return false;
        }

        match self.mode {
            Mode::Feed => {
                self.battery = FULL_BATTERY;
                self.latch.clear();
                self.refresh_expression(stage);
                self.sync_ui(stage, false);
                self.play_reaction(JUMP);
                stage.ui.set_status_message("Battery topped up!");
            }
            Mode::Play => {
                self.play_reaction(DANCE);
                stage.ui.set_status_message("Playtime! Mini dance unlocked");
            }
            Mode::Clean => {
                self.waste.clear_all(&mut stage.scene);
                self.play_reaction(THUMBS_UP);
                stage.ui.set_status_message("All tidy again");
            }
        }
        true
    }

    /// Per-frame step: drain, feedback, then pose.
    pub fn update(&mut self, dt: f32, stage: &mut Stage) {
        let dt = dt.max(0.0);

        if self.alive {
            self.battery = (self.battery - self.drain_rate * dt).max(0.0);
            self.sync_ui(stage, false);
            self.refresh_expression(stage);
            self.expression
                .refresh_lights(stage.lights.as_mut(), self.battery);
            if self.battery <= 0.0 {
                self.die(stage);
            }
        }

        // Runs while dead too, so the death pose plays out.
        if let Some(Resume::DefaultLoop) = self.mixer.advance(dt) {
            self.restore_default_loop();
        }
    }

    /// Coarse timers, decoupled from the frame step.
    pub fn run_timers(&mut self, dt: f32, stage: &mut Stage) {
        let Some(transform) = stage.scene.transform(self.node) else {
            return;
        };
        self.waste.tick(
            dt.max(0.0),
            self.alive,
            &transform,
            &mut stage.scene,
            &mut stage.rng,
        );
    }

    pub fn reset(&mut self, stage: &mut Stage) {
        self.waste.stop();
        self.waste.clear_all(&mut stage.scene);

        self.battery = FULL_BATTERY;
        self.alive = true;
        self.mode = Mode::Feed;
        self.latch.clear();
        self.mixer.unlock();
        self.refresh_expression(stage);
        self.expression
            .refresh_lights(stage.lights.as_mut(), self.battery);
        self.mixer.fade_to_action(WALKING, self.loop_fade);
        self.sync_ui(stage, true);

        stage.ui.enable_reset(false);
        stage
            .ui
            .set_status_message("All better! Choose a mode to keep playing");
        log::info!("companion reset");

        self.waste.start();
    }

    fn die(&mut self, stage: &mut Stage) {
        self.alive = false;
        self.latch.clear();
        self.waste.clear_all(&mut stage.scene);
        self.mixer.lock_to(DEATH);
        self.mixer.fade_to_action(DEATH, self.action_fade);
        stage
            .ui
            .set_status_message("Oh no! Your buddy powered down. Reset to revive");
        stage.ui.enable_reset(true);
        log::info!("companion powered down");
    }

    fn play_reaction(&mut self, clip: &str) {
        if self.mixer.fade_to_action(clip, self.action_fade) {
            self.mixer.on_finished(Resume::DefaultLoop);
        }
    }

    fn restore_default_loop(&mut self) {
        if self.alive {
            self.mixer.fade_to_action(WALKING, self.loop_fade);
        }
    }

    fn refresh_expression(&mut self, stage: &mut Stage) {
        self.expression.refresh_face(&mut stage.scene, self.battery);
        if self.latch.observe(self.battery, self.alive) {
            stage.ui.set_status_message("Battery getting low – snack time?");
        }
    }

    fn sync_ui(&self, stage: &mut Stage, with_mode: bool) {
        stage.ui.update_battery(self.battery);
        if with_mode {
            stage.ui.on_mode_change(self.mode);
        }
    }

    pub fn state(&self) -> PetState {
        PetState {
            battery: self.battery,
            alive: self.alive,
            mode: self.mode,
            low_power_notified: self.latch.is_set(),
        }
    }

    pub fn battery(&self) -> f32 {
        self.battery
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn node(&self) -> hecs::Entity {
        self.node
    }

    pub fn mixer(&self) -> &Mixer<Resume> {
        &self.mixer
    }

    pub fn waste(&self) -> &WasteSpawner {
        &self.waste
    }

    /// Drop a waste marker right now, outside the schedule.
    pub fn drop_waste(&mut self, stage: &mut Stage) -> bool {
        let Some(transform) = stage.scene.transform(self.node) else {
            return false;
        };
        self.waste
            .spawn(&transform, &mut stage.scene, &mut stage.rng)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetLibrary, AssetProvider, ROBOT_PATH};
    use crate::ecs::components::{Mesh, MorphWeights, NodeKind, Transform};
    use crate::testing::{stage, Recorded};
    use glam::Vec3;

    fn spawn_pet() -> (PetController, Stage, Recorded) {
        let (mut stage, rec) = stage();
        let model = AssetLibrary::bundled().load(ROBOT_PATH).unwrap();
        let node = stage.scene.add(
            NodeKind::Companion,
            Transform::at(Vec3::ZERO),
            Mesh {
                geometries: model.geometries,
                materials: model.materials,
            },
        );
        stage
            .scene
            .attach(node, MorphWeights::new(model.morph_targets.clone()));
        let pet = PetController::new(node, &model, &Tuning::default(), &mut stage);
        (pet, stage, rec)
    }

    #[test]
    fn latch_fires_once_per_crossing() {
        let mut latch = LowPowerLatch::new(30.0, 35.0);
        let fired: Vec<bool> = [40.0, 29.0, 32.0, 28.0]
            .into_iter()
            .map(|b| latch.observe(b, true))
            .collect();
        assert_eq!(fired, vec![false, true, false, false]);
        // Climb out of the dead band, then cross again.
        assert!(!latch.observe(36.0, true));
        assert!(!latch.is_set());
        assert!(latch.observe(30.0, true));
    }

    #[test]
    fn latch_ignores_dead_companion() {
        let mut latch = LowPowerLatch::new(30.0, 35.0);
        assert!(!latch.observe(10.0, false));
        assert!(!latch.is_set());
    }

    #[test]
    fn starts_walking_at_full_charge() {
        let (pet, _stage, rec) = spawn_pet();
        assert_eq!(pet.battery(), 100.0);
        assert!(pet.is_alive());
        assert_eq!(pet.mode(), Mode::Feed);
        assert_eq!(pet.mixer().active_clip(), Some(WALKING));
        assert_eq!(pet.mixer().policy(JUMP), Some(LoopPolicy::OnceThenHold));
        assert_eq!(pet.mixer().policy(WALKING), Some(LoopPolicy::Loop));
        assert_eq!(rec.last_mode(), Some(Mode::Feed));
    }

    #[test]
    fn battery_never_increases_while_draining() {
        let (mut pet, mut stage, _rec) = spawn_pet();
        let mut last = pet.battery();
        for dt in [0.0, 0.016, 1.0, 10.0, 0.5, 50.0, 0.0, 100.0] {
            pet.update(dt, &mut stage);
            assert!(pet.battery() <= last);
            assert!((0.0..=100.0).contains(&pet.battery()));
            last = pet.battery();
        }
    }

    #[test]
    fn feeding_at_low_battery() {
        let (mut pet, mut stage, rec) = spawn_pet();
        pet.update(270.0, &mut stage);
        assert!((pet.battery() - 10.0).abs() < 1e-2);
        assert!(pet.state().low_power_notified);
        assert_eq!(rec.count_status("Battery getting low – snack time?"), 1);

        assert!(pet.perform_action(&mut stage));
        assert_eq!(pet.battery(), 100.0);
        assert!(!pet.state().low_power_notified);
        assert_eq!(pet.mixer().active_clip(), Some(JUMP));
        assert_eq!(rec.last_status().as_deref(), Some("Battery topped up!"));

        // Jump runs out, the default loop comes back on its own.
        pet.update(1.1, &mut stage);
        assert_eq!(pet.mixer().active_clip(), Some(WALKING));
        assert!(pet.mixer().is_finished(JUMP));
    }

    #[test]
    fn play_and_clean_reactions() {
        let (mut pet, mut stage, _rec) = spawn_pet();
        pet.set_mode(Mode::Play, &mut stage);
        assert!(pet.perform_action(&mut stage));
        assert_eq!(pet.mixer().active_clip(), Some(DANCE));

        assert!(pet.drop_waste(&mut stage));
        assert_eq!(pet.waste().len(), 1);
        pet.set_mode(Mode::Clean, &mut stage);
        assert!(pet.perform_action(&mut stage));
        assert!(pet.waste().is_empty());
        assert_eq!(stage.scene.count(NodeKind::Waste), 0);
        assert_eq!(pet.mixer().active_clip(), Some(THUMBS_UP));
    }

    #[test]
    fn drains_to_death_exactly_once() {
        let (mut pet, mut stage, rec) = spawn_pet();
        pet.drop_waste(&mut stage);
        pet.update(301.0, &mut stage);
        assert!(!pet.is_alive());
        assert_eq!(pet.battery(), 0.0);
        assert!(!pet.state().low_power_notified);
        assert_eq!(pet.mixer().active_clip(), Some(DEATH));
        assert!(rec.reset_enabled());
        assert!(pet.waste().is_empty());

        // Dead: actions rejected, no more drain, no more waste.
        assert!(!pet.perform_action(&mut stage));
        pet.update(5.0, &mut stage);
        assert!(pet.mixer().is_finished(DEATH));
        pet.run_timers(60.0, &mut stage);
        assert!(pet.waste().is_empty());
        assert_eq!(
            rec.count_status("Oh no! Your buddy powered down. Reset to revive"),
            1
        );
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut pet, mut stage, rec) = spawn_pet();
        pet.set_mode(Mode::Play, &mut stage);
        pet.drop_waste(&mut stage);
        pet.update(400.0, &mut stage);

        pet.reset(&mut stage);
        let once = pet.state();
        pet.reset(&mut stage);
        let twice = pet.state();
        assert_eq!(once, twice);
        assert_eq!(
            twice,
            PetState {
                battery: 100.0,
                alive: true,
                mode: Mode::Feed,
                low_power_notified: false,
            }
        );
        assert!(pet.waste().is_empty());
        assert!(pet.waste().is_running());
        assert!(!rec.reset_enabled());
        assert_eq!(pet.mixer().active_clip(), Some(WALKING));
    }

    #[test]
    fn reaction_interrupted_by_death_does_not_resume() {
        let (mut pet, mut stage, _rec) = spawn_pet();
        pet.set_mode(Mode::Play, &mut stage);
        pet.update(299.9, &mut stage);
        pet.perform_action(&mut stage);
        pet.update(0.2, &mut stage);
        assert!(!pet.is_alive());
        pet.update(10.0, &mut stage);
        assert_eq!(pet.mixer().active_clip(), Some(DEATH));
    }

    #[test]
    fn lights_follow_battery() {
        let (mut pet, mut stage, rec) = spawn_pet();
        pet.update(150.0, &mut stage);
        let level = rec.last_light().unwrap();
        assert!((level - 0.5).abs() < 1e-4);

        pet.reset(&mut stage);
        assert_eq!(rec.last_light(), Some(1.0));
    }

    #[test]
    fn sad_face_tracks_battery() {
        let (mut pet, mut stage, _rec) = spawn_pet();
        pet.update(150.0, &mut stage);
        let sad = stage
            .scene
            .with_morphs(pet.node(), |m| m.influences[2])
            .unwrap();
        assert!((sad - 0.5).abs() < 1e-3);
    }
}
