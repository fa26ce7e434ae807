//! Animation blend engine.
//!
//! Wraps a model's clips as named actions. One action is active at a time;
//! the one it replaced fades its weight to zero over the transition window
//! and is disabled once silent. One-shot actions hold their last pose and
//! raise a finish notification, delivered as the continuation token `T`
//! the caller armed (a single slot, never cumulative).

use crate::assets::ClipInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPolicy {
    Loop,
    OnceThenHold,
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

impl Fade {
    fn value(&self) -> f32 {
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    fn done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone)]
struct Action {
    clip: ClipInfo,
    policy: LoopPolicy,
    time: f32,
    time_scale: f32,
    weight: f32,
    fade: Option<Fade>,
    playing: bool,
    finished: bool,
}

impl Action {
    fn new(mut clip: ClipInfo) -> Self {
        clip.duration = clip.duration.max(f32::EPSILON);
        Self {
            clip,
            policy: LoopPolicy::Loop,
            time: 0.0,
            time_scale: 1.0,
            weight: 0.0,
            fade: None,
            playing: false,
            finished: false,
        }
    }

    fn reset(&mut self) {
        self.time = 0.0;
        self.finished = false;
        self.fade = None;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.weight = 0.0;
        self.fade = None;
    }

    fn fade(&mut self, to: f32, duration: f32) {
        if duration <= 0.0 {
            self.weight = to;
            self.fade = None;
            if to == 0.0 {
                self.playing = false;
            }
            return;
        }
        self.fade = Some(Fade {
            from: self.weight,
            to,
            elapsed: 0.0,
            duration,
        });
    }

    /// Advance clocks. Returns true on the tick a one-shot reaches its end.
    fn advance(&mut self, dt: f32) -> bool {
        if !self.playing {
            return false;
        }

        if let Some(fade) = self.fade.as_mut() {
            fade.elapsed += dt;
            self.weight = fade.value();
            if fade.done() {
                let silent = fade.to == 0.0;
                self.fade = None;
                if silent {
                    self.playing = false;
                }
            }
        }

        if self.finished {
            return false;
        }

        self.time += dt * self.time_scale;
        match self.policy {
            LoopPolicy::Loop => {
                self.time = self.time.rem_euclid(self.clip.duration);
                false
            }
            LoopPolicy::OnceThenHold => {
                if self.time >= self.clip.duration {
                    self.time = self.clip.duration;
                    self.finished = true;
                    true
                } else {
                    false
                }
            }
        }
    }
}

pub struct Mixer<T> {
    actions: Vec<Action>,
    active: Option<usize>,
    /// When set, only this clip may be faded to.
    terminal: Option<String>,
    on_finished: Option<T>,
}

impl<T> Mixer<T> {
    /// Build one stopped, looping action per clip.
    pub fn new(clips: &[ClipInfo]) -> Self {
        Self {
            actions: clips.iter().cloned().map(Action::new).collect(),
            active: None,
            terminal: None,
            on_finished: None,
        }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|a| a.clip.name == name)
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.index(name).is_some()
    }

    /// Rename a clip in place. Used for assets that ship generic track names.
    pub fn rename_clip(&mut self, from: &str, to: &str) -> bool {
        match self.index(from) {
            Some(i) => {
                self.actions[i].clip.name = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_loop(&mut self, name: &str, policy: LoopPolicy) -> bool {
        match self.index(name) {
            Some(i) => {
                self.actions[i].policy = policy;
                true
            }
            None => false,
        }
    }

    /// Refuse every fade except to `name` until [`unlock`](Self::unlock).
    pub fn lock_to(&mut self, name: &str) {
        self.terminal = Some(name.to_string());
    }

    pub fn unlock(&mut self) {
        self.terminal = None;
    }

    /// Stop everything and play `name` once, holding the final pose.
    /// `then` is handed back from [`advance`](Self::advance) when it ends.
    pub fn play_once(&mut self, name: &str, then: T) -> bool {
        let Some(idx) = self.index(name) else {
            log::warn!("animation {name} not found");
            return false;
        };

        self.stop_all();

        let action = &mut self.actions[idx];
        action.reset();
        action.policy = LoopPolicy::OnceThenHold;
        action.time_scale = 1.0;
        action.weight = 1.0;
        action.playing = true;

        self.active = Some(idx);
        self.on_finished = Some(then);
        true
    }

    /// Cross-fade from the active action to `name` over `duration` seconds.
    /// Clears any armed finish continuation; re-arm with
    /// [`on_finished`](Self::on_finished).
    pub fn fade_to_action(&mut self, name: &str, duration: f32) -> bool {
        if let Some(terminal) = &self.terminal {
            if terminal != name {
                log::debug!("fade to {name} refused, locked to {terminal}");
                return false;
            }
        }
        let Some(idx) = self.index(name) else {
            log::warn!("animation {name} not found");
            return false;
        };

        if let Some(prev) = self.active {
            if prev != idx {
                self.actions[prev].fade(0.0, duration);
            }
        }

        let action = &mut self.actions[idx];
        action.reset();
        action.time_scale = 1.0;
        action.weight = if duration > 0.0 { 0.0 } else { 1.0 };
        action.playing = true;
        action.fade(1.0, duration);

        self.active = Some(idx);
        self.on_finished = None;
        true
    }

    /// Arm the single finish slot for the active action.
    pub fn on_finished(&mut self, then: T) {
        self.on_finished = Some(then);
    }

    pub fn stop_all(&mut self) {
        for action in &mut self.actions {
            action.stop();
        }
        self.active = None;
        self.on_finished = None;
    }

    /// Advance every action's clock. Returns the armed continuation if the
    /// active one-shot finished during this step.
    pub fn advance(&mut self, dt: f32) -> Option<T> {
        let mut active_finished = false;
        for (i, action) in self.actions.iter_mut().enumerate() {
            if action.advance(dt) && Some(i) == self.active {
                active_finished = true;
            }
        }
        if active_finished {
            self.on_finished.take()
        } else {
            None
        }
    }

    pub fn active_clip(&self) -> Option<&str> {
        self.active.map(|i| self.actions[i].clip.name.as_str())
    }

    /// Current blend weight, or `None` for an unknown clip.
    pub fn weight(&self, name: &str) -> Option<f32> {
        self.index(name).map(|i| self.actions[i].weight)
    }

    pub fn is_playing(&self, name: &str) -> bool {
        self.index(name).is_some_and(|i| self.actions[i].playing)
    }

    pub fn is_finished(&self, name: &str) -> bool {
        self.index(name).is_some_and(|i| self.actions[i].finished)
    }

    pub fn time(&self, name: &str) -> Option<f32> {
        self.index(name).map(|i| self.actions[i].time)
    }

    pub fn policy(&self, name: &str) -> Option<LoopPolicy> {
        self.index(name).map(|i| self.actions[i].policy)
    }

    pub fn has_pending_finish(&self) -> bool {
        self.on_finished.is_some()
    }
}
