//! Recording sinks for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::expression::LightRig;
use crate::pet::Mode;
use crate::ui::{AudioSink, Cue, Presenter};
use crate::world::Stage;

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Mode(Mode),
    Battery(f32),
    Status(String),
    Overlay(bool),
    Event(String),
    Reset(bool),
    Deploy(bool),
}

#[derive(Default)]
struct Log {
    calls: Vec<UiCall>,
    cues: Vec<Cue>,
    lights: Vec<f32>,
}

/// Cheap-to-clone handle onto everything the stage's sinks received.
#[derive(Clone, Default)]
pub struct Recorded(Rc<RefCell<Log>>);

impl Recorded {
    fn push(&self, call: UiCall) {
        self.0.borrow_mut().calls.push(call);
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.0.borrow().calls.clone()
    }

    pub fn last_mode(&self) -> Option<Mode> {
        self.calls().into_iter().rev().find_map(|c| match c {
            UiCall::Mode(m) => Some(m),
            _ => None,
        })
    }

    pub fn last_status(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|c| match c {
            UiCall::Status(s) => Some(s),
            _ => None,
        })
    }

    pub fn count_status(&self, text: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, UiCall::Status(s) if s == text))
            .count()
    }

    pub fn reset_enabled(&self) -> bool {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|c| match c {
                UiCall::Reset(on) => Some(on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn overlay_calls(&self) -> Vec<bool> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::Overlay(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn cues(&self) -> usize {
        self.0.borrow().cues.len()
    }

    pub fn last_light(&self) -> Option<f32> {
        self.0.borrow().lights.last().copied()
    }
}

impl Presenter for Recorded {
    fn on_mode_change(&mut self, mode: Mode) {
        self.push(UiCall::Mode(mode));
    }
    fn update_battery(&mut self, percent: f32) {
        self.push(UiCall::Battery(percent));
    }
    fn set_status_message(&mut self, text: &str) {
        self.push(UiCall::Status(text.to_string()));
    }
    fn show_hatching_overlay(&mut self, visible: bool) {
        self.push(UiCall::Overlay(visible));
    }
    fn log_event(&mut self, text: &str) {
        self.push(UiCall::Event(text.to_string()));
    }
    fn enable_reset(&mut self, enabled: bool) {
        self.push(UiCall::Reset(enabled));
    }
    fn enable_deploy(&mut self, enabled: bool) {
        self.push(UiCall::Deploy(enabled));
    }
}

impl AudioSink for Recorded {
    fn play(&mut self, cue: Cue) {
        self.0.borrow_mut().cues.push(cue);
    }
}

impl LightRig for Recorded {
    fn set_intensity(&mut self, level: f32) {
        self.0.borrow_mut().lights.push(level);
    }
}

/// A fresh stage wired to one recorder, with a seeded RNG.
pub fn stage() -> (Stage, Recorded) {
    let rec = Recorded::default();
    let stage = Stage::new(
        Box::new(rec.clone()),
        Box::new(rec.clone()),
        Box::new(rec.clone()),
        fastrand::Rng::with_seed(0x5eed),
    );
    (stage, rec)
}
