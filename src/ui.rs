//! Presentation sink: what the core tells the control panel.

use std::cell::RefCell;
use std::rc::Rc;

use crate::pet::Mode;
use crate::util::ring::RingBuffer;

/// Capabilities the core calls on the on-screen panel. The core never
/// reads anything back.
pub trait Presenter {
    fn on_mode_change(&mut self, mode: Mode);
    fn update_battery(&mut self, percent: f32);
    fn set_status_message(&mut self, text: &str);
    fn show_hatching_overlay(&mut self, visible: bool);
    fn log_event(&mut self, text: &str);
    fn enable_reset(&mut self, enabled: bool);

    /// Deploy button availability. Panels without one ignore it.
    fn enable_deploy(&mut self, _enabled: bool) {}
}

/// Lets a caller keep a handle on the panel it handed to the stage.
impl<P: Presenter> Presenter for Rc<RefCell<P>> {
    fn on_mode_change(&mut self, mode: Mode) {
        self.borrow_mut().on_mode_change(mode);
    }
    fn update_battery(&mut self, percent: f32) {
        self.borrow_mut().update_battery(percent);
    }
    fn set_status_message(&mut self, text: &str) {
        self.borrow_mut().set_status_message(text);
    }
    fn show_hatching_overlay(&mut self, visible: bool) {
        self.borrow_mut().show_hatching_overlay(visible);
    }
    fn log_event(&mut self, text: &str) {
        self.borrow_mut().log_event(text);
    }
    fn enable_reset(&mut self, enabled: bool) {
        self.borrow_mut().enable_reset(enabled);
    }
    fn enable_deploy(&mut self, enabled: bool) {
        self.borrow_mut().enable_deploy(enabled);
    }
}

/// Short audio cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    HatchPop,
}

pub trait AudioSink {
    fn play(&mut self, cue: Cue);
}

/// Audio sink for headless runs.
#[derive(Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, cue: Cue) {
        log::info!("♪ {cue:?}");
    }
}

/// Event log length shown on the panel.
const EVENT_LOG_LEN: usize = 5;
/// Below this the battery bar switches to its warning gradient.
const LOW_BAND: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryBand {
    Healthy,
    Low,
}

/// In-memory model of the control panel.
pub struct StatusPanel {
    pub mode_label: String,
    /// Fill fraction of the battery bar, 0..=1.
    pub battery_fill: f32,
    pub battery_text: String,
    pub battery_band: BatteryBand,
    pub status: String,
    pub hatching_visible: bool,
    pub reset_enabled: bool,
    pub deploy_enabled: bool,
    events: RingBuffer<String>,
}

impl Default for StatusPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPanel {
    pub fn new() -> Self {
        let mut panel = Self {
            mode_label: String::new(),
            battery_fill: 1.0,
            battery_text: String::new(),
            battery_band: BatteryBand::Healthy,
            status: String::new(),
            hatching_visible: false,
            reset_enabled: false,
            deploy_enabled: true,
            events: RingBuffer::new(EVENT_LOG_LEN),
        };
        panel.mode_label = Mode::Feed.label().to_string();
        panel.update_battery(100.0);
        panel.status = "Tap deploy to wake your bot.".to_string();
        panel
    }

    /// Newest first.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.events.iter_newest().map(String::as_str)
    }
}

impl Presenter for StatusPanel {
    fn on_mode_change(&mut self, mode: Mode) {
        self.mode_label = mode.label().to_string();
        self.log_event(&format!("{} mode armed", mode.label()));
    }

    fn update_battery(&mut self, percent: f32) {
        let clamped = percent.clamp(0.0, 100.0);
        self.battery_fill = clamped / 100.0;
        self.battery_text = format!("{}%", clamped.round() as u32);
        self.battery_band = if clamped < LOW_BAND {
            BatteryBand::Low
        } else {
            BatteryBand::Healthy
        };
    }

    fn set_status_message(&mut self, text: &str) {
        log::info!("status: {text}");
        self.status = text.to_string();
        self.log_event(text);
    }

    fn show_hatching_overlay(&mut self, visible: bool) {
        self.hatching_visible = visible;
    }

    fn log_event(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.events.push(text.to_string());
    }

    fn enable_reset(&mut self, enabled: bool) {
        self.reset_enabled = enabled;
    }

    fn enable_deploy(&mut self, enabled: bool) {
        self.deploy_enabled = enabled;
    }
}
