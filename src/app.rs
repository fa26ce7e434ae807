use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;

use hatchbot::assets::AssetLibrary;
use hatchbot::config::Tuning;
use hatchbot::expression::AmbientRig;
use hatchbot::pet::Mode;
use hatchbot::ui::{LogAudio, StatusPanel};
use hatchbot::world::{Intent, Stage, World};

/// Simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// Simulated session length.
const SESSION_LENGTH: f64 = 420.0;
/// How often to log a status line (simulated seconds).
const STATUS_LOG_INTERVAL: f64 = 30.0;

/// Control-panel presses, in simulated seconds since start.
const SCRIPT: &[(f64, Intent)] = &[
    (1.0, Intent::Deploy),
    (2.0, Intent::Deploy),
    (15.0, Intent::SelectMode(Mode::Play)),
    (15.5, Intent::PerformAction),
    (48.0, Intent::SelectMode(Mode::Clean)),
    (48.5, Intent::PerformAction),
    (95.0, Intent::SelectMode(Mode::Feed)),
    (95.5, Intent::PerformAction),
    (405.0, Intent::PerformAction),
    (410.0, Intent::Reset),
];

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    since_log: f64,
    frame_time_min: f64,
    frame_time_max: f64,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            since_log: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
        }
    }

    /// Returns true when a status line is due.
    fn record_frame(&mut self, dt: f64) -> bool {
        self.frame_count += 1;
        self.since_log += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);
        if self.since_log >= STATUS_LOG_INTERVAL {
            self.since_log = 0.0;
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct App {
    world: World,
    panel: Rc<RefCell<StatusPanel>>,
    accumulator: f64,
    clock: f64,
    next_intent: usize,
    frame_stats: FrameStats,
    /// Drives simulated frame jitter; the world has its own RNG.
    frame_rng: fastrand::Rng,
}

impl App {
    fn new() -> Self {
        let panel = Rc::new(RefCell::new(StatusPanel::new()));
        let stage = Stage::new(
            Box::new(panel.clone()),
            Box::new(AmbientRig::new(Tuning::default().light_floor)),
            Box::new(LogAudio),
            fastrand::Rng::new(),
        );
        let world = World::new(stage, Box::new(AssetLibrary::bundled()), Tuning::default());
        Self {
            world,
            panel,
            accumulator: 0.0,
            clock: 0.0,
            next_intent: 0,
            frame_stats: FrameStats::new(),
            frame_rng: fastrand::Rng::new(),
        }
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        self.accumulator = (self.accumulator + dt).min(MAX_ACCUMULATOR);

        while self.accumulator >= TICK_RATE {
            self.clock += TICK_RATE;
            self.dispatch_due_intents();
            self.world.update(TICK_RATE as f32);
            self.accumulator -= TICK_RATE;
        }
    }

    fn dispatch_due_intents(&mut self) {
        while let Some(&(at, intent)) = SCRIPT.get(self.next_intent) {
            if at > self.clock {
                break;
            }
            let accepted = self.world.handle(intent);
            log::info!("[{:>6.1}s] {intent:?} -> {}", self.clock, accepted);
            self.next_intent += 1;
        }
    }

    fn log_status(&self) {
        let panel = self.panel.borrow();
        match self.world.pet() {
            Some(pet) => log::info!(
                "[{:>6.1}s] battery {} | {} | alive: {} | waste: {}",
                self.clock,
                panel.battery_text,
                panel.mode_label,
                pet.is_alive(),
                pet.waste().len(),
            ),
            None => log::info!(
                "[{:>6.1}s] box: {:?} | {}",
                self.clock,
                self.world.hatch().state(),
                panel.status,
            ),
        }
    }
}

/// Entry point: play a scripted session headlessly.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let mut app = App::new();
    if !app.world.hatch().is_loaded() {
        return Err("gift box asset missing".into());
    }

    while app.clock < SESSION_LENGTH {
        // Simulated render cadence: 14-18 ms frames.
        let dt = 0.014 + app.frame_rng.f64() * 0.004;
        if app.frame_stats.record_frame(dt) {
            app.log_status();
        }
        app.run_fixed_update(dt);
    }

    let panel = app.panel.borrow();
    log::info!(
        "session done: {} frames ({:.2}..{:.2} ms) in {:.0} ms wall",
        app.frame_stats.frame_count,
        app.frame_stats.frame_time_min * 1000.0,
        app.frame_stats.frame_time_max * 1000.0,
        started.elapsed().as_secs_f64() * 1000.0,
    );
    log::info!("final status: {}", panel.status);
    for entry in panel.events() {
        log::info!("  - {entry}");
    }
    Ok(())
}
