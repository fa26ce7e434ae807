/// Gameplay tunables. Defaults match the shipped experience.
#[derive(Debug, Clone)]
pub struct Tuning {
    /// Battery percent lost per second while alive (full drain in 300s).
    pub drain_rate: f32,
    /// Battery at or below this posts the "battery low" message.
    pub low_power_enter: f32,
    /// Battery above this re-arms the low-power message.
    pub low_power_exit: f32,
    /// Cross-fade used for one-shot reactions and the death pose.
    pub action_fade: f32,
    /// Cross-fade back into the default loop.
    pub loop_fade: f32,
    /// Seconds the gift box wobbles before the reveal plays.
    pub incubation_delay: f32,
    /// Offset from reveal start to the pop sound.
    pub sound_cue_delay: f32,
    /// Seconds between waste spawn attempts.
    pub waste_period: f32,
    /// How far behind the companion waste lands.
    pub waste_trail: f32,
    /// Half-width of the random jitter box around the trail point.
    pub waste_jitter: f32,
    /// Marker height above the ground plane.
    pub waste_height: f32,
    /// No two live markers closer than this.
    pub waste_min_separation: f32,
    /// Placement proposals per spawn tick before giving up.
    pub waste_attempts: u32,
    /// Lowest light level the rig will show.
    pub light_floor: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            drain_rate: 100.0 / 300.0,
            low_power_enter: 30.0,
            low_power_exit: 35.0,
            action_fade: 0.5,
            loop_fade: 0.4,
            incubation_delay: 8.0,
            sound_cue_delay: 0.42,
            waste_period: 15.0,
            waste_trail: 2.0,
            waste_jitter: 1.0,
            waste_height: 0.25,
            waste_min_separation: 0.8,
            waste_attempts: 8,
            light_floor: 0.35,
        }
    }
}
