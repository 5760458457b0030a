//! Session configuration
//!
//! An immutable configuration value built once per session. Hosts tune it by
//! merging a partial JSON override document: recognized keys replace the
//! matching constant, unrecognized keys and out-of-domain values are ignored.

use serde::Deserialize;

/// All tunable constants of a session.
///
/// Constructed via [`GameConfig::default`] plus [`GameConfig::with_overrides`]
/// (or [`GameConfig::from_json`]); never mutated afterwards. Components derive
/// their own views of it at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Speed gained per tick until `max_speed`.
    pub acceleration: f32,
    /// Cloud scroll rate relative to the ground.
    pub bg_cloud_speed: f32,
    /// Gap between the character's feet and the canvas bottom.
    pub bottom_pad: f32,
    /// Obstacle-free warm-up after the game starts, ms.
    pub clear_time: f32,
    /// Chance a new cloud spawns once the previous gap has passed.
    pub cloud_frequency: f32,
    /// Delay before the jump key may restart a crashed game, ms.
    pub gameover_clear_time: f32,
    /// Scales each obstacle type's base gap contribution.
    pub gap_coefficient: f32,
    /// Downward acceleration per frame.
    pub gravity: f32,
    /// Upward velocity magnitude at the start of a jump.
    pub initial_jump_velocity: f32,
    /// How long the night inversion lasts before auto-reverting, ms.
    pub invert_fade_duration: f32,
    /// Distance units between night inversions.
    pub invert_distance: u32,
    /// Idle blinks before the waiting animation stops rescheduling.
    pub max_blink_count: u32,
    pub max_clouds: usize,
    /// Largest obstacle duplication count (sprite units).
    pub max_obstacle_length: u32,
    /// How many times in a row one obstacle type may spawn.
    pub max_obstacle_duplication: usize,
    pub max_speed: f32,
    /// Jump height at which an early release still completes, px.
    pub min_jump_height: f32,
    /// Speed multiplier applied on narrow (mobile) canvases.
    pub mobile_speed_coefficient: f32,
    /// Starting speed.
    pub speed: f32,
    /// Fall-speed multiplier while speed-dropping.
    pub speed_drop_coefficient: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            acceleration: 0.001,
            bg_cloud_speed: 0.2,
            bottom_pad: 10.0,
            clear_time: 3000.0,
            cloud_frequency: 0.5,
            gameover_clear_time: 750.0,
            gap_coefficient: 0.6,
            gravity: 0.6,
            initial_jump_velocity: 12.0,
            invert_fade_duration: 12000.0,
            invert_distance: 700,
            max_blink_count: 3,
            max_clouds: 6,
            max_obstacle_length: 3,
            max_obstacle_duplication: 2,
            max_speed: 13.0,
            min_jump_height: 35.0,
            mobile_speed_coefficient: 1.2,
            speed: 6.0,
            speed_drop_coefficient: 3.0,
        }
    }
}

/// Partial override document.
///
/// Field names match the host-facing option names; anything else in the JSON
/// is silently dropped by serde, which is exactly the permissive-merge policy
/// the session wants.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ConfigOverrides {
    pub acceleration: Option<f32>,
    pub bg_cloud_speed: Option<f32>,
    pub bottom_pad: Option<f32>,
    pub clear_time: Option<f32>,
    pub cloud_frequency: Option<f32>,
    pub gameover_clear_time: Option<f32>,
    pub gap_coefficient: Option<f32>,
    pub gravity: Option<f32>,
    pub initial_jump_velocity: Option<f32>,
    pub invert_fade_duration: Option<f32>,
    pub invert_distance: Option<u32>,
    pub max_blink_count: Option<u32>,
    pub max_clouds: Option<usize>,
    pub max_obstacle_length: Option<u32>,
    pub max_obstacle_duplication: Option<usize>,
    pub max_speed: Option<f32>,
    pub min_jump_height: Option<f32>,
    pub mobile_speed_coefficient: Option<f32>,
    pub speed: Option<f32>,
    pub speed_drop_coefficient: Option<f32>,
}

/// Keep only finite, non-negative floats; everything the simulation divides
/// or counts by must stay in that domain.
fn sane(value: Option<f32>) -> Option<f32> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

impl GameConfig {
    /// Merge a partial override document into a copy of `self`.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> GameConfig {
        let mut cfg = self.clone();
        if let Some(v) = sane(overrides.acceleration) {
            cfg.acceleration = v;
        }
        if let Some(v) = sane(overrides.bg_cloud_speed) {
            cfg.bg_cloud_speed = v;
        }
        if let Some(v) = sane(overrides.bottom_pad) {
            cfg.bottom_pad = v;
        }
        if let Some(v) = sane(overrides.clear_time) {
            cfg.clear_time = v;
        }
        if let Some(v) = sane(overrides.cloud_frequency) {
            cfg.cloud_frequency = v;
        }
        if let Some(v) = sane(overrides.gameover_clear_time) {
            cfg.gameover_clear_time = v;
        }
        if let Some(v) = sane(overrides.gap_coefficient) {
            cfg.gap_coefficient = v;
        }
        if let Some(v) = sane(overrides.gravity) {
            cfg.gravity = v;
        }
        if let Some(v) = sane(overrides.initial_jump_velocity) {
            cfg.initial_jump_velocity = v;
        }
        if let Some(v) = sane(overrides.invert_fade_duration) {
            cfg.invert_fade_duration = v;
        }
        if let Some(v) = overrides.invert_distance.filter(|v| *v > 0) {
            cfg.invert_distance = v;
        }
        if let Some(v) = overrides.max_blink_count {
            cfg.max_blink_count = v;
        }
        if let Some(v) = overrides.max_clouds {
            cfg.max_clouds = v;
        }
        if let Some(v) = overrides.max_obstacle_length.filter(|v| *v > 0) {
            cfg.max_obstacle_length = v;
        }
        if let Some(v) = overrides.max_obstacle_duplication.filter(|v| *v > 0) {
            cfg.max_obstacle_duplication = v;
        }
        if let Some(v) = sane(overrides.max_speed) {
            cfg.max_speed = v;
        }
        if let Some(v) = sane(overrides.min_jump_height) {
            cfg.min_jump_height = v;
        }
        if let Some(v) = sane(overrides.mobile_speed_coefficient) {
            cfg.mobile_speed_coefficient = v;
        }
        if let Some(v) = sane(overrides.speed) {
            cfg.speed = v;
        }
        if let Some(v) = sane(overrides.speed_drop_coefficient) {
            cfg.speed_drop_coefficient = v;
        }
        cfg
    }

    /// Build a config from defaults plus a JSON override document.
    pub fn from_json(json: &str) -> serde_json::Result<GameConfig> {
        let overrides: ConfigOverrides = serde_json::from_str(json)?;
        let cfg = GameConfig::default().with_overrides(&overrides);
        log::debug!("config overrides applied: {overrides:?}");
        Ok(cfg)
    }
}
