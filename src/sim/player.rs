//! The runner character
//!
//! Owns position, vertical velocity and the status state machine. Jump
//! physics integrate against logical frames elapsed rather than raw wall
//! time, so tuning constants hold at any real frame rate. State updates are
//! pure; drawing is a separate render pass.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::GameConfig;
use crate::platform::{DestRect, Renderer};
use crate::sim::collision::CollisionBox;
use crate::sprites::{self, SpriteRect};

pub const PLAYER_WIDTH: f32 = 44.0;
pub const PLAYER_HEIGHT: f32 = 47.0;
pub const PLAYER_WIDTH_DUCK: f32 = 59.0;

/// Fixed horizontal lane.
const START_X_POS: f32 = 20.0;

/// Canvas y above which a jump is forcibly capped.
const MAX_JUMP_Y: f32 = 30.0;

/// Upper bound for the random idle-blink interval, ms.
const BLINK_TIMING_MS: f32 = 7000.0;

/// Upright silhouette, sprite-relative. Head, torso, legs.
const RUNNING_HITBOXES: [CollisionBox; 6] = [
    CollisionBox::new(22.0, 0.0, 17.0, 16.0),
    CollisionBox::new(1.0, 18.0, 30.0, 9.0),
    CollisionBox::new(10.0, 35.0, 14.0, 8.0),
    CollisionBox::new(1.0, 24.0, 29.0, 5.0),
    CollisionBox::new(5.0, 30.0, 21.0, 4.0),
    CollisionBox::new(9.0, 34.0, 15.0, 4.0),
];

/// Single wide, short box while ducking.
const DUCKING_HITBOXES: [CollisionBox; 1] = [CollisionBox::new(1.0, 18.0, 55.0, 25.0)];

/// Character status. Crashed is terminal until an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Waiting,
    Running,
    Jumping,
    Ducking,
    Crashed,
}

impl PlayerStatus {
    /// Sprite-sheet x offsets of this status's animation frames.
    fn frames(self) -> &'static [f32] {
        match self {
            PlayerStatus::Waiting => &[44.0, 0.0],
            PlayerStatus::Running => &[88.0, 132.0],
            PlayerStatus::Crashed => &[220.0],
            PlayerStatus::Jumping => &[0.0],
            PlayerStatus::Ducking => &[262.0, 321.0],
        }
    }

    fn ms_per_frame(self) -> f32 {
        match self {
            PlayerStatus::Waiting => 1000.0 / 3.0,
            PlayerStatus::Running => 1000.0 / 12.0,
            PlayerStatus::Crashed | PlayerStatus::Jumping => 1000.0 / 60.0,
            PlayerStatus::Ducking => 1000.0 / 8.0,
        }
    }
}

/// Jump and duck tuning, derived once from the session config.
#[derive(Debug, Clone, Copy)]
pub struct PlayerConfig {
    pub gravity: f32,
    /// Starting jump velocity; negative is up.
    pub initial_jump_velocity: f32,
    /// Velocity an early jump release clamps to.
    pub drop_velocity: f32,
    /// Canvas y the jump must clear before an early release takes effect.
    pub min_jump_y: f32,
    pub speed_drop_coefficient: f32,
    pub ground_y: f32,
}

impl PlayerConfig {
    pub fn derive(config: &GameConfig, canvas_height: f32) -> Self {
        let ground_y = canvas_height - PLAYER_HEIGHT - config.bottom_pad;
        Self {
            gravity: config.gravity,
            initial_jump_velocity: -config.initial_jump_velocity,
            drop_velocity: -config.initial_jump_velocity / 2.0,
            min_jump_y: ground_y - config.min_jump_height,
            speed_drop_coefficient: config.speed_drop_coefficient,
            ground_y,
        }
    }
}

pub struct Player {
    config: PlayerConfig,
    pos: Vec2,
    velocity: f32,
    status: PlayerStatus,
    jumping: bool,
    ducking: bool,
    speed_drop: bool,
    reached_min_height: bool,
    jump_count: u32,

    // Animation state.
    current_frame: usize,
    frame_timer: f32,
    ms_per_frame: f32,

    // Idle blink.
    blink_timer: f32,
    blink_delay: f32,
    blink_count: u32,
}

impl Player {
    pub fn new(config: PlayerConfig, rng: &mut Pcg32) -> Self {
        let mut player = Self {
            config,
            pos: Vec2::new(START_X_POS, config.ground_y),
            velocity: 0.0,
            status: PlayerStatus::Waiting,
            jumping: false,
            ducking: false,
            speed_drop: false,
            reached_min_height: false,
            jump_count: 0,
            current_frame: 0,
            frame_timer: 0.0,
            ms_per_frame: PlayerStatus::Waiting.ms_per_frame(),
            blink_timer: 0.0,
            blink_delay: 0.0,
            blink_count: 0,
        };
        player.update_animation(0.0, Some(PlayerStatus::Waiting), rng);
        player
    }

    /// Begin a jump. No-op while already airborne.
    ///
    /// The initial velocity scales with the current speed so the jump arc
    /// stays roughly normalized as the game accelerates.
    pub fn start_jump(&mut self, speed: f32) {
        if !self.jumping {
            self.set_status(PlayerStatus::Jumping);
            self.velocity = self.config.initial_jump_velocity - speed / 10.0;
            self.jumping = true;
            self.reached_min_height = false;
            self.speed_drop = false;
        }
    }

    /// Jump input released: clamp a still-strong ascent to the drop velocity
    /// so an early release produces a shorter hop.
    pub fn end_jump(&mut self) {
        if self.reached_min_height && self.velocity < self.config.drop_velocity {
            self.velocity = self.config.drop_velocity;
        }
    }

    /// Integrate one frame of jump physics.
    pub fn update_jump(&mut self, delta_time: f32) {
        let frames_elapsed = delta_time / self.ms_per_frame;

        if self.speed_drop {
            self.pos.y +=
                (self.velocity * self.config.speed_drop_coefficient * frames_elapsed).round();
        } else {
            self.pos.y += (self.velocity * frames_elapsed).round();
        }
        self.velocity += self.config.gravity * frames_elapsed;

        if self.pos.y < self.config.min_jump_y || self.speed_drop {
            self.reached_min_height = true;
        }
        if self.pos.y < MAX_JUMP_Y || self.speed_drop {
            self.end_jump();
        }

        // Back at ground level: jump complete.
        if self.pos.y > self.config.ground_y {
            self.land();
        }
    }

    fn land(&mut self) {
        self.pos.y = self.config.ground_y;
        self.velocity = 0.0;
        self.jumping = false;
        self.reached_min_height = false;
        self.jump_count += 1;
        self.set_status(PlayerStatus::Running);

        // Speed drop becomes a duck if the duck input is still held.
        if self.speed_drop {
            self.speed_drop = false;
            self.set_duck(true);
        }
    }

    /// Fast fall: a small downward kick lets gravity take over immediately.
    /// Only meaningful mid-jump.
    pub fn set_speed_drop(&mut self) {
        if self.jumping {
            self.speed_drop = true;
            self.velocity = 1.0;
        }
    }

    /// Duck input released mid-drop cancels the fast fall.
    pub fn clear_speed_drop(&mut self) {
        self.speed_drop = false;
    }

    /// Enter or leave the duck. Ducking while airborne is a no-op; the
    /// session routes that input to [`Player::set_speed_drop`] instead.
    pub fn set_duck(&mut self, ducking: bool) {
        if ducking && self.status != PlayerStatus::Ducking && !self.jumping {
            self.set_status(PlayerStatus::Ducking);
            self.ducking = true;
        } else if !ducking && self.status == PlayerStatus::Ducking {
            self.set_status(PlayerStatus::Running);
            self.ducking = false;
        }
    }

    /// Back to running on the ground, all flags and counters cleared.
    pub fn reset(&mut self) {
        self.pos.y = self.config.ground_y;
        self.velocity = 0.0;
        self.jumping = false;
        self.ducking = false;
        self.speed_drop = false;
        self.reached_min_height = false;
        self.jump_count = 0;
        self.set_status(PlayerStatus::Running);
    }

    fn set_status(&mut self, status: PlayerStatus) {
        self.status = status;
        self.current_frame = 0;
        self.frame_timer = 0.0;
        self.ms_per_frame = status.ms_per_frame();
    }

    /// Advance animation timers and frames. In the waiting state this drives
    /// the idle blink; `rng` picks the next blink interval.
    pub fn update_animation(
        &mut self,
        delta_time: f32,
        status: Option<PlayerStatus>,
        rng: &mut Pcg32,
    ) {
        self.frame_timer += delta_time;

        if let Some(status) = status {
            self.set_status(status);
            if status == PlayerStatus::Waiting {
                self.blink_timer = 0.0;
                self.pick_blink_delay(rng);
            }
        }

        if self.status == PlayerStatus::Waiting {
            self.blink(delta_time, rng);
        } else if self.frame_timer >= self.ms_per_frame {
            let frames = self.status.frames();
            self.current_frame = (self.current_frame + 1) % frames.len();
            self.frame_timer = 0.0;
        }
    }

    /// Idle blink: hold the eyes-open frame until the random delay elapses,
    /// run through the blink frame once, then schedule the next blink.
    fn blink(&mut self, delta_time: f32, rng: &mut Pcg32) {
        self.blink_timer += delta_time;
        if self.blink_timer >= self.blink_delay && self.frame_timer >= self.ms_per_frame {
            self.current_frame = (self.current_frame + 1) % 2;
            self.frame_timer = 0.0;
            if self.current_frame == 0 {
                self.blink_count += 1;
                self.blink_timer = 0.0;
                self.pick_blink_delay(rng);
            }
        }
    }

    fn pick_blink_delay(&mut self, rng: &mut Pcg32) {
        self.blink_delay = rng.random_range(0.0..BLINK_TIMING_MS).ceil();
    }

    /// Emit this frame's draw request.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        let frame_x = self.status.frames()[self.current_frame];
        let ducked = self.ducking && self.status != PlayerStatus::Crashed;
        let width = if ducked {
            PLAYER_WIDTH_DUCK
        } else {
            PLAYER_WIDTH
        };

        let src = SpriteRect::new(
            sprites::sheet::PLAYER.x + frame_x,
            sprites::sheet::PLAYER.y,
            width,
            PLAYER_HEIGHT,
        );
        let dst = DestRect::new(self.pos.x, self.pos.y, width, PLAYER_HEIGHT);
        renderer.blit(src, dst, 1.0);
    }

    /// Active hitbox set for the fine collision phase.
    pub fn hitboxes(&self) -> &'static [CollisionBox] {
        if self.ducking {
            &DUCKING_HITBOXES
        } else {
            &RUNNING_HITBOXES
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn ground_y(&self) -> f32 {
        self.config.ground_y
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn is_ducking(&self) -> bool {
        self.ducking
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn jump_count(&self) -> u32 {
        self.jump_count
    }

    pub fn blink_count(&self) -> u32 {
        self.blink_count
    }
}
