//! Game session orchestrator
//!
//! One explicitly constructed session value owning the character, horizon,
//! distance meter and the injected platform collaborators. A single
//! authoritative `update` advances physics, spawns terrain and checks
//! collisions in a fixed order, then schedules the next frame. There is no
//! global instance; independent sessions can coexist.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::GameConfig;
use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MS_PER_FRAME};
use crate::leaderboard::Leaderboard;
use crate::platform::{DestRect, FrameHandle, Platform, Sound};
use crate::sim::collision::check_for_collision;
use crate::sim::distance_meter::DistanceMeter;
use crate::sim::horizon::Horizon;
use crate::sim::player::{Player, PlayerConfig, PlayerStatus};
use crate::sprites;

/// How long the character "runs in" after the first jump before the world
/// starts scrolling, ms.
const INTRO_DURATION_MS: f32 = 200.0;

/// Logical canvas size of the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// Discrete input events delivered by the host. The session never polls
/// device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    JumpPressed,
    JumpReleased,
    DuckPressed,
    DuckReleased,
    Restart,
    FocusLost,
    FocusGained,
}

pub struct Game {
    config: GameConfig,
    dimensions: Dimensions,
    platform: Platform,
    rng: Pcg32,

    player: Player,
    horizon: Horizon,
    distance_meter: DistanceMeter,
    leaderboard: Leaderboard,

    /// Wall-clock timestamp of the previous tick.
    time: Option<f64>,
    running_time: f32,
    distance_ran: f32,
    current_speed: f32,
    /// Best pixel distance across this session's runs.
    highest_score: f32,
    play_count: u32,

    playing: bool,
    paused: bool,
    crashed: bool,
    /// The player has interacted at least once.
    activated: bool,

    playing_intro: bool,
    intro_timer: f32,

    inverted: bool,
    invert_timer: f32,

    pending_frame: Option<FrameHandle>,
}

impl Game {
    pub fn new(config: GameConfig, dimensions: Dimensions, platform: Platform, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let player = Player::new(PlayerConfig::derive(&config, dimensions.height), &mut rng);
        let horizon = Horizon::new(&config, dimensions.width, &mut rng);
        let distance_meter = DistanceMeter::new(dimensions.width);
        let speed = config.speed;

        let mut game = Self {
            config,
            dimensions,
            platform,
            rng,
            player,
            horizon,
            distance_meter,
            leaderboard: Leaderboard::new(),
            time: None,
            running_time: 0.0,
            distance_ran: 0.0,
            current_speed: speed,
            highest_score: 0.0,
            play_count: 0,
            playing: false,
            paused: false,
            crashed: false,
            activated: false,
            playing_intro: false,
            intro_timer: 0.0,
            inverted: false,
            invert_timer: 0.0,
            pending_frame: None,
        };
        game.set_speed(Some(speed));
        // First idle frame: draws the waiting pose and arms the blink loop.
        game.update();
        game
    }

    /// Set the current speed, damped on narrow canvases so small screens
    /// stay playable.
    fn set_speed(&mut self, speed: Option<f32>) {
        let speed = speed.unwrap_or(self.current_speed);
        if self.dimensions.width < DEFAULT_WIDTH {
            let mobile_speed = speed * self.dimensions.width / DEFAULT_WIDTH
                * self.config.mobile_speed_coefficient;
            self.current_speed = mobile_speed.min(speed);
        } else {
            self.current_speed = speed;
        }
    }

    /// The authoritative per-frame update. Invoked by the host whenever the
    /// scheduled frame fires; reschedules itself while there is anything to
    /// animate.
    pub fn update(&mut self) {
        self.pending_frame = None;

        let now = self.platform.clock.now_ms();
        let mut delta_time = match self.time {
            Some(prev) => (now - prev) as f32,
            None => 0.0,
        };
        self.time = Some(now);

        if self.playing {
            if self.player.is_jumping() {
                self.player.update_jump(delta_time);
            }

            self.running_time += delta_time;
            let has_obstacles = self.running_time > self.config.clear_time;

            // The first completed jump starts the intro.
            if self.player.jump_count() == 1
                && !self.playing_intro
                && !self.activated
                && !self.crashed
            {
                self.play_intro();
            }

            if self.playing_intro {
                self.intro_timer += delta_time;
                if self.intro_timer > INTRO_DURATION_MS {
                    self.start_game();
                }
                // The horizon stands still until the intro is over.
                self.horizon
                    .update(0.0, self.current_speed, has_obstacles, false, &mut self.rng);
            } else {
                if !self.activated {
                    delta_time = 0.0;
                }
                self.horizon.update(
                    delta_time,
                    self.current_speed,
                    has_obstacles,
                    self.inverted,
                    &mut self.rng,
                );
            }

            let collision = has_obstacles
                && self
                    .horizon
                    .front_obstacle()
                    .is_some_and(|obstacle| check_for_collision(obstacle, &self.player).is_some());

            if !collision {
                self.distance_ran += self.current_speed * delta_time / MS_PER_FRAME;
                if self.current_speed < self.config.max_speed {
                    self.current_speed += self.config.acceleration;
                }
            } else {
                self.game_over();
            }

            if self.distance_meter.update(delta_time, self.distance_ran) {
                self.platform.sound.play(Sound::ScoreReached);
            }

            self.update_invert(delta_time);
        }

        if self.playing
            || (!self.activated && self.player.blink_count() < self.config.max_blink_count)
        {
            self.player.update_animation(delta_time, None, &mut self.rng);
            self.render_frame();
            self.schedule_next_update();
        }
    }

    /// First jump: mark the session activated and let the character run in
    /// before anything scrolls.
    fn play_intro(&mut self) {
        self.playing_intro = true;
        self.intro_timer = 0.0;
        self.playing = true;
        self.activated = true;
        log::info!("session activated, playing intro");
    }

    /// Intro finished; the clock on the obstacle warm-up starts now.
    fn start_game(&mut self) {
        self.running_time = 0.0;
        self.playing_intro = false;
        self.intro_timer = 0.0;
        self.play_count += 1;
    }

    fn game_over(&mut self) {
        self.platform.sound.play(Sound::Hit);
        self.pause();
        self.crashed = true;
        self.distance_meter.cancel_achievement();
        self.player
            .update_animation(100.0, Some(PlayerStatus::Crashed), &mut self.rng);

        if self.distance_ran > self.highest_score {
            self.highest_score = self.distance_ran.ceil();
            self.distance_meter.set_high_score(self.highest_score);
        }
        let score = DistanceMeter::actual_distance(self.distance_ran.ceil());
        self.leaderboard
            .record_run(score, self.current_speed, self.play_count);
        log::info!(
            "game over: score {score}, speed {:.2}, play #{}",
            self.current_speed,
            self.play_count
        );

        self.time = Some(self.platform.clock.now_ms());
        self.render_frame();
    }

    /// Stop scheduling. Idempotent: a second call finds no pending frame.
    pub fn pause(&mut self) {
        self.playing = false;
        self.paused = true;
        if let Some(handle) = self.pending_frame.take() {
            self.platform.scheduler.cancel_frame(handle);
        }
    }

    /// Resume from a pause. Resets the timing reference so the dead time
    /// doesn't land in the next delta.
    pub fn resume(&mut self) {
        if !self.crashed {
            self.playing = true;
            self.paused = false;
            self.player
                .update_animation(0.0, Some(PlayerStatus::Running), &mut self.rng);
            self.time = Some(self.platform.clock.now_ms());
            self.update();
        }
    }

    /// Begin a new run. Refused while a frame is still scheduled, which
    /// keeps a second loop from ever starting.
    pub fn restart(&mut self) {
        if self.pending_frame.is_some() {
            return;
        }
        self.play_count += 1;
        self.running_time = 0.0;
        self.playing = true;
        self.paused = false;
        self.crashed = false;
        self.distance_ran = 0.0;
        self.set_speed(Some(self.config.speed));
        self.time = Some(self.platform.clock.now_ms());
        self.distance_meter.reset();
        self.horizon.reset(&mut self.rng);
        self.player.reset();
        self.inverted = false;
        self.invert_timer = 0.0;
        self.platform.sound.play(Sound::ButtonPress);
        log::info!("restart, play #{}", self.play_count);
        self.update();
    }

    /// Night mode: each multiple of the invert distance flips the colors,
    /// and the effect reverts on its own after the fade duration.
    fn update_invert(&mut self, delta_time: f32) {
        if self.invert_timer > self.config.invert_fade_duration {
            self.invert_timer = 0.0;
            self.inverted = false;
        } else if self.invert_timer > 0.0 {
            self.invert_timer += delta_time;
        } else {
            let distance = DistanceMeter::actual_distance(self.distance_ran.ceil());
            if distance > 0
                && distance % self.config.invert_distance == 0
                && self.invert_timer == 0.0
            {
                self.invert_timer += delta_time;
                self.inverted = true;
            }
        }
    }

    /// Route one host input event.
    pub fn on_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::JumpPressed => self.on_jump_pressed(),
            InputEvent::JumpReleased => self.on_jump_released(),
            InputEvent::DuckPressed => self.on_duck_pressed(),
            InputEvent::DuckReleased => self.on_duck_released(),
            InputEvent::Restart => {
                if self.crashed {
                    self.restart();
                }
            }
            InputEvent::FocusLost => self.pause(),
            InputEvent::FocusGained => {
                // Visibility only matters once a game has actually started.
                if !self.crashed && self.activated {
                    self.player.reset();
                    self.resume();
                }
            }
        }
    }

    fn on_jump_pressed(&mut self) {
        if self.crashed || self.paused {
            return;
        }
        if !self.playing {
            self.playing = true;
            self.update();
        }
        if !self.player.is_jumping() && !self.player.is_ducking() {
            self.platform.sound.play(Sound::ButtonPress);
            self.player.start_jump(self.current_speed);
        }
    }

    fn on_jump_released(&mut self) {
        if self.is_running() {
            self.player.end_jump();
        } else if self.crashed {
            // The jump key restarts only once the game-over panel has
            // settled, so a late reflex press doesn't skip it.
            let elapsed = self
                .time
                .map(|t| (self.platform.clock.now_ms() - t) as f32)
                .unwrap_or_default();
            if elapsed >= self.config.gameover_clear_time {
                self.restart();
            }
        } else if self.paused {
            self.player.reset();
            self.resume();
        }
    }

    fn on_duck_pressed(&mut self) {
        if self.crashed || self.paused || !self.playing {
            return;
        }
        if self.player.is_jumping() {
            // Duck mid-jump is a fast fall, not a duck.
            self.player.set_speed_drop();
        } else if !self.player.is_ducking() {
            self.player.set_duck(true);
        }
    }

    fn on_duck_released(&mut self) {
        self.player.clear_speed_drop();
        self.player.set_duck(false);
    }

    fn schedule_next_update(&mut self) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.platform.scheduler.request_frame());
        }
    }

    /// Emit all draw requests for the current state.
    fn render_frame(&mut self) {
        let renderer = self.platform.renderer.as_mut();
        renderer.clear();
        self.horizon.render(renderer);
        self.player.render(renderer);
        self.distance_meter.render(renderer);

        if self.crashed {
            let center_x = self.dimensions.width / 2.0;
            let text = sprites::game_over_text_rect();
            renderer.blit(
                text,
                DestRect::new(
                    (center_x - text.width / 2.0).round(),
                    ((self.dimensions.height - 25.0) / 3.0).round(),
                    text.width,
                    text.height,
                ),
                1.0,
            );
            let restart = sprites::restart_button_rect();
            renderer.blit(
                restart,
                DestRect::new(
                    center_x - restart.width / 2.0,
                    self.dimensions.height / 2.0,
                    restart.width,
                    restart.height,
                ),
                1.0,
            );
        }
    }

    /// Distance traveled this run, in displayed units.
    pub fn current_distance(&self) -> u32 {
        DistanceMeter::actual_distance(self.distance_ran.ceil())
    }

    /// Best pixel distance of the session. Hosts persist this externally.
    pub fn high_score(&self) -> u32 {
        self.highest_score as u32
    }

    /// Seed the high score with a host-persisted value (pixel distance).
    pub fn set_high_score(&mut self, distance_px: u32) {
        self.highest_score = distance_px as f32;
        self.distance_meter.set_high_score(self.highest_score);
    }

    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Whether a frame is currently scheduled.
    pub fn is_running(&self) -> bool {
        self.pending_frame.is_some()
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn play_count(&self) -> u32 {
        self.play_count
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn horizon(&self) -> &Horizon {
        &self.horizon
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }
}
