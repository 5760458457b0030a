//! Horizon
//!
//! The scrolling world: ground line, parallax clouds, night sky and the live
//! obstacle queue. Obstacles are ordered by x ascending; spawning happens at
//! the right edge, eviction at the front.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::config::GameConfig;
use crate::consts::FPS;
use crate::platform::{DestRect, Renderer};
use crate::sim::obstacle::{Obstacle, ObstacleKind};
use crate::sprites;

const CLOUD_MIN_SKY_LEVEL: f32 = 71.0;
const CLOUD_MAX_SKY_LEVEL: f32 = 30.0;
const CLOUD_MIN_GAP: f32 = 100.0;
const CLOUD_MAX_GAP: f32 = 400.0;

/// Decorative cloud. Never collides.
struct Cloud {
    pos: Vec2,
    /// Distance the cloud must travel before the next one may spawn.
    gap: f32,
}

impl Cloud {
    fn new(container_width: f32, rng: &mut Pcg32) -> Self {
        Self {
            pos: Vec2::new(
                container_width,
                rng.random_range(CLOUD_MAX_SKY_LEVEL..=CLOUD_MIN_SKY_LEVEL).round(),
            ),
            gap: rng.random_range(CLOUD_MIN_GAP..=CLOUD_MAX_GAP).round(),
        }
    }

    fn update(&mut self, speed: f32) {
        self.pos.x -= speed.ceil();
    }

    fn is_visible(&self) -> bool {
        self.pos.x + sprites::CLOUD_WIDTH > 0.0
    }

    fn render(&self, renderer: &mut dyn Renderer) {
        renderer.blit(
            sprites::cloud_rect(),
            DestRect::new(self.pos.x, self.pos.y, sprites::CLOUD_WIDTH, sprites::CLOUD_HEIGHT),
            1.0,
        );
    }
}

const GROUND_Y: f32 = 127.0;
/// Chance a recycled ground segment uses the bumpy variant.
const GROUND_BUMP_THRESHOLD: f64 = 0.5;

/// Two ground segments leapfrogging each other as they scroll.
struct GroundLine {
    x_positions: [f32; 2],
    source_offsets: [f32; 2],
}

impl GroundLine {
    fn new() -> Self {
        Self {
            x_positions: [0.0, sprites::GROUND_WIDTH],
            source_offsets: [0.0, 0.0],
        }
    }

    fn update(&mut self, delta_time: f32, speed: f32, rng: &mut Pcg32) {
        let increment = (speed * (FPS / 1000.0) * delta_time).floor();
        let lead = if self.x_positions[0] <= 0.0 { 0 } else { 1 };
        let trail = 1 - lead;

        self.x_positions[lead] -= increment;
        self.x_positions[trail] = self.x_positions[lead] + sprites::GROUND_WIDTH;

        if self.x_positions[lead] <= -sprites::GROUND_WIDTH {
            self.x_positions[lead] += sprites::GROUND_WIDTH * 2.0;
            self.x_positions[trail] = self.x_positions[lead] - sprites::GROUND_WIDTH;
            self.source_offsets[lead] = if rng.random_bool(GROUND_BUMP_THRESHOLD) {
                sprites::GROUND_WIDTH
            } else {
                0.0
            };
        }
    }

    fn reset(&mut self) {
        self.x_positions = [0.0, sprites::GROUND_WIDTH];
    }

    fn render(&self, renderer: &mut dyn Renderer) {
        for i in 0..2 {
            renderer.blit(
                sprites::ground_rect(self.source_offsets[i]),
                DestRect::new(
                    self.x_positions[i],
                    GROUND_Y,
                    sprites::GROUND_WIDTH,
                    sprites::GROUND_HEIGHT,
                ),
                1.0,
            );
        }
    }
}

const MOON_SPEED: f32 = 0.25;
const STAR_SPEED: f32 = 0.3;
const STAR_COUNT: usize = 2;
const STAR_MAX_Y: f32 = 70.0;
const NIGHT_FADE_SPEED: f32 = 0.035;
/// Sprite x offsets of the moon phases; index 3 is the full moon.
const MOON_PHASES: [f32; 7] = [140.0, 120.0, 100.0, 60.0, 40.0, 20.0, 0.0];

struct Star {
    pos: Vec2,
    variant: usize,
}

/// Moon and stars faded in while the session is inverted.
struct NightSky {
    opacity: f32,
    current_phase: usize,
    moon_x: f32,
    stars: Vec<Star>,
    container_width: f32,
}

impl NightSky {
    fn new(container_width: f32, rng: &mut Pcg32) -> Self {
        let mut sky = Self {
            opacity: 0.0,
            current_phase: 0,
            moon_x: container_width - 50.0,
            stars: Vec::new(),
            container_width,
        };
        sky.place_stars(rng);
        sky
    }

    fn place_stars(&mut self, rng: &mut Pcg32) {
        let segment = self.container_width / STAR_COUNT as f32;
        self.stars = (0..STAR_COUNT)
            .map(|i| Star {
                pos: Vec2::new(
                    rng.random_range(segment * i as f32..segment * (i + 1) as f32).round(),
                    rng.random_range(0.0..=STAR_MAX_Y).round(),
                ),
                variant: i,
            })
            .collect();
    }

    fn update(&mut self, activated: bool) {
        // A fresh activation advances the moon phase.
        if activated && self.opacity == 0.0 {
            self.current_phase = (self.current_phase + 1) % MOON_PHASES.len();
        }

        if activated && self.opacity < 1.0 {
            self.opacity = (self.opacity + NIGHT_FADE_SPEED).min(1.0);
        } else if !activated && self.opacity > 0.0 {
            self.opacity = (self.opacity - NIGHT_FADE_SPEED).max(0.0);
        }

        // Sky bodies drift while any night is visible.
        if self.opacity > 0.0 {
            let container_width = self.container_width;
            let wrapped = |x: f32, speed: f32, width: f32| {
                let x = x - speed;
                if x < -width { container_width } else { x }
            };
            self.moon_x = wrapped(self.moon_x, MOON_SPEED, sprites::MOON_WIDTH * 3.0);
            for star in &mut self.stars {
                star.pos.x = wrapped(star.pos.x, STAR_SPEED, sprites::STAR_SIZE);
            }
        }
    }

    fn reset(&mut self, rng: &mut Pcg32) {
        self.current_phase = 0;
        self.opacity = 0.0;
        self.moon_x = self.container_width - 50.0;
        self.place_stars(rng);
    }

    fn render(&self, renderer: &mut dyn Renderer) {
        if self.opacity <= 0.0 {
            return;
        }
        let moon_width = if self.current_phase == 3 {
            sprites::MOON_WIDTH * 2.0
        } else {
            sprites::MOON_WIDTH
        };
        renderer.blit(
            sprites::moon_rect(MOON_PHASES[self.current_phase], moon_width),
            DestRect::new(self.moon_x, 30.0, moon_width, sprites::MOON_HEIGHT),
            self.opacity,
        );
        for star in &self.stars {
            renderer.blit(
                sprites::star_rect(star.variant),
                DestRect::new(star.pos.x, star.pos.y, sprites::STAR_SIZE, sprites::STAR_SIZE),
                self.opacity,
            );
        }
    }
}

/// The scrolling world and its obstacle queue.
pub struct Horizon {
    width: f32,
    gap_coefficient: f32,
    cloud_speed: f32,
    cloud_frequency: f32,
    max_clouds: usize,
    max_obstacle_length: u32,
    max_obstacle_duplication: usize,

    obstacles: Vec<Obstacle>,
    /// Most recent spawns, newest first; bounds consecutive duplicates.
    obstacle_history: Vec<ObstacleKind>,
    clouds: Vec<Cloud>,
    ground: GroundLine,
    night: NightSky,
}

impl Horizon {
    pub fn new(config: &GameConfig, width: f32, rng: &mut Pcg32) -> Self {
        let mut horizon = Self {
            width,
            gap_coefficient: config.gap_coefficient,
            cloud_speed: config.bg_cloud_speed,
            cloud_frequency: config.cloud_frequency,
            max_clouds: config.max_clouds,
            max_obstacle_length: config.max_obstacle_length,
            max_obstacle_duplication: config.max_obstacle_duplication,
            obstacles: Vec::new(),
            obstacle_history: Vec::new(),
            clouds: Vec::new(),
            ground: GroundLine::new(),
            night: NightSky::new(width, rng),
        };
        horizon.clouds.push(Cloud::new(width, rng));
        horizon
    }

    /// Advance the world by one tick.
    ///
    /// `update_obstacles` gates the queue during warm-up and intro;
    /// `show_night` tracks the session's inverted flag.
    pub fn update(
        &mut self,
        delta_time: f32,
        current_speed: f32,
        update_obstacles: bool,
        show_night: bool,
        rng: &mut Pcg32,
    ) {
        self.ground.update(delta_time, current_speed, rng);
        self.night.update(show_night);
        self.update_clouds(delta_time, current_speed, rng);
        if update_obstacles {
            self.update_obstacles(delta_time, current_speed, rng);
        }
    }

    fn update_clouds(&mut self, delta_time: f32, speed: f32, rng: &mut Pcg32) {
        let cloud_speed = self.cloud_speed / 1000.0 * delta_time * speed;
        for cloud in &mut self.clouds {
            cloud.update(cloud_speed);
        }
        self.clouds.retain(Cloud::is_visible);

        let spawn = match self.clouds.last() {
            Some(last) => {
                self.clouds.len() < self.max_clouds
                    && self.width - last.pos.x > last.gap
                    && self.cloud_frequency > rng.random::<f32>()
            }
            None => true,
        };
        if spawn {
            self.clouds.push(Cloud::new(self.width, rng));
        }
    }

    fn update_obstacles(&mut self, delta_time: f32, speed: f32, rng: &mut Pcg32) {
        for obstacle in &mut self.obstacles {
            obstacle.update(delta_time, speed);
        }
        self.obstacles.retain(|o| !o.is_removed());

        // Spawn the follower once the current last obstacle's gap has fully
        // entered the canvas; the queue never holds more than one pending
        // off-screen obstacle.
        let spawn = match self.obstacles.last() {
            Some(last) => {
                !last.following_created
                    && last.is_visible()
                    && last.pos().x + last.width() + last.gap() < self.width
            }
            None => true,
        };
        if spawn {
            if let Some(last) = self.obstacles.last_mut() {
                last.following_created = true;
            }
            self.spawn_obstacle(speed, rng);
        }
    }

    fn spawn_obstacle(&mut self, speed: f32, rng: &mut Pcg32) {
        let kind = loop {
            let candidate = ObstacleKind::ALL[rng.random_range(0..ObstacleKind::ALL.len())];
            if speed >= candidate.spec().min_speed && !self.over_duplicated(candidate) {
                break candidate;
            }
        };

        self.obstacles.push(Obstacle::new(
            kind,
            self.width,
            self.gap_coefficient,
            speed,
            self.max_obstacle_length,
            rng,
        ));
        self.obstacle_history.insert(0, kind);
        self.obstacle_history.truncate(self.max_obstacle_duplication);
    }

    /// True when the last `max_obstacle_duplication` spawns were all `kind`.
    fn over_duplicated(&self, kind: ObstacleKind) -> bool {
        self.obstacle_history.len() >= self.max_obstacle_duplication
            && self.obstacle_history[..self.max_obstacle_duplication]
                .iter()
                .all(|k| *k == kind)
    }

    /// Nearest obstacle; the only one the collision detector must consider.
    pub fn front_obstacle(&self) -> Option<&Obstacle> {
        self.obstacles.first()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn has_obstacles(&self) -> bool {
        !self.obstacles.is_empty()
    }

    /// Clear obstacles and night state for a restart. Clouds persist.
    pub fn reset(&mut self, rng: &mut Pcg32) {
        self.obstacles.clear();
        self.obstacle_history.clear();
        self.ground.reset();
        self.night.reset(rng);
    }

    /// Emit this frame's draw requests, back to front.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        self.night.render(renderer);
        for cloud in &self.clouds {
            cloud.render(renderer);
        }
        self.ground.render(renderer);
        for obstacle in &self.obstacles {
            obstacle.render(renderer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{DEFAULT_WIDTH, MS_PER_FRAME};
    use rand::SeedableRng;

    fn horizon_with_rng(seed: u64) -> (Horizon, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let horizon = Horizon::new(&GameConfig::default(), DEFAULT_WIDTH, &mut rng);
        (horizon, rng)
    }

    /// Drive the horizon with obstacles enabled for `frames` ticks.
    fn run(horizon: &mut Horizon, rng: &mut Pcg32, frames: usize, speed: f32) {
        for _ in 0..frames {
            horizon.update(MS_PER_FRAME, speed, true, false, rng);
        }
    }

    #[test]
    fn first_update_spawns_an_obstacle() {
        let (mut horizon, mut rng) = horizon_with_rng(1);
        assert!(!horizon.has_obstacles());
        horizon.update(MS_PER_FRAME, 6.0, true, false, &mut rng);
        assert!(horizon.has_obstacles());
        // The fresh spawn sits at the right edge, off the visible field.
        assert_eq!(horizon.front_obstacle().unwrap().pos().x, DEFAULT_WIDTH);
    }

    #[test]
    fn warm_up_spawns_nothing() {
        let (mut horizon, mut rng) = horizon_with_rng(1);
        for _ in 0..100 {
            horizon.update(MS_PER_FRAME, 6.0, false, false, &mut rng);
        }
        assert!(!horizon.has_obstacles());
    }

    #[test]
    fn queue_stays_ordered_and_gapped() {
        let (mut horizon, mut rng) = horizon_with_rng(2);
        for _ in 0..2000 {
            horizon.update(MS_PER_FRAME, 6.0, true, false, &mut rng);
            let obstacles = horizon.obstacles();
            for pair in obstacles.windows(2) {
                let leading_edge = pair[0].pos().x + pair[0].width();
                assert!(
                    pair[1].pos().x >= leading_edge + pair[0].gap(),
                    "follower at {} violates gap {} after {}",
                    pair[1].pos().x,
                    pair[0].gap(),
                    leading_edge
                );
            }
        }
    }

    #[test]
    fn at_most_one_pending_obstacle_beyond_the_edge() {
        let (mut horizon, mut rng) = horizon_with_rng(3);
        for _ in 0..2000 {
            horizon.update(MS_PER_FRAME, 6.0, true, false, &mut rng);
            let pending = horizon
                .obstacles()
                .iter()
                .filter(|o| o.pos().x >= DEFAULT_WIDTH)
                .count();
            assert!(pending <= 1);
        }
    }

    #[test]
    fn obstacles_are_evicted_from_the_front() {
        let (mut horizon, mut rng) = horizon_with_rng(4);
        // 300 frames at 6 px/frame scrolls 1800 px; the first spawn is long
        // gone and nothing off-screen lingers in the queue.
        run(&mut horizon, &mut rng, 300, 6.0);
        assert!(horizon.has_obstacles());
        assert!(horizon.obstacles().iter().all(Obstacle::is_visible));
    }

    #[test]
    fn no_flyers_below_minimum_speed() {
        let (mut horizon, mut rng) = horizon_with_rng(5);
        run(&mut horizon, &mut rng, 5000, 6.0);
        // Speed 6 is below the flyer threshold of 8.5.
        assert!(
            horizon
                .obstacles()
                .iter()
                .all(|o| o.kind() != ObstacleKind::Pterodactyl)
        );
    }

    #[test]
    fn kinds_never_repeat_past_the_duplication_cap() {
        let (mut horizon, mut rng) = horizon_with_rng(6);
        let mut kinds = Vec::new();
        for _ in 0..60 {
            horizon.spawn_obstacle(9.0, &mut rng);
            kinds.push(horizon.obstacles().last().unwrap().kind());
        }
        for window in kinds.windows(3) {
            assert!(
                !(window[0] == window[1] && window[1] == window[2]),
                "three consecutive {:?}",
                window[0]
            );
        }
    }

    #[test]
    fn clouds_stay_bounded() {
        let (mut horizon, mut rng) = horizon_with_rng(7);
        for _ in 0..5000 {
            horizon.update(MS_PER_FRAME, 13.0, false, false, &mut rng);
            assert!(horizon.clouds.len() <= GameConfig::default().max_clouds);
        }
        assert!(!horizon.clouds.is_empty());
    }

    #[test]
    fn night_sky_fades_in_and_out() {
        let (mut horizon, mut rng) = horizon_with_rng(8);
        for _ in 0..60 {
            horizon.update(MS_PER_FRAME, 6.0, false, true, &mut rng);
        }
        assert_eq!(horizon.night.opacity, 1.0);

        for _ in 0..60 {
            horizon.update(MS_PER_FRAME, 6.0, false, false, &mut rng);
        }
        assert_eq!(horizon.night.opacity, 0.0);
    }

    #[test]
    fn reset_clears_the_queue() {
        let (mut horizon, mut rng) = horizon_with_rng(9);
        run(&mut horizon, &mut rng, 500, 6.0);
        assert!(horizon.has_obstacles());
        horizon.reset(&mut rng);
        assert!(!horizon.has_obstacles());
        assert_eq!(horizon.night.opacity, 0.0);
    }
}
