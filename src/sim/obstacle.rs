//! Obstacles
//!
//! A small catalog of obstacle types with per-type sizing, spacing and
//! hitbox data. Instances are spawned by the horizon at the right canvas
//! edge and scroll left until evicted.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::FPS;
use crate::platform::{DestRect, Renderer};
use crate::sim::collision::CollisionBox;
use crate::sprites::{SpriteRect, sheet};

/// Widest gap is this multiple of the minimum gap.
const MAX_GAP_COEFFICIENT: f32 = 1.5;

const CACTUS_SMALL_HITBOXES: [CollisionBox; 3] = [
    CollisionBox::new(0.0, 7.0, 5.0, 27.0),
    CollisionBox::new(4.0, 0.0, 6.0, 34.0),
    CollisionBox::new(10.0, 4.0, 7.0, 14.0),
];

const CACTUS_LARGE_HITBOXES: [CollisionBox; 3] = [
    CollisionBox::new(0.0, 12.0, 7.0, 38.0),
    CollisionBox::new(8.0, 0.0, 7.0, 49.0),
    CollisionBox::new(13.0, 10.0, 10.0, 38.0),
];

const PTERODACTYL_HITBOXES: [CollisionBox; 5] = [
    CollisionBox::new(15.0, 15.0, 16.0, 5.0),
    CollisionBox::new(18.0, 21.0, 24.0, 6.0),
    CollisionBox::new(2.0, 14.0, 4.0, 3.0),
    CollisionBox::new(6.0, 10.0, 4.0, 7.0),
    CollisionBox::new(10.0, 8.0, 6.0, 9.0),
];

/// Static description of one obstacle type.
pub struct ObstacleSpec {
    /// Width of a single sprite unit.
    pub width: f32,
    pub height: f32,
    /// Possible y positions; flyers use several altitude bands.
    pub y_positions: &'static [f32],
    /// Duplication allowed only above this speed.
    pub multiple_speed: f32,
    /// Base gap to the following obstacle.
    pub min_gap: f32,
    /// Type excluded from spawning below this speed.
    pub min_speed: f32,
    /// Per-instance speed drift magnitude (flyers).
    pub speed_offset: f32,
    /// Animation frames and rate; 1 frame means static.
    pub num_frames: usize,
    pub frame_rate: f32,
    pub hitboxes: &'static [CollisionBox],
    pub sprite_origin: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    CactusSmall,
    CactusLarge,
    Pterodactyl,
}

static CACTUS_SMALL_SPEC: ObstacleSpec = ObstacleSpec {
    width: 17.0,
    height: 35.0,
    y_positions: &[105.0],
    multiple_speed: 4.0,
    min_gap: 120.0,
    min_speed: 0.0,
    speed_offset: 0.0,
    num_frames: 1,
    frame_rate: 0.0,
    hitboxes: &CACTUS_SMALL_HITBOXES,
    sprite_origin: sheet::CACTUS_SMALL,
};

static CACTUS_LARGE_SPEC: ObstacleSpec = ObstacleSpec {
    width: 25.0,
    height: 50.0,
    y_positions: &[90.0],
    multiple_speed: 7.0,
    min_gap: 120.0,
    min_speed: 0.0,
    speed_offset: 0.0,
    num_frames: 1,
    frame_rate: 0.0,
    hitboxes: &CACTUS_LARGE_HITBOXES,
    sprite_origin: sheet::CACTUS_LARGE,
};

static PTERODACTYL_SPEC: ObstacleSpec = ObstacleSpec {
    width: 46.0,
    height: 40.0,
    y_positions: &[100.0, 75.0, 50.0],
    // Flyers never duplicate.
    multiple_speed: f32::MAX,
    min_gap: 150.0,
    min_speed: 8.5,
    speed_offset: 0.8,
    num_frames: 2,
    frame_rate: 1000.0 / 6.0,
    hitboxes: &PTERODACTYL_HITBOXES,
    sprite_origin: sheet::PTERODACTYL,
};

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [
        ObstacleKind::CactusSmall,
        ObstacleKind::CactusLarge,
        ObstacleKind::Pterodactyl,
    ];

    pub fn spec(self) -> &'static ObstacleSpec {
        match self {
            ObstacleKind::CactusSmall => &CACTUS_SMALL_SPEC,
            ObstacleKind::CactusLarge => &CACTUS_LARGE_SPEC,
            ObstacleKind::Pterodactyl => &PTERODACTYL_SPEC,
        }
    }
}

pub struct Obstacle {
    kind: ObstacleKind,
    pos: Vec2,
    /// Sprite duplication count.
    size: u32,
    /// Total width (`spec.width * size`).
    width: f32,
    /// Required clearance to the next obstacle's left edge.
    gap: f32,
    speed_offset: f32,
    hitboxes: Vec<CollisionBox>,
    /// The horizon has already queued the obstacle that follows this one.
    pub following_created: bool,
    removed: bool,

    current_frame: usize,
    frame_timer: f32,
}

impl Obstacle {
    /// Spawn a new obstacle with its left edge at `x`.
    pub fn new(
        kind: ObstacleKind,
        x: f32,
        gap_coefficient: f32,
        speed: f32,
        max_length: u32,
        rng: &mut Pcg32,
    ) -> Self {
        let spec = kind.spec();

        let mut size = rng.random_range(1..=max_length.max(1));
        if size > 1 && spec.multiple_speed > speed {
            size = 1;
        }
        let width = spec.width * size as f32;

        let y = spec.y_positions[rng.random_range(0..spec.y_positions.len())];

        let mut hitboxes = spec.hitboxes.to_vec();
        if size > 1 && hitboxes.len() >= 3 {
            // Stretch the middle box across the duplicated sprite units.
            hitboxes[1].width = width - hitboxes[0].width - hitboxes[2].width;
        }

        let speed_offset = if spec.speed_offset != 0.0 {
            if rng.random_bool(0.5) {
                spec.speed_offset
            } else {
                -spec.speed_offset
            }
        } else {
            0.0
        };

        let gap = Self::pick_gap(width, gap_coefficient, speed, spec.min_gap, rng);

        Self {
            kind,
            pos: Vec2::new(x, y),
            size,
            width,
            gap,
            speed_offset,
            hitboxes,
            following_created: false,
            removed: false,
            current_frame: 0,
            frame_timer: 0.0,
        }
    }

    /// Gap to the next obstacle: proportional to width and speed with a
    /// type-specific floor, widened by up to 50% at random.
    fn pick_gap(
        width: f32,
        gap_coefficient: f32,
        speed: f32,
        type_min_gap: f32,
        rng: &mut Pcg32,
    ) -> f32 {
        let min_gap = (width * speed + type_min_gap * gap_coefficient).round();
        let max_gap = (min_gap * MAX_GAP_COEFFICIENT).round();
        rng.random_range(min_gap..=max_gap)
    }

    /// Scroll left and advance the flap animation.
    pub fn update(&mut self, delta_time: f32, speed: f32) {
        if self.removed {
            return;
        }
        let speed = speed + self.speed_offset;
        self.pos.x -= (speed * (FPS / 1000.0) * delta_time).floor();

        let spec = self.kind.spec();
        if spec.num_frames > 1 {
            self.frame_timer += delta_time;
            if self.frame_timer >= spec.frame_rate {
                self.current_frame = (self.current_frame + 1) % spec.num_frames;
                self.frame_timer = 0.0;
            }
        }

        if !self.is_visible() {
            self.removed = true;
        }
    }

    /// Still at least partially inside the canvas.
    pub fn is_visible(&self) -> bool {
        self.pos.x + self.width > 0.0
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Emit this frame's draw request.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        let spec = self.kind.spec();

        // Size-2 and size-3 cacti are pre-composed groups further right in
        // the sheet; flyers offset by the flap frame instead.
        let mut source_x =
            spec.width * self.size as f32 * (0.5 * (self.size - 1) as f32) + spec.sprite_origin.x;
        if self.current_frame > 0 {
            source_x += spec.width * self.current_frame as f32;
        }

        let src = SpriteRect::new(source_x, spec.sprite_origin.y, self.width, spec.height);
        let dst = DestRect::new(self.pos.x, self.pos.y, self.width, spec.height);
        renderer.blit(src, dst, 1.0);
    }

    pub fn kind(&self) -> ObstacleKind {
        self.kind
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.kind.spec().height
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn hitboxes(&self) -> &[CollisionBox] {
        &self.hitboxes
    }

    #[cfg(test)]
    pub(crate) fn set_x(&mut self, x: f32) {
        self.pos.x = x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MS_PER_FRAME;
    use rand::SeedableRng;

    fn rng(seed: u64) -> Pcg32 {
        Pcg32::seed_from_u64(seed)
    }

    #[test]
    fn gap_respects_the_speed_scaled_floor() {
        for seed in 0..200 {
            let mut rng = rng(seed);
            let o = Obstacle::new(ObstacleKind::CactusSmall, 600.0, 0.6, 6.0, 3, &mut rng);
            let min_gap = (o.width() * 6.0 + 120.0 * 0.6).round();
            assert!(o.gap() >= min_gap, "gap {} below floor {}", o.gap(), min_gap);
            assert!(o.gap() <= (min_gap * 1.5).round());
        }
    }

    #[test]
    fn slow_speed_forces_single_size() {
        // Below the small cactus duplication speed every spawn is size 1.
        for seed in 0..100 {
            let mut rng = rng(seed);
            let o = Obstacle::new(ObstacleKind::CactusSmall, 600.0, 0.6, 3.5, 3, &mut rng);
            assert_eq!(o.size(), 1);
            assert_eq!(o.width(), 17.0);
        }
    }

    #[test]
    fn fast_speed_allows_duplication_and_stretches_the_middle_hitbox() {
        let mut saw_multi = false;
        for seed in 0..100 {
            let mut rng = rng(seed);
            let o = Obstacle::new(ObstacleKind::CactusSmall, 600.0, 0.6, 9.0, 3, &mut rng);
            assert!(o.size() >= 1 && o.size() <= 3);
            if o.size() > 1 {
                saw_multi = true;
                assert_eq!(o.width(), 17.0 * o.size() as f32);
                let boxes = o.hitboxes();
                let expected = o.width() - boxes[0].width - boxes[2].width;
                assert_eq!(boxes[1].width, expected);
            }
        }
        assert!(saw_multi);
    }

    #[test]
    fn flyers_never_duplicate() {
        for seed in 0..100 {
            let mut rng = rng(seed);
            let o = Obstacle::new(ObstacleKind::Pterodactyl, 600.0, 0.6, 13.0, 3, &mut rng);
            assert_eq!(o.size(), 1);
            assert!([100.0, 75.0, 50.0].contains(&o.pos().y));
            assert_eq!(o.speed_offset.abs(), 0.8);
        }
    }

    #[test]
    fn obstacle_scrolls_left_and_is_evicted_off_screen() {
        let mut rng = rng(5);
        let mut o = Obstacle::new(ObstacleKind::CactusLarge, 600.0, 0.6, 6.0, 3, &mut rng);
        let start_x = o.pos().x;

        // One logical frame at speed 6 moves a whole-pixel step of ~6.
        o.update(MS_PER_FRAME, 6.0);
        let moved = start_x - o.pos().x;
        assert!((5.0..=6.0).contains(&moved), "moved {moved}");
        assert_eq!(moved, moved.floor());
        assert!(!o.is_removed());

        // Push it fully past the left edge.
        o.set_x(-o.width() - 1.0);
        o.update(MS_PER_FRAME, 6.0);
        assert!(o.is_removed());
    }
}
