//! Two-phase axis-aligned collision detection
//!
//! A cheap bounding-box test runs every frame; the precise sub-hitbox test
//! only runs on a coarse hit. Both phases share one overlap predicate.

use crate::sim::obstacle::Obstacle;
use crate::sim::player::{self, Player};

/// Axis-aligned rectangle, canvas pixels.
///
/// Used both as an entity's outer bounds and as a sub-hitbox relative to its
/// owner. Width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CollisionBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Axis-aligned overlap test.
    pub fn overlaps(&self, other: &CollisionBox) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Shift an owner-relative sub-hitbox into canvas space.
    pub fn translated_by(&self, origin: &CollisionBox) -> CollisionBox {
        CollisionBox::new(self.x + origin.x, self.y + origin.y, self.width, self.height)
    }
}

/// Decide whether the player has hit the given obstacle.
///
/// Coarse phase: both outer boxes inset by 1px to compensate for the white
/// sprite border, the obstacle's width scaled by its duplication count. Fine
/// phase: the player's active hitbox set (ducking or upright) against the
/// obstacle's sub-boxes, first match wins, player boxes on the outer loop.
///
/// Pure function of its arguments so it can be exercised without a renderer.
pub fn check_for_collision(
    obstacle: &Obstacle,
    player: &Player,
) -> Option<(CollisionBox, CollisionBox)> {
    let player_box = CollisionBox::new(
        player.pos().x + 1.0,
        player.pos().y + 1.0,
        player::PLAYER_WIDTH - 2.0,
        player::PLAYER_HEIGHT - 2.0,
    );
    let obstacle_box = CollisionBox::new(
        obstacle.pos().x + 1.0,
        obstacle.pos().y + 1.0,
        obstacle.width() - 2.0,
        obstacle.height() - 2.0,
    );

    if !player_box.overlaps(&obstacle_box) {
        return None;
    }

    for player_hitbox in player.hitboxes() {
        for obstacle_hitbox in obstacle.hitboxes() {
            let adj_player = player_hitbox.translated_by(&player_box);
            let adj_obstacle = obstacle_hitbox.translated_by(&obstacle_box);
            if adj_player.overlaps(&adj_obstacle) {
                return Some((adj_player, adj_obstacle));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::consts::DEFAULT_HEIGHT;
    use crate::sim::obstacle::ObstacleKind;
    use crate::sim::player::PlayerConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn test_player() -> Player {
        let cfg = PlayerConfig::derive(&GameConfig::default(), DEFAULT_HEIGHT);
        let mut rng = Pcg32::seed_from_u64(7);
        Player::new(cfg, &mut rng)
    }

    fn obstacle_at(kind: ObstacleKind, x: f32, seed: u64) -> Obstacle {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut o = Obstacle::new(kind, 600.0, 0.6, 6.0, 3, &mut rng);
        o.set_x(x);
        o
    }

    #[test]
    fn disjoint_boxes_do_not_overlap() {
        let a = CollisionBox::new(0.0, 0.0, 10.0, 10.0);
        let b = CollisionBox::new(20.0, 20.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = CollisionBox::new(0.0, 0.0, 10.0, 10.0);
        let b = CollisionBox::new(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(
            ax in -200.0f32..200.0, ay in -200.0f32..200.0,
            aw in 0.0f32..100.0, ah in 0.0f32..100.0,
            bx in -200.0f32..200.0, by in -200.0f32..200.0,
            bw in 0.0f32..100.0, bh in 0.0f32..100.0,
        ) {
            let a = CollisionBox::new(ax, ay, aw, ah);
            let b = CollisionBox::new(bx, by, bw, bh);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn horizontally_separated_boxes_never_overlap(
            ay in -200.0f32..200.0, ah in 0.0f32..100.0,
            by in -200.0f32..200.0, bh in 0.0f32..100.0,
            gap in 0.001f32..100.0,
        ) {
            let a = CollisionBox::new(0.0, ay, 10.0, ah);
            let b = CollisionBox::new(10.0 + gap, by, 10.0, bh);
            prop_assert!(!a.overlaps(&b));
        }
    }

    #[test]
    fn far_obstacle_reports_no_collision() {
        let player = test_player();
        let obstacle = obstacle_at(ObstacleKind::CactusSmall, 400.0, 1);
        assert!(check_for_collision(&obstacle, &player).is_none());
    }

    #[test]
    fn grounded_player_hits_overlapping_cactus() {
        let player = test_player();
        // Directly on top of the player's x lane, on the ground.
        let obstacle = obstacle_at(ObstacleKind::CactusLarge, player.pos().x, 1);
        assert!(check_for_collision(&obstacle, &player).is_some());
    }

    #[test]
    fn ducking_clears_a_low_flyer_despite_coarse_overlap() {
        // A flyer at the middle height band overlaps the upright silhouette
        // but passes over the duck hitbox.
        let mut player = test_player();
        player.reset();

        let mut rng = Pcg32::seed_from_u64(3);
        let mut obstacle = loop {
            let o = Obstacle::new(ObstacleKind::Pterodactyl, 600.0, 0.6, 9.0, 3, &mut rng);
            if o.pos().y == 75.0 {
                break o;
            }
        };
        obstacle.set_x(player.pos().x + 10.0);

        // Upright: the head/torso boxes intersect the flyer.
        assert!(check_for_collision(&obstacle, &player).is_some());

        // Ducking: coarse boxes still overlap, fine phase finds nothing.
        player.set_duck(true);
        assert!(check_for_collision(&obstacle, &player).is_none());
    }
}
