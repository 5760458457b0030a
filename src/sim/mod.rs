//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One authoritative update per scheduled frame
//! - Seeded RNG only
//! - State updates separated from draw-request emission
//! - No rendering or platform dependencies beyond the injected traits

pub mod collision;
pub mod distance_meter;
pub mod game;
pub mod horizon;
pub mod obstacle;
pub mod player;

pub use collision::{CollisionBox, check_for_collision};
pub use distance_meter::DistanceMeter;
pub use game::{Dimensions, Game, InputEvent};
pub use horizon::Horizon;
pub use obstacle::{Obstacle, ObstacleKind};
pub use player::{Player, PlayerStatus};
