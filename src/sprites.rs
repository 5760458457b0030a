//! Sprite-sheet geometry
//!
//! Source rectangles within the sprite sheet. The core computes these and
//! hands them to the [`Renderer`](crate::platform::Renderer) together with a
//! destination rect; it never loads or inspects the image itself.

use glam::Vec2;

/// Source rectangle within the sprite sheet, sheet pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SpriteRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Top-left origin of each region in the sheet.
pub mod sheet {
    use glam::Vec2;

    pub const RESTART: Vec2 = Vec2::new(2.0, 2.0);
    pub const CLOUD: Vec2 = Vec2::new(86.0, 2.0);
    pub const PTERODACTYL: Vec2 = Vec2::new(134.0, 2.0);
    pub const CACTUS_SMALL: Vec2 = Vec2::new(228.0, 2.0);
    pub const CACTUS_LARGE: Vec2 = Vec2::new(332.0, 2.0);
    pub const MOON: Vec2 = Vec2::new(484.0, 2.0);
    pub const STAR: Vec2 = Vec2::new(645.0, 2.0);
    pub const TEXT: Vec2 = Vec2::new(655.0, 2.0);
    pub const PLAYER: Vec2 = Vec2::new(848.0, 2.0);
    pub const GROUND: Vec2 = Vec2::new(2.0, 54.0);
}

/// Score glyph cell size in the sheet.
pub const GLYPH_WIDTH: f32 = 10.0;
pub const GLYPH_HEIGHT: f32 = 13.0;

/// Glyph row used by the score meter: digits 0-9, then 'H' (10) and 'I' (11).
pub fn glyph_rect(glyph: u8) -> SpriteRect {
    SpriteRect::new(
        sheet::TEXT.x + GLYPH_WIDTH * glyph as f32,
        sheet::TEXT.y,
        GLYPH_WIDTH,
        GLYPH_HEIGHT,
    )
}

/// "GAME OVER" banner within the text region.
pub fn game_over_text_rect() -> SpriteRect {
    SpriteRect::new(sheet::TEXT.x, sheet::TEXT.y + 13.0, 191.0, 11.0)
}

/// Restart button glyph.
pub fn restart_button_rect() -> SpriteRect {
    SpriteRect::new(sheet::RESTART.x, sheet::RESTART.y, 36.0, 32.0)
}

pub const CLOUD_WIDTH: f32 = 46.0;
pub const CLOUD_HEIGHT: f32 = 14.0;

pub fn cloud_rect() -> SpriteRect {
    SpriteRect::new(sheet::CLOUD.x, sheet::CLOUD.y, CLOUD_WIDTH, CLOUD_HEIGHT)
}

pub const GROUND_WIDTH: f32 = 600.0;
pub const GROUND_HEIGHT: f32 = 12.0;

/// Ground strip; `source_offset` selects the flat (0) or bumpy (600) variant.
pub fn ground_rect(source_offset: f32) -> SpriteRect {
    SpriteRect::new(
        sheet::GROUND.x + source_offset,
        sheet::GROUND.y,
        GROUND_WIDTH,
        GROUND_HEIGHT,
    )
}

pub const MOON_WIDTH: f32 = 20.0;
pub const MOON_HEIGHT: f32 = 40.0;

/// Moon at a given phase offset; the full moon occupies a double-width cell.
pub fn moon_rect(phase_offset: f32, width: f32) -> SpriteRect {
    SpriteRect::new(sheet::MOON.x + phase_offset, sheet::MOON.y, width, MOON_HEIGHT)
}

pub const STAR_SIZE: f32 = 9.0;

pub fn star_rect(variant: usize) -> SpriteRect {
    SpriteRect::new(
        sheet::STAR.x,
        sheet::STAR.y + STAR_SIZE * variant as f32,
        STAR_SIZE,
        STAR_SIZE,
    )
}
