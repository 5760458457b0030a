//! Distance meter
//!
//! Converts pixels traveled into the displayed score, detects achievement
//! crossings and tracks the high-score glyph row. State updates return
//! whether the achievement cue should fire; drawing is a separate pass.

use crate::platform::{DestRect, Renderer};
use crate::sprites;

/// Pixel distance to displayed unit conversion.
const DISTANCE_COEFFICIENT: f32 = 0.025;
/// Units between achievement flashes.
const ACHIEVEMENT_DISTANCE: u32 = 100;
/// Starting digit count.
const MAX_DISTANCE_UNITS: usize = 5;
/// Half-period of the achievement flash, ms.
const FLASH_DURATION_MS: f32 = 1000.0 / 4.0;
const FLASH_ITERATIONS: u32 = 3;

/// Glyph codes past the digits.
pub const GLYPH_H: u8 = 10;
pub const GLYPH_I: u8 = 11;
/// Spacer; skipped when rendering.
pub const GLYPH_BLANK: u8 = 12;

const METER_Y: f32 = 5.0;
/// Horizontal advance per drawn glyph.
const DEST_WIDTH: f32 = 11.0;

pub struct DistanceMeter {
    x: f32,
    digits: Vec<u8>,
    /// Displayed digit count; grows when the score exceeds all-nines and
    /// never shrinks within a session.
    max_score_units: usize,
    /// Largest score the current digit count can show.
    max_score: u32,
    high_score_glyphs: Vec<u8>,
    achievement: bool,
    flash_timer: f32,
    flash_iterations: u32,
    /// Whether the digits are visible this frame (flash blanking).
    paint: bool,
}

impl DistanceMeter {
    pub fn new(canvas_width: f32) -> Self {
        let mut meter = Self {
            x: 0.0,
            digits: vec![0; MAX_DISTANCE_UNITS],
            max_score_units: MAX_DISTANCE_UNITS,
            max_score: 10u32.pow(MAX_DISTANCE_UNITS as u32) - 1,
            high_score_glyphs: Vec::new(),
            achievement: false,
            flash_timer: 0.0,
            flash_iterations: 0,
            paint: true,
        };
        meter.calc_x_pos(canvas_width);
        meter
    }

    fn calc_x_pos(&mut self, canvas_width: f32) {
        self.x = canvas_width - DEST_WIDTH * (self.max_score_units as f32 + 1.0);
    }

    /// Convert a pixel distance to a displayed unit distance.
    pub fn actual_distance(distance_px: f32) -> u32 {
        if distance_px > 0.0 {
            (distance_px * DISTANCE_COEFFICIENT).round() as u32
        } else {
            0
        }
    }

    /// Feed the meter this frame's distance. Returns true when an
    /// achievement was just crossed and the score cue should play.
    pub fn update(&mut self, delta_time: f32, distance_px: f32) -> bool {
        let mut play_sound = false;

        if !self.achievement {
            let distance = Self::actual_distance(distance_px.ceil());

            // Score has outgrown the current digit count.
            while distance > self.max_score {
                self.max_score_units += 1;
                self.max_score = self.max_score * 10 + 9;
            }

            if distance > 0 {
                if distance % ACHIEVEMENT_DISTANCE == 0 {
                    self.achievement = true;
                    self.flash_timer = 0.0;
                    play_sound = true;
                }
                let s = format!("{distance:0width$}", width = self.max_score_units);
                self.digits = s.bytes().map(|b| b - b'0').collect();
            } else {
                self.digits = vec![0; self.max_score_units];
            }
            self.paint = true;
        } else {
            // Flash the score on reaching an achievement.
            if self.flash_iterations <= FLASH_ITERATIONS {
                self.flash_timer += delta_time;
                if self.flash_timer < FLASH_DURATION_MS {
                    self.paint = false;
                } else if self.flash_timer > FLASH_DURATION_MS * 2.0 {
                    self.flash_timer = 0.0;
                    self.flash_iterations += 1;
                } else {
                    self.paint = true;
                }
            } else {
                self.achievement = false;
                self.flash_iterations = 0;
                self.flash_timer = 0.0;
            }
        }

        play_sound
    }

    /// Record a new high score, shown as "HI ddddd".
    pub fn set_high_score(&mut self, distance_px: f32) {
        let distance = Self::actual_distance(distance_px);
        let s = format!("{distance:0width$}", width = self.max_score_units);
        self.high_score_glyphs = [GLYPH_H, GLYPH_I, GLYPH_BLANK]
            .into_iter()
            .chain(s.bytes().map(|b| b - b'0'))
            .collect();
    }

    /// Abort any flash in progress (the session crashed).
    pub fn cancel_achievement(&mut self) {
        self.achievement = false;
        self.flash_timer = 0.0;
        self.flash_iterations = 0;
        self.paint = true;
    }

    /// Back to zero for a restart. The digit count is kept: it never
    /// shrinks within a session.
    pub fn reset(&mut self) {
        self.digits = vec![0; self.max_score_units];
        self.cancel_achievement();
    }

    /// Emit this frame's draw requests: current score (unless blanked by the
    /// flash) and the high-score row to its left.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        if self.paint {
            for (i, &digit) in self.digits.iter().enumerate() {
                self.draw_glyph(renderer, i as f32, digit, self.x, 1.0);
            }
        }

        let high_score_x =
            self.x - self.max_score_units as f32 * 2.0 * sprites::GLYPH_WIDTH;
        for (i, &glyph) in self.high_score_glyphs.iter().enumerate() {
            self.draw_glyph(renderer, i as f32, glyph, high_score_x, 0.8);
        }
    }

    fn draw_glyph(
        &self,
        renderer: &mut dyn Renderer,
        slot: f32,
        glyph: u8,
        base_x: f32,
        opacity: f32,
    ) {
        if glyph == GLYPH_BLANK {
            return;
        }
        renderer.blit(
            sprites::glyph_rect(glyph),
            DestRect::new(
                base_x + slot * DEST_WIDTH,
                METER_Y,
                sprites::GLYPH_WIDTH,
                sprites::GLYPH_HEIGHT,
            ),
            opacity,
        );
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn max_score_units(&self) -> usize {
        self.max_score_units
    }

    pub fn achievement_active(&self) -> bool {
        self.achievement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MS_PER_FRAME;

    /// Pixel distance whose unit conversion equals `units`.
    fn px(units: u32) -> f32 {
        units as f32 / DISTANCE_COEFFICIENT
    }

    #[test]
    fn pixel_to_unit_conversion() {
        assert_eq!(DistanceMeter::actual_distance(0.0), 0);
        assert_eq!(DistanceMeter::actual_distance(-5.0), 0);
        assert_eq!(DistanceMeter::actual_distance(4000.0), 100);
    }

    #[test]
    fn starts_at_five_zeros() {
        let meter = DistanceMeter::new(600.0);
        assert_eq!(meter.digits(), &[0, 0, 0, 0, 0]);
        assert_eq!(meter.max_score_units(), 5);
    }

    #[test]
    fn digits_track_the_distance() {
        let mut meter = DistanceMeter::new(600.0);
        meter.update(MS_PER_FRAME, px(1234));
        assert_eq!(meter.digits(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn digit_count_grows_and_never_shrinks() {
        let mut meter = DistanceMeter::new(600.0);
        meter.update(MS_PER_FRAME, px(123_456));
        assert_eq!(meter.max_score_units(), 6);
        assert_eq!(meter.digits(), &[1, 2, 3, 4, 5, 6]);

        // Even after a restart the meter keeps the wider display.
        meter.reset();
        assert_eq!(meter.max_score_units(), 6);
        assert_eq!(meter.digits(), &[0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn achievement_fires_once_per_crossing() {
        let mut meter = DistanceMeter::new(600.0);
        let mut cues = 0;

        // Walk the distance up through the 100-unit boundary and keep
        // ticking well past it while the flash plays out.
        let mut distance = 99.6;
        for _ in 0..600 {
            distance += 0.05;
            if meter.update(MS_PER_FRAME, px(100) * distance / 100.0) {
                cues += 1;
            }
        }
        assert_eq!(cues, 1);
        assert!(!meter.achievement_active());
    }

    #[test]
    fn flash_blanks_and_restores_the_digits() {
        let mut meter = DistanceMeter::new(600.0);
        meter.update(MS_PER_FRAME, px(100));
        assert!(meter.achievement_active());

        // First half-period hides the digits.
        meter.update(100.0, px(100));
        assert!(!meter.paint);
        // Second half-period shows them again.
        meter.update(FLASH_DURATION_MS, px(100));
        assert!(meter.paint);

        // Flash finishes after its iteration budget and re-arms.
        for _ in 0..40 {
            meter.update(100.0, px(101));
        }
        assert!(!meter.achievement_active());
    }

    #[test]
    fn high_score_row_is_prefixed_with_hi() {
        let mut meter = DistanceMeter::new(600.0);
        meter.set_high_score(px(250));
        assert_eq!(
            meter.high_score_glyphs,
            vec![GLYPH_H, GLYPH_I, GLYPH_BLANK, 0, 0, 2, 5, 0]
        );
    }
}
