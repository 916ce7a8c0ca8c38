//! Scoring module - line-clear points, level, and countdown length
//!
//! - A turn that clears lines bumps the multiplier first; the points use the
//!   new multiplier.
//! - A turn that clears nothing resets the multiplier to 1.
//! - `lines` is derived from the cleared block count, not counted separately.

use crate::types::{
    BASE_MULTIPLIER, BASE_TIMER_MS, LEVEL_SCORE_STEP, POINTS_PER_BLOCK, TIMER_FLOOR_MS,
    TIMER_STEP_MS,
};

/// Outcome of scoring one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Distinct cells cleared
    pub blocks: usize,
    /// `blocks / board_width`
    pub lines: u32,
    /// Multiplier after this turn
    pub multiplier: u32,
    /// Points added by this turn
    pub points: u32,
}

/// Lines represented by a cleared block count
pub fn lines_for_blocks(blocks: usize, board_width: usize) -> u32 {
    if board_width == 0 {
        return 0;
    }
    (blocks / board_width) as u32
}

/// Score one turn given the cleared block count and the multiplier going in
pub fn score_turn(blocks: usize, board_width: usize, multiplier: u32) -> ScoreResult {
    let lines = lines_for_blocks(blocks, board_width);
    if lines == 0 {
        return ScoreResult {
            blocks,
            lines,
            multiplier: BASE_MULTIPLIER,
            points: 0,
        };
    }

    let multiplier = multiplier.saturating_add(1);
    let points = lines
        .saturating_mul(blocks as u32)
        .saturating_mul(POINTS_PER_BLOCK)
        .saturating_mul(multiplier);

    ScoreResult {
        blocks,
        lines,
        multiplier,
        points,
    }
}

/// `floor(score / 1000)`
pub fn level_for_score(score: u32) -> u32 {
    score / LEVEL_SCORE_STEP
}

/// Countdown for a level: `12000 - 500 * level`, never below the floor
pub fn timer_delay_ms(level: u32) -> u32 {
    BASE_TIMER_MS
        .saturating_sub(TIMER_STEP_MS.saturating_mul(level))
        .max(TIMER_FLOOR_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_clear_resets_multiplier() {
        let result = score_turn(0, 5, 6);
        assert_eq!(result.multiplier, 1);
        assert_eq!(result.points, 0);

        // Fewer blocks than one line width still counts as no line.
        let result = score_turn(4, 5, 3);
        assert_eq!(result.lines, 0);
        assert_eq!(result.multiplier, 1);
    }

    #[test]
    fn test_single_row_uses_new_multiplier() {
        let result = score_turn(5, 5, 1);
        assert_eq!(result.lines, 1);
        assert_eq!(result.multiplier, 2);
        assert_eq!(result.points, 5 * 10 * 2);
    }

    #[test]
    fn test_row_and_column_cross() {
        let result = score_turn(9, 5, 1);
        assert_eq!(result.lines, 1);
        assert_eq!(result.points, 9 * 10 * 2);
    }

    #[test]
    fn test_two_rows() {
        let result = score_turn(10, 5, 2);
        assert_eq!(result.lines, 2);
        assert_eq!(result.multiplier, 3);
        assert_eq!(result.points, 2 * 10 * 10 * 3);
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_score(0), 0);
        assert_eq!(level_for_score(999), 0);
        assert_eq!(level_for_score(1000), 1);
        assert_eq!(level_for_score(25_400), 25);
    }

    #[test]
    fn test_timer_delay_has_floor() {
        assert_eq!(timer_delay_ms(0), 12000);
        assert_eq!(timer_delay_ms(1), 11500);
        assert_eq!(timer_delay_ms(22), 1000);
        assert_eq!(timer_delay_ms(24), 1000);
        assert_eq!(timer_delay_ms(u32::MAX), 1000);
    }
}
