//! Game state module - the turn, scoring and lives state machine
//!
//! This module ties together the grid, the two piece slots, the piece source
//! and scoring. It owns no clock: whenever the countdown must restart it emits
//! [`GameEvent::TimerRestarted`] carrying a generation number, and the owner
//! calls [`GameState::on_timer_expired`] with that generation when the delay
//! elapses. An expiry for any other generation is stale and ignored.
//!
//! Lifecycle: `Setup` → [`GameState::initialise`] → `Playing` → `Ended`.
//! The game ends when a forfeit takes lives below zero, or on
//! [`GameState::cancel`]. `Ended` is terminal.

use crate::error::{GameError, Result};
use crate::grid::Grid;
use crate::pieces::Piece;
use crate::scoring::{level_for_score, score_turn, timer_delay_ms, ScoreResult};
use crate::source::PieceSource;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Setup,
    Playing,
    Ended,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Playing => "playing",
            Phase::Ended => "ended",
        }
    }
}

/// Result of a successful placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub placed: Piece,
    pub anchor: Coord,
    /// Cells cleared by this turn, deduplicated, in `(x, y)` order
    pub cleared: Vec<Coord>,
    pub score: ScoreResult,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState<S> {
    grid: Grid,
    source: S,
    current: Option<Piece>,
    following: Option<Piece>,
    phase: Phase,
    score: u32,
    level: u32,
    /// Drops to -1 on the forfeit that ends the game
    lives: i32,
    multiplier: u32,
    high_score: u32,
    cursor: Coord,
    cursor_visible: bool,
    timer_generation: u64,
    timer_delay_ms: u32,
    /// A countdown has been requested and not stopped since
    timer_armed: bool,
    events: Vec<GameEvent>,
}

impl<S: PieceSource> GameState<S> {
    /// Create a session on an empty `cols x rows` grid
    pub fn new(cols: usize, rows: usize, source: S) -> Self {
        Self {
            grid: Grid::new(cols, rows),
            source,
            current: None,
            following: None,
            phase: Phase::Setup,
            score: 0,
            level: 0,
            lives: STARTING_LIVES,
            multiplier: BASE_MULTIPLIER,
            high_score: 0,
            cursor: CURSOR_START,
            cursor_visible: false,
            timer_generation: 0,
            timer_delay_ms: timer_delay_ms(0),
            timer_armed: false,
            events: Vec::new(),
        }
    }

    /// Seed the in-memory high score (read from the score file at start)
    pub fn with_high_score(mut self, high_score: u32) -> Self {
        self.high_score = high_score;
        self
    }

    pub fn with_lives(mut self, lives: i32) -> Self {
        self.lives = lives;
        self
    }

    /// Start play: ask the peer for pieces if needed, deal, start the countdown.
    ///
    /// A peer-fed source is not ready yet; the deal and the first countdown then
    /// wait for the bootstrap gate in [`GameState::receive_piece`].
    pub fn initialise(&mut self) {
        if self.phase != Phase::Setup {
            return;
        }
        log::info!("Initialising game");
        self.phase = Phase::Playing;

        let requested = self.source.initial_requests();
        if requested > 0 {
            self.events.push(GameEvent::PiecesRequested { count: requested });
        }

        if self.source.is_ready() {
            self.deal();
            self.restart_timer();
        }
    }

    /// Feed a peer-supplied piece by catalog index
    pub fn receive_piece(&mut self, index: usize) -> Result<()> {
        if self.phase == Phase::Ended {
            return Err(GameError::NotPlaying);
        }
        let piece = match Piece::from_index(index) {
            Ok(piece) => piece,
            Err(e) => {
                // The peer answered a request, just not usefully.
                let requested = self.source.reject();
                if requested > 0 {
                    self.events.push(GameEvent::PiecesRequested { count: requested });
                }
                return Err(e);
            }
        };
        log::debug!("Queueing incoming piece {}", piece);

        let gate_opened = self.source.accept(piece);
        if self.phase != Phase::Playing {
            return Ok(());
        }

        if gate_opened {
            log::info!("Piece queue primed with {} pieces", self.source.buffered());
            self.deal();
            self.restart_timer();
        } else if self.source.is_ready() && (self.current.is_none() || self.following.is_none())
        {
            self.refill_slots();
        }
        Ok(())
    }

    /// Play the current piece centred on `(x, y)`.
    ///
    /// On success: commit, clear full lines, rescore, advance pieces, restart
    /// the countdown. On failure nothing changes.
    pub fn place_at(&mut self, x: i32, y: i32) -> Result<TurnOutcome> {
        if self.phase != Phase::Playing {
            return Err(GameError::NotPlaying);
        }
        let piece = self.current.ok_or(GameError::NoActivePiece)?;

        // The cursor sentinel must not block its own cell.
        let cursor_was_visible = self.cursor_visible;
        self.hide_cursor();

        if !self.grid.place(&piece, x, y) {
            log::debug!("Unable to play {} at {}, {}", piece, x, y);
            if cursor_was_visible {
                self.show_cursor();
            }
            self.events.push(GameEvent::PieceRejected { x, y });
            return Err(GameError::Blocked { x, y });
        }

        log::debug!("Played {} at {}, {}", piece, x, y);
        self.events.push(GameEvent::PiecePlaced {
            kind: piece.kind,
            x,
            y,
        });

        let (cleared, score) = self.after_piece();
        self.advance();
        if cursor_was_visible {
            self.show_cursor();
        }
        self.restart_timer();

        Ok(TurnOutcome {
            placed: piece,
            anchor: (x, y),
            cleared,
            score,
        })
    }

    /// Play the current piece at the keyboard cursor
    pub fn place_at_cursor(&mut self) -> Result<TurnOutcome> {
        let (x, y) = self.cursor;
        self.place_at(x, y)
    }

    /// Clear full rows/columns and rescore the turn
    fn after_piece(&mut self) -> (Vec<Coord>, ScoreResult) {
        let cleared = self.grid.clear_full_lines();
        let result = score_turn(cleared.len(), self.grid.cols(), self.multiplier);

        if !cleared.is_empty() {
            log::debug!(
                "Cleared {} blocks ({} lines)",
                result.blocks,
                result.lines
            );
            self.events.push(GameEvent::LinesCleared {
                cells: cleared.clone(),
                blocks: result.blocks,
                lines: result.lines,
            });
        }

        self.set_multiplier(result.multiplier);

        if result.points > 0 {
            self.score = self.score.saturating_add(result.points);
            self.events.push(GameEvent::ScoreChanged { score: self.score });

            if self.score > self.high_score {
                self.high_score = self.score;
                self.events.push(GameEvent::HighScoreChanged {
                    high_score: self.high_score,
                });
            }
        }

        let level = level_for_score(self.score);
        if level != self.level {
            self.level = level;
            self.events.push(GameEvent::LevelChanged { level });
        }

        (cleared, result)
    }

    fn set_multiplier(&mut self, multiplier: u32) {
        if multiplier != self.multiplier {
            self.multiplier = multiplier;
            self.events.push(GameEvent::MultiplierChanged { multiplier });
        }
    }

    /// Fill both slots from the source for the first time
    fn deal(&mut self) {
        self.current = self.source.next_piece();
        self.following = self.source.next_piece();
        self.pieces_changed();
    }

    /// Following piece becomes current; draw a new following piece
    fn advance(&mut self) {
        self.current = self.following.take().or_else(|| self.source.next_piece());
        self.following = self.source.next_piece();
        self.pieces_changed();
    }

    /// Top up empty slots after a starved queue receives pieces
    fn refill_slots(&mut self) {
        if self.current.is_none() {
            self.current = self.following.take().or_else(|| self.source.next_piece());
        }
        if self.following.is_none() {
            self.following = self.source.next_piece();
        }
        self.pieces_changed();
    }

    fn pieces_changed(&mut self) {
        log::debug!(
            "Current piece: {:?}, following piece: {:?}",
            self.current.map(|p| p.kind),
            self.following.map(|p| p.kind)
        );
        self.events.push(GameEvent::PiecesAdvanced {
            current: self.current.map(|p| p.kind),
            following: self.following.map(|p| p.kind),
        });

        let requested = self.source.top_up();
        if requested > 0 {
            self.events.push(GameEvent::PiecesRequested { count: requested });
        }
    }

    /// Invalidate any pending countdown and ask for a fresh one
    fn restart_timer(&mut self) {
        self.timer_generation = self.timer_generation.wrapping_add(1);
        self.timer_delay_ms = timer_delay_ms(self.level);
        self.timer_armed = true;
        log::debug!(
            "Countdown {} set to {}ms",
            self.timer_generation,
            self.timer_delay_ms
        );
        self.events.push(GameEvent::TimerRestarted {
            generation: self.timer_generation,
            delay_ms: self.timer_delay_ms,
        });
    }

    /// The countdown for `generation` ran out: forfeit the turn.
    ///
    /// Costs a life and resets the multiplier. If lives are still at or above
    /// zero the pieces advance and a new countdown starts; otherwise the game
    /// ends. Returns false (and changes nothing) for a stale generation or a
    /// game that is not in play.
    pub fn on_timer_expired(&mut self, generation: u64) -> bool {
        if self.phase != Phase::Playing || !self.timer_armed || generation != self.timer_generation
        {
            log::debug!("Ignoring stale countdown {}", generation);
            return false;
        }

        self.lives -= 1;
        log::info!("Countdown expired, lives now {}", self.lives);
        self.set_multiplier(BASE_MULTIPLIER);
        self.events.push(GameEvent::LifeLost { lives: self.lives });

        if self.lives < 0 {
            self.events.push(GameEvent::Died);
            self.end();
        } else {
            self.advance();
            self.restart_timer();
        }
        true
    }

    /// End the game from outside (player quit, connection lost)
    pub fn cancel(&mut self) {
        if self.phase != Phase::Ended {
            log::info!("Game cancelled");
            self.end();
        }
    }

    fn end(&mut self) {
        if self.phase == Phase::Ended {
            return;
        }
        log::info!("Game has ended with score {}", self.score);
        self.phase = Phase::Ended;
        // Any countdown still in flight is now stale.
        self.timer_generation = self.timer_generation.wrapping_add(1);
        self.timer_armed = false;
        self.events.push(GameEvent::TimerStopped);
        self.events.push(GameEvent::GameEnded);
    }

    /// Move the keyboard cursor, wrapping within the control window.
    ///
    /// The old overlay is removed before the coordinate changes and the new one
    /// drawn after, so no stale sentinel is left behind.
    pub fn move_cursor(&mut self, dx: i32, dy: i32) -> bool {
        if self.phase == Phase::Ended {
            return false;
        }

        self.hide_cursor();
        let (w, h) = self.control_window();
        self.cursor = (
            (self.cursor.0 + dx).rem_euclid(w),
            (self.cursor.1 + dy).rem_euclid(h),
        );
        self.show_cursor();

        log::debug!("Cursor at {}, {}", self.cursor.0, self.cursor.1);
        self.events.push(GameEvent::CursorMoved {
            x: self.cursor.0,
            y: self.cursor.1,
        });
        true
    }

    fn control_window(&self) -> (i32, i32) {
        (
            CONTROL_WINDOW.min(self.grid.cols() as i32).max(1),
            CONTROL_WINDOW.min(self.grid.rows() as i32).max(1),
        )
    }

    fn show_cursor(&mut self) {
        let (x, y) = self.cursor;
        self.cursor_visible = self.grid.overlay(x, y);
    }

    fn hide_cursor(&mut self) {
        if self.cursor_visible {
            let (x, y) = self.cursor;
            self.grid.clear_overlay(x, y);
            self.cursor_visible = false;
        }
    }

    /// Rotate the current piece a quarter turn
    pub fn rotate_current(&mut self, clockwise: bool) -> Result<Piece> {
        if self.phase != Phase::Playing {
            return Err(GameError::NotPlaying);
        }
        let piece = self.current.ok_or(GameError::NoActivePiece)?;
        let rotated = if clockwise {
            piece.rotated_cw()
        } else {
            piece.rotated_ccw()
        };
        self.current = Some(rotated);
        self.events.push(GameEvent::PieceRotated {
            kind: rotated.kind,
            rotation: rotated.rotation,
        });
        Ok(rotated)
    }

    /// Exchange the current and following piece
    pub fn swap_pieces(&mut self) -> Result<()> {
        if self.phase != Phase::Playing {
            return Err(GameError::NotPlaying);
        }
        if self.current.is_none() || self.following.is_none() {
            return Err(GameError::NoActivePiece);
        }
        std::mem::swap(&mut self.current, &mut self.following);
        self.events.push(GameEvent::PiecesSwapped);
        Ok(())
    }

    /// Apply a keypress-level action. Returns whether it took effect.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        if let Some((dx, dy)) = action.cursor_delta() {
            return self.move_cursor(dx, dy);
        }
        match action {
            GameAction::RotateCw => self.rotate_current(true).is_ok(),
            GameAction::RotateCcw => self.rotate_current(false).is_ok(),
            GameAction::Swap => self.swap_pieces().is_ok(),
            GameAction::PlaceAtCursor => self.place_at_cursor().is_ok(),
            GameAction::CursorLeft
            | GameAction::CursorRight
            | GameAction::CursorUp
            | GameAction::CursorDown => false,
        }
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access for setting up positions
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn current(&self) -> Option<Piece> {
        self.current
    }

    pub fn following(&self) -> Option<Piece> {
        self.following
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn cursor(&self) -> Coord {
        self.cursor
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn timer_generation(&self) -> u64 {
        self.timer_generation
    }

    /// Length of the most recently started countdown
    pub fn timer_delay_ms(&self) -> u32 {
        self.timer_delay_ms
    }

    pub fn snapshot_into(&self, out: &mut crate::snapshot::GameSnapshot) {
        use crate::snapshot::PieceSnapshot;

        out.cols = self.grid.cols();
        out.rows = self.grid.rows();
        out.cells.clear();
        out.cells.extend_from_slice(self.grid.cells());
        out.current = self.current.map(PieceSnapshot::from);
        out.following = self.following.map(PieceSnapshot::from);
        out.phase = self.phase.as_str();
        out.score = self.score;
        out.level = self.level;
        out.lives = self.lives;
        out.multiplier = self.multiplier;
        out.high_score = self.high_score;
        out.cursor = self.cursor;
        out.cursor_visible = self.cursor_visible;
        out.timer_delay_ms = self.timer_delay_ms;
    }

    pub fn snapshot(&self) -> crate::snapshot::GameSnapshot {
        let mut s = crate::snapshot::GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::LocalPieces;

    fn started() -> GameState<LocalPieces> {
        let mut state = GameState::new(GRID_COLS, GRID_ROWS, LocalPieces::new(12345));
        state.initialise();
        state
    }

    #[test]
    fn test_new_game_state() {
        let state = GameState::new(5, 5, LocalPieces::new(1));
        assert_eq!(state.phase, Phase::Setup);
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.multiplier, 1);
        assert!(state.current.is_none());
        assert!(state.following.is_none());
        assert!(!state.cursor_visible);
    }

    #[test]
    fn test_initialise_deals_and_starts_timer() {
        let mut state = started();
        assert_eq!(state.phase, Phase::Playing);
        assert!(state.current.is_some());
        assert!(state.following.is_some());

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::TimerRestarted {
            generation: 1,
            delay_ms: 12000
        }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::PiecesRequested { .. })));
    }

    #[test]
    fn test_initialise_twice_is_noop() {
        let mut state = started();
        let generation = state.timer_generation;
        state.initialise();
        assert_eq!(state.timer_generation, generation);
    }

    #[test]
    fn test_stale_generation_ignored() {
        let mut state = started();
        let first = state.timer_generation;
        assert!(state.place_at(2, 2).is_ok());
        assert!(!state.on_timer_expired(first));
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_ended_game_rejects_everything() {
        let mut state = started();
        state.cancel();
        assert_eq!(state.place_at(2, 2), Err(GameError::NotPlaying));
        assert!(!state.move_cursor(1, 0));
        assert!(!state.on_timer_expired(state.timer_generation));
        assert!(state.swap_pieces().is_err());
    }

    #[test]
    fn test_cancel_emits_end_once() {
        let mut state = started();
        state.drain_events();
        state.cancel();
        state.cancel();
        let ended = state
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::GameEnded)
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut state = started();
        state.move_cursor(-1, 0);
        state.move_cursor(-1, 0);
        state.move_cursor(-1, 0);
        assert_eq!(state.cursor, (4, 2));
        state.move_cursor(0, 3);
        assert_eq!(state.cursor, (4, 0));
    }

    #[test]
    fn test_swap_exchanges_slots() {
        let mut state = started();
        let current = state.current;
        let following = state.following;
        state.swap_pieces().unwrap();
        assert_eq!(state.current, following);
        assert_eq!(state.following, current);
    }
}
