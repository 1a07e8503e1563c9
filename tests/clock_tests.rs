//! Tests for gravity timing and the game loop, driven by virtual time

use std::convert::Infallible;

use blockfall::clock::{
    GameLoop, IntervalTimer, LoopStatus, Renderer, RepeatingTimer, TimeSource, VirtualClock,
};
use blockfall::game::{test_helpers::*, Game, GameEvent, GameView, Intent};
use blockfall::piece::{PieceKind, Position};

const INTERVAL: u64 = 1000;

#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<(Position, u32)>,
    game_overs: Vec<u32>,
}

impl Renderer for RecordingRenderer {
    type Error = Infallible;

    fn render(&mut self, view: &GameView<'_>) -> Result<(), Infallible> {
        self.frames.push((view.piece.origin, view.score));
        Ok(())
    }

    fn game_over(&mut self, final_score: u32) -> Result<(), Infallible> {
        self.game_overs.push(final_score);
        Ok(())
    }
}

fn started(game: Game) -> (GameLoop<VirtualClock, IntervalTimer>, VirtualClock, RecordingRenderer) {
    let clock = VirtualClock::new();
    let mut game_loop = GameLoop::new(game, clock.clone(), IntervalTimer::new(INTERVAL));
    let mut renderer = RecordingRenderer::default();
    game_loop.start(&mut renderer).unwrap();
    (game_loop, clock, renderer)
}

fn o_session() -> Game {
    Game::with_provider(empty_grid(), sequence(&[PieceKind::O]))
}

/// First O lands on the blockers, the second cannot spawn.
fn doomed_session() -> Game {
    let mut grid = empty_grid();
    grid.set_cell(2, 0, FILLER);
    grid.set_cell(2, 1, FILLER);
    Game::with_provider(grid, sequence(&[PieceKind::O]))
}

// ============================================================================
// Timer Tests
// ============================================================================

mod timer {
    use super::*;

    #[test]
    fn fires_only_after_interval_is_exceeded() {
        let mut timer = IntervalTimer::new(INTERVAL);
        timer.start(0);

        assert!(!timer.poll(INTERVAL));
        assert!(timer.poll(INTERVAL + 1));
        assert!(!timer.poll(INTERVAL + 500));
        assert!(timer.poll(2 * INTERVAL + 2));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = IntervalTimer::new(INTERVAL);
        timer.start(0);
        timer.cancel();

        assert!(!timer.is_active());
        assert!(!timer.poll(10 * INTERVAL));
    }

    #[test]
    fn unstarted_timer_is_idle() {
        let mut timer = IntervalTimer::new(INTERVAL);

        assert!(!timer.is_active());
        assert!(!timer.poll(10 * INTERVAL));
    }

    #[test]
    fn virtual_clock_clones_share_time() {
        let clock = VirtualClock::new();
        let handle = clock.clone();

        handle.advance(250);

        assert_eq!(clock.now_ms(), 250);
    }
}

// ============================================================================
// Gravity Tests
// ============================================================================

mod gravity {
    use super::*;

    #[test]
    fn start_renders_and_arms_timer() {
        let (game_loop, _clock, renderer) = started(o_session());

        assert_eq!(renderer.frames, vec![(Position { x: 0, y: 0 }, 0)]);
        assert!(game_loop.timer().is_active());
        assert_eq!(game_loop.status(), LoopStatus::Running);
    }

    #[test]
    fn piece_drops_once_per_interval() {
        let (mut game_loop, clock, mut renderer) = started(o_session());

        clock.advance(INTERVAL);
        game_loop.frame(&mut renderer).unwrap();
        assert_eq!(game_loop.game().current_piece().origin.y, 0);

        clock.advance(1);
        game_loop.frame(&mut renderer).unwrap();
        assert_eq!(game_loop.game().current_piece().origin.y, 1);

        clock.advance(INTERVAL / 2);
        game_loop.frame(&mut renderer).unwrap();
        assert_eq!(game_loop.game().current_piece().origin.y, 1);

        assert_eq!(renderer.frames.len(), 2);
        assert_eq!(game_loop.last_event(), Some(&GameEvent::PieceMoved));
    }

    #[test]
    fn gravity_locks_at_the_floor() {
        let (mut game_loop, clock, mut renderer) = started(o_session());

        for _ in 0..19 {
            clock.advance(INTERVAL + 1);
            game_loop.frame(&mut renderer).unwrap();
        }

        let game = game_loop.game();
        assert_eq!(game.grid().total_filled_cells(), 4);
        assert_eq!(game.current_piece().origin, Position { x: 0, y: 0 });
        assert_eq!(
            game_loop.last_event(),
            Some(&GameEvent::PieceSpawned(PieceKind::O))
        );
    }
}

// ============================================================================
// Input Tests
// ============================================================================

mod input {
    use super::*;

    #[test]
    fn intents_apply_immediately() {
        let (mut game_loop, _clock, mut renderer) = started(o_session());

        game_loop.handle(Intent::MoveRight, &mut renderer).unwrap();
        game_loop.handle(Intent::SoftDrop, &mut renderer).unwrap();

        assert_eq!(
            game_loop.game().current_piece().origin,
            Position { x: 1, y: 1 }
        );
        assert_eq!(renderer.frames.len(), 3);
    }

    #[test]
    fn rejected_intent_does_not_render() {
        let (mut game_loop, _clock, mut renderer) = started(o_session());

        game_loop.handle(Intent::MoveLeft, &mut renderer).unwrap();

        assert_eq!(renderer.frames.len(), 1);
        assert_eq!(game_loop.game().current_piece().origin.x, 0);
    }

    #[test]
    fn input_and_gravity_interleave() {
        let (mut game_loop, clock, mut renderer) = started(o_session());

        game_loop.handle(Intent::MoveRight, &mut renderer).unwrap();
        clock.advance(INTERVAL + 1);
        game_loop.frame(&mut renderer).unwrap();
        game_loop.handle(Intent::MoveRight, &mut renderer).unwrap();

        assert_eq!(
            game_loop.game().current_piece().origin,
            Position { x: 2, y: 1 }
        );
    }
}

// ============================================================================
// Pause Tests
// ============================================================================

mod pause {
    use super::*;

    #[test]
    fn paused_loop_ignores_time_and_input() {
        let (mut game_loop, clock, mut renderer) = started(o_session());

        game_loop.toggle_pause();
        assert_eq!(game_loop.status(), LoopStatus::Paused);
        assert!(!game_loop.timer().is_active());

        clock.advance(5 * INTERVAL);
        game_loop.frame(&mut renderer).unwrap();
        game_loop.handle(Intent::MoveRight, &mut renderer).unwrap();

        assert_eq!(
            game_loop.game().current_piece().origin,
            Position { x: 0, y: 0 }
        );
    }

    #[test]
    fn resume_restarts_interval_from_now() {
        let (mut game_loop, clock, mut renderer) = started(o_session());

        game_loop.toggle_pause();
        clock.advance(5 * INTERVAL);
        game_loop.toggle_pause();
        assert_eq!(game_loop.status(), LoopStatus::Running);

        clock.advance(INTERVAL);
        game_loop.frame(&mut renderer).unwrap();
        assert_eq!(game_loop.game().current_piece().origin.y, 0);

        clock.advance(1);
        game_loop.frame(&mut renderer).unwrap();
        assert_eq!(game_loop.game().current_piece().origin.y, 1);
    }
}

// ============================================================================
// Game Over Tests
// ============================================================================

mod game_over {
    use super::*;

    #[test]
    fn game_over_cancels_timer_and_notifies_once() {
        let (mut game_loop, clock, mut renderer) = started(doomed_session());

        clock.advance(INTERVAL + 1);
        game_loop.frame(&mut renderer).unwrap();

        assert_eq!(game_loop.status(), LoopStatus::Stopped);
        assert!(!game_loop.timer().is_active());
        assert_eq!(renderer.game_overs, vec![0]);

        let frames = renderer.frames.len();
        for intent in [
            Intent::MoveLeft,
            Intent::MoveRight,
            Intent::RotateClockwise,
            Intent::SoftDrop,
        ] {
            game_loop.handle(intent, &mut renderer).unwrap();
        }
        clock.advance(10 * INTERVAL);
        game_loop.frame(&mut renderer).unwrap();
        game_loop.toggle_pause();

        assert_eq!(renderer.frames.len(), frames);
        assert_eq!(renderer.game_overs, vec![0]);
        assert_eq!(game_loop.status(), LoopStatus::Stopped);
    }

    #[test]
    fn soft_drop_can_end_the_game() {
        let (mut game_loop, _clock, mut renderer) = started(doomed_session());

        game_loop.handle(Intent::SoftDrop, &mut renderer).unwrap();

        assert!(game_loop.game().is_game_over());
        assert_eq!(renderer.game_overs, vec![0]);
        assert!(!game_loop.timer().is_active());
    }

    #[test]
    fn session_over_at_first_spawn_reports_on_start() {
        let mut grid = empty_grid();
        grid.set_cell(0, 0, FILLER);
        let game = Game::with_provider(grid, sequence(&[PieceKind::O]));

        let (game_loop, _clock, renderer) = started(game);

        assert_eq!(renderer.game_overs, vec![0]);
        assert!(!game_loop.timer().is_active());
        assert_eq!(
            game_loop.last_event(),
            Some(&GameEvent::GameOver { score: 0 })
        );
    }
}
