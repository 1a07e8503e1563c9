//! Gravity timing and the loop that drives a [`Game`].
//!
//! Time is read through [`TimeSource`] and gravity is scheduled through
//! [`RepeatingTimer`], so tests can advance a [`VirtualClock`] instead of
//! sleeping.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::game::{Game, GameEvent, GameView, Intent};

// ============================================================================
// Time Sources
// ============================================================================

pub trait TimeSource {
    /// Milliseconds since some fixed starting point; never decreases.
    fn now_ms(&self) -> u64;
}

/// Wall-clock time measured from construction.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Manually advanced time. Clones share the same counter, so a test can keep
/// one handle while the loop owns another.
#[derive(Clone, Default)]
pub struct VirtualClock {
    now: Rc<Cell<u64>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl TimeSource for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ============================================================================
// Repeating Timer
// ============================================================================

pub trait RepeatingTimer {
    fn start(&mut self, now_ms: u64);
    fn cancel(&mut self);
    fn is_active(&self) -> bool;
    /// Polled once per frame. Returns true when the timer fires, which also
    /// re-arms it from `now_ms`.
    fn poll(&mut self, now_ms: u64) -> bool;
}

/// Fires once strictly more than `interval_ms` has elapsed since it was
/// started or last fired.
#[derive(Clone, Debug)]
pub struct IntervalTimer {
    interval_ms: u64,
    last_fired_ms: u64,
    active: bool,
}

impl IntervalTimer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired_ms: 0,
            active: false,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

impl RepeatingTimer for IntervalTimer {
    fn start(&mut self, now_ms: u64) {
        self.last_fired_ms = now_ms;
        self.active = true;
    }

    fn cancel(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn poll(&mut self, now_ms: u64) -> bool {
        if !self.active {
            return false;
        }
        if now_ms.saturating_sub(self.last_fired_ms) > self.interval_ms {
            self.last_fired_ms = now_ms;
            return true;
        }
        false
    }
}

// ============================================================================
// Renderer Hook
// ============================================================================

pub trait Renderer {
    type Error;

    /// Called after every committed mutation.
    fn render(&mut self, view: &GameView<'_>) -> Result<(), Self::Error>;

    /// Called exactly once, when the session ends.
    fn game_over(&mut self, _final_score: u32) -> Result<(), Self::Error> {
        Ok(())
    }
}

// ============================================================================
// Game Loop
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoopStatus {
    Running,
    Paused,
    Stopped,
}

/// Interleaves input intents and timed gravity on one `Game`.
pub struct GameLoop<T: TimeSource, R: RepeatingTimer> {
    game: Game,
    time: T,
    timer: R,
    paused: bool,
    last_event: Option<GameEvent>,
}

impl<T: TimeSource, R: RepeatingTimer> GameLoop<T, R> {
    pub fn new(game: Game, time: T, timer: R) -> Self {
        Self {
            game,
            time,
            timer,
            paused: false,
            last_event: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn timer(&self) -> &R {
        &self.timer
    }

    pub fn last_event(&self) -> Option<&GameEvent> {
        self.last_event.as_ref()
    }

    pub fn status(&self) -> LoopStatus {
        if self.game.is_game_over() {
            LoopStatus::Stopped
        } else if self.paused {
            LoopStatus::Paused
        } else {
            LoopStatus::Running
        }
    }

    /// Draws the initial state and arms gravity. A session that ended at its
    /// very first spawn reports game over here instead.
    pub fn start<D: Renderer>(&mut self, renderer: &mut D) -> Result<(), D::Error> {
        if let Some(last) = self.game.take_events().pop() {
            self.last_event = Some(last);
        }
        renderer.render(&self.game.view())?;
        if self.game.is_game_over() {
            self.timer.cancel();
            return renderer.game_over(self.game.score());
        }
        self.timer.start(self.time.now_ms());
        Ok(())
    }

    /// One frame: applies gravity if the timer is due.
    pub fn frame<D: Renderer>(&mut self, renderer: &mut D) -> Result<(), D::Error> {
        if !self.timer.poll(self.time.now_ms()) {
            return Ok(());
        }
        self.game.move_down();
        self.publish(renderer)
    }

    /// Applies one input intent immediately. Ignored while paused or stopped.
    pub fn handle<D: Renderer>(&mut self, intent: Intent, renderer: &mut D) -> Result<(), D::Error> {
        if self.status() != LoopStatus::Running {
            return Ok(());
        }
        self.game.apply(intent);
        self.publish(renderer)
    }

    pub fn toggle_pause(&mut self) {
        match self.status() {
            LoopStatus::Running => {
                self.paused = true;
                self.timer.cancel();
            }
            LoopStatus::Paused => {
                self.paused = false;
                self.timer.start(self.time.now_ms());
            }
            LoopStatus::Stopped => {}
        }
    }

    /// Drains pending game events into the renderer. Game over cancels the
    /// timer so no further gravity is scheduled.
    fn publish<D: Renderer>(&mut self, renderer: &mut D) -> Result<(), D::Error> {
        let events = self.game.take_events();
        let Some(last) = events.last() else {
            return Ok(());
        };
        self.last_event = Some(last.clone());

        renderer.render(&self.game.view())?;
        for event in &events {
            if let GameEvent::GameOver { score } = event {
                self.timer.cancel();
                renderer.game_over(*score)?;
            }
        }
        Ok(())
    }
}
