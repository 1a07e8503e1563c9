use std::convert::Infallible;
use std::io::{self, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use blockfall::clock::{GameLoop, IntervalTimer, LoopStatus, Renderer, SystemClock};
use blockfall::config::{GameConfig, DEFAULT_DROP_INTERVAL_MS};
use blockfall::game::{Game, GameEvent, GameView, Intent};
use blockfall::grid::{GRID_COLUMNS, GRID_ROWS};
use blockfall::piece::{DisplayColor, PieceKind};

// ============================================================================
// Command Line
// ============================================================================

/// Falling-block puzzle in the terminal.
#[derive(Parser, Debug)]
#[command(name = "blockfall", version)]
struct Args {
    /// Playfield height in rows
    #[arg(long, default_value_t = GRID_ROWS)]
    rows: usize,

    /// Playfield width in columns
    #[arg(long, default_value_t = GRID_COLUMNS)]
    columns: usize,

    /// Milliseconds between automatic drops
    #[arg(long, default_value_t = DEFAULT_DROP_INTERVAL_MS)]
    drop_interval_ms: u64,

    /// Seed for the piece generator
    #[arg(long)]
    seed: Option<u64>,
}

impl From<Args> for GameConfig {
    fn from(args: Args) -> Self {
        Self {
            rows: args.rows,
            columns: args.columns,
            drop_interval_ms: args.drop_interval_ms,
            seed: args.seed,
        }
    }
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const FRAME_MS: u64 = 16;

fn display_color(color: DisplayColor) -> Color {
    match color {
        DisplayColor::Red => Color::Red,
        DisplayColor::Blue => Color::Blue,
        DisplayColor::Green => Color::Green,
        DisplayColor::Purple => Color::Magenta,
        DisplayColor::Orange => Color::Rgb(255, 165, 0),
        DisplayColor::Yellow => Color::Yellow,
        DisplayColor::Cyan => Color::Cyan,
    }
}

// ============================================================================
// Renderer Hook
// ============================================================================

/// Marks the screen stale whenever the game commits a change; the main loop
/// redraws on the next pass.
#[derive(Default)]
struct RedrawRequest {
    dirty: bool,
    final_score: Option<u32>,
}

impl Renderer for RedrawRequest {
    type Error = Infallible;

    fn render(&mut self, _view: &GameView<'_>) -> Result<(), Infallible> {
        self.dirty = true;
        Ok(())
    }

    fn game_over(&mut self, final_score: u32) -> Result<(), Infallible> {
        self.final_score = Some(final_score);
        self.dirty = true;
        Ok(())
    }
}

// ============================================================================
// Rendering
// ============================================================================

type Session = GameLoop<SystemClock, IntervalTimer>;

fn render(frame: &mut Frame, session: &Session) {
    let area = frame.size();
    render_game(frame, session, area);

    render_status_popup(frame, session.status(), &session.game().view(), area);
}

fn render_game(frame: &mut Frame, session: &Session, area: Rect) {
    let game = session.game();
    let grid_display_width = (game.grid().columns() as u16 * CELL_WIDTH) + 2;
    let grid_display_height = game.grid().rows() as u16 + 2;
    let info_width = 18;
    let total_width = grid_display_width + info_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = center_within(area, total_width, total_height);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, session, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↑: Rotate | ↓: Drop | P: Pause | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .render_grid()
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match PieceKind::from_id(cell) {
                    Some(kind) => Span::styled(
                        BLOCK_CHAR,
                        Style::default().fg(display_color(kind.color())),
                    ),
                    None => Span::raw(EMPTY_CHAR),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, session: &Session, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let game = session.game();
    let last_event = session.last_event().map(describe_event).unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.lines_cleared())),
        Line::from(""),
        Line::from(Span::styled("Last", Style::default().fg(Color::Green))),
        Line::from(last_event),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::PieceMoved => "moved".to_string(),
        GameEvent::PieceRotated => "rotated".to_string(),
        GameEvent::PieceLocked => "locked".to_string(),
        GameEvent::LinesCleared(n) => format!("{} cleared", n),
        GameEvent::PieceSpawned(kind) => format!("{:?} spawned", kind),
        GameEvent::GameOver { .. } => "game over".to_string(),
    }
}

/// Overlay shown on top of the board while the loop is not running.
fn render_status_popup(frame: &mut Frame, status: LoopStatus, view: &GameView<'_>, area: Rect) {
    let (title, color, hint) = match status {
        LoopStatus::Running => return,
        LoopStatus::Paused => ("paused", Color::Yellow, "p resumes"),
        LoopStatus::Stopped => ("game over", Color::Red, "q or esc exits"),
    };

    let mut text = vec![Line::from(Span::styled(
        title.to_uppercase(),
        Style::default().fg(color),
    ))];
    if status == LoopStatus::Stopped {
        text.push(Line::from(format!(
            "{} points, {} lines",
            view.score, view.lines_cleared
        )));
    }
    text.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));

    let height = text.len() as u16 + 2;
    let popup = center_within(area, 26, height);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(block),
        popup,
    );
}

/// A `width x height` rect in the middle of `area`, clipped to fit.
fn center_within(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

// ============================================================================
// Input
// ============================================================================

enum Control {
    Play(Intent),
    TogglePause,
    Quit,
}

fn control_for(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Control::Quit),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Control::TogglePause),
        KeyCode::Left => Some(Control::Play(Intent::MoveLeft)),
        KeyCode::Right => Some(Control::Play(Intent::MoveRight)),
        KeyCode::Up => Some(Control::Play(Intent::RotateClockwise)),
        KeyCode::Down => Some(Control::Play(Intent::SoftDrop)),
        _ => None,
    }
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, config: &GameConfig) -> Result<u32> {
    let game = Game::from_config(config)?;
    let timer = IntervalTimer::new(config.drop_interval_ms);
    let mut session = GameLoop::new(game, SystemClock::new(), timer);
    let mut redraw = RedrawRequest::default();

    session.start(&mut redraw)?;

    loop {
        if redraw.dirty {
            terminal.draw(|frame| render(frame, &session))?;
            redraw.dirty = false;
        }

        if event::poll(Duration::from_millis(FRAME_MS))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match control_for(key.code) {
                    Some(Control::Quit) => break,
                    Some(Control::TogglePause) => {
                        session.toggle_pause();
                        redraw.dirty = true;
                    }
                    Some(Control::Play(intent)) => session.handle(intent, &mut redraw)?,
                    None => {}
                },
                Event::Resize(_, _) => redraw.dirty = true,
                _ => {}
            }
        }

        session.frame(&mut redraw)?;
    }

    Ok(redraw.final_score.unwrap_or(session.game().score()))
}

fn main() -> Result<()> {
    let config = GameConfig::from(Args::parse());
    config.validate().context("invalid game settings")?;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let outcome = Terminal::new(backend)
        .map_err(anyhow::Error::from)
        .and_then(|mut terminal| run(&mut terminal, &config));

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    let score = outcome?;
    println!("Final score: {}", score);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popup_is_centered_in_the_area() {
        let area = Rect::new(4, 2, 40, 20);

        assert_eq!(center_within(area, 26, 5), Rect::new(11, 9, 26, 5));
    }

    #[test]
    fn popup_is_clipped_to_a_small_terminal() {
        let area = Rect::new(0, 0, 10, 3);

        assert_eq!(center_within(area, 26, 5), area);
    }
}
