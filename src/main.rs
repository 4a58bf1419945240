use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::stdout,
    time::{Duration, Instant},
};

use blocktris::board::{CellState, BOARD_HEIGHT, BOARD_WIDTH};
use blocktris::game::{GameEvent, GameState, PieceSource, RandomPieceSource};
use blocktris::input::{map_key, Action};
use blocktris::piece::PieceKind;

// ============================================================================
// Command Line
// ============================================================================

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(name = "blocktris", version)]
struct Args {
    /// Seed for the piece sequence. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Gravity interval at level 1, in milliseconds.
    #[arg(
        long,
        default_value_t = 1000,
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(50..=10_000)
    )]
    tick_ms: u64,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

fn piece_color(kind: PieceKind) -> Color {
    match kind {
        PieceKind::I => Color::Cyan,
        PieceKind::O => Color::Yellow,
        PieceKind::T => Color::Magenta,
        PieceKind::S => Color::Green,
        PieceKind::Z => Color::Red,
        PieceKind::J => Color::Blue,
        PieceKind::L => Color::Rgb(255, 165, 0),
    }
}

// ============================================================================
// App
// ============================================================================

/// Front-end state around the engine: pause and gravity timing live here.
struct App {
    game: GameState,
    paused: bool,
    base_tick: Duration,
    last_tick: Instant,
    status: Option<String>,
}

impl App {
    fn new(game: GameState, base_tick: Duration) -> Self {
        Self {
            game,
            paused: false,
            base_tick,
            last_tick: Instant::now(),
            status: None,
        }
    }

    fn start(&mut self) {
        self.game.spawn_new_piece();
        self.last_tick = Instant::now();
        self.drain_events();
    }

    fn tick_duration(&self) -> Duration {
        self.game.tick_duration(self.base_tick)
    }

    fn is_running(&self) -> bool {
        !self.paused && !self.game.is_game_over()
    }

    /// Returns false when the user asked to quit.
    fn handle(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::TogglePause => {
                if !self.game.is_game_over() {
                    self.paused = !self.paused;
                }
            }
            Action::Restart => {
                self.game.reset();
                self.paused = false;
                self.status = None;
                self.start();
            }
            Action::Game(command) if self.is_running() => {
                self.game.apply(command);
                self.drain_events();
            }
            Action::Game(_) => {}
        }
        true
    }

    fn on_tick(&mut self) {
        if self.is_running() {
            self.game.tick();
            self.drain_events();
        }
        self.last_tick = Instant::now();
    }

    fn drain_events(&mut self) {
        for event in self.game.take_events() {
            match event {
                GameEvent::LinesCleared(1) => self.status = Some("Single".to_string()),
                GameEvent::LinesCleared(2) => self.status = Some("Double".to_string()),
                GameEvent::LinesCleared(3) => self.status = Some("Triple".to_string()),
                GameEvent::LinesCleared(_) => self.status = Some("Tetris!".to_string()),
                GameEvent::LevelUp(level) => self.status = Some(format!("Level {level}!")),
                _ => {}
            }
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, app: &App) {
    let area = frame.size();

    render_game(frame, app, area);
    if app.game.is_game_over() {
        render_game_over(frame, &app.game, area);
    } else if app.paused {
        render_paused(frame, area);
    }
}

fn render_game(frame: &mut Frame, app: &App, area: Rect) {
    let grid_display_width = (BOARD_WIDTH as u16 * CELL_WIDTH) + 2;
    let grid_display_height = BOARD_HEIGHT as u16 + 2;
    let side_width = 16;
    let total_width = grid_display_width + side_width + 2;
    let total_height = grid_display_height + 2;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);
    let game_row = vertical[0];

    // [Board][Next / Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(game_row);
    let side = Layout::vertical([Constraint::Length(6), Constraint::Fill(1)]).split(horizontal[1]);

    render_board(frame, &app.game, horizontal[0]);
    render_preview(frame, &app.game, side[0]);
    render_info(frame, app, side[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };
    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↓: Soft drop | ↑: Rotate | Space: Drop | P: Pause | R: Restart | Esc: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_board(frame: &mut Frame, game: &GameState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blocktris ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visual = game.render_board();
    let lines: Vec<Line> = visual
        .rows()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                    CellState::Filled(kind) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(piece_color(*kind)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, game: &GameState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(next) = game.next else {
        return;
    };
    let shape = next.kind.shape(next.rotation);
    let color = piece_color(next.kind);
    let max_y = shape.iter().map(|(_, y)| *y).max().unwrap_or(0);

    let mut lines: Vec<Line> = Vec::new();
    for y in 0..=max_y {
        let mut spans: Vec<Span> = vec![Span::raw(" ")];
        for x in 0i16..4 {
            if shape.contains(&(x, y)) {
                spans.push(Span::styled(BLOCK_CHAR, Style::default().fg(color)));
            } else {
                spans.push(Span::raw(EMPTY_CHAR));
            }
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let game = &app.game;
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score)),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.lines_cleared)),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.level)),
        Line::from(""),
        Line::from(Span::styled("Speed", Style::default().fg(Color::Magenta))),
        Line::from(format!("x{:.1}", game.drop_speed())),
    ];
    if let Some(status) = &app.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(Color::White),
        )));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &GameState, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score)),
        Line::from(format!("Lines: {}", game.lines_cleared)),
        Line::from(format!("Level: {}", game.level)),
        Line::from(""),
        Line::from(Span::styled(
            "R: restart  Esc: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(26, 12, area));
}

fn render_paused(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(24, 8, area));
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(app: &mut App) -> Result<()> {
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    app.start();

    loop {
        terminal
            .draw(|frame| render(frame, app))
            .context("failed to draw frame")?;

        let tick_duration = app.tick_duration();
        let timeout = tick_duration
            .checked_sub(app.last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout).context("failed to poll input")? {
            if let Event::Key(key) = event::read().context("failed to read input")? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = map_key(key) {
                        if !app.handle(action) {
                            break;
                        }
                    }
                }
            }
        }

        if app.last_tick.elapsed() >= tick_duration {
            app.on_tick();
        }
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    stdout()
        .execute(LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let source: Box<dyn PieceSource> = match args.seed {
        Some(seed) => Box::new(RandomPieceSource::seeded(seed)),
        None => Box::new(RandomPieceSource::from_entropy()),
    };
    let mut app = App::new(
        GameState::with_source(source),
        Duration::from_millis(args.tick_ms),
    );

    enable_raw_mode().context("failed to enable raw mode")?;
    stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let result = run(&mut app);
    let restored = restore_terminal();
    result?;
    restored
}
