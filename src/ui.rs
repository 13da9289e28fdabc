//! Layout and drawing: playfield, sidebar, pause and game-over overlays.

use crate::app::{ClearFlash, Screen};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use sandfall::{Cell, Grid, Session, ShapeKind};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{CellFilter, Duration as TfxDuration, EffectRenderer, Interpolation, fx, ref_count};

const SIDEBAR_WIDTH: u16 = 24;

/// Smallest board (in piece cells) the session accepts.
pub const MIN_PLAYFIELD_CELLS: u16 = 4;

/// Duration of the fade on cleared rows.
const LINE_CLEAR_FADE_MS: u32 = 400;

/// Board size in terminal cells including the border. Half-blocks (▀) put
/// two grid rows in one terminal row.
fn playfield_outer_size(grid: &Grid) -> (u16, u16) {
    let w = grid.width() as u16;
    let h = grid.height().div_ceil(2) as u16;
    (w + 2, h + 2)
}

/// Largest board (in piece cells) that fits the terminal next to the sidebar.
pub fn max_playfield_cells_for_terminal(term_cols: u16, term_rows: u16, scale: u16) -> (u16, u16) {
    let scale = scale.max(1);
    let max_cols = term_cols.saturating_sub(2).saturating_sub(SIDEBAR_WIDTH);
    let max_grid_rows = term_rows.saturating_sub(2).saturating_mul(2);
    (max_cols / scale, max_grid_rows / scale)
}

/// Draw the current screen with optional pause overlay and clear fade.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    session: &Session,
    theme: &Theme,
    paused: bool,
    flash: &mut ClearFlash,
    area: Rect,
    now: Instant,
) {
    let board = draw_game(frame, session, theme, flash, area);
    match screen {
        Screen::Playing => {
            if flash.is_active() {
                apply_line_clear_effect(frame, session.grid(), theme, board, flash, now);
            }
            if paused {
                draw_pause_overlay(frame, theme, area);
            }
        }
        Screen::GameOver => draw_game_over(frame, session, theme, area),
    }
}

/// Playfield + sidebar, centred. Returns the inner board rect.
fn draw_game(frame: &mut Frame, session: &Session, theme: &Theme, flash: &ClearFlash, area: Rect) -> Rect {
    let (pw, ph) = playfield_outer_size(session.grid());
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    let board = draw_playfield(frame, session, theme, flash, inner[0]);
    draw_sidebar(frame, session, theme, inner[1]);
    board
}

/// Colours the board one terminal cell at a time: upper grid row as the
/// foreground of ▀, lower row as its background.
struct BoardPainter<'a> {
    grid: &'a Grid,
    theme: &'a Theme,
    piece: HashSet<(i32, i32)>,
    piece_color: Color,
    flashing: HashSet<usize>,
}

impl BoardPainter<'_> {
    fn color_at(&self, x: i32, y: i32) -> Color {
        if self.piece.contains(&(x, y)) {
            return grain_shade(self.piece_color, x, y);
        }
        match self.grid.get(x, y) {
            Some(Cell::Occupied(c)) => grain_shade(self.theme.sand_color(c), x, y),
            Some(Cell::Empty) if self.flashing.contains(&(y as usize)) => Color::White,
            _ => self.theme.bg,
        }
    }
}

fn draw_playfield(frame: &mut Frame, session: &Session, theme: &Theme, flash: &ClearFlash, area: Rect) -> Rect {
    let title = format!(" Sandfall  | Lines: {} ", session.lines_cleared());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let grid = session.grid();
    let (gw, gh) = (grid.width(), grid.height());
    let board = Rect {
        x: inner.x,
        y: inner.y,
        width: (gw as u16).min(inner.width),
        height: (gh.div_ceil(2) as u16).min(inner.height),
    };

    let painter = BoardPainter {
        grid,
        theme,
        piece: session
            .active_piece()
            .map(|p| p.cells().collect())
            .unwrap_or_default(),
        piece_color: session
            .active_piece()
            .map_or(theme.bg, |p| theme.sand_color(p.color)),
        flashing: flash.rows.iter().copied().collect(),
    };

    let buf = frame.buffer_mut();
    for row in 0..board.height {
        // terminal row 0 shows the two top grid rows
        let top_y = gh as i32 - 1 - 2 * i32::from(row);
        let bot_y = top_y - 1;
        for col in 0..board.width {
            let x = i32::from(col);
            let top = painter.color_at(x, top_y);
            let bot = if bot_y >= 0 { painter.color_at(x, bot_y) } else { theme.bg };
            buf[(board.x + col, board.y + row)]
                .set_symbol("▀")
                .set_style(Style::default().fg(top).bg(bot));
        }
    }
    board
}

/// Slight per-grain brightness jitter so settled sand reads as grains.
fn grain_shade(color: Color, x: i32, y: i32) -> Color {
    let factor = match (x.wrapping_mul(7) + y.wrapping_mul(13)).rem_euclid(4) {
        0 => 0.90,
        1 => 1.0,
        2 => 1.06,
        _ => 0.96,
    };
    let (r, g, b) = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Red => (255, 0, 0),
        Color::Green => (0, 255, 0),
        Color::Yellow => (255, 255, 0),
        Color::Blue => (0, 0, 255),
        Color::Magenta => (255, 0, 255),
        Color::Cyan => (0, 255, 255),
        Color::White => (255, 255, 255),
        _ => (128, 128, 128),
    };
    let scale = |c: u8| (f32::from(c) * factor).round().min(255.0) as u8;
    Color::Rgb(scale(r), scale(g), scale(b))
}

/// Buffer positions covering the flashing grid rows.
fn clearing_buffer_positions(board: Rect, grid_height: usize, rows: &[usize]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &y in rows {
        let Some(from_top) = grid_height.checked_sub(1 + y) else {
            continue;
        };
        let ry = board.y + (from_top / 2) as u16;
        if ry >= board.y + board.height {
            continue;
        }
        for rx in board.x..board.x + board.width {
            set.insert((rx, ry));
        }
    }
    set
}

/// Create or advance the fade that takes cleared rows from white to background.
fn apply_line_clear_effect(
    frame: &mut Frame,
    grid: &Grid,
    theme: &Theme,
    board: Rect,
    flash: &mut ClearFlash,
    now: Instant,
) {
    let delta = flash
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    flash.last_process = Some(now);

    if flash.effect.is_none() {
        let clearing = clearing_buffer_positions(board, grid.height(), &flash.rows);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            clearing.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_to(theme.bg, theme.bg, (LINE_CLEAR_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board);
        flash.effect = Some(effect);
    }

    if let Some(effect) = flash.effect.as_mut() {
        frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_sidebar(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Stats
            Constraint::Length(1),
            Constraint::Length(4), // Colours
            Constraint::Length(1),
            Constraint::Length(8), // Controls
        ])
        .split(area);

    let stats_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let piece = session
        .active_piece()
        .map_or_else(|| "-".to_string(), |p| format!("{:?}", p.kind));
    let stats = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(session.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(session.lines_cleared().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Piece: ", title_style),
            Span::styled(piece, fg_style),
        ]),
    ];
    Paragraph::new(Text::from(stats)).render(stats_inner, frame.buffer_mut());

    let colours_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let colours_inner = colours_block.inner(chunks[2]);
    colours_block.render(chunks[2], frame.buffer_mut());
    let colours_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(colours_inner);
    Paragraph::new(Line::from(Span::styled("Colours", title_style)))
        .render(colours_layout[0], frame.buffer_mut());
    draw_colour_strip(frame, theme, colours_layout[1]);

    let help_block = Block::default().borders(Borders::ALL).border_style(border_style);
    let help_inner = help_block.inner(chunks[4]);
    help_block.render(chunks[4], frame.buffer_mut());
    let help = [
        ("←/→", "move"),
        ("↑", "rotate"),
        ("↓", "soft drop"),
        ("Space", "hard drop"),
        ("P", "pause"),
        ("Q", "quit"),
    ];
    let lines: Vec<Line> = help
        .iter()
        .map(|(k, what)| {
            Line::from(vec![
                Span::styled(format!("{k:<6}"), title_style),
                Span::styled(*what, fg_style),
            ])
        })
        .collect();
    Paragraph::new(Text::from(lines)).render(help_inner, frame.buffer_mut());
}

/// One block per piece kind, in kind order.
fn draw_colour_strip(frame: &mut Frame, theme: &Theme, area: Rect) {
    let block_w = (area.width / ShapeKind::ALL.len() as u16).max(1);
    for (i, kind) in ShapeKind::ALL.iter().enumerate() {
        let r = Rect {
            x: area.x + i as u16 * block_w,
            y: area.y,
            width: block_w,
            height: area.height.min(1),
        }
        .intersection(area);
        let c = theme.sand_color(kind.color());
        Paragraph::new("██")
            .style(Style::default().fg(c).bg(c))
            .render(r, frame.buffer_mut());
    }
}

fn centered_popup(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let popup = centered_popup(area, 30, 9);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", session.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Lines: {} ", session.lines_cleared()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " R — Restart    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Sandfall ", Style::default().fg(theme.title))),
        )
        .render(popup, frame.buffer_mut());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_fit_accounts_for_half_blocks() {
        // 80x24 terminal: 54 board columns, 44 grid rows
        assert_eq!(max_playfield_cells_for_terminal(80, 24, 2), (27, 22));
        assert_eq!(max_playfield_cells_for_terminal(80, 24, 1), (54, 44));
        assert_eq!(max_playfield_cells_for_terminal(10, 2, 0), (0, 0));
    }

    #[test]
    fn test_clearing_positions_map_floor_to_bottom_row() {
        let board = Rect::new(1, 1, 4, 3);
        // 6 grid rows -> 3 terminal rows; rows 0 and 1 share the bottom one
        let set = clearing_buffer_positions(board, 6, &[0, 1]);
        assert_eq!(set.len(), 4);
        assert!(set.contains(&(1, 3)));
        assert!(set.contains(&(4, 3)));
        let set = clearing_buffer_positions(board, 6, &[5]);
        assert!(set.contains(&(2, 1)));
    }

    #[test]
    fn test_grain_shade_stays_in_range() {
        for x in 0..8 {
            for y in 0..8 {
                assert!(matches!(grain_shade(Color::White, x, y), Color::Rgb(..)));
            }
        }
        assert_eq!(grain_shade(Color::Rgb(100, 100, 100), 2, 0), Color::Rgb(106, 106, 106));
        assert_eq!(grain_shade(Color::Rgb(100, 100, 100), 1, 1), Color::Rgb(90, 90, 90));
    }
}
