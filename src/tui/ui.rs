//! Stateless UI rendering for tic-tac-toe.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use strum::IntoEnumIterator;

use super::app::App;
use crate::games::tictactoe::{Board, Difficulty, Mark, Position, Square};
use crate::history::RecordResult;

/// Renders the whole screen.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(9),    // Body
            Constraint::Length(3), // Status
            Constraint::Length(1), // Help
        ])
        .split(area);

    draw_header(frame, chunks[0], app);

    let body = if app.show_history() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        draw_history(frame, cols[1], app);
        cols[0]
    } else {
        chunks[1]
    };

    if app.difficulty().is_none() {
        draw_selector(frame, body);
    } else {
        let winning = app.outcome().line().map(|line| line.positions());
        draw_board(frame, body, app.board(), app.cursor(), winning.as_ref());
    }

    let mut status = app.status_line();
    if let Some(notice) = app.notice() {
        status = format!("{}  ({})", status, notice);
    }
    let status_text = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_text, chunks[2]);

    let help = if app.difficulty().is_none() {
        "1/e Easy  2/m Medium  3/h Hard  q Quit"
    } else {
        "Arrows+Enter or 1-9 Move  r Replay  d Difficulty  m Mute  h History  c Clear  q Quit"
    };
    frame.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        chunks[3],
    );
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "TacoTex Tic-Tac-Toe",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if let Some(difficulty) = app.difficulty() {
        spans.push(Span::raw(format!("  [{}]", difficulty)));
    }
    spans.push(Span::raw(format!("  vs {}", app.backend_name())));
    let account = app
        .session()
        .short_address()
        .unwrap_or_else(|| "not connected".to_string());
    spans.push(Span::styled(
        format!("  {}", account),
        Style::default().fg(Color::Green),
    ));
    if app.is_muted() {
        spans.push(Span::styled("  muted", Style::default().fg(Color::DarkGray)));
    }

    let title = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, area);
}

fn draw_selector(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Choose your opponent",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (i, difficulty) in Difficulty::iter().enumerate() {
        lines.push(Line::from(format!(
            "{}. {:<6} - {}",
            i + 1,
            difficulty,
            difficulty.blurb()
        )));
    }
    let selector = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().title("Difficulty").borders(Borders::ALL));
    frame.render_widget(selector, center_rect(area, 40, 8));
}

fn draw_board(
    frame: &mut Frame,
    area: Rect,
    board: &Board,
    cursor: Position,
    winning: Option<&[Position; 3]>,
) {
    let board_area = center_rect(area, 40, 11);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(board_area);

    for row in 0..3 {
        let positions: Vec<Position> = (0..3)
            .filter_map(|col| Position::from_row_col(row, col))
            .collect();
        draw_row(frame, rows[row * 2], board, cursor, winning, &positions);
        if row < 2 {
            draw_separator(frame, rows[row * 2 + 1]);
        }
    }
}

fn draw_row(
    frame: &mut Frame,
    area: Rect,
    board: &Board,
    cursor: Position,
    winning: Option<&[Position; 3]>,
    positions: &[Position],
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(1),
            Constraint::Length(12),
            Constraint::Length(1),
            Constraint::Length(12),
        ])
        .split(area);

    for (i, pos) in positions.iter().enumerate() {
        draw_cell(frame, cols[i * 2], board, cursor, winning, *pos);
        if i < 2 {
            draw_separator_vertical(frame, cols[i * 2 + 1]);
        }
    }
}

fn draw_cell(
    frame: &mut Frame,
    area: Rect,
    board: &Board,
    cursor: Position,
    winning: Option<&[Position; 3]>,
    pos: Position,
) {
    let key = format!(" {} ", pos.to_index() + 1);
    let (symbol, base_style) = match board.get(pos) {
        Square::Empty => (key.as_str(), Style::default().fg(Color::DarkGray)),
        Square::Occupied(Mark::X) => (
            " X ",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        Square::Occupied(Mark::O) => (
            " O ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };

    let style = if winning.is_some_and(|line| line.contains(&pos)) {
        base_style.bg(Color::Green).fg(Color::Black)
    } else if pos == cursor {
        base_style.bg(Color::White).fg(Color::Black)
    } else {
        base_style
    };

    let paragraph =
        Paragraph::new(Line::from(Span::styled(symbol, style))).alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn draw_history(frame: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();
    let mut lines = vec![
        Line::from(format!(
            "W {}  L {}  D {}  ({:.0}%)",
            stats.wins(),
            stats.losses(),
            stats.draws(),
            stats.win_rate()
        )),
        Line::from(""),
    ];
    if app.records().is_empty() {
        lines.push(Line::from(Span::styled(
            "No games yet",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for record in app.records() {
        let color = match record.result() {
            RecordResult::Win => Color::Green,
            RecordResult::Loss => Color::Red,
            RecordResult::Draw => Color::Yellow,
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<5}", record.result()), Style::default().fg(color)),
            Span::raw(format!(
                " {:<6} {}",
                record.difficulty(),
                record.timestamp().format("%Y-%m-%d %H:%M")
            )),
        ]));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(format!("History ({})", stats.total_games()))
            .borders(Borders::ALL),
    );
    frame.render_widget(panel, area);
}

fn draw_separator(frame: &mut Frame, area: Rect) {
    let sep = Paragraph::new("──────────────────────────────────────")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, area);
}

fn draw_separator_vertical(frame: &mut Frame, area: Rect) {
    let sep = Paragraph::new("│").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, area);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vert[1])[1]
}
