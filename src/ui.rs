pub mod board;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};
use targetsum::GameStatus;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const TARGET_BOX_WIDTH: u16 = 20;
/// Rows used by everything except the tiles
const CHROME_HEIGHT: u16 = 8;

/// Background of the target box for each outcome
fn status_color(status: GameStatus) -> Color {
    match status {
        GameStatus::Playing => Color::Rgb(200, 200, 200),
        GameStatus::Won => Color::Rgb(200, 255, 200),
        GameStatus::Lost => Color::Rgb(255, 200, 200),
    }
}

fn status_text_color(status: GameStatus) -> Color {
    match status {
        GameStatus::Playing => Color::Gray,
        GameStatus::Won => Color::Green,
        GameStatus::Lost => Color::Red,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let status = session.status();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let inner_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2);
        let board_height = board::board_height(self.order.len(), inner_width)
            .min(area.height.saturating_sub(VERTICAL_MARGIN * 2 + CHROME_HEIGHT));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),            // timer
                Constraint::Length(3),            // target
                Constraint::Length(1),            // padding
                Constraint::Min(board_height),    // tiles
                Constraint::Length(1),            // equation
                Constraint::Length(1),            // status
                Constraint::Length(1),            // legend
            ])
            .split(area);

        let timer_style = if session.remaining_secs() <= 3 && !session.is_over() {
            Style::default().patch(bold_style).fg(Color::Red)
        } else {
            dim_style.patch(bold_style)
        };
        Paragraph::new(Span::styled(
            format!("{}s", session.remaining_secs()),
            timer_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let target_area = centered(chunks[1], TARGET_BOX_WIDTH);
        Paragraph::new(Line::from(Span::styled(
            session.target().to_string(),
            bold_style.fg(Color::Black),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title("target"),
        )
        .style(Style::default().bg(status_color(status)).fg(Color::Black))
        .render(target_area, buf);

        let rects = board::tile_rects(chunks[3], self.order.len());
        for (pos, (&index, rect)) in self.order.iter().zip(rects).enumerate() {
            if rect.is_empty() {
                continue;
            }

            let mut tile_style = if session.is_disabled(index) {
                dim_style
            } else {
                bold_style
            };
            if session.is_selected(index) {
                tile_style = tile_style.fg(Color::Cyan);
            }

            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_type(if pos == self.cursor && !session.is_over() {
                    BorderType::Thick
                } else {
                    BorderType::Plain
                });
            if pos == self.cursor && !session.is_over() {
                block = block.border_style(Style::default().fg(Color::Yellow));
            }
            if let Some(key) = board::shortcut(pos) {
                block = block.title(key.to_string());
            }

            Paragraph::new(Span::styled(
                session.numbers()[index].to_string(),
                tile_style,
            ))
            .alignment(Alignment::Center)
            .block(block)
            .style(tile_style)
            .render(rect, buf);
        }

        Paragraph::new(Span::styled(
            board::equation(session.numbers(), session.selected()),
            Style::default().fg(Color::Cyan),
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        Paragraph::new(Span::styled(
            status.to_string(),
            Style::default()
                .patch(bold_style)
                .fg(status_text_color(status)),
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

        let legend = if session.is_over() {
            "(r) play again / (esc) quit"
        } else {
            "(←/→) move / (enter) pick / (1-9) quick pick / (r) new puzzle / (esc) quit"
        };
        Paragraph::new(Span::styled(legend, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);
    }
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y,
        width,
        area.height,
    )
}
