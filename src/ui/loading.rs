// Loading and error panels.

use ratatui::{prelude::*, widgets::*};

/// Centered progress message with a percentage bar.
pub fn draw_loading(frame: &mut Frame, message: &str, percent: u8, area: Rect) {
    let message = if message.is_empty() {
        "Loading..."
    } else {
        message
    };

    let chunks = centered_rows(area, 5);
    let text = Paragraph::new(Line::from(vec![
        Span::styled("⏳ ", Style::default().fg(Color::Yellow)),
        Span::raw(message),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(text, chunks[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .percent(u16::from(percent.min(100)));
    frame.render_widget(gauge, horizontal_middle(chunks[1], 60));
}

/// Failure panel with a retry hint.
pub fn draw_error(frame: &mut Frame, message: &str, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "😵 Something went wrong",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::styled(" to try again", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let chunks = centered_rows(area, 7);
    let panel = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(panel, horizontal_middle(chunks[0].union(chunks[1]), 70));
}

/// Split `area` into a block of `height` rows centered vertically.
fn centered_rows(area: Rect, height: u16) -> std::rc::Rc<[Rect]> {
    let top = area.height.saturating_sub(height) / 2;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(top), Constraint::Length(height), Constraint::Min(0)])
        .split(area);
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(rows[1])
}

fn horizontal_middle(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height)
}
