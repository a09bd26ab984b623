// Modal UI components.
// Sign-in prompt drawn over the current screen.

use ratatui::{prelude::*, widgets::*};

/// Draw the sign-in modal showing the authorize URL to open in a browser.
pub fn draw_login_modal(frame: &mut Frame, url: &str) {
    let area = frame.area();

    // Create centered modal
    let modal_width = area.width.saturating_sub(4).min(80);
    let modal_height = 12.min(area.height);
    let modal_x = (area.width.saturating_sub(modal_width)) / 2;
    let modal_y = (area.height.saturating_sub(modal_height)) / 2;

    let modal_area = Rect::new(modal_x, modal_y, modal_width, modal_height);

    // Clear the area behind the modal
    frame.render_widget(Clear, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Steps and URL
            Constraint::Length(1), // Instructions
        ])
        .split(modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Sign in with GitHub ");

    let text = vec![
        Line::from(Span::styled(
            "1. Open this URL in your browser:",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(url, Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "2. Authorize, then paste the URL you are redirected to into the search box.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let body = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(body, chunks[0]);

    let instructions = Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Yellow)),
        Span::styled("/", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" = Close ", Style::default().fg(Color::DarkGray)),
    ]);

    let instructions_widget = Paragraph::new(instructions).alignment(Alignment::Center);
    frame.render_widget(instructions_widget, chunks[1]);
}
