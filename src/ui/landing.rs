// Landing screen: username search and example profiles.

use ratatui::{prelude::*, widgets::*};

use crate::app::App;

pub fn draw_landing(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title
            Constraint::Length(3), // Search input
            Constraint::Length(3), // Sign-in state
            Constraint::Min(3),    // Examples
        ])
        .split(area);

    let title = vec![
        Line::from(Span::styled(
            "My Contributions",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Discover and showcase open-source contributions, ranked by project popularity.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(Block::default().padding(Padding::top(1))),
        chunks[0],
    );

    let placeholder = app.landing.input.is_empty();
    let input_line = Line::from(vec![
        Span::styled("🔍 ", Style::default().fg(Color::DarkGray)),
        if placeholder {
            Span::styled(
                "Enter a GitHub username...",
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Span::raw(app.landing.input.as_str())
        },
        Span::styled("█", Style::default().fg(Color::Yellow)),
    ]);
    let input = Paragraph::new(input_line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Explore "),
    );
    frame.render_widget(input, chunks[1]);

    let auth_line = if app.tokens.is_authenticated() {
        match &app.landing.viewer {
            Some(login) => Line::from(vec![
                Span::styled("✅ Signed in as ", Style::default().fg(Color::Green)),
                Span::styled(
                    format!("@{}", login),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "  (first example is you)",
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            None => Line::from(Span::styled(
                "✅ Signed in",
                Style::default().fg(Color::Green),
            )),
        }
    } else {
        Line::from(vec![
            Span::styled("Ctrl+S", Style::default().fg(Color::Yellow)),
            Span::raw(" Sign in with GitHub  "),
            Span::styled(
                "Works without signing in! Auth raises API rate limits.",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    };
    frame.render_widget(
        Paragraph::new(auth_line)
            .alignment(Alignment::Center)
            .block(Block::default().padding(Padding::top(1))),
        chunks[2],
    );

    let items: Vec<ListItem> = app
        .landing
        .examples()
        .into_iter()
        .map(|user| ListItem::new(Line::from(Span::raw(format!("@{}", user)))))
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(app.landing.selected));

    let examples = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Try these "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(examples, chunks[3], &mut list_state);
}
