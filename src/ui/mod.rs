// UI module for rendering the TUI.
// Header, the active screen, status bar, and overlays.

mod format;
mod landing;
mod loading;
mod modal;
mod profile;

use ratatui::{prelude::*, widgets::*};

use crate::app::App;
use crate::state::{LoadingState, Route};

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    match &app.route {
        Route::Landing => landing::draw_landing(frame, app, chunks[1]),
        Route::Callback { .. } => loading::draw_loading(frame, "Signing in...", 50, chunks[1]),
        Route::Profile { .. } => {
            if let Some(state) = &app.profile {
                profile::draw_profile(frame, state, chunks[1]);
            }
        }
    }

    draw_status_bar(frame, app, chunks[2]);

    if let Some(url) = &app.landing.login_prompt {
        modal::draw_login_modal(frame, url);
    }

    // Help overlay (rendered last, on top of everything)
    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let location = match &app.route {
        Route::Profile { username } => format!(" / @{}", username),
        _ => String::new(),
    };

    let auth = if app.tokens.is_authenticated() {
        Span::styled("Signed in ", Style::default().fg(Color::Green))
    } else {
        Span::styled("Anonymous ", Style::default().fg(Color::DarkGray))
    };

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Line::from(vec![
            Span::styled(
                " contribs",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(location),
            Span::raw(" "),
        ]))
        .title(Line::from(auth).right_aligned());
    frame.render_widget(block, area);
}

/// Draw the status bar with keybinding hints and any notice.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::raw(key),
            Span::styled(label, Style::default().fg(Color::DarkGray)),
        ]
    };

    let auth_hint = if app.tokens.is_authenticated() {
        hint("  ^X ", "Sign out")
    } else {
        hint("  ^S ", "Sign in")
    };

    let mut hints: Vec<Span> = match &app.route {
        Route::Landing => [
            hint(" ↵ ", "Explore"),
            hint("  ↑↓ ", "Examples"),
            auth_hint,
            hint("  F1 ", "Help"),
            hint("  Esc ", "Quit"),
        ]
        .concat(),
        Route::Callback { .. } => hint(" Esc ", "Cancel").to_vec(),
        Route::Profile { .. } => {
            let failed = app
                .profile
                .as_ref()
                .is_some_and(|p| matches!(p.data, LoadingState::Error(_)));
            if failed {
                [hint(" r ", "Retry"), hint("  Esc ", "Back"), hint("  q ", "Quit")].concat()
            } else {
                [
                    hint(" ←→ ", "Language"),
                    hint("  1-4/d ", "Range"),
                    hint("  v ", "View"),
                    hint("  ↑↓ ", "Scroll"),
                    hint("  r ", "Refresh"),
                    hint("  Esc ", "Back"),
                    hint("  ? ", "Help"),
                    hint("  q ", "Quit"),
                ]
                .concat()
            }
        }
    };

    if let Some(notice) = &app.notice {
        hints.push(Span::styled(
            format!("  {}", notice),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    // Create a centered popup
    let popup_width = 55.min(area.width);
    let popup_height = 20.min(area.height);
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let row = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(keys, Style::default().fg(Color::Cyan)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        row("  Enter         ", "Explore username / example"),
        row("  ↑/↓ or j/k    ", "Select example / scroll"),
        row("  ←/→ or h/l    ", "Previous/next language"),
        row("  a             ", "Show all languages"),
        row("  1-4 or d      ", "Date range"),
        row("  v or Tab      ", "Cards / timeline"),
        row("  PgUp/PgDn     ", "Page scroll"),
        row("  r             ", "Refresh / retry"),
        row("  Ctrl+S        ", "Sign in with GitHub"),
        row("  Ctrl+X        ", "Sign out"),
        row("  Esc           ", "Back / close"),
        row("  ? or F1       ", "Show/hide this help"),
        row("  q or Ctrl+C   ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::styled(" or ", Style::default().fg(Color::DarkGray)),
            Span::styled("?", Style::default().fg(Color::Yellow)),
            Span::styled(" to close", Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .alignment(Alignment::Left);

    frame.render_widget(help_paragraph, popup_area);
}
