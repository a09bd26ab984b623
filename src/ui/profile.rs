// Profile screen: hero stats, badges, filters, and the card or timeline list.

use chrono::Utc;
use num_format::{Locale, ToFormattedString};
use ratatui::{prelude::*, widgets::*};

use crate::contributions::{Contribution, DateRange, group_by_month, language_color};
use crate::state::{LoadingState, ProfileData, ProfileState, ViewMode};

use super::format::{format_number, format_stars, hex_color, time_ago};
use super::loading::{draw_error, draw_loading};

/// PRs listed per card before collapsing into "+N more".
const CARD_PRS: usize = 3;
/// Languages listed per card.
const CARD_LANGUAGES: usize = 4;

pub fn draw_profile(frame: &mut Frame, state: &ProfileState, area: Rect) {
    match &state.data {
        LoadingState::Idle => {}
        LoadingState::Loading { message, percent } => draw_loading(frame, message, *percent, area),
        LoadingState::Error(message) => draw_error(frame, message, area),
        LoadingState::Loaded(data) => draw_loaded(frame, state, data, area),
    }
}

fn draw_loaded(frame: &mut Frame, state: &ProfileState, data: &ProfileData, area: Rect) {
    let badge_height = if data.badges.is_empty() { 0 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),            // Hero
            Constraint::Length(badge_height), // Badges
            Constraint::Length(3),            // Filters
            Constraint::Min(1),               // Cards / timeline
        ])
        .split(area);

    draw_hero(frame, data, chunks[0]);
    if !data.badges.is_empty() {
        draw_badges(frame, data, chunks[1]);
    }
    draw_filters(frame, state, chunks[2]);

    let contributions = state.filtered();
    let lines = if contributions.is_empty() {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                state.empty_message(),
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center),
        ]
    } else {
        match state.view {
            ViewMode::Cards => card_lines(&contributions),
            ViewMode::Timeline => timeline_lines(&contributions),
        }
    };

    let title = format!(
        " {} ({}) ",
        state.view.title(),
        contributions.len()
    );
    let list = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((state.scroll, 0));
    frame.render_widget(list, chunks[3]);
}

fn draw_hero(frame: &mut Frame, data: &ProfileData, area: Rect) {
    let profile = &data.profile;
    let stats = &data.stats;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let mut about = vec![Line::from(Span::styled(
        profile.name.clone().unwrap_or_else(|| profile.login.clone()),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if profile.name.is_some() {
        about.push(Line::from(Span::styled(
            format!("@{}", profile.login),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(bio) = &profile.bio {
        about.push(Line::from(bio.clone()));
    }
    about.push(Line::from(Span::styled(
        profile.url.clone(),
        Style::default().fg(Color::Blue),
    )));

    frame.render_widget(
        Paragraph::new(about)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    let stat = |value: String, label: &'static str, color: Color| {
        Line::from(vec![
            Span::styled(
                format!("{:>8} ", value),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(label, Style::default().fg(Color::DarkGray)),
        ])
    };
    let numbers = vec![
        stat(stats.total_repos.to_string(), "Projects", Color::White),
        stat(format_number(stats.combined_stars), "Combined ⭐", Color::Yellow),
        stat(stats.total_prs.to_string(), "Merged PRs", Color::White),
        stat(stats.languages_used.len().to_string(), "Languages", Color::White),
    ];
    frame.render_widget(
        Paragraph::new(numbers).block(Block::default().borders(Borders::ALL)),
        chunks[1],
    );
}

fn draw_badges(frame: &mut Frame, data: &ProfileData, area: Rect) {
    let mut spans = Vec::new();
    for badge in &data.badges {
        spans.push(Span::raw(format!(" {} ", badge.icon)));
        spans.push(Span::styled(
            badge.label.clone(),
            Style::default()
                .fg(hex_color(&badge.color))
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {}  ", badge.description),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Badges "),
        ),
        area,
    );
}

fn draw_filters(frame: &mut Frame, state: &ProfileState, area: Rect) {
    let active = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut languages = vec![Span::styled(
        " All ",
        if state.language.is_none() {
            active
        } else {
            Style::default()
        },
    )];
    for lang in state.languages() {
        let style = if state.language.as_deref() == Some(lang.as_str()) {
            active
        } else {
            Style::default()
        };
        languages.push(Span::raw(" "));
        languages.push(Span::styled(
            "●",
            Style::default().fg(hex_color(language_color(&lang))),
        ));
        languages.push(Span::styled(format!("{} ", lang), style));
    }

    let mut controls = Vec::new();
    for (i, range) in DateRange::ALL.iter().enumerate() {
        let style = if *range == state.range {
            active
        } else {
            Style::default().fg(Color::DarkGray)
        };
        controls.push(Span::styled(format!(" {}:{} ", i + 1, range.label()), style));
    }
    controls.push(Span::raw("   "));
    for view in [ViewMode::Cards, ViewMode::Timeline] {
        let style = if view == state.view {
            active
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let icon = match view {
            ViewMode::Cards => "▦",
            ViewMode::Timeline => "⏱",
        };
        controls.push(Span::styled(format!(" {} {} ", icon, view.title()), style));
    }

    frame.render_widget(
        Paragraph::new(vec![Line::from(languages), Line::from(controls)])
            .block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn language_spans(languages: &[String]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for lang in languages.iter().take(CARD_LANGUAGES) {
        spans.push(Span::styled(
            "● ",
            Style::default().fg(hex_color(language_color(lang))),
        ));
        spans.push(Span::raw(format!("{}  ", lang)));
    }
    spans
}

/// One card per repository.
pub fn card_lines(contributions: &[Contribution]) -> Vec<Line<'static>> {
    let now = Utc::now();
    let mut lines = Vec::new();

    for c in contributions {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} / ", c.repo.owner),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                c.repo.name.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ⭐ {}", format_stars(c.repo.stars)),
                Style::default().fg(Color::Yellow),
            ),
        ]));

        if let Some(description) = &c.repo.description {
            lines.push(Line::from(Span::styled(
                description.clone(),
                Style::default().fg(Color::Gray),
            )));
        }

        for pr in c.prs.iter().take(CARD_PRS) {
            lines.push(Line::from(vec![
                Span::raw("  🟣 "),
                Span::raw(pr.title.clone()),
                Span::styled(
                    format!(" #{}", pr.number),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
        }
        if c.prs.len() > CARD_PRS {
            lines.push(Line::from(Span::styled(
                format!("  +{} more merged PRs", c.prs.len() - CARD_PRS),
                Style::default().fg(Color::Magenta),
            )));
        }

        let mut footer = vec![Span::raw("  ")];
        footer.extend(language_spans(&c.languages));
        footer.push(Span::styled(
            time_ago(&c.last_contribution, now),
            Style::default().fg(Color::DarkGray),
        ));
        lines.push(Line::from(footer));
        lines.push(Line::from(""));
    }

    lines
}

/// Months newest first, each listing repositories and that month's PRs.
pub fn timeline_lines(contributions: &[Contribution]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for month in group_by_month(contributions) {
        lines.push(Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Magenta)),
            Span::styled(month.label(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {} contributions", month.pr_count()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

        for entry in &month.entries {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(entry.repo.full_name.clone(), Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("  ⭐ {}", entry.repo.stars.to_formatted_string(&Locale::en)),
                    Style::default().fg(Color::Yellow),
                ),
            ]));
            for pr in &entry.prs {
                lines.push(Line::from(vec![
                    Span::raw("    🟣 "),
                    Span::raw(pr.title.clone()),
                    Span::styled(
                        format!(" #{}", pr.number),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]));
            }
        }
        lines.push(Line::from(""));
    }

    lines
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::contributions::{PullRequestSummary, RepoSummary};

    fn contribution(prs: usize) -> Contribution {
        let when = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
        Contribution {
            repo: RepoSummary {
                owner: "rust-lang".to_string(),
                name: "rust".to_string(),
                full_name: "rust-lang/rust".to_string(),
                description: Some("Empowering everyone".to_string()),
                stars: 12_345,
                forks: 0,
                language: Some("Rust".to_string()),
                avatar_url: String::new(),
                url: String::new(),
            },
            prs: (0..prs)
                .map(|n| PullRequestSummary {
                    title: format!("Fix {}", n),
                    number: n as u64,
                    url: String::new(),
                    merged_at: when,
                })
                .collect(),
            pr_count: prs,
            languages: ["Rust", "C", "Python", "Shell", "Makefile"]
                .iter()
                .map(|l| l.to_string())
                .collect(),
            first_contribution: when,
            last_contribution: when,
        }
    }

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_card_collapses_extra_prs() {
        let lines = text(&card_lines(&[contribution(5)]));

        assert!(lines[0].contains("rust-lang / rust"));
        assert!(lines[0].contains("⭐ 12.3k"));
        assert_eq!(lines.iter().filter(|l| l.contains("🟣")).count(), 3);
        assert!(lines.iter().any(|l| l.contains("+2 more merged PRs")));

        let footer = lines.iter().find(|l| l.contains("ago")).unwrap();
        assert!(footer.contains("Shell"));
        assert!(!footer.contains("Makefile"));
    }

    #[test]
    fn test_card_without_extra_prs() {
        let lines = text(&card_lines(&[contribution(2)]));
        assert!(!lines.iter().any(|l| l.contains("more merged PRs")));
    }

    #[test]
    fn test_timeline_lines() {
        let lines = text(&timeline_lines(&[contribution(2)]));
        assert!(lines[0].contains("May 2023"));
        assert!(lines[0].contains("2 contributions"));
        assert!(lines[1].contains("rust-lang/rust"));
        assert!(lines[1].contains("⭐ 12,345"));
    }

    #[test]
    fn test_timeline_star_separators() {
        let mut small = contribution(1);
        small.repo.stars = 999;
        let mut huge = contribution(1);
        huge.repo.full_name = "torvalds/linux".to_string();
        huge.repo.stars = 1_234_567;

        let lines = text(&timeline_lines(&[small, huge]));
        assert!(lines[1].contains("torvalds/linux"));
        assert!(lines[1].contains("⭐ 1,234,567"));
        assert!(lines.iter().any(|l| l.contains("rust-lang/rust") && l.contains("⭐ 999")));
    }
}
