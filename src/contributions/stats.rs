// Hero statistics and milestone badges.
// Pure reductions over an aggregated, star-sorted contribution list.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::types::Contribution;

/// Summary counters for the profile header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroStats {
    pub total_repos: usize,
    pub combined_stars: u64,
    pub total_prs: usize,
    /// Distinct languages in first-seen order.
    pub languages_used: Vec<String>,
    /// The most-starred contribution (the first, since input is sorted).
    pub top_project: Option<Contribution>,
}

/// A milestone earned by a contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub label: String,
    pub icon: String,
    pub color: String,
    pub description: String,
}

impl Badge {
    fn new(label: &str, icon: &str, color: &str, description: String) -> Self {
        Self {
            label: label.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            description,
        }
    }
}

pub fn compute_hero_stats(contributions: &[Contribution]) -> HeroStats {
    let mut languages_used: Vec<String> = Vec::new();
    let mut total_prs = 0;
    let mut combined_stars = 0;

    for contribution in contributions {
        total_prs += contribution.prs.len();
        combined_stars += contribution.repo.stars;
        for language in &contribution.languages {
            if !languages_used.contains(language) {
                languages_used.push(language.clone());
            }
        }
    }

    HeroStats {
        total_repos: contributions.len(),
        combined_stars,
        total_prs,
        languages_used,
        top_project: contributions.first().cloned(),
    }
}

/// Years a contribution must span to count as long-term.
const LONG_TERM_YEARS: i32 = 3;

pub fn compute_badges(contributions: &[Contribution], stats: &HeroStats) -> Vec<Badge> {
    let mut badges = Vec::new();

    if let Some(top) = &stats.top_project {
        let description = format!("Contributed to {}", top.repo.full_name);
        let stars = top.repo.stars;
        if stars >= 50_000 {
            badges.push(Badge::new("50k+ ⭐ Contributor", "🏆", "#ffd700", description));
        } else if stars >= 10_000 {
            badges.push(Badge::new("10k+ ⭐ Contributor", "🌟", "#f0883e", description));
        } else if stars >= 1_000 {
            badges.push(Badge::new("1k+ ⭐ Contributor", "⭐", "#d29922", description));
        }
    }

    let projects = format!("{} projects contributed to", stats.total_repos);
    if stats.total_repos >= 50 {
        badges.push(Badge::new("Prolific Contributor", "🔥", "#f85149", projects));
    } else if stats.total_repos >= 20 {
        badges.push(Badge::new("Active Contributor", "💪", "#58a6ff", projects));
    }

    if stats.languages_used.len() >= 10 {
        badges.push(Badge::new(
            "Polyglot",
            "🌍",
            "#bc8cff",
            format!("{} languages", stats.languages_used.len()),
        ));
    }

    let merged = format!("{} merged PRs", stats.total_prs);
    if stats.total_prs >= 100 {
        badges.push(Badge::new("PR Machine", "🚀", "#3fb950", merged));
    } else if stats.total_prs >= 25 {
        badges.push(Badge::new("PR Veteran", "📦", "#3fb950", merged));
    }

    let long_term = contributions.iter().any(|c| {
        c.last_contribution.year() - c.first_contribution.year() >= LONG_TERM_YEARS
    });
    if long_term {
        badges.push(Badge::new(
            "Long-Term Contributor",
            "🕰️",
            "#8b949e",
            "Contributing for 3+ years".to_string(),
        ));
    }

    badges
}

/// Display color (hex) for a language, grey for unknown ones.
pub fn language_color(language: &str) -> &'static str {
    match language {
        "TypeScript" => "#3178c6",
        "JavaScript" => "#f1e05a",
        "Python" => "#3572A5",
        "Rust" => "#dea584",
        "Go" => "#00ADD8",
        "Java" => "#b07219",
        "C++" => "#f34b7d",
        "C" => "#555555",
        "C#" => "#178600",
        "Ruby" => "#701516",
        "Swift" => "#F05138",
        "Kotlin" => "#A97BFF",
        "PHP" => "#4F5D95",
        "Shell" => "#89e051",
        "HTML" => "#e34c26",
        "CSS" => "#563d7c",
        "Dart" => "#00B4AB",
        "Scala" => "#c22d40",
        "Elixir" => "#6e4a7e",
        "Haskell" => "#5e5086",
        "Lua" => "#000080",
        "Zig" => "#ec915c",
        "Vue" => "#41b883",
        "SCSS" => "#c6538c",
        "Svelte" => "#ff3e00",
        _ => "#8b949e",
    }
}
