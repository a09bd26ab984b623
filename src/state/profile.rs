// Profile screen state.
// Loaded data plus the language, date-range, and view selections.

use crate::contributions::{
    Badge, Contribution, DateRange, HeroStats, UserProfile, compute_badges, compute_hero_stats,
};

use super::loading::LoadingState;

/// Card grid or month-by-month timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Cards,
    Timeline,
}

impl ViewMode {
    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::Cards => "Cards",
            ViewMode::Timeline => "Timeline",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            ViewMode::Cards => ViewMode::Timeline,
            ViewMode::Timeline => ViewMode::Cards,
        }
    }
}

/// Everything the profile screen renders once a load completes.
#[derive(Debug, Clone)]
pub struct ProfileData {
    pub profile: UserProfile,
    pub contributions: Vec<Contribution>,
    pub stats: HeroStats,
    pub badges: Vec<Badge>,
}

impl ProfileData {
    pub fn new(profile: UserProfile, contributions: Vec<Contribution>) -> Self {
        let stats = compute_hero_stats(&contributions);
        let badges = compute_badges(&contributions, &stats);
        Self {
            profile,
            contributions,
            stats,
            badges,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileState {
    pub username: String,
    pub range: DateRange,
    pub view: ViewMode,
    /// Selected language filter; None shows all.
    pub language: Option<String>,
    pub data: LoadingState<ProfileData>,
    pub scroll: u16,
}

impl ProfileState {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            range: DateRange::default(),
            view: ViewMode::default(),
            language: None,
            data: LoadingState::Idle,
            scroll: 0,
        }
    }

    /// Filter chips after "All": used languages, alphabetically.
    pub fn languages(&self) -> Vec<String> {
        let mut languages = self
            .data
            .data()
            .map(|d| d.stats.languages_used.clone())
            .unwrap_or_default();
        languages.sort();
        languages
    }

    /// Contributions touching the selected language.
    pub fn filtered(&self) -> Vec<Contribution> {
        let Some(data) = self.data.data() else {
            return Vec::new();
        };
        match &self.language {
            None => data.contributions.clone(),
            Some(lang) => data
                .contributions
                .iter()
                .filter(|c| c.languages.contains(lang))
                .cloned()
                .collect(),
        }
    }

    /// Step through All and the sorted languages.
    pub fn cycle_language(&mut self, forward: bool) {
        let languages = self.languages();
        if languages.is_empty() {
            self.language = None;
            return;
        }

        // Position 0 is "All"
        let current = self
            .language
            .as_ref()
            .and_then(|l| languages.iter().position(|x| x == l))
            .map_or(0, |i| i + 1);
        let slots = languages.len() + 1;
        let next = if forward {
            (current + 1) % slots
        } else {
            (current + slots - 1) % slots
        };

        self.language = if next == 0 {
            None
        } else {
            Some(languages[next - 1].clone())
        };
        self.scroll = 0;
    }

    pub fn clear_language(&mut self) {
        self.language = None;
        self.scroll = 0;
    }

    /// Switch date range. Returns true when a reload is needed.
    pub fn set_range(&mut self, range: DateRange) -> bool {
        if self.range == range {
            return false;
        }
        self.range = range;
        self.language = None;
        self.scroll = 0;
        true
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggle();
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Message for an empty filter result.
    pub fn empty_message(&self) -> String {
        match &self.language {
            Some(lang) => format!("No contributions found for {}.", lang),
            None => "No contributions found.".to_string(),
        }
    }
}
