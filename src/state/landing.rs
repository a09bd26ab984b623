// Landing screen state.
// Username input, example profiles, and the sign-in prompt.

use crate::contributions::snapshot::EXAMPLE_USERS;

use super::route::{Route, is_valid_username};

#[derive(Debug, Clone, Default)]
pub struct LandingState {
    pub input: String,
    /// Login of the signed-in user, once looked up.
    pub viewer: Option<String>,
    pub selected: usize,
    /// Sign-in URL shown in a modal, when open.
    pub login_prompt: Option<String>,
}

impl LandingState {
    /// Example users, with the signed-in viewer first.
    pub fn examples(&self) -> Vec<String> {
        self.viewer
            .iter()
            .cloned()
            .chain(EXAMPLE_USERS.iter().map(|u| u.to_string()))
            .collect()
    }

    pub fn select_next(&mut self) {
        let len = self.examples().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn set_viewer(&mut self, login: String) {
        if self.viewer.is_none() && self.selected > 0 {
            self.selected += 1;
        }
        self.viewer = Some(login);
    }

    /// Where Enter leads: the typed input (a username, path, or pasted
    /// redirect URL), else the highlighted example. `None` when the typed
    /// username is not a valid GitHub login.
    pub fn submit(&self) -> Option<Route> {
        let input = self.input.trim();
        if input.is_empty() {
            return self
                .examples()
                .get(self.selected)
                .map(|u| Route::profile(u.clone()));
        }

        if input.contains('/') {
            Some(Route::parse(input))
        } else if is_valid_username(input) {
            Some(Route::profile(input))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_put_viewer_first() {
        let mut landing = LandingState::default();
        assert_eq!(landing.examples()[0], "torvalds");

        landing.select_next();
        landing.set_viewer("octocat".to_string());
        let examples = landing.examples();
        assert_eq!(examples[0], "octocat");
        assert_eq!(examples.len(), EXAMPLE_USERS.len() + 1);
        // Selection stays on the same example
        assert_eq!(examples[landing.selected], "sindresorhus");
    }

    #[test]
    fn test_submit() {
        let mut landing = LandingState::default();
        assert_eq!(landing.submit(), Some(Route::profile("torvalds")));

        landing.input = "  gaearon ".to_string();
        assert_eq!(landing.submit(), Some(Route::profile("gaearon")));

        landing.input = "http://localhost:3000/callback?code=abc".to_string();
        assert!(matches!(landing.submit(), Some(Route::Callback { .. })));
    }

    #[test]
    fn test_submit_rejects_invalid_usernames() {
        let mut landing = LandingState::default();
        for input in ["a?b", "..", "a b", "x#y", "evil&per_page=1"] {
            landing.input = input.to_string();
            assert_eq!(landing.submit(), None, "{input}");
        }

        landing.input = "/../users".to_string();
        assert_eq!(landing.submit(), Some(Route::profile("users")));
        landing.input = "/a%26b".to_string();
        assert_eq!(landing.submit(), Some(Route::Landing));
    }

    #[test]
    fn test_selection_bounds() {
        let mut landing = LandingState::default();
        landing.select_prev();
        assert_eq!(landing.selected, 0);
        for _ in 0..20 {
            landing.select_next();
        }
        assert_eq!(landing.selected, EXAMPLE_USERS.len() - 1);
    }
}
