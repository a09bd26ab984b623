// App state and main event loop.
// Routes between screens, handles keyboard input, and runs loads on background tasks.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::auth::{TokenStore, exchange_code, login_url};
use crate::cache::ResultCache;
use crate::config::Config;
use crate::contributions::{Aggregator, DateRange, SnapshotDir, UserProfile};
use crate::error::Result;
use crate::github::{GitHubApi, GitHubClient};
use crate::state::{LandingState, LoadingState, ProfileData, ProfileState, Route};
use crate::ui;

/// Messages from background tasks to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    Progress { message: String, percent: u8 },
    ProfileLoaded(Box<ProfileData>),
    ProfileFailed(String),
    SignedIn { token: String, next: String },
    SignInFailed(String),
    Viewer(String),
}

/// What a background profile load needs, cloned out of the app.
#[derive(Clone)]
struct LoadContext {
    api_url: String,
    token: Option<String>,
    cache: ResultCache,
    snapshots: SnapshotDir,
}

/// Main application state.
pub struct App {
    config: Config,
    runtime: Handle,
    http: reqwest::Client,
    pub tokens: TokenStore,
    cache: ResultCache,
    snapshots: SnapshotDir,
    pub route: Route,
    pub landing: LandingState,
    pub profile: Option<ProfileState>,
    /// Set while an authorization code is being exchanged.
    pub signing_in: bool,
    /// One-line notice shown in the status bar.
    pub notice: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
    /// Events for the current screen; replacing it abandons the old load.
    load_rx: Option<UnboundedReceiver<AppEvent>>,
    viewer_rx: Option<UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        config: Config,
        runtime: Handle,
        tokens: TokenStore,
        cache: ResultCache,
        snapshots: SnapshotDir,
    ) -> Self {
        Self {
            config,
            runtime,
            http: reqwest::Client::new(),
            tokens,
            cache,
            snapshots,
            route: Route::Landing,
            landing: LandingState::default(),
            profile: None,
            signing_in: false,
            notice: None,
            show_help: false,
            should_quit: false,
            load_rx: None,
            viewer_rx: None,
        }
    }

    /// Main event loop.
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        while !self.should_quit {
            self.drain_events();
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_input()?;
        }
        Ok(())
    }

    /// Switch screens, starting whatever load the new screen needs.
    pub fn navigate(&mut self, route: Route) {
        info!(route = %route, "navigating");
        self.load_rx = None;
        self.signing_in = false;
        self.profile = None;
        self.show_help = false;

        match &route {
            Route::Landing => {
                self.landing.input.clear();
                self.landing.login_prompt = None;
                if self.tokens.is_authenticated() && self.landing.viewer.is_none() {
                    self.lookup_viewer();
                }
            }
            Route::Callback { code, state } => match code {
                Some(code) => {
                    self.signing_in = true;
                    let next = state.clone().unwrap_or_else(|| "/".to_string());
                    self.exchange(code.clone(), next);
                }
                None => {
                    self.navigate(Route::Landing);
                    return;
                }
            },
            Route::Profile { username } => {
                self.profile = Some(ProfileState::new(username.clone()));
                self.start_load();
            }
        }

        self.route = route;
    }

    /// (Re)load the current profile for its selected date range.
    pub fn start_load(&mut self) {
        let Some(profile) = self.profile.as_mut() else {
            return;
        };
        profile.data = LoadingState::loading("Loading...", 0);

        let (tx, rx) = mpsc::unbounded_channel();
        self.load_rx = Some(rx);

        let context = LoadContext {
            api_url: self.config.api_url.clone(),
            token: self.tokens.get(),
            cache: self.cache.clone(),
            snapshots: self.snapshots.clone(),
        };
        let username = profile.username.clone();
        let range = profile.range;
        debug!(username = %username, %range, "starting profile load");
        self.runtime
            .spawn(load_profile(context, username, range, tx));
    }

    fn exchange(&mut self, code: String, next: String) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.load_rx = Some(rx);

        let http = self.http.clone();
        let proxy_url = self.config.auth_proxy_url.clone();
        self.runtime.spawn(async move {
            let event = match exchange_code(&http, &proxy_url, &code).await {
                Ok(token) => AppEvent::SignedIn { token, next },
                Err(e) => AppEvent::SignInFailed(e.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    fn lookup_viewer(&mut self) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.viewer_rx = Some(rx);

        let token = self.tokens.get();
        let api_url = self.config.api_url.clone();
        self.runtime.spawn(async move {
            match fetch_viewer(api_url, token).await {
                Ok(login) => {
                    let _ = tx.send(AppEvent::Viewer(login));
                }
                Err(e) => warn!(error = %e, "failed to look up signed-in user"),
            }
        });
    }

    fn drain_events(&mut self) {
        let mut events = Vec::new();
        for rx in [self.load_rx.as_mut(), self.viewer_rx.as_mut()]
            .into_iter()
            .flatten()
        {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }

        for event in events {
            self.apply(event);
        }
    }

    /// Apply one background event to the current state.
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Progress { message, percent } => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.data.progress(&message, percent);
                }
            }
            AppEvent::ProfileLoaded(data) => {
                if let Some(profile) = self.profile.as_mut() {
                    info!(
                        username = %profile.username,
                        repos = data.stats.total_repos,
                        prs = data.stats.total_prs,
                        "profile loaded"
                    );
                    profile.data = LoadingState::Loaded(*data);
                }
            }
            AppEvent::ProfileFailed(message) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.data = LoadingState::Error(message);
                }
            }
            AppEvent::SignedIn { token, next } => {
                if let Err(e) = self.tokens.set(&token) {
                    warn!(error = %e, "failed to store token");
                    self.notice = Some(format!("Could not save sign-in: {}", e));
                } else {
                    self.notice = Some("Signed in".to_string());
                }
                self.landing.viewer = None;
                self.navigate(Route::parse(&next));
            }
            AppEvent::SignInFailed(message) => {
                warn!(error = %message, "sign-in failed");
                self.notice = Some(message);
                self.navigate(Route::Landing);
            }
            AppEvent::Viewer(login) => {
                self.landing.set_viewer(login);
                self.viewer_rx = None;
            }
        }
    }

    fn sign_in(&mut self) {
        let return_path = self.route.path();
        self.landing.login_prompt = Some(login_url(
            &self.config.client_id,
            &self.config.redirect_uri,
            Some(&return_path),
        ));
    }

    fn sign_out(&mut self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear token");
        }
        self.landing.viewer = None;
        self.viewer_rx = None;
        self.notice = Some(if self.tokens.is_overridden() {
            "Signed out (GITHUB_TOKEN is still set)".to_string()
        } else {
            "Signed out".to_string()
        });
        if self.landing.selected > 0 {
            self.landing.selected -= 1;
        }
    }

    fn handle_input(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Dispatch one key press for the current screen.
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1)) {
                self.show_help = false;
            }
            return;
        }

        if self.landing.login_prompt.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.landing.login_prompt = None;
            }
            return;
        }

        self.notice = None;
        match self.route {
            Route::Landing => self.handle_landing_key(key, ctrl),
            Route::Profile { .. } => self.handle_profile_key(key, ctrl),
            Route::Callback { .. } => {
                if key.code == KeyCode::Esc {
                    self.navigate(Route::Landing);
                }
            }
        }
    }

    fn handle_landing_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Char('s') if ctrl => {
                if !self.tokens.is_authenticated() {
                    self.sign_in();
                }
            }
            KeyCode::Char('x') if ctrl => self.sign_out(),
            KeyCode::Char(c) if !ctrl => self.landing.input.push(c),
            KeyCode::Backspace => {
                self.landing.input.pop();
            }
            KeyCode::Up => self.landing.select_prev(),
            KeyCode::Down => self.landing.select_next(),
            KeyCode::Enter => match self.landing.submit() {
                Some(route) => self.navigate(route),
                None => {
                    self.notice = Some(format!(
                        "\"{}\" is not a valid GitHub username",
                        self.landing.input.trim()
                    ));
                }
            },
            KeyCode::F(1) => self.show_help = true,
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_profile_key(&mut self, key: KeyEvent, ctrl: bool) {
        let loaded = self
            .profile
            .as_ref()
            .is_some_and(|p| p.data.is_loaded());
        let failed = self
            .profile
            .as_ref()
            .is_some_and(|p| matches!(p.data, LoadingState::Error(_)));

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Backspace => self.navigate(Route::Landing),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') if loaded || failed => self.start_load(),
            KeyCode::Char('s') if ctrl => {
                if !self.tokens.is_authenticated() {
                    self.sign_in();
                }
            }
            KeyCode::Char('x') if ctrl => self.sign_out(),
            _ if !loaded => {}
            KeyCode::Char('v') | KeyCode::Tab => {
                if let Some(p) = self.profile.as_mut() {
                    p.toggle_view();
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(p) = self.profile.as_mut() {
                    p.cycle_language(true);
                }
            }
            KeyCode::Char('h') | KeyCode::Left => {
                if let Some(p) = self.profile.as_mut() {
                    p.cycle_language(false);
                }
            }
            KeyCode::Char('a') => {
                if let Some(p) = self.profile.as_mut() {
                    p.clear_language();
                }
            }
            KeyCode::Char('d') => {
                let reload = self
                    .profile
                    .as_mut()
                    .is_some_and(|p| p.set_range(p.range.next()));
                if reload {
                    self.start_load();
                }
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                let reload = self
                    .profile
                    .as_mut()
                    .is_some_and(|p| p.set_range(DateRange::ALL[index]));
                if reload {
                    self.start_load();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll(1, true),
            KeyCode::Up | KeyCode::Char('k') => self.scroll(1, false),
            KeyCode::PageDown => self.scroll(10, true),
            KeyCode::PageUp => self.scroll(10, false),
            KeyCode::Home | KeyCode::Char('g') => {
                if let Some(p) = self.profile.as_mut() {
                    p.scroll = 0;
                }
            }
            _ => {}
        }
    }

    fn scroll(&mut self, lines: u16, down: bool) {
        if let Some(p) = self.profile.as_mut() {
            if down {
                p.scroll_down(lines);
            } else {
                p.scroll_up(lines);
            }
        }
    }
}

async fn load_profile(
    context: LoadContext,
    username: String,
    range: DateRange,
    tx: UnboundedSender<AppEvent>,
) {
    let event = match fetch_profile(&context, &username, range, &tx).await {
        Ok(data) => AppEvent::ProfileLoaded(Box::new(data)),
        Err(e) => {
            warn!(username = %username, error = %e, "profile load failed");
            AppEvent::ProfileFailed(e.to_string())
        }
    };
    // The receiver is gone if the user navigated away
    let _ = tx.send(event);
}

async fn fetch_viewer(api_url: String, token: Option<String>) -> Result<String> {
    let mut client = GitHubClient::new(token.as_deref())?.with_base_url(api_url);
    Ok(client.get_current_user().await?.login)
}

async fn fetch_profile(
    context: &LoadContext,
    username: &str,
    range: DateRange,
    tx: &UnboundedSender<AppEvent>,
) -> Result<ProfileData> {
    let mut client =
        GitHubClient::new(context.token.as_deref())?.with_base_url(context.api_url.clone());

    let profile = match client.user(username).await {
        Ok(user) => UserProfile::from(user),
        Err(e) => match context.snapshots.load(username) {
            Ok(Some(snapshot)) => {
                warn!(username, error = %e, "profile lookup failed, using snapshot");
                snapshot.profile
            }
            _ => return Err(e),
        },
    };

    let contributions = Aggregator::new(&mut client, context.cache.clone())
        .with_snapshots(context.snapshots.clone())
        .aggregate(username, range, |message, percent| {
            let _ = tx.send(AppEvent::Progress {
                message: message.to_string(),
                percent,
            });
        })
        .await?;

    Ok(ProfileData::new(profile, contributions))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStore;

    fn app(runtime: &tokio::runtime::Runtime) -> App {
        let store = Arc::new(MemoryStore::new());
        let config = Config {
            github_token: None,
            // Nothing listens here; loads fail fast
            api_url: "http://127.0.0.1:9".to_string(),
            client_id: "client".to_string(),
            auth_proxy_url: "http://127.0.0.1:9/api/auth".to_string(),
            redirect_uri: "http://localhost:3000/callback".to_string(),
            data_dir: std::env::temp_dir(),
            snapshot_dir: std::env::temp_dir().join("contribs-test-none"),
            store_quota: crate::config::DEFAULT_STORE_QUOTA,
        };
        let snapshots = SnapshotDir::new(config.snapshot_dir.clone());
        App::new(
            config,
            runtime.handle().clone(),
            TokenStore::new(store.clone()),
            ResultCache::new(store),
            snapshots,
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_typing_and_submit() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);

        for c in "octocat".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.route, Route::profile("octocat"));
        let profile = app.profile.as_ref().unwrap();
        assert_eq!(profile.username, "octocat");
        assert!(profile.data.is_loading());

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.route, Route::Landing);
        assert!(app.profile.is_none());
        assert!(app.landing.input.is_empty());
    }

    #[test]
    fn test_invalid_username_stays_on_landing() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);

        for c in "a?b".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.route, Route::Landing);
        assert!(app.profile.is_none());
        assert!(app.notice.as_deref().is_some_and(|n| n.contains("not a valid")));
    }

    #[test]
    fn test_progress_and_results_update_profile() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);
        app.navigate(Route::profile("octocat"));

        app.apply(AppEvent::Progress {
            message: "Searching".to_string(),
            percent: 40,
        });
        match &app.profile.as_ref().unwrap().data {
            LoadingState::Loading { message, percent } => {
                assert_eq!(message, "Searching");
                assert_eq!(*percent, 40);
            }
            other => panic!("unexpected state: {other:?}"),
        }

        app.apply(AppEvent::ProfileFailed("boom".to_string()));
        assert!(matches!(
            app.profile.as_ref().unwrap().data,
            LoadingState::Error(_)
        ));

        // Retry restarts the load
        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.profile.as_ref().unwrap().data.is_loading());
    }

    #[test]
    fn test_sign_in_flow() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);

        app.handle_key(ctrl('s'));
        let prompt = app.landing.login_prompt.clone().unwrap();
        assert!(prompt.contains("client_id=client"));
        app.handle_key(key(KeyCode::Esc));
        assert!(app.landing.login_prompt.is_none());

        app.navigate(Route::parse("/callback?code=abc&state=%2Foctocat"));
        assert!(app.signing_in);

        app.apply(AppEvent::SignedIn {
            token: "gho_1".to_string(),
            next: "/octocat".to_string(),
        });
        assert_eq!(app.tokens.get().as_deref(), Some("gho_1"));
        assert_eq!(app.route, Route::profile("octocat"));

        app.handle_key(ctrl('x'));
        assert!(!app.tokens.is_authenticated());
    }

    #[test]
    fn test_callback_without_code_goes_home() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);

        app.navigate(Route::parse("/callback"));
        assert_eq!(app.route, Route::Landing);

        app.navigate(Route::parse("/callback?code=bad"));
        app.apply(AppEvent::SignInFailed("Failed to exchange code".to_string()));
        assert_eq!(app.route, Route::Landing);
        assert!(!app.signing_in);
        assert!(!app.tokens.is_authenticated());
    }

    #[test]
    fn test_range_change_reloads() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = app(&runtime);
        app.navigate(Route::profile("octocat"));

        // Filters are inert until data arrives
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.profile.as_ref().unwrap().range, DateRange::All);

        let profile = UserProfile {
            login: "octocat".to_string(),
            name: None,
            avatar_url: String::new(),
            bio: None,
            followers: 0,
            following: 0,
            public_repos: 0,
            url: String::new(),
        };
        app.apply(AppEvent::ProfileLoaded(Box::new(ProfileData::new(
            profile,
            Vec::new(),
        ))));
        app.handle_key(key(KeyCode::Char('3')));

        let state = app.profile.as_ref().unwrap();
        assert_eq!(state.range, DateRange::ThreeYears);
        assert!(state.data.is_loading());
    }
}
