// Screen routing.
// Maps paths (or pasted redirect URLs) onto the three screens.

use std::fmt;

use reqwest::Url;

/// Base used to resolve bare paths into URLs for parsing.
const LOCAL_ORIGIN: &str = "http://localhost/";

/// GitHub caps logins at 39 characters.
const MAX_USERNAME_LEN: usize = 39;

/// Whether `name` can be a GitHub login: ASCII letters, digits, and hyphens.
/// Anything else could change the API request path or query.
pub fn is_valid_username(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_USERNAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// A screen the dashboard can show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// `/`
    #[default]
    Landing,
    /// `/callback?code=..&state=..`
    Callback {
        code: Option<String>,
        state: Option<String>,
    },
    /// `/{username}`
    Profile { username: String },
}

impl Route {
    /// Parse a path with optional query, or a full URL.
    /// Unparseable input and invalid usernames map to the landing screen.
    pub fn parse(input: &str) -> Route {
        let input = input.trim();
        let Some(url) = Url::parse(LOCAL_ORIGIN).ok().and_then(|base| base.join(input).ok())
        else {
            return Route::Landing;
        };

        let first = url
            .path_segments()
            .and_then(|mut segments| segments.find(|s| !s.is_empty()))
            .map(|s| s.to_string());

        match first.as_deref() {
            None => Route::Landing,
            Some("callback") => {
                let mut code = None;
                let mut state = None;
                for (key, value) in url.query_pairs() {
                    match key.as_ref() {
                        "code" if code.is_none() => code = Some(value.into_owned()),
                        "state" if state.is_none() => state = Some(value.into_owned()),
                        _ => {}
                    }
                }
                Route::Callback { code, state }
            }
            Some(username) if is_valid_username(username) => Route::Profile {
                username: username.to_string(),
            },
            Some(_) => Route::Landing,
        }
    }

    pub fn profile(username: impl Into<String>) -> Route {
        Route::Profile {
            username: username.into(),
        }
    }

    /// Path form, used as the sign-in return target.
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Callback { .. } => "/callback".to_string(),
            Route::Profile { username } => format!("/{}", username),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_landing() {
        assert_eq!(Route::parse("/"), Route::Landing);
        assert_eq!(Route::parse(""), Route::Landing);
    }

    #[test]
    fn test_parse_profile() {
        assert_eq!(Route::parse("/octocat"), Route::profile("octocat"));
        assert_eq!(Route::parse("octocat"), Route::profile("octocat"));
        assert_eq!(Route::parse("/octocat/extra?x=1"), Route::profile("octocat"));
    }

    #[test]
    fn test_parse_rejects_invalid_usernames() {
        assert_eq!(Route::parse("/a?b"), Route::profile("a"));
        assert_eq!(Route::parse("/a%3Fb"), Route::Landing);
        assert_eq!(Route::parse("/.."), Route::Landing);
        assert_eq!(Route::parse("/some.user"), Route::Landing);
        assert_eq!(Route::parse(&format!("/{}", "a".repeat(40))), Route::Landing);
        assert_eq!(Route::parse("/my-name-1"), Route::profile("my-name-1"));
    }

    #[test]
    fn test_is_valid_username() {
        assert!(is_valid_username("octocat"));
        assert!(is_valid_username("Foo-Bar9"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("a?b"));
        assert!(!is_valid_username(".."));
        assert!(!is_valid_username("a b"));
        assert!(!is_valid_username("ünï"));
    }

    #[test]
    fn test_parse_callback() {
        assert_eq!(
            Route::parse("/callback?code=abc&state=%2Foctocat"),
            Route::Callback {
                code: Some("abc".to_string()),
                state: Some("/octocat".to_string()),
            }
        );
        assert_eq!(
            Route::parse("/callback"),
            Route::Callback {
                code: None,
                state: None
            }
        );

        // A redirect URL pasted from the browser works too
        assert_eq!(
            Route::parse("http://localhost:3000/callback?code=xyz"),
            Route::Callback {
                code: Some("xyz".to_string()),
                state: None,
            }
        );
    }

    #[test]
    fn test_path_round_trips() {
        for path in ["/", "/octocat"] {
            assert_eq!(Route::parse(path).path(), path);
        }
    }
}
