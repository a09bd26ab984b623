// OAuth code exchange server.
// Holds the client secret and trades authorization codes for access tokens.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{
        HeaderValue, Method, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    response::{IntoResponse, Response},
    routing::any,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::Result;

#[derive(Clone)]
pub struct AuthState {
    http: reqwest::Client,
    config: Arc<ServerConfig>,
}

impl AuthState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
        }
    }
}

#[derive(Error, Debug)]
enum ExchangeError {
    #[error("Invalid request body: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Missing code")]
    MissingCode,

    #[error("{0}")]
    Rejected(String),

    #[error("No access token in response")]
    MissingToken,

    #[error("Token request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ExchangeError {
    fn into_response(self) -> Response {
        let status = match self {
            ExchangeError::MissingCode | ExchangeError::Rejected(_) => StatusCode::BAD_REQUEST,
            ExchangeError::MalformedPayload(_)
            | ExchangeError::MissingToken
            | ExchangeError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Deserialize)]
struct CodeRequest {
    code: Option<String>,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Serialize)]
struct AccessToken {
    access_token: String,
}

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth", any(auth_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn auth_handler(State(state): State<AuthState>, method: Method, body: Bytes) -> Response {
    let response = match method {
        Method::OPTIONS => StatusCode::NO_CONTENT.into_response(),
        Method::POST => match exchange(&state, &body).await {
            Ok(access_token) => Json(AccessToken { access_token }).into_response(),
            Err(e) => {
                warn!(error = %e, "code exchange failed");
                e.into_response()
            }
        },
        _ => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response(),
    };

    with_cors(response)
}

async fn exchange(state: &AuthState, body: &[u8]) -> std::result::Result<String, ExchangeError> {
    let request: CodeRequest = serde_json::from_slice(body)?;
    let code = request
        .code
        .filter(|c| !c.is_empty())
        .ok_or(ExchangeError::MissingCode)?;

    let config = &state.config;
    let upstream: TokenResponse = state
        .http
        .post(&config.token_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&TokenRequest {
            client_id: &config.client_id,
            client_secret: &config.client_secret,
            code: &code,
        })
        .send()
        .await?
        .json()
        .await?;

    if let Some(error) = upstream.error {
        return Err(ExchangeError::Rejected(
            upstream.error_description.unwrap_or(error),
        ));
    }

    upstream.access_token.ok_or(ExchangeError::MissingToken)
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// Run the exchange server until Ctrl+C or SIGTERM.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let address = format!("0.0.0.0:{}", config.port);
    let app = router(AuthState::new(config));

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Auth server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Auth server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::post;
    use serde_json::Value;

    use super::*;
    use crate::auth::exchange_code;
    use crate::error::ContribError;

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// Token endpoint double keyed on the submitted code.
    async fn fake_token_endpoint(Json(body): Json<Value>) -> Json<Value> {
        assert_eq!(body["client_id"], "id");
        assert_eq!(body["client_secret"], "secret");
        match body["code"].as_str() {
            Some("good") => Json(json!({ "access_token": "gho_123", "token_type": "bearer" })),
            Some("expired") => Json(json!({
                "error": "bad_verification_code",
                "error_description": "The code passed is incorrect or expired."
            })),
            Some("bare") => Json(json!({ "error": "bad_verification_code" })),
            _ => Json(json!({})),
        }
    }

    /// Exchange server wired to the fake token endpoint; returns its /api/auth URL.
    async fn auth_server() -> String {
        let upstream = spawn(Router::new().route("/token", post(fake_token_endpoint))).await;
        let config = ServerConfig {
            port: 0,
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            token_url: format!("{}/token", upstream),
        };
        let base = spawn(router(AuthState::new(config))).await;
        format!("{}/api/auth", base)
    }

    fn assert_cors(response: &reqwest::Response) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    }

    async fn post_body(url: &str, body: &str) -> (StatusCode, Value) {
        let response = reqwest::Client::new()
            .post(url)
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        assert_cors(&response);
        let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_preflight_and_methods() {
        let url = auth_server().await;
        let client = reqwest::Client::new();

        let response = client
            .request(reqwest::Method::OPTIONS, &url)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 204);
        assert_cors(&response);

        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 405);
        assert_cors(&response);
        assert_eq!(response.text().await.unwrap(), "Method not allowed");
    }

    #[tokio::test]
    async fn test_exchange_statuses() {
        let url = auth_server().await;

        let (status, body) = post_body(&url, r#"{"code":"good"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "access_token": "gho_123" }));

        let (status, body) = post_body(&url, "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing code");

        let (status, _) = post_body(&url, r#"{"code":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post_body(&url, r#"{"code":"expired"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "The code passed is incorrect or expired.");

        let (status, body) = post_body(&url, r#"{"code":"bare"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_verification_code");

        let (status, body) = post_body(&url, r#"{"code":"other"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());

        let (status, body) = post_body(&url, "not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_exchange_code_client() {
        let url = auth_server().await;
        let http = reqwest::Client::new();

        assert_eq!(exchange_code(&http, &url, "good").await.unwrap(), "gho_123");

        // Rejections surface as non-2xx, which the client reports generically
        match exchange_code(&http, &url, "expired").await.unwrap_err() {
            ContribError::Auth(msg) => assert_eq!(msg, "Failed to exchange code"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_code_reads_error_field() {
        let proxy = spawn(Router::new().route(
            "/api/auth",
            post(|| async { Json(json!({ "error": "access_denied" })) }),
        ))
        .await;
        let http = reqwest::Client::new();

        match exchange_code(&http, &format!("{}/api/auth", proxy), "x")
            .await
            .unwrap_err()
        {
            ContribError::Auth(msg) => assert_eq!(msg, "access_denied"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
