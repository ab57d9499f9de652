use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    routing::get,
};
use reqwest::Url;
use serde::Deserialize;
use tokio::{net::TcpListener, process::Command, sync::oneshot};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{AutotubeError, Result},
    progress::Observer,
};

pub const UPLOAD_SCOPE: &str = "https://www.googleapis.com/auth/youtube.upload";

const SUCCESS_PAGE: &str =
    "The authentication flow has completed. You may close this window.";

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

/// OAuth client registered for the upload, as found in `client_secret.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ClientSecret {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AutotubeError::AuthorizationFailed {
                reason: format!("cannot read {}: {}", path.display(), e),
            }
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: ClientSecretFile = serde_json::from_str(content)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| AutotubeError::AuthorizationFailed {
                reason: "client secret has neither an 'installed' nor a 'web' section"
                    .to_string(),
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Installed-application authorization: the user consents in a browser and
/// Google redirects back to a short-lived listener on the loopback interface.
pub struct InstalledAppFlow {
    secret: ClientSecret,
    client: reqwest::Client,
}

impl InstalledAppFlow {
    pub fn new(secret: ClientSecret) -> Self {
        Self {
            secret,
            client: reqwest::Client::new(),
        }
    }

    pub async fn run_local_server(&self, observer: &dyn Observer) -> Result<Credential> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://127.0.0.1:{}/", port);
        let state = Uuid::new_v4().simple().to_string();

        let url = self.authorization_url(&redirect_uri, &state)?;
        observer.notice(&format!(
            "Please visit this URL to authorize the upload: {}",
            url
        ));
        open_browser(url.as_str());

        let code = wait_for_code(listener, &state).await?;
        self.exchange_code(&code, &redirect_uri).await
    }

    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.secret.auth_uri,
            &[
                ("client_id", self.secret.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", UPLOAD_SCOPE),
                ("state", state),
                ("access_type", "offline"),
            ],
        )
        .map_err(|e| AutotubeError::AuthorizationFailed {
            reason: format!("invalid auth_uri {}: {}", self.secret.auth_uri, e),
        })
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Credential> {
        debug!(token_uri = %self.secret.token_uri, "exchanging authorization code");
        let response = self
            .client
            .post(&self.secret.token_uri)
            .form(&[
                ("code", code),
                ("client_id", self.secret.client_id.as_str()),
                ("client_secret", self.secret.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AutotubeError::AuthorizationFailed {
                reason: format!("token exchange returned {}: {}", status, body),
            });
        }

        Ok(response.json::<Credential>().await?)
    }
}

struct CallbackState {
    expected_state: String,
    code_tx: Mutex<Option<oneshot::Sender<Result<String>>>>,
}

impl CallbackState {
    fn finish(&self, outcome: Result<String>) {
        let sender = match self.code_tx.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(tx) = sender {
            let _ = tx.send(outcome);
        }
    }
}

/// Serve the redirect endpoint on `listener` until a request settles the
/// flow, either with an authorization code or with an error.
async fn wait_for_code(listener: TcpListener, expected_state: &str) -> Result<String> {
    let (code_tx, code_rx) = oneshot::channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let shared = Arc::new(CallbackState {
        expected_state: expected_state.to_string(),
        code_tx: Mutex::new(Some(code_tx)),
    });
    let app = Router::new()
        .route("/", get(handle_callback))
        .with_state(shared);

    tokio::spawn(async move {
        let shutdown = async move {
            let _ = stop_rx.await;
        };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            debug!(error = %e, "redirect listener stopped");
        }
    });

    let outcome = code_rx.await.map_err(|_| AutotubeError::AuthorizationFailed {
        reason: "redirect listener stopped before the callback arrived".to_string(),
    });
    let _ = stop_tx.send(());
    outcome?
}

async fn handle_callback(
    State(shared): State<Arc<CallbackState>>,
    uri: Uri,
) -> (StatusCode, String) {
    let target = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    match parse_callback(target, &shared.expected_state) {
        Ok(Some(code)) => {
            shared.finish(Ok(code));
            (StatusCode::OK, SUCCESS_PAGE.to_string())
        }
        Ok(None) => (StatusCode::NOT_FOUND, "Not found".to_string()),
        Err(e) => {
            let body = e.to_string();
            shared.finish(Err(e));
            (StatusCode::BAD_REQUEST, body)
        }
    }
}

/// Inspect a redirect request target such as `/?code=..&state=..`.
///
/// Returns the authorization code, `None` for unrelated requests (a browser
/// asking for `/favicon.ico`), or an error when Google reports a denial or the
/// state does not match.
pub fn parse_callback(target: &str, expected_state: &str) -> Result<Option<String>> {
    let url = Url::parse(&format!("http://127.0.0.1{}", target)).map_err(|e| {
        AutotubeError::AuthorizationFailed {
            reason: format!("malformed redirect {}: {}", target, e),
        }
    })?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(AutotubeError::AuthorizationFailed {
            reason: format!("consent was not granted: {}", error),
        });
    }

    let Some(code) = code else {
        return Ok(None);
    };

    if state.as_deref() != Some(expected_state) {
        return Err(AutotubeError::AuthorizationFailed {
            reason: "state mismatch in redirect".to_string(),
        });
    }

    Ok(Some(code))
}

fn open_browser(url: &str) {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.arg("/C").arg("start").arg("");
        command
    } else {
        Command::new("xdg-open")
    };

    if let Err(e) = command.arg(url).spawn() {
        debug!(error = %e, "could not launch a browser");
    }
}
