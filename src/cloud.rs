//! Shared plumbing for the Google Cloud REST APIs (speech, translation, synthesis).
//!
//! Credentials come from the environment; when none are set, requests go out
//! unauthenticated and the API's refusal surfaces as a stage error for that turn.

use crate::error::{LingoError, Result, Stage};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// API key sent as the `key` query parameter.
pub const CLOUD_API_KEY_ENV: &str = "GOOGLE_CLOUD_API_KEY";
/// OAuth access token sent as a bearer token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";
/// Quota project for bearer-token requests.
pub const PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

/// How requests to the Google Cloud APIs are authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CloudAuth {
    ApiKey(String),
    Bearer {
        token: String,
        project: Option<String>,
    },
    /// No credential attached.
    #[default]
    Ambient,
}

impl CloudAuth {
    /// Read credentials from the environment, preferring an API key.
    pub fn from_env() -> Self {
        if let Ok(key) = std::env::var(CLOUD_API_KEY_ENV)
            && !key.is_empty()
        {
            return CloudAuth::ApiKey(key);
        }

        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV)
            && !token.is_empty()
        {
            let project = std::env::var(PROJECT_ENV).ok().filter(|p| !p.is_empty());
            return CloudAuth::Bearer { token, project };
        }

        warn!(
            "neither {} nor {} is set; cloud requests will be unauthenticated",
            CLOUD_API_KEY_ENV, ACCESS_TOKEN_ENV
        );
        CloudAuth::Ambient
    }

    /// Append the API key to `url` when this is key-based auth.
    pub fn url(&self, url: &str) -> String {
        match self {
            CloudAuth::ApiKey(key) => match reqwest::Url::parse(url) {
                Ok(mut parsed) => {
                    parsed.query_pairs_mut().append_pair("key", key);
                    parsed.to_string()
                }
                // Unparseable URLs fail at send time with a stage error
                Err(_) => url.to_string(),
            },
            _ => url.to_string(),
        }
    }

    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            CloudAuth::Bearer { token, project } => {
                let request = request.bearer_auth(token);
                match project {
                    Some(p) => request.header("x-goog-user-project", p),
                    None => request,
                }
            }
            _ => request,
        }
    }
}

/// POST a JSON body and decode a JSON response, mapping every failure to `stage`.
pub async fn post_json<B, R>(
    client: &reqwest::Client,
    auth: &CloudAuth,
    url: &str,
    body: &B,
    stage: Stage,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    debug!(stage = %stage, url = %url, "sending request");

    let response = auth
        .apply(client.post(auth.url(url)).json(body))
        .send()
        .await
        .map_err(|e| LingoError::for_stage(stage, format!("request failed: {e}")))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| LingoError::for_stage(stage, format!("failed to read response: {e}")))?;

    if !status.is_success() {
        return Err(LingoError::for_stage(
            stage,
            api_error_message(&text, status.as_u16()),
        ));
    }

    serde_json::from_str(&text)
        .map_err(|e| LingoError::for_stage(stage, format!("unexpected response format: {e}")))
}

/// Extract a readable message from a Google error envelope.
///
/// `{"error": {"code": 403, "message": "...", "status": "PERMISSION_DENIED"}}`
/// becomes `"HTTP 403 PERMISSION_DENIED: ..."`. Non-JSON bodies are passed through.
pub fn api_error_message(body: &str, status: u16) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = json["error"]["message"].as_str()
    {
        return match json["error"]["status"].as_str() {
            Some(code) => format!("HTTP {status} {code}: {message}"),
            None => format!("HTTP {status}: {message}"),
        };
    }

    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    }
}
