pub mod cancel;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::config::AppConfig;
use cancel::{run_cancellable, CancelToken};

/// Shown when a list fetch fails for any reason other than cancellation
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load complaints";
/// Shown when the server answers a save with a falsy `Success`
pub const SAVE_REJECTED_MESSAGE: &str = "Failed to save complaint.";
/// Fallback when a failure carries no usable message
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was aborted through its cancellation token
    #[error("request cancelled")]
    Cancelled,

    /// Transport failure or a response body that is not the expected JSON
    #[error("{0}")]
    Network(String),

    #[error("{}", SAVE_REJECTED_MESSAGE)]
    SaveRejected,

    #[error("{}", LOAD_FAILED_MESSAGE)]
    FetchFailure(#[source] Box<ApiError>),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

impl ApiError {
    /// Text to put in front of the user, or None for errors that stay silent
    pub fn user_message(&self) -> Option<String> {
        match self {
            ApiError::Cancelled => None,
            ApiError::Network(msg) if msg.trim().is_empty() => {
                Some(UNEXPECTED_ERROR_MESSAGE.to_string())
            }
            ApiError::Network(msg) => Some(msg.clone()),
            ApiError::SaveRejected => Some(SAVE_REJECTED_MESSAGE.to_string()),
            ApiError::FetchFailure(_) => Some(LOAD_FAILED_MESSAGE.to_string()),
        }
    }
}

/// A complaint as returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    #[serde(rename = "Id", default, deserialize_with = "deserialize_text")]
    pub id: Option<String>,
    #[serde(
        rename = "Title",
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        rename = "Body",
        default,
        deserialize_with = "deserialize_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub body: Option<String>,
}

impl Complaint {
    /// Title to render, None when missing or blank
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Stable key for list reconciliation.
    /// Uses the server id, or a hash of the content and position when there is none.
    pub fn render_key(&self, index: usize) -> String {
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            return id.to_string();
        }

        let mut hasher = DefaultHasher::new();
        self.title.hash(&mut hasher);
        self.body.hash(&mut hasher);
        index.hash(&mut hasher);
        format!("anon-{:016x}", hasher.finish())
    }
}

/// Fields are documented as strings, but scalar values are tolerated so one
/// odd entry cannot fail the whole list. Arrays and objects read as absent.
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Payload for the save endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComplaint {
    pub title: String,
    pub body: String,
}

/// Loose truthiness for the `Success` flag: absent, null, false, 0 and "" are all failures
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// HTTP client for the complaints API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    list_url: String,
    save_url: String,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("complaint-board/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            list_url: join_url(&config.base_url, &config.list_path),
            save_url: join_url(&config.base_url, &config.save_path),
        })
    }

    pub fn list_url(&self) -> &str {
        &self.list_url
    }

    /// GET the complaint list. The status code is not inspected; whatever the
    /// server sends must decode as a JSON array.
    pub async fn list_complaints(
        &self,
        cancel: Option<&CancelToken>,
    ) -> Result<Vec<Complaint>, ApiError> {
        run_cancellable(cancel, async {
            let response = self.http.get(&self.list_url).send().await?;
            tracing::debug!("GET {} -> {}", self.list_url, response.status());
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        })
        .await
    }

    /// POST a new complaint and check the `Success` flag of the reply
    pub async fn save_complaint(
        &self,
        complaint: &NewComplaint,
        cancel: Option<&CancelToken>,
    ) -> Result<(), ApiError> {
        run_cancellable(cancel, async {
            let response = self
                .http
                .post(&self.save_url)
                .json(complaint)
                .send()
                .await?;
            tracing::debug!("POST {} -> {}", self.save_url, response.status());
            let bytes = response.bytes().await?;
            let reply: Value = serde_json::from_slice(&bytes)?;

            if is_truthy(reply.get("Success")) {
                Ok(())
            } else {
                Err(ApiError::SaveRejected)
            }
        })
        .await
    }
}
