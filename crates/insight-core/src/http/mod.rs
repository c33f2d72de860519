//! HTTP client adapter.
//!
//! Single chokepoint for backend calls. Applies bearer-token injection,
//! per-endpoint de-duplication, the slow-request advisory, the hard timeout,
//! error classification, and the token-expired forced logout.

mod notify;
mod tracker;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;

pub use notify::{NoticeLevel, Notifier, NotifierEvent, RecordingNotifier};
pub use tracker::{RequestTicket, RequestTracker};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::storage::{KeyValueStore, TOKEN_KEY};
use crate::util::compact_text;

/// Server error text that signals an expired bearer token.
pub const TOKEN_EXPIRED_MESSAGE: &str = "Token has expired, please log in again";

const SLOW_REQUEST_MESSAGE: &str = "This is taking longer than expected. Please wait...";
const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Redirecting to login...";

/// Successful response: status plus decoded JSON body (`Null` when empty).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

/// Hook run when the adapter forcibly terminates the session.
pub trait SessionReset: Send + Sync {
    fn reset_session(&self);
}

/// Request-identity key: method plus path, ignoring query and body.
#[must_use]
pub fn request_key(method: &Method, path: &str) -> String {
    let path = path.split('?').next().unwrap_or(path);
    format!("{method}:{path}")
}

pub struct HttpClient {
    base_url: String,
    client: reqwest::Client,
    request_timeout: Duration,
    slow_request_after: Duration,
    forced_logout_delay: Duration,
    storage: Arc<dyn KeyValueStore>,
    tracker: Arc<RequestTracker>,
    notifier: Arc<dyn Notifier>,
    session_resets: Arc<Mutex<Vec<Arc<dyn SessionReset>>>>,
    forced_logout: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("slow_request_after", &self.slow_request_after)
            .field("pending", &self.tracker.pending_count())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        tracker: Arc<RequestTracker>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().build().map_err(|error| {
            Error::InvalidConfiguration(format!("Failed to construct HTTP client: {error}"))
        })?;

        Ok(Self {
            base_url: config.base_url(),
            client,
            request_timeout: config.request_timeout,
            slow_request_after: config.slow_request_after,
            forced_logout_delay: config.forced_logout_delay,
            storage,
            tracker,
            notifier,
            session_resets: Arc::new(Mutex::new(Vec::new())),
            forced_logout: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tracker(&self) -> &Arc<RequestTracker> {
        &self.tracker
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Register a hook run after durable state is cleared by a forced logout.
    pub fn on_session_reset(&self, hook: Arc<dyn SessionReset>) {
        self.session_resets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hook);
    }

    /// Send a request and decode the body into `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let response = self.send(method, path, body).await?;
        Ok(serde_json::from_value(response.data)?)
    }

    /// Send a request through the adapter policies.
    pub async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<ApiResponse> {
        let request = self.build_request(method.clone(), path, body)?;
        let registration = Registration {
            http: self,
            ticket: self.tracker.register(&request_key(&method, path)),
        };
        tracing::debug!("Request sent: {method} {path}");

        let outcome = self.drive(request, &registration.ticket).await;
        let outcome = if registration.ticket.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            outcome
        };
        drop(registration);

        match &outcome {
            Ok(response) => {
                tracing::debug!("Response received: {method} {path} ({})", response.status);
            }
            Err(Error::Cancelled) => {
                tracing::debug!("Request superseded: {method} {path}");
            }
            Err(Error::Http { status, body }) => {
                if *status == 401 && is_token_expired(body) {
                    tracing::warn!("Unauthorized - token expired");
                    self.schedule_forced_logout();
                } else {
                    tracing::warn!(
                        "Error response: {method} {path} ({status}): {}",
                        compact_text(&body.to_string())
                    );
                }
            }
            Err(error) => tracing::warn!("Request failed: {method} {path}: {error}"),
        }

        outcome
    }

    /// Wait for a scheduled forced logout to finish resetting the session.
    pub async fn settle(&self) {
        let handle = self
            .forced_logout
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(error) = handle.await {
                tracing::warn!("Forced logout task failed: {error}");
            }
        }
    }

    async fn drive(&self, request: reqwest::Request, ticket: &RequestTicket) -> Result<ApiResponse> {
        let dispatch = self.dispatch(request);
        tokio::pin!(dispatch);
        let advisory = tokio::time::sleep(self.slow_request_after);
        tokio::pin!(advisory);
        let mut advised = false;

        loop {
            tokio::select! {
                biased;
                () = ticket.token().cancelled() => break Err(Error::Cancelled),
                result = &mut dispatch => break result,
                () = &mut advisory, if !advised => {
                    advised = true;
                    if self.tracker.raise_advisory() {
                        self.notifier.show_advisory(SLOW_REQUEST_MESSAGE);
                    }
                }
            }
        }
    }

    async fn dispatch(&self, request: reqwest::Request) -> Result<ApiResponse> {
        let response = self
            .client
            .execute(request)
            .await
            .map_err(classify_transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(classify_transport_error)?;
        let data = decode_body(&text);

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                data,
            })
        } else {
            Err(Error::Http {
                status: status.as_u16(),
                body: data,
            })
        }
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Request> {
        let mut builder = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .timeout(self.request_timeout)
            .header(reqwest::header::ACCEPT, "application/json");

        match self.storage.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.trim().is_empty() => {
                builder = builder.bearer_auth(token.trim());
            }
            Ok(_) => {}
            Err(error) => tracing::warn!("Failed to read stored token: {error}"),
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        builder.build().map_err(|error| {
            Error::InvalidConfiguration(format!("Failed to build request for {path}: {error}"))
        })
    }

    fn schedule_forced_logout(&self) {
        let mut slot = self
            .forced_logout
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        self.notifier
            .notify(NoticeLevel::Warning, SESSION_EXPIRED_NOTICE);

        let delay = self.forced_logout_delay;
        let storage = Arc::clone(&self.storage);
        let notifier = Arc::clone(&self.notifier);
        let resets = Arc::clone(&self.session_resets);
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(error) = storage.clear() {
                tracing::error!("Failed to clear durable state on forced logout: {error}");
            }
            let hooks = resets
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for hook in hooks {
                hook.reset_session();
            }
            tracing::info!("Session terminated after token expiry");
            notifier.redirect_to_login();
        }));
    }
}

/// Releases a tracker registration when `send` completes or its future is
/// dropped mid-flight.
struct Registration<'a> {
    http: &'a HttpClient,
    ticket: RequestTicket,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        if self.http.tracker.finish(&self.ticket) {
            self.http.notifier.dismiss_advisory();
        }
    }
}

fn is_token_expired(body: &Value) -> bool {
    body.get("error")
        .and_then(Value::as_str)
        .is_some_and(|message| message.trim() == TOKEN_EXPIRED_MESSAGE)
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
    }
}

fn classify_transport_error(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Network(format!("request timed out: {error}"))
    } else {
        Error::Network(error.to_string())
    }
}
