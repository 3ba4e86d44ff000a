//! The single outbound-call path to the compliance service.
//!
//! The gateway never owns the credential. It observes the session
//! controller's current credential through a `watch` channel and reports
//! rejected credentials back over an `mpsc` channel; the controller is the
//! only party that reacts to those reports.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::auth::Credential;

use super::ApiError;

pub use reqwest::Method;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Side effects the gateway asks the session controller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// The service answered `401` for the request to `path`.
    Unauthorized { path: String },
}

/// The controller's end of the gateway channels.
///
/// `credential` is the write side of the value every gateway clone reads
/// before a request; `events` receives [`GatewayEvent`]s from every clone.
#[derive(Debug)]
pub struct GatewayLink {
    pub credential: watch::Sender<Option<Credential>>,
    pub events: mpsc::UnboundedReceiver<GatewayEvent>,
}

/// Request gateway for the compliance service.
/// Clone is cheap - reqwest::Client and both channel handles are reference counted.
#[derive(Clone, Debug)]
pub struct Gateway {
    client: Client,
    base_url: String,
    credential: watch::Receiver<Option<Credential>>,
    events: mpsc::UnboundedSender<GatewayEvent>,
}

impl Gateway {
    /// Create a gateway for `base_url` (e.g. `http://localhost:5000/api`)
    /// together with the link the session controller needs to drive it.
    pub fn new(base_url: &str, timeout: Duration) -> Result<(Self, GatewayLink), ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        let (credential_tx, credential_rx) = watch::channel(None);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let gateway = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: credential_rx,
            events: events_tx,
        };
        let link = GatewayLink {
            credential: credential_tx,
            events: events_rx,
        };
        Ok((gateway, link))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a credential will be attached to the next request
    pub fn has_credential(&self) -> bool {
        self.credential.borrow().is_some()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn report(&self, event: GatewayEvent) {
        if self.events.send(event).is_err() {
            debug!("Session controller dropped, gateway event discarded");
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<T, ()>(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// Perform one request and decode the JSON response.
    ///
    /// A `401` is reported as [`GatewayEvent::Unauthorized`] before the error
    /// is returned. Every other failure is returned untouched. No retries.
    pub async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        // Read once per call; the controller may swap it between calls.
        let credential = self.credential.borrow().clone();

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(header::ACCEPT, "application/json");
        if let Some(ref credential) = credential {
            request = request.bearer_auth(credential.as_str());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, authenticated = credential.is_some(), "Sending request");

        let response = request.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "Request failed before a response arrived");
            ApiError::NetworkError(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                warn!(%method, path, "Credential rejected by service");
                self.report(GatewayEvent::Unauthorized {
                    path: path.to_string(),
                });
            } else {
                debug!(%method, path, %status, "Service returned an error");
            }
            return Err(ApiError::from_status(status, &text));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(%method, path, error = %e, "Failed to parse response");
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
        })
    }
}
