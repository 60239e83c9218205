use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Url;

use super::wire::{CreateRoomRequest, ErrorBody, MessagePage, MessagePayload, RoomPayload};

/// Errors from the REST API.
#[derive(Debug)]
pub enum ApiError {
    /// Client misconfigured (bad base URL, TLS setup). Not retryable.
    Config(String),
    /// Connection refused, DNS failure, reset.
    Network(String),
    /// The request exceeded the configured timeout.
    Timeout,
    /// Server answered with a non-success status.
    Api { status: u16, message: String },
    /// Body did not match the expected shape.
    Parse(String),
}

impl ApiError {
    /// Text suitable for a toast: the server's own message when it sent one.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Timeout => write!(f, "request timed out"),
            ApiError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

fn send_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e.to_string())
    }
}

/// The chat server's REST surface.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Rooms visible to the session: public rooms followed by the user's rooms.
    async fn list_rooms(&self) -> Result<Vec<RoomPayload>, ApiError>;

    /// One page of room history, newest first (server order).
    async fn fetch_messages(
        &self,
        room_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<MessagePayload>, ApiError>;

    async fn create_room(&self, request: &CreateRoomRequest) -> Result<RoomPayload, ApiError>;

    /// Ends the server session.
    async fn logout(&self) -> Result<(), ApiError>;
}

/// `ChatApi` over HTTP with a per-request timeout.
pub struct HttpApi {
    base_url: Url,
    client: reqwest::Client,
    session_cookie: Option<String>,
}

impl HttpApi {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session_cookie: Option<String>,
    ) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::Config(format!("{base_url}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            base_url,
            client,
            session_cookie,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.with_session(self.client.get(url))
    }

    fn with_session(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session_cookie {
            Some(cookie) => builder.header(reqwest::header::COOKIE, cookie.as_str()),
            None => builder,
        }
    }
}

/// Turn a non-success response into `ApiError::Api`, preferring the `{error}` body.
async fn api_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_default();
    warn!("API returned HTTP {}: {}", status, body);
    ApiError::Api { status, message }
}

#[async_trait]
impl ChatApi for HttpApi {
    async fn list_rooms(&self) -> Result<Vec<RoomPayload>, ApiError> {
        let url = self.endpoint(&["api", "rooms"])?;
        let response = self.get(url).send().await.map_err(send_error)?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let rooms: Vec<RoomPayload> = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        info!("Fetched {} rooms", rooms.len());
        Ok(rooms)
    }

    async fn fetch_messages(
        &self,
        room_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<MessagePayload>, ApiError> {
        let mut url = self.endpoint(&["api", "messages", room_id])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());
        debug!("GET {}", url);

        let response = self.get(url).send().await.map_err(send_error)?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let page: MessagePage = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(page.messages)
    }

    async fn create_room(&self, request: &CreateRoomRequest) -> Result<RoomPayload, ApiError> {
        let url = self.endpoint(&["api", "rooms"])?;
        let response = self
            .with_session(self.client.post(url))
            .json(request)
            .send()
            .await
            .map_err(send_error)?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        let room: RoomPayload = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        info!("Created room {} ({})", room.name, room.id);
        Ok(room)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["logout"])?;
        let response = self.get(url).send().await.map_err(send_error)?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }
        Ok(())
    }
}
