use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use thiserror::Error;

use crate::models::ExternalEvent;

#[derive(Debug, Error)]
pub enum FeedError {
    /// The request never produced a response (connection refused, timeout).
    #[error("feed transport error: {0}")]
    Transport(String),
    /// The upstream answered with an error status.
    #[error("feed returned http status {0}")]
    Status(u16),
    #[error("feed decode error: {0}")]
    Decode(String),
}

/// Source of upstream events and their image bytes. The sync job only ever
/// talks to this trait, so tests can substitute a canned feed.
pub trait EventFeed {
    fn fetch_events(&self) -> Result<Vec<ExternalEvent>, FeedError>;
    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, FeedError>;
}

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(20))
        .user_agent("event-sync/0.1")
        .build()
        .expect("http client")
});

pub struct HttpFeed {
    url: String,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl EventFeed for HttpFeed {
    fn fetch_events(&self) -> Result<Vec<ExternalEvent>, FeedError> {
        let body = get_bytes(&self.url)?;
        decode_events(&body)
    }

    fn fetch_image(&self, url: &str) -> Result<Vec<u8>, FeedError> {
        get_bytes(url)
    }
}

fn get_bytes(url: &str) -> Result<Vec<u8>, FeedError> {
    let response = CLIENT
        .get(url)
        .send()
        .map_err(|err| FeedError::Transport(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status(status.as_u16()));
    }
    let bytes = response
        .bytes()
        .map_err(|err| FeedError::Transport(err.to_string()))?;
    Ok(bytes.to_vec())
}

pub fn decode_events(body: &[u8]) -> Result<Vec<ExternalEvent>, FeedError> {
    serde_json::from_slice(body).map_err(|err| FeedError::Decode(err.to_string()))
}
