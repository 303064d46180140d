// API client module: a small blocking HTTP client that talks to the
// servlet's choose endpoint. One session, one POST per call, no retries.

use crate::config::ClientConfig;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failures surfaced by `ServletClient`. The client never recovers from
/// any of these; callers decide what to print.
#[derive(Debug, Error)]
pub enum ServletError {
    /// Transport failure: connection refused, DNS, timeout, body read.
    #[error("Error communicating with servlet: {source}")]
    Communication {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The servlet answered with a 4xx or 5xx status.
    #[error("Error communicating with servlet: HTTP status {status} for url ({url})")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// Writing the per-request diagnostics failed.
    #[error("failed to write request diagnostics: {0}")]
    Output(#[from] io::Error),

    #[error("session is closed")]
    Closed,

    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// Form body posted to the choose endpoint: a single `choice` field.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceRequest<'a> {
    pub choice: &'a str,
}

/// Raw answer from the servlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceResponse {
    pub status: StatusCode,
    pub body: String,
}

/// The seam the UI layer talks to. `ServletClient` is the real
/// implementation; tests substitute a recording double.
pub trait ChoiceSender {
    /// Where choices are sent, shown to the operator.
    fn target(&self) -> String;

    /// Send one choice and return the response text. Request diagnostics
    /// go to `out`. The value is not validated here.
    fn send_choice<W: Write>(&self, choice: &str, out: &mut W) -> Result<String, ServletError>;

    /// Release the underlying connection resources.
    fn close(&mut self);
}

/// Session wrapper holding a reusable reqwest blocking client with the
/// identification header preset.
pub struct ServletClient {
    client: Option<Client>,
    config: ClientConfig,
}

impl ServletClient {
    pub fn new(config: ClientConfig) -> Result<Self, ServletError> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| ServletError::Build(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServletError::Build(e.to_string()))?;
        debug!(base_url = %config.base_url, "opened servlet session");
        Ok(ServletClient {
            client: Some(client),
            config,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }

    /// POST `choice=<value>` and return status plus body. Status and headers
    /// are written to `out` before a 4xx/5xx is turned into an error.
    pub fn post_choice<W: Write>(
        &self,
        choice: &str,
        out: &mut W,
    ) -> Result<ChoiceResponse, ServletError> {
        let client = self.client.as_ref().ok_or(ServletError::Closed)?;
        let url = self.config.endpoint();

        writeln!(out, "Sending choice '{}' to {}", choice, url)?;
        let res = client
            .post(&url)
            // sets Content-Type: application/x-www-form-urlencoded
            .form(&ChoiceRequest { choice })
            .send()
            .map_err(|source| ServletError::Communication {
                url: url.clone(),
                source,
            })?;

        let status = res.status();
        writeln!(out, "HTTP Status: {}", status.as_u16())?;
        writeln!(out, "Response Headers: {:?}", res.headers())?;
        debug!(%url, status = status.as_u16(), "servlet answered");

        if status.is_client_error() || status.is_server_error() {
            let body = res.text().unwrap_or_else(|e| {
                warn!(%url, error = %e, "could not read error response body");
                String::new()
            });
            return Err(ServletError::Status { url, status, body });
        }

        let body = res
            .text()
            .map_err(|source| ServletError::Communication {
                url: url.clone(),
                source,
            })?;
        Ok(ChoiceResponse { status, body })
    }
}

impl ChoiceSender for ServletClient {
    fn target(&self) -> String {
        self.config.base_url.clone()
    }

    fn send_choice<W: Write>(&self, choice: &str, out: &mut W) -> Result<String, ServletError> {
        self.post_choice(choice, out).map(|res| res.body)
    }

    fn close(&mut self) {
        match self.client.take() {
            // Dropping the blocking client shuts down its connection pool.
            Some(client) => {
                drop(client);
                info!(base_url = %self.config.base_url, "servlet session closed");
            }
            None => warn!("close called on an already closed servlet session"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_client_refuses_to_send() {
        let mut client = ServletClient::new(ClientConfig::default()).unwrap();
        assert!(!client.is_closed());
        client.close();
        assert!(client.is_closed());
        let mut out: Vec<u8> = Vec::new();
        assert!(matches!(client.send_choice("1", &mut out), Err(ServletError::Closed)));
        assert!(out.is_empty());
        // second close only logs
        client.close();
        assert!(client.is_closed());
    }

    #[test]
    fn invalid_user_agent_is_a_build_error() {
        let config = ClientConfig {
            user_agent: "bad\nagent".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(ServletClient::new(config), Err(ServletError::Build(_))));
    }

    #[test]
    fn status_error_mentions_status_and_url() {
        let err = ServletError::Status {
            url: "http://localhost:8080/servlet-demo/api/choose".into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Error communicating with servlet:"));
        assert!(msg.contains("500 Internal Server Error"));
        assert!(msg.contains("/api/choose"));
    }
}
