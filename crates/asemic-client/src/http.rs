//! HTTP command client.
//!
//! Every command is one request with a JSON body. A non-2xx status becomes
//! [`CommandError::Http`] with the body verbatim, since the relay puts its
//! plain-text explanation there. Nothing is retried.

use std::time::Duration;

use asemic_app::{Command, CommandError};
use asemic_proto::{Endpoint, KeyRequest, Method, NoiseRequest};
use url::Url;
use uuid::Uuid;

use crate::TransportError;

/// Requests that take longer than this are reported as transport failures.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What a successful command returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResponse {
    /// The relay accepted the command. Its effect arrives on the push channel.
    Accepted,
    /// Downloaded file contents.
    File(Vec<u8>),
}

/// Client for the relay's command endpoints.
#[derive(Debug, Clone)]
pub struct CommandClient {
    base: Url,
    http: reqwest::Client,
}

impl CommandClient {
    /// Create a client for the relay at `base`.
    pub fn new(base: Url) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { base, http })
    }

    /// Relay base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Execute one command.
    pub async fn execute(&self, command: &Command) -> Result<CommandResponse, CommandError> {
        let endpoint = command.endpoint();
        let url = self
            .base
            .join(&endpoint.path())
            .map_err(|e| CommandError::Transport(e.to_string()))?;
        let request = self.http.request(http_method(endpoint.method()), url);

        let request = match command {
            Command::AddKey { key } | Command::RemoveKey { key } => {
                request.json(&KeyRequest { key: key.clone() })
            },
            Command::SetNoiseLevel { level } => request.json(&NoiseRequest { level: *level }),
            Command::SendMessage(body) => request.json(body),
            Command::FetchFile { .. } => request,
        };

        tracing::debug!(command = %command.describe(), path = %endpoint.path(), "sending command");
        let response =
            request.send().await.map_err(|e| CommandError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| {
                CommandError::Transport(format!("reading {status} response body: {e}"))
            })?;
            tracing::warn!(status = status.as_u16(), %body, "relay rejected command");
            return Err(CommandError::Http { status: status.as_u16(), body });
        }

        match command {
            Command::FetchFile { .. } => {
                let bytes =
                    response.bytes().await.map_err(|e| CommandError::Transport(e.to_string()))?;
                Ok(CommandResponse::File(bytes.to_vec()))
            },
            _ => Ok(CommandResponse::Accepted),
        }
    }

    /// Download a received attachment.
    pub async fn fetch_file(&self, id: Uuid) -> Result<Vec<u8>, CommandError> {
        let command = Command::FetchFile { id, filename: String::new() };
        match self.execute(&command).await? {
            CommandResponse::File(bytes) => Ok(bytes),
            CommandResponse::Accepted => Ok(Vec::new()),
        }
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths_join_onto_base() {
        let base = Url::parse("http://127.0.0.1:8080/").unwrap();
        let id = Uuid::nil();
        assert_eq!(
            base.join(&Endpoint::Download(id).path()).unwrap().as_str(),
            "http://127.0.0.1:8080/download/00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(http_method(Endpoint::RemoveKey.method()), reqwest::Method::DELETE);
    }
}
