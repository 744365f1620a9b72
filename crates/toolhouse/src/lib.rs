//! A chat backend for Toolhouse-style agent endpoints.
//!
//! The wire contract is small: a `POST` to the agent URL opens a new
//! session, a `PUT` to `<agent URL>/<token>` continues one, both carry
//! a JSON body with the user text, and the reply arrives as a streamed
//! plain-text body rather than a buffered JSON document.

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use mime::Mime;
use reqwest::{Client, Response, header};
use retrochat_backend::{
    ChatBackend, ChatBackendError, ErrorKind, SessionToken, TurnRequest,
};

pub use config::{ToolhouseConfig, ToolhouseConfigBuilder};
use io::TextChunks;
use response::ToolhouseResponse;

/// Error type for [`ToolhouseBackend`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ChatBackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Chat backend that talks to one deployed Toolhouse agent.
#[derive(Clone, Debug)]
pub struct ToolhouseBackend {
    client: Client,
    config: Arc<ToolhouseConfig>,
}

impl ToolhouseBackend {
    /// Creates a new `ToolhouseBackend` with the given configuration.
    #[inline]
    pub fn new(config: ToolhouseConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ChatBackend for ToolhouseBackend {
    type Error = Error;
    type Response = ToolhouseResponse;

    fn send_turn(
        &self,
        turn: &TurnRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let body = proto::create_body(turn);
        // Continuation turns address the session resource directly.
        let builder = match &turn.session {
            Some(token) => self
                .client
                .put(format!("{}/{}", self.config.agent_url(), token)),
            None => self.client.post(self.config.agent_url().to_owned()),
        };
        let resp_fut = builder
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send();

        async move {
            let resp = match resp_fut.await.and_then(Response::error_for_status)
            {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(
                        format!("{err}"),
                        ErrorKind::Transport,
                    ));
                }
            };

            let session = resp
                .headers()
                .get(proto::RUN_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(SessionToken::new);

            // A declared non-text body is a buffered payload, not the
            // streamed reply this backend expects.
            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_streamable = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.type_() == mime::TEXT)
                .unwrap_or(true);
            if !is_streamable {
                return Err(Error::new(
                    format!("unexpected content type: {content_type:?}"),
                    ErrorKind::Protocol,
                ));
            }

            // Here we got a successful response.
            let text = TextChunks::from_response(resp);
            Ok(ToolhouseResponse::new(text, session))
        }
    }
}
