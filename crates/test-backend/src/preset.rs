use retrochat_backend::SessionToken;
use serde::{Deserialize, Serialize};

/// The preset reply for one scripted turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetTurn {
    /// Text chunks streamed back, in order.
    pub chunks: Vec<String>,
    /// The session token granted with the response head, if any.
    pub token: Option<SessionToken>,
    /// If set, the turn fails outright instead of streaming.
    pub fails: bool,
}

impl PresetTurn {
    /// Creates a turn that streams the specified chunks.
    #[inline]
    pub fn with_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            token: None,
            fails: false,
        }
    }

    /// Creates a turn that fails outright.
    #[inline]
    pub fn failing() -> Self {
        Self {
            chunks: vec![],
            token: None,
            fails: true,
        }
    }

    /// Grants a session token with this turn's response.
    #[inline]
    pub fn with_session_token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = Some(SessionToken::new(token));
        self
    }
}
