use crate::SessionToken;

/// One user turn to be sent to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TurnRequest {
    /// The user input text. Should be non-empty and trimmed; the
    /// backend receives it verbatim.
    pub text: String,
    /// The token of the session to continue, if one has been granted.
    ///
    /// When absent, the backend starts a fresh session and may grant a
    /// token via [`crate::ChatResponse::session_token`].
    pub session: Option<SessionToken>,
}

impl TurnRequest {
    /// Creates a session-initiating turn.
    #[inline]
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            session: None,
        }
    }

    /// Creates a turn that continues the session identified by `token`.
    #[inline]
    pub fn continuing<S: Into<String>>(text: S, token: SessionToken) -> Self {
        Self {
            text: text.into(),
            session: Some(token),
        }
    }
}
