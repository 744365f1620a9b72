use std::error::Error;

use crate::error::ErrorKind;
use crate::response::ChatResponse;
use crate::turn::TurnRequest;

/// The error type for a chat backend.
pub trait ChatBackendError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a remote conversational endpoint, which is an
/// entry for submitting turns and consuming streamed replies.
///
/// Once the backend is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the backend should be prepared for being dropped anytime. All the
/// conversation context lives on the remote side, keyed by the session
/// token carried in each turn.
pub trait ChatBackend: Send + Sync {
    /// The error type that may be returned by the backend.
    type Error: ChatBackendError;

    /// The response type for this backend.
    type Response: ChatResponse<Error = Self::Error>;

    /// Submits a turn to the backend.
    fn send_turn(
        &self,
        turn: &TurnRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static;
}
