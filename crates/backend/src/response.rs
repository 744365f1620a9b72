use std::pin::Pin;
use std::task::{self, Poll};

use crate::SessionToken;
use crate::backend::ChatBackendError;

/// A response from the chat backend.
pub trait ChatResponse: Sized + Send + 'static {
    /// The error type that may be returned by the backend.
    type Error: ChatBackendError;

    /// Attempts to pull out the next text chunk from the response.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct response state:
    ///
    /// - `Poll::Pending` means that this response is still waiting for
    ///   the next chunk. Implementations will ensure that the current
    ///   task will be notified when the next chunk may be ready.
    /// - `Poll::Ready(Ok(Some(chunk)))` means the response has a chunk
    ///   to deliver, and may produce further chunks on subsequent
    ///   `poll_next_chunk` calls.
    /// - `Poll::Ready(Ok(None))` means the response has completed.
    /// - `Poll::Ready(Err(error))` means an error occurred while
    ///   processing the response.
    ///
    /// Chunks are delivered strictly in arrival order. Calling this
    /// method after completion should always return `None`.
    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>>;

    /// Returns the session token granted by this response, if any.
    ///
    /// Backends that support session continuation surface the token
    /// they received with the response head here. The token is
    /// available before the body has been consumed, and implementations
    /// should always return the same token for one response.
    fn session_token(&self) -> Option<SessionToken> {
        None
    }
}
