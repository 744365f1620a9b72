//! A local fake backend for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use retrochat_backend::{
    ChatBackend, ChatBackendError, ChatResponse, ErrorKind, SessionToken,
    TurnRequest,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ChatBackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Debug)]
pub struct TestResponse {
    chunks: VecDeque<String>,
    session: Option<SessionToken>,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ChatResponse for TestResponse {
    type Error = crate::Error;

    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            let chunk = this.chunks.pop_front();
            return Poll::Ready(Ok(chunk));
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_chunk(cx)
    }

    fn session_token(&self) -> Option<SessionToken> {
        self.session.clone()
    }
}

/// A local fake backend for testing purpose.
///
/// Before sending turns, you need to set up the script, which is how the
/// backend should respond to submitted turns, in order. If the script
/// runs out of turns, an error will be returned.
///
/// Clones share the same script, so a backend handed to the client can
/// still be inspected from the test body.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestBackend {
    script: Arc<Mutex<VecDeque<PresetTurn>>>,
    sent: Arc<Mutex<Vec<TurnRequest>>>,
    delay: Option<Duration>,
}

impl TestBackend {
    /// Appends a scripted turn.
    #[inline]
    pub fn add_turn(&mut self, preset: PresetTurn) {
        self.script.lock().unwrap().push_back(preset);
    }

    /// Sets the delay before each streamed chunk.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the turns submitted to this backend so far.
    #[inline]
    pub fn sent_turns(&self) -> Vec<TurnRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl ChatBackend for TestBackend {
    type Error = crate::Error;
    type Response = TestResponse;

    fn send_turn(
        &self,
        turn: &TurnRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        self.sent.lock().unwrap().push(turn.clone());

        let preset = self.script.lock().unwrap().pop_front();
        let delay = self.delay.unwrap_or(Duration::from_millis(1));
        let result = match preset {
            None => Err(Error {
                message: "script ran out of turns",
                kind: ErrorKind::Other,
            }),
            Some(preset) if preset.fails => Err(Error {
                message: "scripted failure",
                kind: ErrorKind::Transport,
            }),
            Some(preset) => Ok(TestResponse {
                chunks: preset.chunks.into(),
                session: preset.token,
                delay,
                sleep: None,
            }),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use super::*;

    async fn collect_response(resp: TestResponse) -> String {
        let mut resp = pin!(resp);
        let mut reply = String::new();
        loop {
            let Some(chunk) = poll_fn(|cx| resp.as_mut().poll_next_chunk(cx))
                .await
                .unwrap()
            else {
                break;
            };
            reply.push_str(&chunk);
        }
        reply
    }

    #[tokio::test]
    async fn test_send_turn() {
        let mut backend = TestBackend::default();
        backend.add_turn(
            PresetTurn::with_chunks(["Hello, ", "world!"])
                .with_session_token("run-1"),
        );
        backend.add_turn(PresetTurn::with_chunks(["Bye!"]));

        let resp = backend.send_turn(&TurnRequest::new("Hi")).await.unwrap();
        assert_eq!(resp.session_token(), Some(SessionToken::new("run-1")));
        assert_eq!(collect_response(resp).await, "Hello, world!");

        let turn = TurnRequest::continuing("More", SessionToken::new("run-1"));
        let resp = backend.send_turn(&turn).await.unwrap();
        assert_eq!(resp.session_token(), None);
        assert_eq!(collect_response(resp).await, "Bye!");

        let sent = backend.sent_turns();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].session, None);
        assert_eq!(sent[1].session, Some(SessionToken::new("run-1")));
    }

    #[tokio::test]
    async fn test_script_exhausted() {
        let backend = TestBackend::default();
        let result = backend.send_turn(&TurnRequest::new("Hi")).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let mut backend = TestBackend::default();
        backend.add_turn(PresetTurn::failing());
        let result = backend.send_turn(&TurnRequest::new("Hi")).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
