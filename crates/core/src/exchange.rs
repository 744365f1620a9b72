use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;

use retrochat_backend::{
    ChatBackend, ChatBackendError, ChatResponse, SessionToken, TurnRequest,
};
use tracing::Instrument;

/// A progress report from an in-flight exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeEvent {
    /// The response head granted a session token.
    SessionGranted(SessionToken),
    /// A text chunk arrived.
    Chunk(String),
}

type SendTurnResult = Result<TurnOutcome, Box<dyn ChatBackendError>>;
type BoxedSendTurnFuture =
    Pin<Box<dyn Future<Output = SendTurnResult> + Send>>;
#[rustfmt::skip]
type HandlerFn = Arc<
    dyn Fn(TurnRequest, Box<dyn Fn(ExchangeEvent) + Send + 'static>)
        -> BoxedSendTurnFuture + Send + Sync
>;

/// A wrapper around a chat backend that maintains an execution
/// environment for the backend and provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct BackendClient {
    handler_fn: HandlerFn,
}

impl BackendClient {
    #[inline]
    pub fn new<B: ChatBackend + 'static>(backend: B) -> Self {
        // We have to erase the type `B`, since `BackendClient` doesn't
        // have a generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |turn, on_event| {
            let fut = backend.send_turn(&turn);
            Box::pin(
                async move {
                    trace!("sending a turn: {:?}", turn);
                    let resp_or_err = fut.await;
                    drive_response::<B>(resp_or_err, on_event).await
                }
                .instrument(trace_span!("backend client turn")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a turn and drives its response to completion.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. The response stops streaming further
    /// chunks when this operation is cancelled.
    #[inline]
    pub async fn send_turn(
        &self,
        turn: TurnRequest,
        on_event: impl Fn(ExchangeEvent) + Send + 'static,
    ) -> Result<TurnOutcome, Box<dyn ChatBackendError>> {
        (self.handler_fn)(turn, Box::new(on_event)).await
    }
}

/// A completely received reply from the backend client.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    /// The accumulated reply text.
    pub text: String,
}

async fn drive_response<B: ChatBackend + 'static>(
    resp_or_err: Result<B::Response, B::Error>,
    on_event: Box<dyn Fn(ExchangeEvent) + Send + 'static>,
) -> SendTurnResult {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            error!("got an error: {err:?}");
            return Err(Box::new(err));
        }
    };

    if let Some(token) = resp.session_token() {
        on_event(ExchangeEvent::SessionGranted(token));
    }

    let mut text = String::new();

    trace!("start receiving chunks");

    let mut pinned_resp = pin!(resp);
    loop {
        let chunk_or_err =
            poll_fn(|cx| pinned_resp.as_mut().poll_next_chunk(cx)).await;
        let chunk = match chunk_or_err {
            Ok(chunk) => chunk,
            Err(err) => {
                error!("got an error: {err:?}");
                return Err(Box::new(err));
            }
        };

        let Some(chunk) = chunk else {
            break;
        };
        trace!("got a chunk: {chunk:?}");

        text.push_str(&chunk);
        on_event(ExchangeEvent::Chunk(chunk));
    }

    trace!("finished a turn");

    Ok(TurnOutcome { text })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use retrochat_test_backend::{PresetTurn, TestBackend};

    use super::*;

    #[tokio::test]
    async fn test_send_turn() {
        let mut backend = TestBackend::default();
        backend.add_turn(
            PresetTurn::with_chunks(["How ", "are ", "you?"])
                .with_session_token("run-9"),
        );

        let client = BackendClient::new(backend);

        let events = Arc::new(Mutex::new(Vec::new()));
        let outcome = client
            .send_turn(TurnRequest::new("Hi"), {
                let events = Arc::clone(&events);
                move |event| {
                    events.lock().unwrap().push(event);
                }
            })
            .await
            .unwrap();

        assert_eq!(outcome.text, "How are you?");
        assert_eq!(
            *events.lock().unwrap(),
            [
                ExchangeEvent::SessionGranted(SessionToken::new("run-9")),
                ExchangeEvent::Chunk("How ".to_owned()),
                ExchangeEvent::Chunk("are ".to_owned()),
                ExchangeEvent::Chunk("you?".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_handling() {
        let backend = TestBackend::default();
        let client = BackendClient::new(backend);
        let outcome_or_err = client
            .send_turn(TurnRequest::new("Hi"), |_| {})
            .await;
        assert!(matches!(outcome_or_err, Err(_)));
    }
}
