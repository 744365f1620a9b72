mod builder;
mod state;

use retrochat_backend::SessionToken;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::Instrument;

use crate::transcript::Message;
pub use builder::ChatClientBuilder;
use state::{ClientEvent, ClientState, run_client};

/// A streaming conversation client tied to one open chat overlay.
///
/// The client exclusively owns the transcript and the session token of
/// one conversation. Everything that happens to the conversation —
/// submissions, granted tokens, arriving chunks, settlements — is a
/// [`ClientEvent`] applied on the client's own task, one at a time, so
/// turn submission, chunk application and settlement never race.
/// Dropping the client (or shutting it down) discards all conversation
/// state; a reopened overlay starts over with a fresh client and a
/// fresh session.
pub struct ChatClient {
    event_tx: mpsc::UnboundedSender<ClientEvent>,
    stop_tx: watch::Sender<bool>,
}

/// A point-in-time copy of the client's observable state.
#[derive(Clone, Debug)]
pub struct ClientSnapshot {
    /// The transcript messages, in insertion order.
    pub messages: Vec<Message>,
    /// The session token currently held, if any.
    pub session: Option<SessionToken>,
}

impl ChatClient {
    /// Submits a user turn.
    ///
    /// Whitespace-only input is silently ignored. If an exchange is
    /// still in flight, it is superseded: its transport is cancelled
    /// and its placeholder message settles with whatever partial reply
    /// it holds.
    pub fn submit<S: Into<String>>(&self, text: S) {
        self.event_tx
            .send(ClientEvent::Submit(text.into()))
            .expect("client task has been dropped too early");
    }

    /// Returns a snapshot of the transcript and session state.
    pub async fn snapshot(&self) -> ClientSnapshot {
        let (tx, rx) = oneshot::channel();
        self.event_tx
            .send(ClientEvent::Snapshot(tx))
            .expect("client task has been dropped too early");
        rx.await.expect("client task has been dropped too early")
    }

    /// Shuts the client down. All conversation state is discarded.
    ///
    /// The client task is not guaranteed to stop immediately, but it
    /// will not apply further events and quits soon.
    pub fn shutdown(&self) {
        self.stop_tx.send(true).ok();
    }
}

impl ChatClient {
    fn spawn_from_builder(builder: ChatClientBuilder) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let state = ClientState::from_builder(builder);
        // The task only keeps a weak sender, so a dropped client ends
        // the loop once the last in-flight exchange lets go.
        tokio::spawn(
            run_client(state, event_tx.downgrade(), event_rx, stop_rx)
                .instrument(trace_span!("chat client")),
        );
        Self { event_tx, stop_tx }
    }
}
