use retrochat_backend::{ChatBackendError, SessionToken, TurnRequest};
use tokio::select;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::ClientSnapshot;
use super::builder::{ChatClientBuilder, ChunkCallback, TurnEndedCallback};
use crate::exchange::{BackendClient, ExchangeEvent};
use crate::transcript::{MessageId, MessageKind, Transcript};

/// Notice shown in place of a reply when an exchange fails.
pub(crate) const TURN_FAILED_NOTICE: &str =
    "Error: Failed to get response. Please try again.";

const JOIN_NOTICE: &str = "has joined the chatroom";

/// Everything that can happen to one open conversation.
///
/// Events are applied on the client task in arrival order, one at a
/// time, so handlers never race.
#[derive(Debug)]
pub(crate) enum ClientEvent {
    /// The user submitted input.
    Submit(String),
    /// A response head granted a session token.
    SessionGranted(SessionToken),
    /// A chunk of the streamed reply arrived.
    ChunkArrived {
        generation: u64,
        text: String,
    },
    /// The exchange resolved, successfully or not.
    TurnFinished {
        generation: u64,
        result: Result<(), Box<dyn ChatBackendError>>,
    },
    /// A caller wants to observe the transcript and session state.
    Snapshot(oneshot::Sender<ClientSnapshot>),
}

pub(crate) struct ClientState {
    backend: BackendClient,
    transcript: Transcript,
    session: Option<SessionToken>,
    bot_name: String,
    user_name: String,
    // Identifies the live exchange. Events stamped with an older
    // generation belong to a superseded exchange and must not touch
    // the transcript.
    generation: u64,
    streaming: Option<StreamingSlot>,
    in_flight: Option<JoinHandle<()>>,
    on_chunk: Option<ChunkCallback>,
    on_turn_ended: Option<TurnEndedCallback>,
}

struct StreamingSlot {
    message_id: MessageId,
    generation: u64,
}

pub(crate) async fn run_client(
    mut state: ClientState,
    events: mpsc::WeakUnboundedSender<ClientEvent>,
    mut event_rx: mpsc::UnboundedReceiver<ClientEvent>,
    mut stop_rx: watch::Receiver<bool>,
) {
    debug!("started");
    loop {
        let event = select! {
            biased;

            _ = stop_rx.changed() => {
                break;
            }
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                event
            }
        };
        trace!("received event: {event:?}");
        state.apply(event, &events);
    }
    debug!("will terminate");
}

impl ClientState {
    pub fn from_builder(builder: ChatClientBuilder) -> Self {
        let ChatClientBuilder {
            backend,
            bot_name,
            user_name,
            on_chunk,
            on_turn_ended,
        } = builder;

        let mut transcript = Transcript::default();
        transcript.push(
            bot_name.clone(),
            JOIN_NOTICE,
            MessageKind::System,
            false,
        );

        Self {
            backend,
            transcript,
            session: None,
            bot_name,
            user_name,
            generation: 0,
            streaming: None,
            in_flight: None,
            on_chunk,
            on_turn_ended,
        }
    }

    fn apply(
        &mut self,
        event: ClientEvent,
        events: &mpsc::WeakUnboundedSender<ClientEvent>,
    ) {
        match event {
            ClientEvent::Submit(input) => self.submit(input, events),
            ClientEvent::SessionGranted(token) => self.grant_session(token),
            ClientEvent::ChunkArrived { generation, text } => {
                self.apply_chunk(generation, &text);
            }
            ClientEvent::TurnFinished { generation, result } => {
                self.finish_turn(generation, result);
            }
            ClientEvent::Snapshot(reply_tx) => {
                reply_tx.send(self.snapshot()).ok();
            }
        }
    }

    fn submit(
        &mut self,
        input: String,
        events: &mpsc::WeakUnboundedSender<ClientEvent>,
    ) {
        let text = input.trim();
        if text.is_empty() {
            return;
        }
        // The exchange task reports back through the client's own
        // queue; without a live sender the turn could never settle.
        let Some(events) = events.upgrade() else {
            return;
        };

        self.supersede();

        self.generation += 1;
        let generation = self.generation;

        self.transcript.push(
            self.user_name.clone(),
            text,
            MessageKind::User,
            false,
        );
        let message_id = self.transcript.push(
            self.bot_name.clone(),
            "",
            MessageKind::Assistant,
            true,
        );
        self.streaming = Some(StreamingSlot {
            message_id,
            generation,
        });

        let turn = TurnRequest {
            text: text.to_owned(),
            session: self.session.clone(),
        };
        let backend = self.backend.clone();
        let task = tokio::spawn(async move {
            let on_event = {
                let events = events.clone();
                move |event| match event {
                    ExchangeEvent::SessionGranted(token) => {
                        events.send(ClientEvent::SessionGranted(token)).ok();
                    }
                    ExchangeEvent::Chunk(text) => {
                        events
                            .send(ClientEvent::ChunkArrived { generation, text })
                            .ok();
                    }
                }
            };
            let result = backend.send_turn(turn, on_event).await;
            let result = match result {
                Ok(outcome) => {
                    debug!(
                        "turn #{generation} completed ({} bytes)",
                        outcome.text.len()
                    );
                    Ok(())
                }
                Err(err) => Err(err),
            };
            events
                .send(ClientEvent::TurnFinished { generation, result })
                .ok();
        });
        self.in_flight = Some(task);
    }

    /// Abandons the in-flight exchange, if any.
    ///
    /// The transport is cancelled and the abandoned placeholder settles
    /// as-is, so the transcript never holds two streaming entries. No
    /// error notice is produced.
    fn supersede(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        if let Some(slot) = self.streaming.take() {
            debug!("superseding exchange #{}", slot.generation);
            self.transcript.settle(slot.message_id);
        }
    }

    fn apply_chunk(&mut self, generation: u64, text: &str) {
        let Some(slot) = &self.streaming else {
            return;
        };
        if slot.generation != generation {
            // A late chunk from an abandoned exchange, drop it.
            return;
        }
        self.transcript.append_body(slot.message_id, text);
        if let Some(on_chunk) = &self.on_chunk {
            on_chunk(text);
        }
    }

    fn finish_turn(
        &mut self,
        generation: u64,
        result: Result<(), Box<dyn ChatBackendError>>,
    ) {
        let Some(slot) = self
            .streaming
            .take_if(|slot| slot.generation == generation)
        else {
            // The exchange was superseded; nothing left to settle.
            return;
        };
        self.in_flight = None;

        match result {
            Ok(()) => self.transcript.settle(slot.message_id),
            Err(err) => {
                error!("exchange failed: {err}");
                self.transcript.fail(slot.message_id, TURN_FAILED_NOTICE);
            }
        }
        if let Some(on_turn_ended) = &self.on_turn_ended {
            on_turn_ended();
        }
    }

    fn grant_session(&mut self, token: SessionToken) {
        // Only the very first grant is kept; a later header never
        // overwrites an established session.
        if self.session.is_none() {
            debug!("session granted: {token}");
            self.session = Some(token);
        }
    }

    fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            messages: self.transcript.messages().to_vec(),
            session: self.session.clone(),
        }
    }
}
