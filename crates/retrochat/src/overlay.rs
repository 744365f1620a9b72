use retrochat_backend::ChatBackend;
use retrochat_core::{ChatClient, ChatClientBuilder, ClientSnapshot};

/// An overlay builder.
///
/// See [`Overlay`].
pub struct OverlayBuilder {
    client_builder: ChatClientBuilder,
}

impl OverlayBuilder {
    /// Creates an overlay builder with a specified backend.
    pub fn with_backend<B: ChatBackend + 'static>(backend: B) -> Self {
        let client_builder = ChatClientBuilder::with_backend(backend);
        Self { client_builder }
    }

    /// Sets the display name used for system and assistant messages.
    #[inline]
    pub fn with_bot_name<S: Into<String>>(mut self, name: S) -> Self {
        self.client_builder = self.client_builder.with_bot_name(name);
        self
    }

    /// Sets the display name used for user messages.
    #[inline]
    pub fn with_user_name<S: Into<String>>(mut self, name: S) -> Self {
        self.client_builder = self.client_builder.with_user_name(name);
        self
    }

    /// Attaches a callback to be invoked after each applied chunk.
    #[inline]
    pub fn on_chunk(
        mut self,
        on_chunk: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.client_builder = self.client_builder.on_chunk(on_chunk);
        self
    }

    /// Attaches a callback to be invoked when a turn ends.
    #[inline]
    pub fn on_turn_ended(
        mut self,
        on_turn_ended: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.client_builder = self.client_builder.on_turn_ended(on_turn_ended);
        self
    }

    /// Opens the overlay.
    ///
    /// Opening creates a fresh transcript seeded with the join notice
    /// and holds no session token; nothing carries over from an
    /// earlier overlay.
    pub fn open(self) -> Overlay {
        Overlay {
            client: self.client_builder.build(),
        }
    }
}

/// A chat overlay, like a floating window with a transcript and an
/// input box.
///
/// The overlay holds a fully configured conversation client that you
/// can use directly, and it is basically a wrapper around
/// [`ChatClient`] that models the open/close lifecycle.
pub struct Overlay {
    client: ChatClient,
}

impl Overlay {
    /// Sends a message to the conversation.
    #[inline]
    pub fn send_message(&self, message: &str) {
        self.client.submit(message);
    }

    /// Returns a snapshot of the transcript and session state.
    #[inline]
    pub async fn snapshot(&self) -> ClientSnapshot {
        self.client.snapshot().await
    }

    /// Closes the overlay, discarding the transcript and the session.
    pub fn close(self) {
        self.client.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use retrochat_backend::SessionToken;
    use retrochat_test_backend::{PresetTurn, TestBackend};
    use tokio::sync::watch;
    use tokio::time::timeout;

    use super::*;

    async fn wait_for_turn(rx: &mut watch::Receiver<bool>) {
        timeout(Duration::from_secs(1), rx.wait_for(|v| *v))
            .await
            .expect("timed out waiting for the turn to end")
            .unwrap();
    }

    fn open_overlay(backend: TestBackend) -> (Overlay, watch::Receiver<bool>) {
        let (ended_tx, ended_rx) = watch::channel(false);
        let overlay = OverlayBuilder::with_backend(backend)
            .on_turn_ended(move || {
                ended_tx.send(true).ok();
            })
            .open();
        (overlay, ended_rx)
    }

    #[tokio::test]
    async fn test_open_seeds_join_notice() {
        let (overlay, _ended_rx) = open_overlay(TestBackend::default());
        let snapshot = overlay.snapshot().await;
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].body(), "has joined the chatroom");
        assert_eq!(snapshot.session, None);
    }

    #[tokio::test]
    async fn test_reopening_starts_a_fresh_session() {
        let mut backend = TestBackend::default();
        backend.add_turn(
            PresetTurn::with_chunks(["hi"]).with_session_token("run-1"),
        );
        let (overlay, mut ended_rx) = open_overlay(backend);
        overlay.send_message("hello");
        wait_for_turn(&mut ended_rx).await;
        assert_eq!(
            overlay.snapshot().await.session,
            Some(SessionToken::new("run-1"))
        );
        overlay.close();

        // A new overlay negotiates its own session and starts with a
        // fresh transcript.
        let mut backend = TestBackend::default();
        backend.add_turn(
            PresetTurn::with_chunks(["hi again"]).with_session_token("run-2"),
        );
        let (overlay, mut ended_rx) = open_overlay(backend);
        let snapshot = overlay.snapshot().await;
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.session, None);

        overlay.send_message("hello again");
        wait_for_turn(&mut ended_rx).await;
        assert_eq!(
            overlay.snapshot().await.session,
            Some(SessionToken::new("run-2"))
        );
    }
}
