use retrochat_backend::ChatBackend;

use super::ChatClient;
use crate::exchange::BackendClient;

pub(crate) type ChunkCallback = Box<dyn Fn(&str) + Send + Sync>;
pub(crate) type TurnEndedCallback = Box<dyn Fn() + Send + Sync>;

/// [`ChatClient`] builder.
pub struct ChatClientBuilder {
    pub(crate) backend: BackendClient,
    pub(crate) bot_name: String,
    pub(crate) user_name: String,
    pub(crate) on_chunk: Option<ChunkCallback>,
    pub(crate) on_turn_ended: Option<TurnEndedCallback>,
}

impl ChatClientBuilder {
    /// Creates a new builder with the specified backend.
    #[inline]
    pub fn with_backend<B: ChatBackend + 'static>(backend: B) -> Self {
        Self {
            backend: BackendClient::new(backend),
            bot_name: "PeteBot".to_owned(),
            user_name: "Trainer".to_owned(),
            on_chunk: None,
            on_turn_ended: None,
        }
    }

    /// Sets the display name used for system and assistant messages.
    #[inline]
    pub fn with_bot_name<S: Into<String>>(mut self, name: S) -> Self {
        self.bot_name = name.into();
        self
    }

    /// Sets the display name used for user messages.
    #[inline]
    pub fn with_user_name<S: Into<String>>(mut self, name: S) -> Self {
        self.user_name = name.into();
        self
    }

    /// Attaches a callback to be invoked after each chunk has been
    /// applied to the streaming message.
    ///
    /// This is a view concern (keep the newest entry visible); the
    /// transcript is already consistent when the callback runs.
    #[inline]
    pub fn on_chunk(
        mut self,
        on_chunk: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_chunk = Some(Box::new(on_chunk));
        self
    }

    /// Attaches a callback to be invoked when the streaming message
    /// settles, whether the exchange succeeded or failed.
    ///
    /// Superseded exchanges are abandoned silently and do not invoke
    /// the callback.
    #[inline]
    pub fn on_turn_ended(
        mut self,
        on_turn_ended: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_turn_ended = Some(Box::new(on_turn_ended));
        self
    }

    /// Builds the client.
    ///
    /// The transcript starts out seeded with the system join notice.
    #[inline]
    pub fn build(self) -> ChatClient {
        ChatClient::spawn_from_builder(self)
    }
}
