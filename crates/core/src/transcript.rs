//! Transcript-related types.

use chrono::{DateTime, Utc};

/// Identifier of one transcript message.
///
/// Ids are unique within one client and grow monotonically, so a later
/// message always compares greater than an earlier one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub(crate) u64);

/// How a message should be rendered.
///
/// The kind governs presentation only; it has no behavioral effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Text submitted by the user.
    User,
    /// A status line, like the join notice.
    System,
    /// A reply from the remote agent.
    Assistant,
}

/// One entry in the visible transcript.
#[derive(Clone, Debug)]
pub struct Message {
    pub(crate) id: MessageId,
    pub(crate) author: String,
    pub(crate) body: String,
    pub(crate) kind: MessageKind,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) streaming: bool,
}

impl Message {
    /// Returns the identifier of this message.
    #[inline]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the display name of the message author.
    #[inline]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the text content of this message.
    ///
    /// For a streaming message this is the partial reply received so
    /// far.
    #[inline]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the kind of this message.
    #[inline]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns when this message was created. Used for display
    /// formatting only.
    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether this message is still being filled from an
    /// in-progress response.
    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }
}

/// The visible transcript of one chat session.
///
/// Append-only: entries are never removed or reordered. The only
/// in-place mutation is filling the body of the single streaming entry
/// and settling it.
#[derive(Clone, Default, Debug)]
pub struct Transcript {
    messages: Vec<Message>,
    last_id: u64,
}

impl Transcript {
    pub(crate) fn push(
        &mut self,
        author: impl Into<String>,
        body: impl Into<String>,
        kind: MessageKind,
        streaming: bool,
    ) -> MessageId {
        debug_assert!(
            !streaming || self.messages.iter().all(|m| !m.streaming),
            "transcript already has a streaming message"
        );
        self.last_id += 1;
        let id = MessageId(self.last_id);
        self.messages.push(Message {
            id,
            author: author.into(),
            body: body.into(),
            kind,
            created_at: Utc::now(),
            streaming,
        });
        id
    }

    pub(crate) fn append_body(&mut self, id: MessageId, chunk: &str) {
        if let Some(msg) = self.entry_mut(id) {
            msg.body.push_str(chunk);
        }
    }

    pub(crate) fn settle(&mut self, id: MessageId) {
        if let Some(msg) = self.entry_mut(id) {
            msg.streaming = false;
        }
    }

    pub(crate) fn fail(&mut self, id: MessageId, notice: &str) {
        if let Some(msg) = self.entry_mut(id) {
            msg.body.clear();
            msg.body.push_str(notice);
            msg.streaming = false;
        }
    }

    fn entry_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Returns the messages in insertion order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
