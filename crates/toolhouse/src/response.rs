use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use retrochat_backend::{ChatResponse, ErrorKind, SessionToken};

use crate::Error;
use crate::io::{Error as TextError, TextChunks};

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextChunk = Result<(Option<String>, TextChunks), TextError>;

pin_project! {
    pub struct ToolhouseResponse {
        next_chunk_fut: Option<PinnedFuture<NextChunk>>,
        session: Option<SessionToken>,
    }
}

impl ToolhouseResponse {
    #[inline]
    pub(crate) fn new(
        text: TextChunks,
        session: Option<SessionToken>,
    ) -> Self {
        let next_chunk_fut = async move { next_chunk(text).await };
        Self {
            next_chunk_fut: Some(Box::pin(next_chunk_fut)),
            session,
        }
    }
}

impl ChatResponse for ToolhouseResponse {
    type Error = crate::Error;

    fn poll_next_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>> {
        let this = self.project();
        let Some(next_chunk_fut) = this.next_chunk_fut else {
            // The stream has been exhausted.
            return Poll::Ready(Ok(None));
        };
        let (chunk, text) = match ready!(next_chunk_fut.as_mut().poll(cx)) {
            Ok((Some(chunk), text)) => (chunk, text),
            Ok((None, _)) => {
                *this.next_chunk_fut = None;
                return Poll::Ready(Ok(None));
            }
            Err(err) => {
                *this.next_chunk_fut = None;
                let kind = match err {
                    TextError::Transport => ErrorKind::Transport,
                    TextError::InvalidUtf8 => ErrorKind::Protocol,
                };
                return Poll::Ready(Err(Error::new(format!("{err:?}"), kind)));
            }
        };

        // The stream may still have more data to pull, create a new
        // future for the next chunk.
        let next_chunk_fut = async move { next_chunk(text).await };
        *this.next_chunk_fut = Some(Box::pin(next_chunk_fut));

        Poll::Ready(Ok(Some(chunk)))
    }

    fn session_token(&self) -> Option<SessionToken> {
        self.session.clone()
    }
}

async fn next_chunk(mut text: TextChunks) -> NextChunk {
    let chunk = text.next_text().await?;
    if let Some(chunk) = &chunk {
        trace!("got text chunk ({} bytes)", chunk.len());
    }
    Ok((chunk, text))
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use retrochat_backend::ChatBackendError;

    use super::*;

    #[tokio::test]
    async fn test_streamed_chunks() {
        let mut resp = pin!(ToolhouseResponse::new(
            TextChunks::from_canned(["Hel", "lo!"]),
            Some(SessionToken::new("run-42")),
        ));
        assert_eq!(
            resp.session_token(),
            Some(SessionToken::new("run-42"))
        );

        let mut collected = Vec::new();
        loop {
            let Some(chunk) = poll_fn(|cx| resp.as_mut().poll_next_chunk(cx))
                .await
                .unwrap()
            else {
                break;
            };
            collected.push(chunk);
        }
        assert_eq!(collected, ["Hel", "lo!"]);

        // Polling after completion stays settled.
        let after_end = poll_fn(|cx| resp.as_mut().poll_next_chunk(cx))
            .await
            .unwrap();
        assert_eq!(after_end, None);
    }

    #[tokio::test]
    async fn test_invalid_payload() {
        let mut resp = pin!(ToolhouseResponse::new(
            TextChunks::from_canned([b"\xFF".as_slice()]),
            None,
        ));
        let err = poll_fn(|cx| resp.as_mut().poll_next_chunk(cx))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}
