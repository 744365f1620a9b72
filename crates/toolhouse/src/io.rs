#[cfg(test)]
use std::collections::VecDeque;

use bytes::Bytes;
use reqwest::Response;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Transport,
    InvalidUtf8,
}

/// Incremental UTF-8 decoder over a streamed reply body.
///
/// The transport can split a multi-byte code point anywhere, so the
/// undecodable suffix of each chunk is carried over and prepended to
/// the next one. Bytes that can never form valid UTF-8 fail the whole
/// stream. The canned variant lets tests play back a reply without a
/// live connection.
pub struct TextChunks {
    source: Source,
    carry: Vec<u8>,
}

enum Source {
    Response(Response),
    #[cfg(test)]
    Canned(VecDeque<Bytes>),
}

impl TextChunks {
    pub fn from_response(response: Response) -> Self {
        Self {
            source: Source::Response(response),
            carry: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn from_canned<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Bytes>,
    {
        Self {
            source: Source::Canned(
                chunks.into_iter().map(Into::into).collect(),
            ),
            carry: Vec::new(),
        }
    }

    pub async fn next_text(&mut self) -> Result<Option<String>, Error> {
        loop {
            let Some(bytes) = self.next_bytes().await? else {
                if !self.carry.is_empty() {
                    // The stream ended in the middle of a code point.
                    return Err(Error::InvalidUtf8);
                }
                return Ok(None);
            };
            self.carry.extend_from_slice(&bytes);

            let decodable = match str::from_utf8(&self.carry) {
                Ok(_) => self.carry.len(),
                Err(err) => {
                    if err.error_len().is_some() {
                        return Err(Error::InvalidUtf8);
                    }
                    err.valid_up_to()
                }
            };
            // The buffer may hold only the head of a code point; read
            // more before emitting anything.
            if decodable == 0 {
                continue;
            }

            let rest = self.carry.split_off(decodable);
            let decoded = std::mem::replace(&mut self.carry, rest);
            let text =
                String::from_utf8(decoded).map_err(|_| Error::InvalidUtf8)?;
            return Ok(Some(text));
        }
    }

    async fn next_bytes(&mut self) -> Result<Option<Bytes>, Error> {
        match &mut self.source {
            Source::Response(response) => {
                response.chunk().await.map_err(|_| Error::Transport)
            }
            #[cfg(test)]
            Source::Canned(chunks) => Ok(chunks.pop_front()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_chunks() {
        let mut text = TextChunks::from_canned(["Hel", "", "lo"]);
        assert_eq!(text.next_text().await.unwrap().unwrap(), "Hel");
        assert_eq!(text.next_text().await.unwrap().unwrap(), "lo");
        assert_eq!(text.next_text().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_split_code_point() {
        // "é" is C3 A9; the break lands between its two bytes.
        let mut text = TextChunks::from_canned([
            b"caf\xC3".as_slice(),
            b"\xA9 au lait".as_slice(),
        ]);
        assert_eq!(text.next_text().await.unwrap().unwrap(), "caf");
        assert_eq!(text.next_text().await.unwrap().unwrap(), "\u{e9} au lait");
        assert_eq!(text.next_text().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_code_point_head_alone() {
        // A chunk holding nothing but the head of a code point emits
        // nothing until the tail arrives.
        let mut text = TextChunks::from_canned([
            b"\xE2\x9C".as_slice(),
            b"\x94 done".as_slice(),
        ]);
        assert_eq!(text.next_text().await.unwrap().unwrap(), "\u{2714} done");
        assert_eq!(text.next_text().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_bytes() {
        let mut text = TextChunks::from_canned([b"\xFFoops".as_slice()]);
        assert_eq!(text.next_text().await.unwrap_err(), Error::InvalidUtf8);
    }

    #[tokio::test]
    async fn test_truncated_stream() {
        let mut text = TextChunks::from_canned([b"ok \xC3".as_slice()]);
        assert_eq!(text.next_text().await.unwrap().unwrap(), "ok ");
        assert_eq!(text.next_text().await.unwrap_err(), Error::InvalidUtf8);
    }
}
