use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// An opaque identifier that correlates turns into the same remote
/// conversation context.
///
/// The token is granted by the backend after the first successful
/// exchange. Its contents are meaningful to the backend only; callers
/// should carry it around verbatim and never inspect it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a token from its raw representation.
    #[inline]
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self(raw.into())
    }

    /// Returns the raw representation of this token.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SessionToken {
    #[inline]
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
