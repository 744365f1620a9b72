//! The contact submission widget.
//!
//! One fire-and-forget `POST` carrying the name and message folded
//! into a templated string. There is no retry; a failed submission is
//! reported once and the caller decides whether to resubmit.

use std::error::Error as StdError;
use std::fmt::{self, Display};

use reqwest::{Client, StatusCode, header};

/// Error type for [`ContactForm`].
#[derive(Debug)]
pub enum ContactError {
    /// The name or the message was empty after trimming.
    EmptyField,
    /// The endpoint rejected the submission.
    Rejected {
        /// The response status.
        status: StatusCode,
        /// The response body text, if any.
        detail: String,
    },
    /// The request failed at the transport level.
    Transport(reqwest::Error),
}

impl Display for ContactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactError::EmptyField => {
                "name and message must not be empty".fmt(f)
            }
            ContactError::Rejected { status, detail } => {
                write!(f, "Error: {status} - {detail}")
            }
            ContactError::Transport(_) => {
                "Failed to send message. Please try again.".fmt(f)
            }
        }
    }
}

impl StdError for ContactError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ContactError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// The contact form of the site, submitting to its own agent endpoint.
pub struct ContactForm {
    client: Client,
    endpoint: String,
}

impl ContactForm {
    /// Creates a form that submits to the specified endpoint.
    #[inline]
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Submits the form once.
    pub async fn send(
        &self,
        name: &str,
        message: &str,
    ) -> Result<(), ContactError> {
        let name = name.trim();
        let message = message.trim();
        if name.is_empty() || message.is_empty() {
            return Err(ContactError::EmptyField);
        }

        let body = serde_json::json!({
            "message": format_submission(name, message),
        });
        let resp = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(ContactError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            error!("contact submission rejected: {status} {detail}");
            return Err(ContactError::Rejected { status, detail });
        }
        Ok(())
    }
}

fn format_submission(name: &str, message: &str) -> String {
    format!("contact : \"{name}\" message : \"{message}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_template() {
        assert_eq!(
            format_submission("Ash", "Hello there"),
            "contact : \"Ash\" message : \"Hello there\""
        );
    }

    #[tokio::test]
    async fn test_empty_fields_are_rejected_locally() {
        let form = ContactForm::new("http://localhost:9/never-reached");
        let err = form.send("  ", "hi").await.unwrap_err();
        assert!(matches!(err, ContactError::EmptyField));
        let err = form.send("Ash", "\n").await.unwrap_err();
        assert!(matches!(err, ContactError::EmptyField));
    }
}
