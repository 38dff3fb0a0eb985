//! WebDriver client error types.

use std::fmt;

/// Errors from the WebDriver HTTP client.
#[derive(Debug)]
pub enum WebDriverError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Response body was not the expected JSON
    Json {
        message: String,
        body: Option<String>,
    },

    /// The driver rejected a command (W3C error payload)
    Command {
        status: u16,
        error: String,
        message: String,
    },
}

impl WebDriverError {
    /// The W3C error code, when the driver sent one.
    pub fn code(&self) -> Option<&str> {
        match self {
            WebDriverError::Command { error, .. } => Some(error),
            _ => None,
        }
    }

    /// The element was not found (yet).
    pub fn is_no_such_element(&self) -> bool {
        self.code() == Some("no such element")
    }

    /// The element was removed from the page after it was found.
    pub fn is_stale(&self) -> bool {
        self.code() == Some("stale element reference")
    }

    /// The browser session no longer exists.
    pub fn is_invalid_session(&self) -> bool {
        self.code() == Some("invalid session id")
    }
}

impl fmt::Display for WebDriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebDriverError::Http(e) => write!(f, "HTTP error: {e}"),
            WebDriverError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            WebDriverError::Command {
                status,
                error,
                message,
            } => write!(f, "command failed ({status} {error}): {message}"),
        }
    }
}

impl std::error::Error for WebDriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WebDriverError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WebDriverError {
    fn from(err: reqwest::Error) -> Self {
        WebDriverError::Http(err)
    }
}
