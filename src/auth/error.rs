//! Error types for the login stages.

use std::fmt;

use thiserror::Error;

/// Why the portal is considered to have rejected a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRejection {
    /// The post-login URL carries the portal's login-error marker.
    InvalidCredentials,
    /// The portal redirected back to its login page.
    BouncedToLoginPage,
    /// The response body shows one of the portal's invalid-credential phrases.
    RejectedInBody,
}

impl fmt::Display for LoginRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::InvalidCredentials => "the provided username or password is invalid",
            Self::BouncedToLoginPage => {
                "the server redirected back to the login page unexpectedly"
            }
            Self::RejectedInBody => {
                "the website indicated an invalid username or password in its content"
            }
        };
        f.write_str(text)
    }
}

/// Errors that can occur while fetching the login page or logging in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Transport-level failure (DNS, connection, TLS, broken body).
    #[error("network error while {action} ({url}): {source}")]
    Network {
        /// What the request was for, e.g. "retrieving login page".
        action: &'static str,
        /// The requested URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} while {action} ({url})")]
    HttpStatus {
        /// What the request was for.
        action: &'static str,
        /// The requested URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// A hidden login form field could not be scraped from the login page.
    #[error("login form field '{field}' not found ({detail}); the website's HTML structure might have changed")]
    Scrape {
        /// Identifier of the missing input (id or name).
        field: String,
        /// Which part was missing.
        detail: &'static str,
    },

    /// The portal rejected the credentials.
    #[error("login failed: {0}; please check your credentials")]
    Rejected(LoginRejection),
}

impl AuthError {
    /// Creates a network error from a reqwest error.
    pub fn network(action: &'static str, url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            action,
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(action: &'static str, url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            action,
            url: url.into(),
            status,
        }
    }

    /// Creates a scrape error for a missing input element.
    pub fn missing_element(field: impl Into<String>) -> Self {
        Self::Scrape {
            field: field.into(),
            detail: "element not found",
        }
    }

    /// Creates a scrape error for an input element without a usable value.
    pub fn missing_value(field: impl Into<String>) -> Self {
        Self::Scrape {
            field: field.into(),
            detail: "element has no value",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_scrape_display_names_field() {
        let msg = AuthError::missing_element("CSRFToken-wppb").to_string();
        assert!(msg.contains("CSRFToken-wppb"), "Expected field in: {msg}");
        assert!(msg.contains("element not found"), "Expected detail in: {msg}");
        assert!(msg.contains("HTML structure"), "Expected drift hint in: {msg}");
    }

    #[test]
    fn test_auth_error_http_status_display() {
        let msg = AuthError::http_status("submitting login form", "https://portal.test/", 503)
            .to_string();
        assert!(msg.contains("503"), "Expected status in: {msg}");
        assert!(msg.contains("submitting login form"), "Expected action in: {msg}");
    }

    #[test]
    fn test_auth_error_rejected_display_per_reason() {
        let bounced = AuthError::Rejected(LoginRejection::BouncedToLoginPage).to_string();
        assert!(bounced.contains("redirected back to the login page"));

        let invalid = AuthError::Rejected(LoginRejection::InvalidCredentials).to_string();
        assert!(invalid.contains("username or password is invalid"));
        assert!(invalid.contains("check your credentials"));
    }
}
