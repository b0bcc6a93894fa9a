//! Cookie-carrying HTTP session shared by the login and download stages.
//!
//! One [`Session`] is built per run. Its cookie jar picks up the login
//! cookies from the form POST and replays them on the download request.

use std::sync::Arc;

use reqwest::Client;
use reqwest::cookie::Jar;
use tracing::instrument;

use crate::user_agent;

/// HTTP session with a cookie jar, used for every request of a run.
///
/// No timeouts are configured: a stalled request blocks until the process
/// is terminated.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    cookie_jar: Arc<Jar>,
}

impl Session {
    /// Creates a new session with an empty cookie jar.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error when the TLS backend or system
    /// proxy configuration cannot be initialised.
    #[instrument(level = "debug")]
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_cookie_jar(Arc::new(Jar::default()))
    }

    /// Creates a session around an existing cookie jar.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Session::new`].
    #[instrument(level = "debug", skip(cookie_jar))]
    pub fn with_cookie_jar(cookie_jar: Arc<Jar>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .cookie_provider(Arc::clone(&cookie_jar))
            .build()?;
        Ok(Self { client, cookie_jar })
    }

    /// Returns the underlying reqwest client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Returns the cookie jar holding the session cookies.
    #[must_use]
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.cookie_jar
    }
}
