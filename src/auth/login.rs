//! Form login and outcome classification.
//!
//! The portal answers a login POST with 200 whether or not the credentials
//! were accepted, so the outcome is inferred from the final URL and body by an
//! ordered list of [`LoginCheck`]s.

use std::fmt;

use tracing::{debug, info, instrument};

use super::error::{AuthError, LoginRejection};
use super::tokens::LoginTokens;
use crate::session::Session;
use crate::site::SiteProfile;

const LOGIN_ACTION: &str = "submitting login form";

/// Username and password for the portal. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    /// Username or email.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Final URL and body of the login POST after redirects.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    /// URL after following redirects.
    pub final_url: String,
    /// Response body text.
    pub body: String,
}

/// One login-failure heuristic.
#[derive(Clone, Copy)]
pub struct LoginCheck {
    /// Rejection reported when the check matches.
    pub rejection: LoginRejection,
    /// Returns true when the response indicates this rejection.
    pub matches: fn(&SiteProfile, &LoginResponse) -> bool,
}

impl fmt::Debug for LoginCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCheck")
            .field("rejection", &self.rejection)
            .finish_non_exhaustive()
    }
}

/// Portal login-failure checks, evaluated in order; the first match wins.
pub const LOGIN_CHECKS: &[LoginCheck] = &[
    LoginCheck {
        rejection: LoginRejection::InvalidCredentials,
        matches: url_has_error_marker,
    },
    LoginCheck {
        rejection: LoginRejection::BouncedToLoginPage,
        matches: url_is_login_page,
    },
    LoginCheck {
        rejection: LoginRejection::RejectedInBody,
        matches: body_has_invalid_credential_phrase,
    },
];

fn url_has_error_marker(site: &SiteProfile, response: &LoginResponse) -> bool {
    response.final_url.contains(site.login_error_marker)
}

fn url_is_login_page(site: &SiteProfile, response: &LoginResponse) -> bool {
    response.final_url.contains(site.login_page_marker)
}

fn body_has_invalid_credential_phrase(site: &SiteProfile, response: &LoginResponse) -> bool {
    site.invalid_credential_phrases
        .iter()
        .any(|phrase| response.body.contains(phrase))
}

/// Classifies a login response; `Ok` means the session is authenticated.
///
/// # Errors
///
/// Returns the rejection of the first check in `checks` that matches.
pub fn classify_login(
    site: &SiteProfile,
    response: &LoginResponse,
    checks: &[LoginCheck],
) -> Result<(), LoginRejection> {
    match checks.iter().find(|check| (check.matches)(site, response)) {
        Some(check) => Err(check.rejection),
        None => Ok(()),
    }
}

/// Builds the login form fields in the order the portal's form submits them.
#[must_use]
pub fn login_form<'a>(
    site: &'a SiteProfile,
    credentials: &'a Credentials,
    tokens: &'a LoginTokens,
) -> Vec<(&'static str, &'a str)> {
    let root = site.site_root();
    vec![
        ("log", credentials.username.as_str()),
        ("pwd", credentials.password.as_str()),
        ("wp-submit", "Log In"),
        ("redirect_to", root),
        ("wppb_login", "true"),
        ("wppb_form_location", "widget"),
        ("wppb_request_url", root),
        ("wppb_lostpassword_url", ""),
        ("wppb_redirect_priority", ""),
        ("wppb_referer_url", root),
        ("CSRFToken-wppb", tokens.csrf_token.as_str()),
        ("_wp_http_referer", tokens.referer.as_str()),
        ("wppb_redirect_check", "true"),
        ("rememberme", "forever"),
    ]
}

/// Posts the login form on `session` and classifies the outcome with `checks`.
///
/// Returns the final URL after redirects on success.
///
/// # Errors
///
/// Returns [`AuthError::Network`]/[`AuthError::HttpStatus`] on request
/// failure and [`AuthError::Rejected`] when a check matches.
#[instrument(skip_all, fields(url = %site.login_url))]
pub async fn login(
    session: &Session,
    site: &SiteProfile,
    credentials: &Credentials,
    tokens: &LoginTokens,
    checks: &[LoginCheck],
) -> Result<String, AuthError> {
    let url = site.login_url.as_str();
    let form = login_form(site, credentials, tokens);

    let response = session
        .client()
        .post(site.login_url.clone())
        .form(&form)
        .send()
        .await
        .map_err(|e| AuthError::network(LOGIN_ACTION, url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::http_status(LOGIN_ACTION, url, status.as_u16()));
    }

    let final_url = response.url().to_string();
    let body = response
        .text()
        .await
        .map_err(|e| AuthError::network(LOGIN_ACTION, url, e))?;
    debug!(final_url = %final_url, bytes = body.len(), "login response received");

    let outcome = LoginResponse { final_url, body };
    classify_login(site, &outcome, checks).map_err(AuthError::Rejected)?;

    info!(final_url = %outcome.final_url, "login accepted");
    Ok(outcome.final_url)
}
