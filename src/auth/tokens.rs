//! Login page fetch and hidden-token extraction.

use tracing::{debug, instrument};

use super::error::AuthError;
use crate::html::{self, Attributes};
use crate::session::Session;
use crate::site::SiteProfile;

const FETCH_ACTION: &str = "retrieving login page";

/// Hidden form values scraped from the login page, valid for one login POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTokens {
    /// Value of the CSRF input.
    pub csrf_token: String,
    /// Value of the referer input.
    pub referer: String,
}

/// Fetches the login page and extracts the login tokens from it.
///
/// # Errors
///
/// Returns [`AuthError::Network`] or [`AuthError::HttpStatus`] when the page
/// cannot be fetched, and [`AuthError::Scrape`] when a token input is missing.
#[instrument(skip_all, fields(url = %site.login_url))]
pub async fn fetch_login_tokens(
    session: &Session,
    site: &SiteProfile,
) -> Result<LoginTokens, AuthError> {
    let url = site.login_url.as_str();
    let response = session
        .client()
        .get(site.login_url.clone())
        .send()
        .await
        .map_err(|e| AuthError::network(FETCH_ACTION, url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::http_status(FETCH_ACTION, url, status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AuthError::network(FETCH_ACTION, url, e))?;
    debug!(bytes = body.len(), "login page fetched");

    extract_login_tokens(&body, site)
}

/// Extracts the CSRF and referer tokens from login page markup.
///
/// The CSRF token is the `value` of the input whose `id` matches
/// [`SiteProfile::csrf_input_id`]; the referer token is the `value` of the
/// input whose `name` matches [`SiteProfile::referer_input_name`].
///
/// # Errors
///
/// Returns [`AuthError::Scrape`] when either input is absent or has an empty value.
pub fn extract_login_tokens(html: &str, site: &SiteProfile) -> Result<LoginTokens, AuthError> {
    let inputs = html::input_elements(html);
    let csrf_token = input_value(&inputs, "id", site.csrf_input_id)?;
    let referer = input_value(&inputs, "name", site.referer_input_name)?;
    Ok(LoginTokens {
        csrf_token,
        referer,
    })
}

fn input_value(inputs: &[Attributes], attribute: &str, expected: &str) -> Result<String, AuthError> {
    let element = inputs
        .iter()
        .find(|input| input.get(attribute).is_some_and(|value| value == expected))
        .ok_or_else(|| AuthError::missing_element(expected))?;

    element
        .get("value")
        .filter(|value| !value.is_empty())
        .cloned()
        .ok_or_else(|| AuthError::missing_value(expected))
}
