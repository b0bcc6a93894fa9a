//! Site-coupled constants for the portal login form and download endpoint.
//!
//! Everything that depends on the portal's markup or wording lives here so the
//! rest of the pipeline stays generic over the target deployment.

use url::Url;

/// Login page of the production portal.
pub const DEFAULT_LOGIN_URL: &str = "https://developer.deepx.ai/";

/// Markup, form and wording of a portal deployment.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Page serving the login form; also the form's POST target and the site root.
    pub login_url: Url,
    /// `id` attribute of the hidden input carrying the CSRF token.
    pub csrf_input_id: &'static str,
    /// `name` attribute of the hidden input carrying the referer token.
    pub referer_input_name: &'static str,
    /// Substring of the post-login URL signalling bad credentials.
    pub login_error_marker: &'static str,
    /// Substring of the post-login URL signalling a bounce back to the login page.
    pub login_page_marker: &'static str,
    /// Body phrases the portal shows for rejected credentials.
    pub invalid_credential_phrases: &'static [&'static str],
    /// Body phrase the portal serves instead of a file the account may not access.
    pub denial_phrase: &'static str,
}

impl Default for SiteProfile {
    fn default() -> Self {
        let login_url = match Url::parse(DEFAULT_LOGIN_URL) {
            Ok(url) => url,
            Err(error) => unreachable!("static login URL is valid: {error}"),
        };
        Self::for_login_url(login_url)
    }
}

impl SiteProfile {
    /// Builds the portal profile bound to another deployment of the same form.
    #[must_use]
    pub fn for_login_url(login_url: Url) -> Self {
        Self {
            login_url,
            csrf_input_id: "CSRFToken-wppb",
            referer_input_name: "_wp_http_referer",
            login_error_marker: "loginerror=",
            login_page_marker: "wp-login.php",
            invalid_credential_phrases: &["잘못된 비밀번호", "알 수 없는 사용자"],
            denial_phrase: "You are not allowed to access this file.",
        }
    }

    /// Parses `login_url` and builds the profile for it.
    ///
    /// # Errors
    ///
    /// Returns the parse error when `login_url` is not an absolute URL.
    pub fn parse(login_url: &str) -> Result<Self, url::ParseError> {
        Url::parse(login_url).map(Self::for_login_url)
    }

    /// Site root used for the form's redirect and referer fields.
    #[must_use]
    pub fn site_root(&self) -> &str {
        self.login_url.as_str()
    }
}
