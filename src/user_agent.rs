//! User-Agent string sent with every portal request.

/// Default User-Agent for portal traffic (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("portal-fetch/{version}")
}
