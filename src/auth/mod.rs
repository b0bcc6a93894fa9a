//! Portal authentication.
//!
//! Two stages on the shared [`Session`](crate::Session): scrape the hidden
//! login tokens from the login page, then post the login form and classify
//! the outcome.

mod error;
mod login;
mod tokens;

pub use error::{AuthError, LoginRejection};
pub use login::{
    Credentials, LOGIN_CHECKS, LoginCheck, LoginResponse, classify_login, login, login_form,
};
pub use tokens::{LoginTokens, extract_login_tokens, fetch_login_tokens};
