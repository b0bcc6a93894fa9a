//! Portal Fetch Library
//!
//! Logs in to a form-based developer portal (CSRF token + session cookie) and
//! downloads a single protected file, refusing HTML denial pages and removing
//! anything that did not arrive complete.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`site`] - Site-coupled constants (login URL, form field names, markers)
//! - [`session`] - Cookie-carrying HTTP session shared by every request
//! - [`auth`] - Login page scraping and form login
//! - [`download`] - Download negotiation, filename resolution, persistence
//! - [`console`] - Leveled, colored user-facing output and progress
//! - [`pipeline`] - The end-to-end run wiring the stages together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod console;
pub mod download;
mod error;
mod html;
pub mod pipeline;
pub mod session;
pub mod site;
mod user_agent;

// Re-export commonly used types
pub use auth::{AuthError, Credentials, LOGIN_CHECKS, LoginRejection, LoginTokens};
pub use crate::console::{Console, ConsoleOptions, Level};
pub use download::{DenialReason, DownloadError, FILENAME_STRATEGIES, human_readable_size};
pub use error::FetchError;
pub use pipeline::{FetchRequest, run};
pub use session::Session;
pub use site::{DEFAULT_LOGIN_URL, SiteProfile};
