//! Chromium DevTools Protocol backend for pagescript tools.
//!
//! Attaches to (or launches) a Chromium instance through `chromiumoxide`,
//! tracks its page targets as tabs and evaluates scripts with
//! `Runtime.evaluate`.

pub mod config;
pub mod context;
pub mod error;
pub mod page;

pub use config::CdpConfig;
pub use context::CdpContext;
pub use error::{AdapterError, AdapterErrorKind};
pub use page::{classify_protocol_error, failure_from_exception, CdpPage};
