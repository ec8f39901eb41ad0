//! HTTP module.
//!
//! This module provides:
//! - Shared session (cookie jar, default headers)
//! - Request construction
//! - Retrying transport with rate-limit backoff

pub mod request;
pub mod retry;
pub mod session;
pub mod transport;

pub use request::{build_request, PreparedRequest, RequestOptions};
pub use retry::{pause, Backoff, RetryDecision, RetryPolicy};
pub use session::Session;
pub use transport::{Response, Transport};
