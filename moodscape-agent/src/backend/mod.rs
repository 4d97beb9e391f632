//! Support-service backends.
//!
//! The [`traits::SupportBackend`] trait abstracts the remote inference and
//! reflection services:
//! - [`http::HttpBackend`]: the production HTTP client
//! - [`mock::MockBackend`]: scripted backend for tests

pub mod http;
pub mod mock;
pub mod traits;

pub use http::HttpBackend;
pub use mock::MockBackend;
pub use traits::{BackendError, ExchangeRequest, ExchangeResponse, SafetyAction, SupportBackend};
