//! Transport boundary: request preparation, envelope decoding and HTTP.

mod envelope;
mod http;
mod interceptor;
mod request;

pub use envelope::ResponseEnvelope;
pub use envelope::SUCCESS_CODE;
pub use http::HttpTransport;
pub use interceptor::Interceptors;
pub use interceptor::TIMESTAMP_PARAM;
pub use request::PreparedRequest;
pub use request::RawResponse;

use async_trait::async_trait;

use crate::error::FailureOutcome;

/// Sends prepared requests.
///
/// Returns `Err` only for failures below HTTP; any response that arrived,
/// whatever its status, is returned as a [`RawResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request.
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, FailureOutcome>;
}
