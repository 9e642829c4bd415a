use std::time::Duration;

use crate::error::LLMError;
use crate::http::{HttpResponse, status_line};

/// Extracts the `Retry-After` header (in seconds) if present.
///
/// HTTP-date values are ignored because vendors primarily use the numeric form.
pub(crate) fn retry_after(response: &HttpResponse) -> Option<Duration> {
    response
        .header("retry-after")
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Returns the body text of a 2xx response, or an [`LLMError::Status`] otherwise.
///
/// A 2xx body that is not UTF-8 is an undecodable payload and reported as
/// [`LLMError::Provider`]; the bytes were delivered, so it is not a transport failure.
/// The error body is decoded lossily so a malformed payload never hides the status.
pub(crate) fn ensure_success(
    provider: &'static str,
    response: HttpResponse,
) -> Result<String, LLMError> {
    if response.is_success() {
        return String::from_utf8(response.body).map_err(|err| {
            LLMError::provider(provider, format!("response body is not valid UTF-8: {err}"))
        });
    }

    let retry_after = retry_after(&response);
    let body = String::from_utf8_lossy(&response.body).into_owned();
    tracing::warn!(provider, status = response.status, "provider returned error status");
    Err(LLMError::Status {
        provider,
        status: response.status,
        status_line: status_line(response.status),
        body,
        retry_after,
    })
}
