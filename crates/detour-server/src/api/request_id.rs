//! `x-request-id` tagging for API calls.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest caller-supplied id that is reused as is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Identifier attached to a request's extensions and echoed on its response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Reuse the caller's id when it is short visible ASCII, otherwise mint a
    /// fresh UUID v4.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(&REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| {
                !id.is_empty()
                    && id.len() <= MAX_REQUEST_ID_LEN
                    && id.bytes().all(|b| b.is_ascii_graphic())
            })
            .map(|id| Self(id.to_string()))
            .unwrap_or_else(Self::generate)
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run the rest of the stack inside an `api` span keyed by the request id.
pub async fn tag_request(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());
    let span = tracing::info_span!(
        "api",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).instrument(span).await;
    if let Some(value) = request_id.header_value() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(id).expect("header"));
        headers
    }

    #[test]
    fn caller_id_is_reused_trimmed() {
        let id = RequestId::from_headers(&headers_with("  plan-42 "));
        assert_eq!(id.as_str(), "plan-42");
    }

    #[test]
    fn missing_or_unusable_ids_are_replaced() {
        let generated = RequestId::from_headers(&HeaderMap::new());
        assert!(uuid::Uuid::parse_str(generated.as_str()).is_ok());

        let spaced = RequestId::from_headers(&headers_with("two words"));
        assert_ne!(spaced.as_str(), "two words");

        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        assert_ne!(RequestId::from_headers(&headers_with(&long)).as_str(), long);
    }
}
