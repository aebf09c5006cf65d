//! Resolution of the authenticated principal behind a request.

use axum::http::{HeaderMap, HeaderName};
use core_auth::PrincipalId;

/// Header carrying the principal id, set by the fronting auth layer.
pub const PRINCIPAL_HEADER: &str = "x-principal-id";

/// Maps an incoming request to the principal that owns its credential.
pub trait SessionResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<PrincipalId>;
}

/// Trusts a single request header. Only suitable behind a proxy that strips
/// the header from client requests and sets it after authenticating.
#[derive(Debug, Clone)]
pub struct HeaderSessionResolver {
    header: HeaderName,
}

impl HeaderSessionResolver {
    pub fn new() -> Self {
        Self {
            header: HeaderName::from_static(PRINCIPAL_HEADER),
        }
    }

    pub fn with_header(header: HeaderName) -> Self {
        Self { header }
    }
}

impl Default for HeaderSessionResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionResolver for HeaderSessionResolver {
    fn resolve(&self, headers: &HeaderMap) -> Option<PrincipalId> {
        let value = headers.get(&self.header)?.to_str().ok()?.trim();
        (!value.is_empty()).then(|| PrincipalId::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_resolution() {
        let resolver = HeaderSessionResolver::new();
        let mut headers = HeaderMap::new();
        assert!(resolver.resolve(&headers).is_none());

        headers.insert(PRINCIPAL_HEADER, HeaderValue::from_static("  "));
        assert!(resolver.resolve(&headers).is_none());

        headers.insert(PRINCIPAL_HEADER, HeaderValue::from_static("user-1"));
        assert_eq!(resolver.resolve(&headers), Some(PrincipalId::new("user-1")));
    }

    #[test]
    fn test_custom_header() {
        let resolver = HeaderSessionResolver::with_header(HeaderName::from_static("x-user"));
        let mut headers = HeaderMap::new();
        headers.insert("x-user", HeaderValue::from_static("ops"));
        assert_eq!(resolver.resolve(&headers), Some(PrincipalId::new("ops")));
    }
}
