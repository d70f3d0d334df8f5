//! Catalog credentials.

use reqwest::RequestBuilder;

/// How the catalog credential is presented on each request.
///
/// Read-access tokens are JWTs (they start with `eyJ`) and travel in the
/// `Authorization` header; classic API keys travel as the `api_key` query
/// parameter.
#[derive(Clone, PartialEq, Eq)]
pub enum CatalogAuth {
    /// `api_key` query parameter
    ApiKey(String),
    /// `Authorization: Bearer` header
    Bearer(String),
}

impl CatalogAuth {
    /// Infer the scheme from the credential's shape.
    ///
    /// Returns `None` for a blank credential.
    ///
    /// # Examples
    ///
    /// ```
    /// use marquee_catalog::CatalogAuth;
    ///
    /// assert!(matches!(CatalogAuth::from_credential("eyJhbGciOi.x.y"), Some(CatalogAuth::Bearer(_))));
    /// assert!(matches!(CatalogAuth::from_credential("0123abcd"), Some(CatalogAuth::ApiKey(_))));
    /// assert!(CatalogAuth::from_credential("  ").is_none());
    /// ```
    pub fn from_credential(credential: &str) -> Option<Self> {
        let credential = credential.trim();
        if credential.is_empty() {
            None
        } else if credential.starts_with("eyJ") {
            Some(Self::Bearer(credential.to_string()))
        } else {
            Some(Self::ApiKey(credential.to_string()))
        }
    }

    /// Attach the credential to a request.
    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::ApiKey(key) => request.query(&[("api_key", key.as_str())]),
            Self::Bearer(token) => request.bearer_auth(token),
        }
    }
}

impl std::fmt::Debug for CatalogAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::Bearer(_) => f.write_str("Bearer(***)"),
        }
    }
}
