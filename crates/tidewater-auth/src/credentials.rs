//! Credential values and providers.
//!
//! A [`Credentials`] value is immutable per issuance: refreshing produces
//! a new value that replaces the old one wholesale, so concurrent readers
//! observe either the previous or the next credentials, never a torn mix.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// A set of credentials for signing requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// The access key ID. Empty for anonymous access.
    pub access_key: String,
    /// The secret access key. Empty for anonymous access.
    pub secret_key: String,
    /// Session token for temporary credentials, sent as
    /// `x-amz-security-token`.
    pub session_token: Option<String>,
    /// When these credentials stop being valid, if they are temporary.
    pub expiration: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Create static credentials from an access key and secret key.
    #[must_use]
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: None,
            expiration: None,
        }
    }

    /// Create anonymous (empty) credentials.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Attach a session token.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Attach an expiration instant.
    #[must_use]
    pub fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Whether these credentials represent anonymous access.
    ///
    /// Anonymous means both key fields are empty; requests are then sent
    /// unsigned.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.access_key.is_empty() && self.secret_key.is_empty()
    }

    /// Whether these credentials have expired.
    ///
    /// Credentials with no expiration never expire.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expiration.is_some_and(|exp| exp <= Utc::now())
    }
}

/// Supplies credentials to the client.
///
/// Implementations own the refresh policy; `fetch` returns the current
/// value. The client calls `fetch` before signing each request, so a
/// provider that refreshes in the background just swaps its stored value.
pub trait CredentialProvider: Send + Sync + std::fmt::Debug {
    /// Return the credentials to sign the next request with.
    fn fetch(&self) -> Arc<Credentials>;
}

/// A provider holding a fixed credential value, replaceable at runtime.
///
/// `replace` swaps the whole value under a write lock; readers cloning
/// the `Arc` under the read lock see old or new, never a mix.
#[derive(Debug)]
pub struct StaticCredentialProvider {
    current: RwLock<Arc<Credentials>>,
}

impl StaticCredentialProvider {
    /// Create a provider around the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            current: RwLock::new(Arc::new(credentials)),
        }
    }

    /// Replace the stored credentials with a fresh issuance.
    pub fn replace(&self, credentials: Credentials) {
        *self.current.write() = Arc::new(credentials);
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn fetch(&self) -> Arc<Credentials> {
        Arc::clone(&self.current.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_detect_anonymous_credentials() {
        assert!(Credentials::anonymous().is_anonymous());
        assert!(!Credentials::new("AKID", "secret").is_anonymous());
    }

    #[test]
    fn test_should_never_expire_without_expiration() {
        let creds = Credentials::new("AKID", "secret");
        assert!(!creds.is_expired());
    }

    #[test]
    fn test_should_expire_when_expiration_in_past() {
        let creds = Credentials::new("AKID", "secret")
            .with_expiration(Utc::now() - chrono::Duration::seconds(1));
        assert!(creds.is_expired());

        let fresh = Credentials::new("AKID", "secret")
            .with_expiration(Utc::now() + chrono::Duration::hours(1));
        assert!(!fresh.is_expired());
    }

    #[test]
    fn test_should_replace_credentials_wholesale() {
        let provider = StaticCredentialProvider::new(Credentials::new("OLD", "old-secret"));
        let before = provider.fetch();

        provider.replace(Credentials::new("NEW", "new-secret").with_session_token("token"));
        let after = provider.fetch();

        // The old Arc still holds the complete old value.
        assert_eq!(before.access_key, "OLD");
        assert!(before.session_token.is_none());
        assert_eq!(after.access_key, "NEW");
        assert_eq!(after.session_token.as_deref(), Some("token"));
    }
}
