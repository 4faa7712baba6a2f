//! Client configuration.
//!
//! All fields can be driven by environment variables, which keeps
//! examples and CI setups free of inline credentials.

/// Configuration for a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint host, with a non-default port if any (e.g.
    /// `play.min.io` or `localhost:9000`).
    pub endpoint: String,
    /// Whether to connect over TLS.
    pub secure: bool,
    /// Region used in the signing scope.
    pub region: String,
    /// Access key ID; empty for anonymous access.
    pub access_key: String,
    /// Secret access key; empty for anonymous access.
    pub secret_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost:9000".to_owned(),
            secure: false,
            region: "us-east-1".to_owned(),
            access_key: String::new(),
            secret_key: String::new(),
            session_token: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `TIDEWATER_ENDPOINT`, `TIDEWATER_SECURE`,
    /// `TIDEWATER_REGION`, `TIDEWATER_ACCESS_KEY`,
    /// `TIDEWATER_SECRET_KEY`, `TIDEWATER_SESSION_TOKEN`. Unset
    /// variables keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("TIDEWATER_ENDPOINT") {
            config.endpoint = v;
        }
        if let Ok(v) = std::env::var("TIDEWATER_SECURE") {
            config.secure = v == "1" || v.eq_ignore_ascii_case("true");
        }
        if let Ok(v) = std::env::var("TIDEWATER_REGION") {
            config.region = v;
        }
        if let Ok(v) = std::env::var("TIDEWATER_ACCESS_KEY") {
            config.access_key = v;
        }
        if let Ok(v) = std::env::var("TIDEWATER_SECRET_KEY") {
            config.secret_key = v;
        }
        if let Ok(v) = std::env::var("TIDEWATER_SESSION_TOKEN") {
            config.session_token = Some(v);
        }

        config
    }

    /// The URL scheme implied by the TLS flag.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        if self.secure { "https" } else { "http" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "localhost:9000");
        assert_eq!(config.region, "us-east-1");
        assert!(!config.secure);
        assert_eq!(config.scheme(), "http");
    }

    #[test]
    fn test_should_derive_scheme_from_secure_flag() {
        let config = ClientConfig {
            secure: true,
            ..ClientConfig::default()
        };
        assert_eq!(config.scheme(), "https");
    }
}
