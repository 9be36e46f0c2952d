use thiserror::Error;

/// Errors raised by the Plex, Radarr and Sonarr clients
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level failure (connection refused, timeout, TLS...)
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status
    #[error("{service} API error: {status} - {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// A mutation needs an id the item does not carry
    #[error("Missing identifier: {0}")]
    MissingIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid {service} configuration: {message}")]
    InvalidConfig {
        service: &'static str,
        message: String,
    },
}

impl SourceError {
    pub fn http(service: &'static str, source: reqwest::Error) -> Self {
        SourceError::Http { service, source }
    }

    pub fn decode(service: &'static str, err: impl std::fmt::Display) -> Self {
        SourceError::Decode {
            service,
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_) | SourceError::Api { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SourceError::Api {
            service: "Radarr",
            status: 401,
            message: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "Radarr API error: 401 - Unauthorized");
        assert!(!err.is_not_found());

        let err = SourceError::Api {
            service: "Sonarr",
            status: 404,
            message: String::new(),
        };
        assert!(err.is_not_found());
    }
}
